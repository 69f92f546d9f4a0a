use std::path::PathBuf;

use anyhow::Context;
use chrono_tz::Tz;
use clap::Parser;
use mediatidy_core::geocode::{GeocoderConfig, DEFAULT_GEOCODER_URL, DEFAULT_USER_AGENT};
use mediatidy_core::{date, OrganizeEvent, OrganizeOptions};

#[derive(Parser)]
#[command(name = "mediatidy", version, about = "Rename media files by capture time and sort them by place")]
struct Cli {
    /// Directory to organize (walked recursively)
    directory: PathBuf,

    /// Sort images with GPS tags into country/region/municipality/city folders
    #[arg(short, long)]
    locations: bool,

    /// strftime pattern for new file names
    #[arg(short, long, default_value = date::DEFAULT_NAMING_FORMAT)]
    format: String,

    /// IANA time zone for file names, e.g. Europe/Athens (default: local)
    #[arg(short, long)]
    time_zone: Option<String>,

    /// Base URL of a Nominatim compatible reverse geocoder
    #[arg(long, default_value = DEFAULT_GEOCODER_URL)]
    geocoder_url: String,

    /// User-Agent sent to the geocoder
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_options(self) -> anyhow::Result<OrganizeOptions> {
        if !self.directory.is_dir() {
            anyhow::bail!("Invalid directory path: {}", self.directory.display());
        }

        let time_zone = self
            .time_zone
            .as_deref()
            .map(|name| name.parse::<Tz>().map_err(|_| anyhow::anyhow!("Invalid time zone: {}", name)))
            .transpose()?;

        date::validate_naming_format(&self.format).context("Invalid naming format")?;

        Ok(OrganizeOptions {
            directory: self.directory,
            location_searching: self.locations,
            naming_format: Some(self.format),
            time_zone,
            geocoder: GeocoderConfig {
                base_url: self.geocoder_url,
                user_agent: self.user_agent,
                ..GeocoderConfig::default()
            },
        })
    }
}

fn print_event(event: &OrganizeEvent<'_>) {
    match event {
        OrganizeEvent::Processing(path) => println!("Processing {}...", path.display()),
        OrganizeEvent::Moved { to, .. } => println!("  -> {}", to.display()),
        OrganizeEvent::Unchanged(_) => println!("  already in place"),
        OrganizeEvent::AlreadyProcessed(path) => {
            println!("Skipping {} (moved earlier in this run)", path.display())
        }
        OrganizeEvent::Failed { path, message } => {
            println!("Error processing {}: {}", path.display(), message)
        }
        OrganizeEvent::Pruned(0) => {}
        OrganizeEvent::Pruned(count) => println!("Removed {} empty directories", count),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let json = cli.json;
    let options = cli.into_options()?;
    let t_total = std::time::Instant::now();

    log::info!("Organizing {}", options.directory.display());
    let result = mediatidy_core::organize(&options, &print_event)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    println!(
        "Processing complete! {} media files, {} moved, {} unchanged, {} failed ({:.2}s)",
        result.total_media,
        result.moved,
        result.unchanged,
        result.failed,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
