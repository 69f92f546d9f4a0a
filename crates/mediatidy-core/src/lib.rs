pub mod compose;
pub mod date;
pub mod geocode;
pub mod location;
pub mod media;
pub mod metadata;
pub mod mover;
pub mod processed;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::geocode::{GeocoderConfig, NominatimGeocoder, ReverseGeocoder};
use crate::location::PlaceHierarchy;
use crate::media::{MediaKind, MediaRecord};
use crate::mover::MoveOutcome;

pub use crate::processed::ProcessedSet;

/// Validated run configuration. The caller checks that `directory` exists and
/// that the naming format and time zone are usable.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub directory: PathBuf,
    /// Sort images into country/region/municipality/city folders
    pub location_searching: bool,
    /// strftime pattern for file names, `date::DEFAULT_NAMING_FORMAT` if unset
    pub naming_format: Option<String>,
    /// Zone file names are rendered in, local time if unset
    pub time_zone: Option<Tz>,
    pub geocoder: GeocoderConfig,
}

impl OrganizeOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            location_searching: false,
            naming_format: None,
            time_zone: None,
            geocoder: GeocoderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeResult {
    pub total_media: u64,
    pub moved: u64,
    pub unchanged: u64,
    /// Rediscovered files that an earlier move of this run put in place
    pub skipped_processed: u64,
    pub failed: u64,
    pub directories_pruned: u64,
    #[serde(default)]
    pub failures: Vec<FileFailure>,
}

/// Progress notifications emitted while a run walks the tree.
#[derive(Debug)]
pub enum OrganizeEvent<'a> {
    Processing(&'a Path),
    Moved { from: &'a Path, to: &'a Path },
    Unchanged(&'a Path),
    AlreadyProcessed(&'a Path),
    Failed { path: &'a Path, message: &'a str },
    Pruned(u64),
}

/// Type alias for progress callback
pub type ProgressCallback<'c> = dyn Fn(&OrganizeEvent<'_>) + 'c;

/// Organize `options.directory` with a fresh [`ProcessedSet`], querying
/// Nominatim when location searching is on.
pub fn organize(
    options: &OrganizeOptions,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<OrganizeResult> {
    let geocoder = if options.location_searching {
        Some(NominatimGeocoder::new(&options.geocoder).context("Failed to set up geocoder")?)
    } else {
        None
    };

    let (result, _) = organize_with(
        options,
        geocoder.as_ref().map(|g| g as &dyn ReverseGeocoder),
        ProcessedSet::new(),
        progress_callback,
    )?;
    Ok(result)
}

/// Run the pipeline with an explicit geocoder and processed set. Places are
/// only looked up when `options.location_searching` is set and a geocoder is
/// given. The set is emptied before the walk starts and handed back so
/// callers can inspect it.
pub fn organize_with(
    options: &OrganizeOptions,
    geocoder: Option<&dyn ReverseGeocoder>,
    mut processed: ProcessedSet,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<(OrganizeResult, ProcessedSet)> {
    let root = fs::canonicalize(&options.directory)
        .with_context(|| format!("Cannot open {}", options.directory.display()))?;
    let mut result = OrganizeResult::default();
    processed.clear();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(kind) = MediaKind::from_path(path) else {
            continue;
        };

        if processed.contains(path) {
            log::debug!("Already processed this run: {}", path.display());
            result.skipped_processed += 1;
            progress_callback(&OrganizeEvent::AlreadyProcessed(path));
            continue;
        }

        result.total_media += 1;
        progress_callback(&OrganizeEvent::Processing(path));

        match process_file(&root, path, kind, options, geocoder) {
            Ok(MoveOutcome::Moved(to)) => {
                processed.insert(&to);
                result.moved += 1;
                progress_callback(&OrganizeEvent::Moved { from: path, to: &to });
            }
            Ok(MoveOutcome::AlreadyInPlace(at)) => {
                processed.insert(&at);
                result.unchanged += 1;
                progress_callback(&OrganizeEvent::Unchanged(&at));
            }
            Err(e) => {
                let message = format!("{:#}", e);
                log::error!("Error processing {}: {}", path.display(), message);
                result.failed += 1;
                progress_callback(&OrganizeEvent::Failed {
                    path,
                    message: &message,
                });
                result.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    message,
                });
            }
        }
    }

    result.directories_pruned = mover::prune_empty_directories(&root) as u64;
    progress_callback(&OrganizeEvent::Pruned(result.directories_pruned));

    Ok((result, processed))
}

/// Take one file from discovery to its final place.
fn process_file(
    root: &Path,
    path: &Path,
    kind: MediaKind,
    options: &OrganizeOptions,
    geocoder: Option<&dyn ReverseGeocoder>,
) -> anyhow::Result<MoveOutcome> {
    let mut record = MediaRecord::new(path.to_path_buf(), kind);

    if kind == MediaKind::Image {
        record.metadata = match metadata::read_image_metadata(path) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                log::debug!("No readable metadata in {}: {}", path.display(), e);
                None
            }
        };
    }

    let taken = date::resolve(path, kind, record.metadata.as_ref())?;
    record.capture_instant = Some(taken.instant);
    let stem = date::format_instant(
        &taken.instant,
        options.time_zone,
        options.naming_format.as_deref(),
    )?;

    if options.location_searching {
        if let (Some(geocoder), Some(metadata)) = (geocoder, record.metadata.as_ref()) {
            let coordinates = location::extract_coordinates(metadata);
            let components = location::reverse_geocode(geocoder, coordinates)
                .context("Reverse geocoding failed")?;
            record.place_hierarchy = PlaceHierarchy::from_components(&components);
        }
    }

    let destination = compose::compose(
        root,
        &record.source_path,
        &stem,
        &record.extension(),
        &record.place_hierarchy,
    );
    record.destination_path = Some(destination.path.clone());
    log::debug!("{}", record.describe());

    if destination.unchanged {
        log::debug!("{} is already in place", path.display());
        return Ok(MoveOutcome::AlreadyInPlace(destination.path));
    }

    mover::move_without_overwrite(&record.source_path, &destination.path)
}
