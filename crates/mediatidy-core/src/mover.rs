use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(PathBuf),
    /// The source already occupies a valid name for this destination
    AlreadyInPlace(PathBuf),
}

impl MoveOutcome {
    pub fn path(&self) -> &Path {
        match self {
            MoveOutcome::Moved(p) | MoveOutcome::AlreadyInPlace(p) => p,
        }
    }
}

/// Move `source` to `destination`, never overwriting an existing file.
/// A taken name gets `C1`, `C2`, ... appended to its stem.
pub fn move_without_overwrite(source: &Path, destination: &Path) -> Result<MoveOutcome> {
    if !source.exists() {
        anyhow::bail!("Source file does not exist: {}", source.display());
    }

    let target = free_destination(source, destination)?;
    if target == source {
        return Ok(MoveOutcome::AlreadyInPlace(target));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    log::info!("Moving {} -> {}", source.display(), target.display());

    if let Err(e) = fs::rename(source, &target) {
        // Different filesystems: fall back to copy + delete
        log::warn!("Rename failed, attempting copy + delete: {}", e);
        fs::copy(source, &target)
            .with_context(|| format!("Failed to copy {} to {}", source.display(), target.display()))?;
        fs::remove_file(source)
            .with_context(|| format!("Failed to remove {} after copy", source.display()))?;
    }

    Ok(MoveOutcome::Moved(target))
}

/// First of `destination`, `<stem>C1<ext>`, `<stem>C2<ext>`, ... that is
/// either free or is `source` itself.
fn free_destination(source: &Path, destination: &Path) -> Result<PathBuf> {
    let usable = |p: &Path| p == source || !p.exists();

    if usable(destination) {
        return Ok(destination.to_path_buf());
    }

    let stem = destination
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Could not extract file stem")?;
    let ext = destination
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    let parent = destination.parent().context("Could not get parent directory")?;

    for counter in 1..=u32::MAX {
        let candidate = parent.join(format!("{}C{}{}", stem, counter, ext));
        if usable(&candidate) {
            log::warn!(
                "{} is taken, using {}",
                destination.display(),
                candidate.display()
            );
            return Ok(candidate);
        }
    }

    anyhow::bail!("No free name left for {}", destination.display())
}

/// Remove every empty directory below `root`, deepest first, repeating until a
/// pass removes nothing. `root` itself is kept. Returns how many were removed.
pub fn prune_empty_directories(root: &Path) -> usize {
    let mut total = 0;

    loop {
        let mut removed = 0;
        for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry while pruning: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let is_empty = fs::read_dir(entry.path())
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !is_empty {
                continue;
            }

            match fs::remove_dir(entry.path()) {
                Ok(()) => {
                    log::debug!("Removed empty directory {}", entry.path().display());
                    removed += 1;
                }
                Err(e) => log::warn!("Cannot remove {}: {}", entry.path().display(), e),
            }
        }

        if removed == 0 {
            return total;
        }
        total += removed;
    }
}
