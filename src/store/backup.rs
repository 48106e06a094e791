//! Rotating backups of the configuration document
//!
//! Backups are named `config-<unix time>.xml` after the revision time of the
//! document they preserve.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{AliasToolError, Result};

const PREFIX: &str = "config-";
const SUFFIX: &str = ".xml";

/// Copy `document` into `dir` and prune old backups down to `keep`
pub fn backup_document(document: &Path, dir: &Path, revision_time: i64, keep: usize) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| AliasToolError::Store(format!("Failed to create backup directory: {}", e)))?;

    let target = dir.join(format!("{}{}{}", PREFIX, revision_time, SUFFIX));
    fs::copy(document, &target)
        .map_err(|e| AliasToolError::Store(format!("Failed to back up {}: {}", document.display(), e)))?;
    debug!(path = %target.display(), "Config backup written");

    prune_backups(dir, keep)?;
    Ok(target)
}

/// Remove the oldest backups so at most `keep` remain
pub fn prune_backups(dir: &Path, keep: usize) -> Result<()> {
    let mut backups = list_backups(dir)?;
    if backups.len() <= keep {
        return Ok(());
    }

    backups.sort_by_key(|(time, _)| *time);
    let excess = backups.len() - keep;
    for (_, path) in backups.into_iter().take(excess) {
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove old config backup");
        }
    }
    Ok(())
}

/// Backups in `dir` with their revision times, unordered
pub fn list_backups(dir: &Path) -> Result<Vec<(i64, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut backups = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(time) = name
            .to_str()
            .and_then(|n| n.strip_prefix(PREFIX))
            .and_then(|n| n.strip_suffix(SUFFIX))
            .and_then(|t| t.parse::<i64>().ok())
        else {
            continue;
        };
        backups.push((time, entry.path()));
    }
    Ok(backups)
}
