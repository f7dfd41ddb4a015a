//! Write-back of an edited document with a one-level `.bak` sidecar.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    document::{SaveDocument, BACKUP_FILE_NAME, SAVE_FILE_NAME},
    error::EditorError,
};

/// Paths touched by a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// The rewritten `data.json`.
    pub target: PathBuf,
    /// The sidecar holding the previous bytes.
    pub backup: PathBuf,
}

/// `data.json` and `data.json.bak` inside `slot_dir`.
pub fn backup_paths(slot_dir: &Path) -> (PathBuf, PathBuf) {
    (
        slot_dir.join(SAVE_FILE_NAME),
        slot_dir.join(BACKUP_FILE_NAME),
    )
}

/// Copy the current `data.json` over `data.json.bak`, then replace
/// `data.json` with the pretty-printed document and clear its dirty flag.
///
/// If the copy fails nothing on disk changes. The replacement is written to a
/// temporary file in the slot directory and renamed into place.
pub fn save_document(
    slot_dir: &Path,
    document: &mut SaveDocument,
) -> Result<SaveReport, EditorError> {
    let (target, backup) = backup_paths(slot_dir);
    let contents = document.to_pretty_json().map_err(|err| EditorError::SaveError {
        path: target.clone(),
        source: io::Error::new(io::ErrorKind::InvalidData, err),
    })?;

    fs::copy(&target, &backup).map_err(|source| EditorError::SaveError {
        path: backup.clone(),
        source,
    })?;
    debug!(backup = %backup.display(), "Backup written");

    replace_file(&target, &contents).map_err(|source| EditorError::SaveError {
        path: target.clone(),
        source,
    })?;

    document.mark_clean();
    info!(
        target = %target.display(),
        backup = %backup.display(),
        bytes = contents.len(),
        "Saved slot"
    );
    Ok(SaveReport { target, backup })
}

fn replace_file(target: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "save file has no parent"))?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(target) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    temp.persist(target).map_err(|err| err.error)?;
    Ok(())
}
