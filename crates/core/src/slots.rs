//! Discovery of `slotNN` save directories.

use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::{document::SAVE_FILE_NAME, error::EditorError};

/// Location of the game's saves relative to the user's home directory.
pub const DEFAULT_SAVES_SUFFIX: &str = "Documents/Something Classic/Quartet/saves";

static SLOT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^slot[0-9]+$").expect("invalid slot name regex"));

/// Result of scanning a directory for slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotScan {
    /// Directory to treat as the current saves-root.
    pub saves_root: PathBuf,
    /// Slot directories, sorted by base name.
    pub slots: Vec<PathBuf>,
}

/// Whether `name` looks like `slot` followed by digits.
pub fn is_slot_name(name: &str) -> bool {
    SLOT_NAME_RE.is_match(name)
}

/// Whether the base name of `path` is a slot name.
pub fn is_slot_directory(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(is_slot_name)
        .unwrap_or(false)
}

/// `<home>/Documents/Something Classic/Quartet/saves`, if a home directory is known.
pub fn default_saves_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_SAVES_SUFFIX))
}

/// Scan `dir` for slots.
///
/// A directory that is itself named like a slot is returned as a singleton
/// with its parent as the saves-root. Otherwise the immediate children that
/// are slot-named directories containing `data.json` are returned sorted by
/// name. An empty list is reported as [`EditorError::NoValidSlots`].
pub fn scan(dir: &Path) -> Result<SlotScan, EditorError> {
    if is_slot_directory(dir) {
        let saves_root = dir
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        debug!(slot = %dir.display(), "Selected directory is a single slot");
        return Ok(SlotScan {
            saves_root,
            slots: vec![dir.to_path_buf()],
        });
    }

    let entries = fs::read_dir(dir).map_err(|source| EditorError::ScanError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut slots: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| is_slot_directory(path))
        .filter(|path| path.join(SAVE_FILE_NAME).is_file())
        .collect();

    if slots.is_empty() {
        return Err(EditorError::NoValidSlots {
            root: dir.to_path_buf(),
        });
    }

    slots.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    info!(root = %dir.display(), count = slots.len(), "Scanned saves folder");

    Ok(SlotScan {
        saves_root: dir.to_path_buf(),
        slots,
    })
}
