//! Error taxonomy surfaced to the user as modal alerts.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Every failure the editor can report. None of them are fatal.
///
/// The `Display` text is the alert's detail message and [`EditorError::header`]
/// is its short heading.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The item catalog resource could not be found.
    #[error("Missing item list resource: {}", path.display())]
    MissingResource {
        /// Location that was expected to hold the catalog.
        path: PathBuf,
    },

    /// The item catalog exists but is not valid JSON.
    #[error("Could not parse item list: {source}")]
    InvalidCatalog {
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The folder picker returned something that is not a directory.
    #[error("Please select a directory. {} is not one.", path.display())]
    InvalidSelection {
        /// The rejected selection.
        path: PathBuf,
    },

    /// The default saves-root does not exist.
    #[error("No directory at: {}", path.display())]
    DefaultRootMissing {
        /// Path that was probed.
        path: PathBuf,
    },

    /// A saves-root contained no `slotNN` directories holding `data.json`.
    #[error("No slotXX folders with data.json in: {}", root.display())]
    NoValidSlots {
        /// Directory that was scanned.
        root: PathBuf,
    },

    /// The selected slot has no `data.json`.
    #[error("Expected file not found: {}", path.display())]
    MissingSaveFile {
        /// Expected location of the save document.
        path: PathBuf,
    },

    /// `data.json` exists but could not be read.
    #[error("Could not read file: {}\n{source}", path.display())]
    ReadError {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// `data.json` is not valid JSON.
    #[error("Could not parse file: {}\n{source}", path.display())]
    ParseError {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// `data.json` parsed but does not have the shape the editor relies on.
    #[error("{reason} ({})", path.display())]
    InvalidFormat {
        /// Offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Listing a directory failed.
    #[error("Could not list {}: {source}", path.display())]
    ScanError {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Copying the backup or writing the document failed.
    #[error("Could not write {}: {source}", path.display())]
    SaveError {
        /// File being copied or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Save or reload was requested with no slot loaded.
    #[error("Please load a slot first.")]
    NothingLoaded {
        /// The requested action, e.g. `save` or `reload`.
        action: &'static str,
    },

    /// An equipment write referenced a character that is not an object.
    #[error("party.characters[{index}] is not an editable character")]
    NoSuchCharacter {
        /// Index into `party.characters`.
        index: usize,
    },

    /// Configuration sources could not be merged or deserialised.
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl EditorError {
    /// Short heading used as the alert title line.
    pub fn header(&self) -> String {
        match self {
            Self::MissingResource { .. } | Self::InvalidCatalog { .. } => {
                "Failed to load item list".to_string()
            }
            Self::InvalidSelection { .. } => "Invalid selection".to_string(),
            Self::DefaultRootMissing { .. } => "Default saves folder not found".to_string(),
            Self::NoValidSlots { .. } => "No valid slots found".to_string(),
            Self::MissingSaveFile { .. } => "Missing save file".to_string(),
            Self::ReadError { .. } => "Could not read save file".to_string(),
            Self::ParseError { .. } => "Invalid JSON".to_string(),
            Self::InvalidFormat { .. } => "Invalid save format".to_string(),
            Self::ScanError { .. } => "Failed to scan saves folder".to_string(),
            Self::SaveError { .. } => "Save failed".to_string(),
            Self::NothingLoaded { action } => format!("Nothing to {action}"),
            Self::NoSuchCharacter { .. } => "Edit rejected".to_string(),
            Self::Config(_) => "Configuration error".to_string(),
        }
    }
}
