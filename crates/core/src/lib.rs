#![warn(clippy::all, missing_docs)]

//! Core logic for the Quartet save editor.
//!
//! This crate hosts slot discovery, the partial save-document model, the
//! equipment view-model, and the backup-then-write persistence used by the
//! terminal UI and any future frontends.

pub mod catalog;
pub mod config;
pub mod document;
pub mod equipment;
pub mod error;
pub mod save;
pub mod session;
pub mod slots;

pub use catalog::{Category, ItemCatalog};
pub use config::AppConfig;
pub use document::SaveDocument;
pub use equipment::{CharacterTab, EquipSlot, EquipmentRow};
pub use error::EditorError;
pub use save::SaveReport;
pub use session::{LoadedSlot, SlotSession};
