//! Editor session: the current saves-root, its slots, and the loaded slot.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    document::SaveDocument,
    error::EditorError,
    save::{save_document, SaveReport},
    slots::{self, SlotScan},
};

/// A slot directory together with its parsed document.
#[derive(Debug, Clone)]
pub struct LoadedSlot {
    /// The `slotNN` directory.
    pub path: PathBuf,
    /// Parsed `data.json`.
    pub document: SaveDocument,
}

/// Owns everything the editor keeps between user actions.
///
/// Failed operations leave the session as it was: the loaded slot stays
/// loaded and its dirty flag is untouched.
#[derive(Debug, Default)]
pub struct SlotSession {
    saves_root: Option<PathBuf>,
    slots: Vec<PathBuf>,
    loaded: Option<LoadedSlot>,
}

impl SlotSession {
    /// Empty session with no saves-root chosen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory used as the folder picker's starting point.
    pub fn saves_root(&self) -> Option<&Path> {
        self.saves_root.as_deref()
    }

    /// Slots found by the last successful open.
    pub fn slots(&self) -> &[PathBuf] {
        &self.slots
    }

    /// The loaded slot and its document.
    pub fn loaded(&self) -> Option<&LoadedSlot> {
        self.loaded.as_ref()
    }

    /// Directory of the loaded slot.
    pub fn current_slot(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|slot| slot.path.as_path())
    }

    /// Document of the loaded slot.
    pub fn document(&self) -> Option<&SaveDocument> {
        self.loaded.as_ref().map(|slot| &slot.document)
    }

    /// Mutable document of the loaded slot, for edits.
    pub fn document_mut(&mut self) -> Option<&mut SaveDocument> {
        self.loaded.as_mut().map(|slot| &mut slot.document)
    }

    /// Whether the loaded document has unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.document().map(SaveDocument::is_dirty).unwrap_or(false)
    }

    /// Accept a picked folder: either a saves-root or a single slot.
    pub fn open_folder(&mut self, dir: &Path) -> Result<&[PathBuf], EditorError> {
        if !dir.is_dir() {
            return Err(EditorError::InvalidSelection {
                path: dir.to_path_buf(),
            });
        }
        self.apply_scan(slots::scan(dir)?)
    }

    /// Scan the default (or configured) saves-root.
    pub fn use_default_root(&mut self, root: &Path) -> Result<&[PathBuf], EditorError> {
        if !root.is_dir() {
            return Err(EditorError::DefaultRootMissing {
                path: root.to_path_buf(),
            });
        }
        self.apply_scan(slots::scan(root)?)
    }

    fn apply_scan(&mut self, scan: SlotScan) -> Result<&[PathBuf], EditorError> {
        info!(
            root = %scan.saves_root.display(),
            slots = scan.slots.len(),
            "Saves root selected"
        );
        self.saves_root = Some(scan.saves_root);
        self.slots = scan.slots;
        Ok(&self.slots)
    }

    /// Parse `<slot>/data.json`, replacing any loaded document.
    pub fn load_slot(&mut self, slot: &Path) -> Result<&mut SaveDocument, EditorError> {
        let document = SaveDocument::load(slot)?;
        let loaded = self.loaded.insert(LoadedSlot {
            path: slot.to_path_buf(),
            document,
        });
        Ok(&mut loaded.document)
    }

    /// Persist the loaded document with a `.bak` of the prior bytes.
    pub fn save(&mut self) -> Result<SaveReport, EditorError> {
        let loaded = self
            .loaded
            .as_mut()
            .ok_or(EditorError::NothingLoaded { action: "save" })?;
        save_document(&loaded.path, &mut loaded.document)
    }

    /// Re-read the loaded slot from disk, discarding edits.
    pub fn reload(&mut self) -> Result<&mut SaveDocument, EditorError> {
        let slot = self
            .current_slot()
            .map(Path::to_path_buf)
            .ok_or(EditorError::NothingLoaded { action: "reload" })?;
        self.load_slot(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    use crate::{
        catalog::ItemCatalog,
        document::{BACKUP_FILE_NAME, SAVE_FILE_NAME},
        equipment::{apply_selection, build_tabs, EquipSlot},
    };

    const ARIA: &str = r#"{
        "party": {
            "characters": [ {
                "stringAttributes": [ { "key": "characterName", "value": "Aria" } ],
                "equippedItems": ["Sword", "", "", "", "", ""]
            } ]
        },
        "world": { "chapter": 4 }
    }"#;

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_json_str(r#"{ "Weapons": ["Sword", "Axe"] }"#).expect("valid catalog")
    }

    fn slot(root: &Path, name: &str, contents: &str) -> Result<PathBuf> {
        let slot = root.join(name);
        fs::create_dir_all(&slot)?;
        fs::write(slot.join(SAVE_FILE_NAME), contents)?;
        Ok(slot)
    }

    #[test]
    fn save_and_reload_require_a_loaded_slot() {
        let mut session = SlotSession::new();
        let err = session.save().unwrap_err();
        assert!(matches!(err, EditorError::NothingLoaded { action: "save" }));
        let err = session.reload().unwrap_err();
        assert_eq!(err.header(), "Nothing to reload");
    }

    #[test]
    fn picking_a_slot_directly_records_its_parent() -> Result<()> {
        let temp = tempdir()?;
        let slot03 = slot(temp.path(), "slot03", ARIA)?;

        let mut session = SlotSession::new();
        let slots = session.open_folder(&slot03)?.to_vec();
        assert_eq!(slots, vec![slot03.clone()]);
        assert_eq!(session.saves_root(), Some(temp.path()));

        session.load_slot(&slots[0])?;
        assert_eq!(session.current_slot(), Some(slot03.as_path()));
        Ok(())
    }

    #[test]
    fn non_directory_selection_is_rejected() -> Result<()> {
        let temp = tempdir()?;
        let file = temp.path().join("notes.txt");
        fs::write(&file, "hi")?;
        let mut session = SlotSession::new();
        let err = session.open_folder(&file).unwrap_err();
        assert!(matches!(err, EditorError::InvalidSelection { .. }));
        Ok(())
    }

    #[test]
    fn missing_default_root_is_reported() -> Result<()> {
        let temp = tempdir()?;
        let mut session = SlotSession::new();
        let err = session
            .use_default_root(&temp.path().join("Quartet/saves"))
            .unwrap_err();
        assert!(matches!(err, EditorError::DefaultRootMissing { .. }));
        Ok(())
    }

    #[test]
    fn empty_scan_keeps_previous_state() -> Result<()> {
        let temp = tempdir()?;
        let saves = temp.path().join("saves");
        let slot00 = slot(&saves, "slot00", ARIA)?;
        let empty = temp.path().join("empty");
        fs::create_dir_all(&empty)?;

        let mut session = SlotSession::new();
        session.open_folder(&saves)?;
        session.load_slot(&slot00)?;

        let err = session.open_folder(&empty).unwrap_err();
        assert!(matches!(err, EditorError::NoValidSlots { .. }));
        assert_eq!(session.saves_root(), Some(saves.as_path()));
        assert_eq!(session.slots(), [slot00.clone()]);
        assert_eq!(session.current_slot(), Some(slot00.as_path()));
        Ok(())
    }

    #[test]
    fn failed_load_keeps_current_slot() -> Result<()> {
        let temp = tempdir()?;
        let good = slot(temp.path(), "slot00", ARIA)?;
        let broken = slot(temp.path(), "slot01", "{ nope")?;

        let mut session = SlotSession::new();
        session.load_slot(&good)?;
        let err = session.load_slot(&broken).unwrap_err();
        assert!(matches!(err, EditorError::ParseError { .. }));
        assert_eq!(session.current_slot(), Some(good.as_path()));
        Ok(())
    }

    #[test]
    fn edit_then_reload_reverts_and_clears_dirty() -> Result<()> {
        let temp = tempdir()?;
        let slot00 = slot(temp.path(), "slot00", ARIA)?;
        let catalog = catalog();

        let mut session = SlotSession::new();
        let document = session.load_slot(&slot00)?;
        let mut tabs = build_tabs(document, &catalog);
        assert!(apply_selection(document, &mut tabs[0], 0, 2)?);
        assert!(session.is_dirty());

        let document = session.reload()?;
        assert!(!document.is_dirty());
        let tabs = build_tabs(document, &catalog);
        assert_eq!(tabs[0].rows[0].selected_option(), "Sword");
        Ok(())
    }

    #[test]
    fn unknown_item_survives_save_unchanged() -> Result<()> {
        let temp = tempdir()?;
        let original = r#"{"party":{"characters":[{"equippedItems":["ModdedBlade","","","","",""]}]}}"#;
        let slot00 = slot(temp.path(), "slot00", original)?;

        let mut session = SlotSession::new();
        let document = session.load_slot(&slot00)?;
        let tabs = build_tabs(document, &catalog());
        assert_eq!(
            tabs[0].rows[0].options(),
            ["", "Sword", "Axe", "ModdedBlade (unknown)"]
        );
        assert_eq!(tabs[0].rows[0].selected_option(), "ModdedBlade (unknown)");

        let report = session.save()?;
        assert_eq!(report.backup, slot00.join(BACKUP_FILE_NAME));
        assert_eq!(fs::read_to_string(&report.backup)?, original);
        let reloaded = SaveDocument::load(&slot00)?;
        assert_eq!(reloaded.equipped(0, EquipSlot::Weapon), "ModdedBlade");
        Ok(())
    }

    #[test]
    fn saving_clears_dirty_and_keeps_foreign_fields() -> Result<()> {
        let temp = tempdir()?;
        let slot00 = slot(temp.path(), "slot00", ARIA)?;

        let mut session = SlotSession::new();
        let document = session.load_slot(&slot00)?;
        document.set_equipped(0, EquipSlot::Armor, "Chain Mail")?;
        session.save()?;
        assert!(!session.is_dirty());

        let written = SaveDocument::load(&slot00)?;
        assert_eq!(written.root()["world"]["chapter"], serde_json::json!(4));
        assert_eq!(written.equipped(0, EquipSlot::Armor), "Chain Mail");
        assert_eq!(written.equipped(0, EquipSlot::Weapon), "Sword");
        Ok(())
    }
}
