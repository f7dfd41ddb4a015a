//! Partial, order-preserving view over a slot's `data.json`.
//!
//! The document is kept as a dynamic JSON tree so fields the editor does not
//! understand survive a load/save cycle. Only
//! `party.characters[i].equippedItems[0..5]` is ever written.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{equipment::EquipSlot, error::EditorError};

/// File holding the save document inside a slot directory.
pub const SAVE_FILE_NAME: &str = "data.json";
/// Sidecar holding the previous contents after a save.
pub const BACKUP_FILE_NAME: &str = "data.json.bak";
/// Number of equipment positions per character.
pub const EQUIPPED_LEN: usize = 6;
/// Characters beyond this index are never shown or normalised.
pub const MAX_EDITABLE_CHARACTERS: usize = 8;

const PARTY_KEY: &str = "party";
const CHARACTERS_KEY: &str = "characters";
const EQUIPPED_KEY: &str = "equippedItems";
const STRING_ATTRIBUTES_KEY: &str = "stringAttributes";
const CHARACTER_NAME_KEY: &str = "characterName";

/// Parsed save document plus its dirty flag.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveDocument {
    root: Map<String, Value>,
    dirty: bool,
}

impl SaveDocument {
    /// Read and parse `<slot_dir>/data.json`.
    pub fn load(slot_dir: &Path) -> Result<Self, EditorError> {
        let path = slot_dir.join(SAVE_FILE_NAME);
        let bytes = fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => EditorError::MissingSaveFile { path: path.clone() },
            _ => EditorError::ReadError {
                path: path.clone(),
                source: err,
            },
        })?;
        let document = Self::from_slice(&bytes, &path)?;
        info!(
            path = %path.display(),
            characters = document.character_count(),
            "Loaded save document"
        );
        Ok(document)
    }

    /// Parse a document from raw bytes. `path` is only used for error reporting.
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self, EditorError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|source| EditorError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_value(value, path)
    }

    /// Wrap an already parsed tree. The root must be an object.
    pub fn from_value(value: Value, path: &Path) -> Result<Self, EditorError> {
        let Value::Object(root) = value else {
            return Err(invalid_format(path, "Root JSON node must be an object."));
        };

        match root.get(PARTY_KEY) {
            None | Some(Value::Object(_)) => {}
            Some(_) => return Err(invalid_format(path, "party must be an object.")),
        }
        match root.get(PARTY_KEY).and_then(|party| party.get(CHARACTERS_KEY)) {
            None | Some(Value::Array(_)) => {}
            Some(_) => return Err(invalid_format(path, "party.characters must be an array.")),
        }

        let mut document = Self { root, dirty: false };
        document.normalize();
        Ok(document)
    }

    /// Materialise `party.characters` and pad the editable characters'
    /// equipment lists. Does not touch the dirty flag.
    fn normalize(&mut self) {
        let count = self.characters().len().min(MAX_EDITABLE_CHARACTERS);
        for index in 0..count {
            let _ = self.equipped_items(index);
        }
    }

    /// Borrow the whole tree.
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Whether edits have been made since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after the document was persisted.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Live `party.characters` array, created in place when missing.
    pub fn characters(&mut self) -> &mut Vec<Value> {
        let party = ensure_object(
            self.root
                .entry(PARTY_KEY)
                .or_insert_with(|| Value::Object(Map::new())),
        );
        ensure_array(
            party
                .entry(CHARACTERS_KEY)
                .or_insert_with(|| Value::Array(Vec::new())),
        )
    }

    /// Number of entries in `party.characters`, without materialising it.
    pub fn character_count(&self) -> usize {
        self.root
            .get(PARTY_KEY)
            .and_then(|party| party.get(CHARACTERS_KEY))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Read-only access to one character object.
    pub fn character(&self, index: usize) -> Option<&Map<String, Value>> {
        self.root
            .get(PARTY_KEY)?
            .get(CHARACTERS_KEY)?
            .get(index)?
            .as_object()
    }

    /// Tab title for a character: its non-blank `characterName`, or
    /// `Character N` (1-based).
    pub fn character_name(&self, index: usize) -> String {
        self.character(index)
            .and_then(|character| character.get(STRING_ATTRIBUTES_KEY))
            .and_then(Value::as_array)
            .and_then(|attributes| {
                attributes
                    .iter()
                    .filter(|attr| {
                        attr.get("key").and_then(Value::as_str) == Some(CHARACTER_NAME_KEY)
                    })
                    .filter_map(|attr| attr.get("value").and_then(Value::as_str))
                    .find(|value| !value.trim().is_empty())
            })
            .map(str::to_string)
            .unwrap_or_else(|| format!("Character {}", index + 1))
    }

    /// Live `equippedItems` array of the character at `index`, created and
    /// padded to six entries when needed. Never shortened.
    ///
    /// Returns `None` when the entry is missing or not an object.
    pub fn equipped_items(&mut self, index: usize) -> Option<&mut Vec<Value>> {
        let character = self.characters().get_mut(index)?.as_object_mut()?;
        let equipped = character
            .entry(EQUIPPED_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        let items = ensure_array(equipped);
        while items.len() < EQUIPPED_LEN {
            items.push(Value::String(String::new()));
        }
        Some(items)
    }

    /// Current text at one equipment position. Non-string values render the
    /// way they print; null and containers read as empty.
    pub fn equipped(&self, index: usize, slot: EquipSlot) -> String {
        self.character(index)
            .and_then(|character| character.get(EQUIPPED_KEY))
            .and_then(|items| items.get(slot.index()))
            .map(value_text)
            .unwrap_or_default()
    }

    /// Write `value` at one equipment position and mark the document dirty.
    pub fn set_equipped(
        &mut self,
        index: usize,
        slot: EquipSlot,
        value: &str,
    ) -> Result<(), EditorError> {
        let items = self
            .equipped_items(index)
            .ok_or(EditorError::NoSuchCharacter { index })?;
        items[slot.index()] = Value::String(value.to_string());
        self.dirty = true;
        debug!(character = index, slot = slot.label(), value, "Equipment changed");
        Ok(())
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut bytes = serde_json::to_vec_pretty(&self.root)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn invalid_format(path: &Path, reason: &str) -> EditorError {
    EditorError::InvalidFormat {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn ensure_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    match value {
        Value::Array(items) => items,
        _ => unreachable!("value was just replaced with an array"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    fn doc(value: Value) -> SaveDocument {
        SaveDocument::from_value(value, Path::new("data.json")).expect("valid document")
    }

    #[test]
    fn short_equipment_is_padded_without_dirtying() {
        let document = doc(json!({
            "party": { "characters": [ { "equippedItems": ["Sword"] } ] }
        }));
        assert!(!document.is_dirty());
        assert_eq!(
            document.root()["party"]["characters"][0]["equippedItems"],
            json!(["Sword", "", "", "", "", ""])
        );
    }

    #[test]
    fn long_equipment_is_never_shortened() {
        let document = doc(json!({
            "party": { "characters": [ { "equippedItems": ["a", "b", "c", "d", "e", "f", "g"] } ] }
        }));
        assert_eq!(
            document.root()["party"]["characters"][0]["equippedItems"]
                .as_array()
                .map(Vec::len),
            Some(7)
        );
    }

    #[test]
    fn missing_party_is_materialised() {
        let document = doc(json!({ "version": 3 }));
        assert_eq!(document.root()["party"], json!({ "characters": [] }));
        assert_eq!(document.root()["version"], json!(3));
        assert_eq!(document.character_count(), 0);
    }

    #[test]
    fn missing_characters_keep_other_party_fields() {
        let document = doc(json!({ "party": { "gold": 120 } }));
        assert_eq!(
            document.root()["party"],
            json!({ "gold": 120, "characters": [] })
        );
    }

    #[test]
    fn characters_past_eight_are_left_alone() {
        let characters: Vec<Value> = (0..10).map(|_| json!({ "equippedItems": [] })).collect();
        let document = doc(json!({ "party": { "characters": characters } }));
        let stored = &document.root()["party"]["characters"];
        assert_eq!(stored[7]["equippedItems"].as_array().map(Vec::len), Some(6));
        assert_eq!(stored[8]["equippedItems"], json!([]));
        assert_eq!(stored[9]["equippedItems"], json!([]));
    }

    #[test]
    fn non_object_root_is_invalid_format() {
        let err = SaveDocument::from_slice(b"[1, 2]", Path::new("data.json")).unwrap_err();
        assert!(matches!(err, EditorError::InvalidFormat { .. }));
        assert_eq!(err.header(), "Invalid save format");
    }

    #[test]
    fn malformed_shapes_are_rejected_not_overwritten() {
        let err = SaveDocument::from_value(json!({ "party": [] }), Path::new("data.json"))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidFormat { .. }));
        let err = SaveDocument::from_value(
            json!({ "party": { "characters": {} } }),
            Path::new("data.json"),
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::InvalidFormat { .. }));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = SaveDocument::from_slice(b"{ \"party\": ", Path::new("data.json")).unwrap_err();
        assert!(matches!(err, EditorError::ParseError { .. }));
    }

    #[test]
    fn load_reports_missing_file() -> Result<()> {
        let temp = tempdir()?;
        let err = SaveDocument::load(temp.path()).unwrap_err();
        assert!(matches!(err, EditorError::MissingSaveFile { .. }));
        Ok(())
    }

    #[test]
    fn character_names_fall_back_to_position() {
        let document = doc(json!({
            "party": { "characters": [
                { "stringAttributes": [ { "key": "characterName", "value": "Aria" } ] },
                { "stringAttributes": [ { "key": "characterName", "value": "   " } ] },
                { "equippedItems": [] },
                { "stringAttributes": [
                    { "key": "title", "value": "Knight" },
                    { "key": "characterName", "value": "Bram" }
                ] }
            ] }
        }));
        assert_eq!(document.character_name(0), "Aria");
        assert_eq!(document.character_name(1), "Character 2");
        assert_eq!(document.character_name(2), "Character 3");
        assert_eq!(document.character_name(3), "Bram");
    }

    #[test]
    fn set_equipped_touches_only_the_target_and_dirties() {
        let original = json!({
            "meta": { "playtime": 12345, "flags": [true, false] },
            "party": {
                "gold": 50,
                "characters": [ {
                    "stringAttributes": [ { "key": "characterName", "value": "Aria" } ],
                    "equippedItems": ["Sword", "", "", "", "", ""],
                    "level": 7
                } ]
            }
        });
        let mut document = doc(original.clone());
        document
            .set_equipped(0, EquipSlot::Helm, "Iron Helm")
            .expect("character exists");

        assert!(document.is_dirty());
        let mut expected = original;
        expected["party"]["characters"][0]["equippedItems"][2] = json!("Iron Helm");
        assert_eq!(Value::Object(document.root().clone()), expected);
    }

    #[test]
    fn set_equipped_rejects_non_object_characters() {
        let mut document = doc(json!({ "party": { "characters": [ "ghost" ] } }));
        let err = document
            .set_equipped(0, EquipSlot::Weapon, "Sword")
            .unwrap_err();
        assert!(matches!(err, EditorError::NoSuchCharacter { index: 0 }));
        assert!(!document.is_dirty());
    }

    #[test]
    fn equipped_reads_non_strings_as_text() {
        let document = doc(json!({
            "party": { "characters": [ { "equippedItems": [42, null, "Cap", false, "", ""] } ] }
        }));
        assert_eq!(document.equipped(0, EquipSlot::Weapon), "42");
        assert_eq!(document.equipped(0, EquipSlot::Accessory1), "");
        assert_eq!(document.equipped(0, EquipSlot::Helm), "Cap");
        assert_eq!(document.equipped(0, EquipSlot::Armor), "false");
    }

    #[test]
    fn key_order_survives_serialisation() -> Result<()> {
        let text = r#"{"zeta":1,"alpha":{"y":2,"b":3},"party":{"characters":[]}}"#;
        let document = SaveDocument::from_slice(text.as_bytes(), Path::new("data.json"))?;
        let pretty = String::from_utf8(document.to_pretty_json()?)?;
        let zeta = pretty.find("\"zeta\"").unwrap_or(usize::MAX);
        let alpha = pretty.find("\"alpha\"").unwrap_or(usize::MAX);
        let y = pretty.find("\"y\"").unwrap_or(usize::MAX);
        let b = pretty.find("\"b\"").unwrap_or(usize::MAX);
        assert!(zeta < alpha);
        assert!(y < b);
        Ok(())
    }
}
