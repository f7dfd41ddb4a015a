//! Per-character equipment rows with category-constrained options.
//!
//! Option lists are closed over the catalog, widened with a
//! `"<name> (unknown)"` entry when the save holds a name the catalog does not
//! know. That suffix is display-only: writes always store the raw name.

use std::collections::HashSet;

use tracing::warn;

use crate::{
    catalog::{Category, ItemCatalog},
    document::{SaveDocument, MAX_EDITABLE_CHARACTERS},
    error::EditorError,
};

/// Appended to save values that are missing from the catalog.
pub const UNKNOWN_SUFFIX: &str = " (unknown)";
/// How the empty option is rendered.
pub const EMPTY_LABEL: &str = "(empty)";

/// One of the six fixed equipment positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipSlot {
    /// `equippedItems[0]`.
    Weapon,
    /// `equippedItems[1]`.
    Accessory1,
    /// `equippedItems[2]`.
    Helm,
    /// `equippedItems[3]`.
    Armor,
    /// `equippedItems[4]`.
    Accessory2,
    /// `equippedItems[5]`.
    Accessory3,
}

impl EquipSlot {
    /// All positions in `equippedItems` order.
    pub const ALL: [EquipSlot; 6] = [
        EquipSlot::Weapon,
        EquipSlot::Accessory1,
        EquipSlot::Helm,
        EquipSlot::Armor,
        EquipSlot::Accessory2,
        EquipSlot::Accessory3,
    ];

    /// Index into `equippedItems`.
    pub fn index(self) -> usize {
        match self {
            EquipSlot::Weapon => 0,
            EquipSlot::Accessory1 => 1,
            EquipSlot::Helm => 2,
            EquipSlot::Armor => 3,
            EquipSlot::Accessory2 => 4,
            EquipSlot::Accessory3 => 5,
        }
    }

    /// Row label shown next to the drop-down.
    pub fn label(self) -> &'static str {
        match self {
            EquipSlot::Weapon => "Weapon",
            EquipSlot::Accessory1 => "Accessory 1",
            EquipSlot::Helm => "Helm",
            EquipSlot::Armor => "Armor",
            EquipSlot::Accessory2 => "Accessory 2",
            EquipSlot::Accessory3 => "Accessory 3",
        }
    }

    /// Catalog category whose names are offered for this position.
    pub fn category(self) -> Category {
        match self {
            EquipSlot::Weapon => Category::Weapons,
            EquipSlot::Helm => Category::Helms,
            EquipSlot::Armor => Category::Armor,
            EquipSlot::Accessory1 | EquipSlot::Accessory2 | EquipSlot::Accessory3 => {
                Category::Accessories
            }
        }
    }
}

/// Drop-down state for one equipment position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentRow {
    slot: EquipSlot,
    options: Vec<String>,
    selected: usize,
    unknown: Option<usize>,
}

impl EquipmentRow {
    /// Build the option list for `current` against the catalog names `base`.
    pub fn new(slot: EquipSlot, base: &[String], current: &str) -> Self {
        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(base.len() + 2);
        for option in std::iter::once("").chain(base.iter().map(String::as_str)) {
            if seen.insert(option) {
                options.push(option.to_string());
            }
        }

        let known = current.is_empty() || base.iter().any(|name| name == current);
        let (selected, unknown) = if known {
            let selected = options
                .iter()
                .position(|option| option == current)
                .unwrap_or(0);
            (selected, None)
        } else {
            let sentinel = format!("{current}{UNKNOWN_SUFFIX}");
            let index = match options.iter().position(|option| *option == sentinel) {
                Some(index) => index,
                None => {
                    options.push(sentinel);
                    options.len() - 1
                }
            };
            (index, Some(index))
        };

        Self {
            slot,
            options,
            selected,
            unknown,
        }
    }

    /// Equipment position this row edits.
    pub fn slot(&self) -> EquipSlot {
        self.slot
    }

    /// Option values; `""` is the empty choice.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the selected option.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Selected option as stored in the option list.
    pub fn selected_option(&self) -> &str {
        self.options
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Index of the `(unknown)` sentinel, if this row has one.
    pub fn unknown_index(&self) -> Option<usize> {
        self.unknown
    }

    /// Text shown for an option.
    pub fn display(option: &str) -> &str {
        if option.is_empty() {
            EMPTY_LABEL
        } else {
            option
        }
    }

    /// Raw value to store when option `index` is picked.
    pub fn value_at(&self, index: usize) -> Option<String> {
        let option = self.options.get(index)?;
        if Some(index) == self.unknown {
            return Some(strip_unknown_suffix(option).to_string());
        }
        Some(option.clone())
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
    }
}

/// Drop the display-only `" (unknown)"` suffix, if present.
pub fn strip_unknown_suffix(option: &str) -> &str {
    option.strip_suffix(UNKNOWN_SUFFIX).unwrap_or(option)
}

/// One tab: a character's display name and its six rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterTab {
    /// Index into `party.characters`.
    pub character: usize,
    /// Character name, or `Character N` when unnamed.
    pub title: String,
    /// One row per [`EquipSlot`], in `equippedItems` order.
    pub rows: Vec<EquipmentRow>,
}

/// Project the first eight object characters into editable tabs.
///
/// Non-object entries are skipped. An empty result means the shell should
/// show its "No Characters" placeholder.
pub fn build_tabs(document: &mut SaveDocument, catalog: &ItemCatalog) -> Vec<CharacterTab> {
    let count = document.characters().len().min(MAX_EDITABLE_CHARACTERS);
    let mut tabs = Vec::with_capacity(count);
    for character in 0..count {
        if document.equipped_items(character).is_none() {
            warn!(character, "Skipping party entry that is not an object");
            continue;
        }
        let rows = EquipSlot::ALL
            .iter()
            .map(|slot| {
                let current = document.equipped(character, *slot);
                EquipmentRow::new(*slot, catalog.items(slot.category()), &current)
            })
            .collect();
        tabs.push(CharacterTab {
            character,
            title: document.character_name(character),
            rows,
        });
    }
    tabs
}

/// Apply a drop-down pick to the document.
///
/// Returns `Ok(false)` when `option` is already selected or out of range, in
/// which case nothing is written.
pub fn apply_selection(
    document: &mut SaveDocument,
    tab: &mut CharacterTab,
    row: usize,
    option: usize,
) -> Result<bool, EditorError> {
    let Some(equipment_row) = tab.rows.get_mut(row) else {
        return Ok(false);
    };
    if equipment_row.selected() == option {
        return Ok(false);
    }
    let Some(value) = equipment_row.value_at(option) else {
        return Ok(false);
    };
    document.set_equipped(tab.character, equipment_row.slot(), &value)?;
    equipment_row.select(option);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::path::Path;

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_json_str(
            r#"{
                "Weapons": ["Sword", "Axe"],
                "Helms": ["Cap"],
                "Armor": ["Mail"],
                "Accessories": ["Ring", "Amulet"],
                "Items": ["Potion"]
            }"#,
        )
        .expect("valid catalog")
    }

    fn doc(value: Value) -> SaveDocument {
        SaveDocument::from_value(value, Path::new("data.json")).expect("valid document")
    }

    fn names(base: &[&str]) -> Vec<String> {
        base.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn position_table_is_fixed() {
        let table: Vec<(usize, &str, Category)> = EquipSlot::ALL
            .iter()
            .map(|slot| (slot.index(), slot.label(), slot.category()))
            .collect();
        assert_eq!(
            table,
            vec![
                (0, "Weapon", Category::Weapons),
                (1, "Accessory 1", Category::Accessories),
                (2, "Helm", Category::Helms),
                (3, "Armor", Category::Armor),
                (4, "Accessory 2", Category::Accessories),
                (5, "Accessory 3", Category::Accessories),
            ]
        );
    }

    #[test]
    fn known_value_is_selected_directly() {
        let row = EquipmentRow::new(EquipSlot::Weapon, &names(&["Sword", "Axe"]), "Axe");
        assert_eq!(row.options(), ["", "Sword", "Axe"]);
        assert_eq!(row.selected_option(), "Axe");
        assert_eq!(row.unknown_index(), None);
    }

    #[test]
    fn unknown_value_gets_a_sentinel() {
        let row = EquipmentRow::new(
            EquipSlot::Weapon,
            &names(&["Sword", "Axe"]),
            "ModdedBlade",
        );
        assert_eq!(
            row.options(),
            ["", "Sword", "Axe", "ModdedBlade (unknown)"]
        );
        assert_eq!(row.selected_option(), "ModdedBlade (unknown)");
        assert_eq!(row.value_at(3).as_deref(), Some("ModdedBlade"));
    }

    #[test]
    fn options_are_deduplicated_in_order() {
        let row = EquipmentRow::new(
            EquipSlot::Helm,
            &names(&["Cap", "", "Hood", "Cap"]),
            "",
        );
        assert_eq!(row.options(), ["", "Cap", "Hood"]);
        assert_eq!(row.selected(), 0);
    }

    #[test]
    fn catalog_names_ending_in_suffix_are_written_verbatim() {
        let row = EquipmentRow::new(
            EquipSlot::Armor,
            &names(&["Robe (unknown)"]),
            "",
        );
        assert_eq!(row.value_at(1).as_deref(), Some("Robe (unknown)"));
    }

    #[test]
    fn empty_option_displays_placeholder() {
        assert_eq!(EquipmentRow::display(""), "(empty)");
        assert_eq!(EquipmentRow::display("Sword"), "Sword");
        assert_eq!(strip_unknown_suffix("Blade (unknown)"), "Blade");
        assert_eq!(strip_unknown_suffix("Blade"), "Blade");
    }

    #[test]
    fn fresh_slot_builds_named_tab() {
        let mut document = doc(json!({
            "party": { "characters": [ {
                "stringAttributes": [ { "key": "characterName", "value": "Aria" } ],
                "equippedItems": ["Sword", "", "", "", "", ""]
            } ] }
        }));
        let tabs = build_tabs(&mut document, &catalog());
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].title, "Aria");
        assert_eq!(tabs[0].rows[0].selected_option(), "Sword");
        for row in &tabs[0].rows[1..] {
            assert_eq!(EquipmentRow::display(row.selected_option()), "(empty)");
        }
        assert!(!document.is_dirty());
    }

    #[test]
    fn at_most_eight_tabs_and_non_objects_skipped() {
        let mut characters: Vec<Value> = (0..10).map(|_| json!({})).collect();
        characters[1] = json!("not a character");
        let mut document = doc(json!({ "party": { "characters": characters } }));
        let tabs = build_tabs(&mut document, &catalog());
        let indices: Vec<usize> = tabs.iter().map(|tab| tab.character).collect();
        assert_eq!(indices, vec![0, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tabs[1].title, "Character 3");
    }

    #[test]
    fn no_characters_yields_no_tabs() {
        let mut document = doc(json!({}));
        assert!(build_tabs(&mut document, &catalog()).is_empty());
        assert_eq!(document.root()["party"]["characters"], json!([]));
    }

    #[test]
    fn selecting_known_item_writes_exact_name() -> Result<(), EditorError> {
        let mut document = doc(json!({
            "party": { "characters": [ { "equippedItems": ["Sword"] } ] }
        }));
        let mut tabs = build_tabs(&mut document, &catalog());
        let tab = &mut tabs[0];

        assert!(apply_selection(&mut document, tab, 0, 2)?);
        assert_eq!(document.equipped(0, EquipSlot::Weapon), "Axe");
        assert_eq!(tab.rows[0].selected_option(), "Axe");
        assert!(document.is_dirty());
        Ok(())
    }

    #[test]
    fn reselecting_current_option_is_a_no_op() -> Result<(), EditorError> {
        let mut document = doc(json!({
            "party": { "characters": [ { "equippedItems": ["Sword"] } ] }
        }));
        let mut tabs = build_tabs(&mut document, &catalog());
        assert!(!apply_selection(&mut document, &mut tabs[0], 0, 1)?);
        assert!(!apply_selection(&mut document, &mut tabs[0], 0, 99)?);
        assert!(!document.is_dirty());
        Ok(())
    }

    #[test]
    fn unknown_sentinel_never_enters_the_document() -> Result<(), EditorError> {
        let mut document = doc(json!({
            "party": { "characters": [ { "equippedItems": ["ModdedBlade", "", "", "", "", ""] } ] }
        }));
        let mut tabs = build_tabs(&mut document, &catalog());
        let sentinel = tabs[0].rows[0].unknown_index().expect("sentinel present");

        apply_selection(&mut document, &mut tabs[0], 0, 1)?;
        assert_eq!(document.equipped(0, EquipSlot::Weapon), "Sword");
        apply_selection(&mut document, &mut tabs[0], 0, sentinel)?;
        assert_eq!(document.equipped(0, EquipSlot::Weapon), "ModdedBlade");
        Ok(())
    }

    #[test]
    fn accessories_share_one_category() {
        let mut document = doc(json!({
            "party": { "characters": [ { "equippedItems": ["", "Ring", "", "", "Amulet", "Ring"] } ] }
        }));
        let tabs = build_tabs(&mut document, &catalog());
        let rows = &tabs[0].rows;
        for index in [1, 4, 5] {
            assert_eq!(rows[index].options(), ["", "Ring", "Amulet"]);
        }
        assert_eq!(rows[5].selected_option(), "Ring");
    }
}
