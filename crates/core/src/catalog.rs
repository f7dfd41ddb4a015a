//! Known item names per equipment category.

use std::{collections::HashMap, fs, io, path::Path};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::EditorError;

/// Catalog compiled into the binary.
const BUNDLED_CATALOG: &str = include_str!("../resources/quartet_items.json");

/// Item categories present in the catalog resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Main-hand weapons.
    Weapons,
    /// Body armour.
    Armor,
    /// Head gear.
    Helms,
    /// Rings, bracelets and the like.
    Accessories,
    /// Consumables. Loaded but not offered by any equipment row.
    Items,
}

impl Category {
    /// All categories in resource order.
    pub const ALL: [Category; 5] = [
        Category::Weapons,
        Category::Armor,
        Category::Helms,
        Category::Accessories,
        Category::Items,
    ];

    /// Key used for this category in the catalog document.
    pub fn key(self) -> &'static str {
        match self {
            Category::Weapons => "Weapons",
            Category::Armor => "Armor",
            Category::Helms => "Helms",
            Category::Accessories => "Accessories",
            Category::Items => "Items",
        }
    }
}

/// Read-only mapping from [`Category`] to ordered item names.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    entries: HashMap<Category, Vec<String>>,
}

impl ItemCatalog {
    /// Parse the catalog shipped with the editor.
    pub fn bundled() -> Result<Self, EditorError> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    /// Parse a catalog from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => EditorError::MissingResource {
                path: path.to_path_buf(),
            },
            _ => EditorError::ReadError {
                path: path.to_path_buf(),
                source: err,
            },
        })?;
        let catalog = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "Loaded item catalog override");
        Ok(catalog)
    }

    /// Parse catalog JSON. Missing categories become empty lists and
    /// non-string entries are skipped.
    pub fn from_json_str(contents: &str) -> Result<Self, EditorError> {
        let root: Value = serde_json::from_str(contents)
            .map_err(|source| EditorError::InvalidCatalog { source })?;

        let entries = Category::ALL
            .iter()
            .map(|category| (*category, read_string_array(root.get(category.key()))))
            .collect::<HashMap<_, _>>();

        for category in Category::ALL {
            debug!(
                category = category.key(),
                count = entries.get(&category).map(Vec::len).unwrap_or(0),
                "Catalog category loaded"
            );
        }

        Ok(Self { entries })
    }

    /// Known names for `category`, in resource order.
    pub fn items(&self, category: Category) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether every category is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

fn read_string_array(node: Option<&Value>) -> Vec<String> {
    match node {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
