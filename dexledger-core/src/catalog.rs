use serde::{Deserialize, Serialize};

use crate::{DexError, Result};

/// Read-only per-entity reference data the ledger consults but does not own:
/// how many alternate forms an entity has (0 for none) and whether its
/// observable sex is restricted to one gender.
pub trait EntityCatalog {
    fn form_count(&self, entity: u16) -> u8;
    fn only_male(&self, entity: u16) -> bool;
    fn only_female(&self, entity: u16) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub form_count: u8,
    #[serde(default)]
    pub only_male: bool,
    #[serde(default)]
    pub only_female: bool,
}

/// Catalog backed by a plain table indexed by entity ID. Row 0 corresponds
/// to the reserved entity 0 and is never consulted. Entities past the end of
/// the table report no forms and no sex restriction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableCatalog {
    entries: Vec<CatalogEntry>,
}

impl TableCatalog {
    /// Catalog with no forms and no sex restrictions for any entity.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Insert or replace the row for `entity`, growing the table as needed.
    pub fn set(&mut self, entity: u16, entry: CatalogEntry) {
        let index = entity as usize;
        if index >= self.entries.len() {
            self.entries.resize(index + 1, CatalogEntry::default());
        }
        self.entries[index] = entry;
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DexError::Config(format!("catalog parse error: {e}")))
    }

    fn entry(&self, entity: u16) -> CatalogEntry {
        self.entries
            .get(entity as usize)
            .copied()
            .unwrap_or_default()
    }
}

impl EntityCatalog for TableCatalog {
    fn form_count(&self, entity: u16) -> u8 {
        self.entry(entity).form_count
    }

    fn only_male(&self, entity: u16) -> bool {
        self.entry(entity).only_male
    }

    fn only_female(&self, entity: u16) -> bool {
        self.entry(entity).only_female
    }
}
