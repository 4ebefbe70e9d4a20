use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub mod bits;
pub mod bulk;
pub mod catalog;
pub mod language;
pub mod ledger;
pub mod revision;

pub use bulk::BulkOperator;
pub use catalog::{CatalogEntry, EntityCatalog, TableCatalog};
pub use language::{Language, LANGUAGE_ALL, LANGUAGE_NONE};
pub use ledger::{DexLedger, EntryState, GenderFlags, Observation, ObservedGender};
pub use revision::{DexLayout, Revision, RevisionPolicy};

#[derive(Debug, Error)]
pub enum DexError {
    #[error("entity id {entity} out of range (valid: 1..={max})")]
    EntityOutOfRange { entity: u16, max: u16 },

    #[error("plane index {index} out of range (capacity {capacity})")]
    PlaneIndexOutOfRange { index: u32, capacity: u32 },

    #[error("form {form} out of range for entity {entity} (form count {count})")]
    FormOutOfRange { entity: u16, form: u8, count: u8 },

    #[error("ledger region needs {needed} bytes at offset {base:#x}, buffer has {len}")]
    BufferTooSmall {
        base: usize,
        needed: usize,
        len: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DexError>;

/// One editing run over a save file's ledger region: which file, where the
/// region sits, which revision it uses, and which bulk operations to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditSettings {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Byte offset of the ledger region inside the save buffer.
    pub base_offset: usize,
    pub revision: Revision,
    /// Optional catalog JSON (a `TableCatalog` array); neutral when absent.
    pub catalog_path: Option<PathBuf>,
    /// The save container's configured language, recorded on caught entries.
    pub language: Language,
    pub mark_all_seen: bool,
    pub mark_all_caught: bool,
    pub caught_none: bool,
    pub clear_all: bool,
    pub complete_all: bool,
    /// Extend seen/caught/complete operations to the shiny planes.
    pub shiny_too: bool,
    pub debug: bool,
}

/// Apply the requested bulk operations to the save file named by `settings`
/// and return a human-readable summary. With `debug` set, the summary is
/// also written next to the output file.
pub fn run(settings: EditSettings) -> Result<String> {
    if !settings.input_path.exists() {
        return Err(DexError::Config(format!(
            "input path does not exist: {}",
            settings.input_path.display()
        )));
    }

    let mut data = fs::read(&settings.input_path)?;

    let catalog = match &settings.catalog_path {
        Some(path) => TableCatalog::from_json(&fs::read_to_string(path)?)?,
        None => TableCatalog::neutral(),
    };

    let policy = settings.revision.policy();
    let mut ledger = DexLedger::new(&mut data, settings.base_offset, policy, &catalog)?;

    {
        let mut ops = BulkOperator::new(&mut ledger, settings.language.code());
        // Clear first so the other toggles compose predictably on top.
        if settings.clear_all {
            ops.clear_all()?;
        }
        if settings.mark_all_seen {
            ops.mark_all_seen(settings.shiny_too)?;
        }
        if settings.mark_all_caught {
            ops.mark_all_caught(settings.shiny_too)?;
        }
        if settings.complete_all {
            ops.complete_all(settings.shiny_too)?;
        }
        if settings.caught_none {
            ops.caught_none()?;
        }
    }

    let seen = ledger.seen_count();
    let caught = ledger.caught_count();
    let max = ledger.policy().max_id;
    info!(seen, caught, max, "ledger edit applied");

    let mut log = format!(
        "dex ledger: {} -> {}\n",
        settings.input_path.display(),
        settings.output_path.display()
    );
    log.push_str(&format!(
        "revision: {:?} (max id {}, language bound {}, base offset {:#x})\n",
        settings.revision, max, policy.language_max_id, settings.base_offset
    ));
    log.push_str(&format!("seen: {seen} / {max}\ncaught: {caught} / {max}\n"));

    fs::write(&settings.output_path, &data)?;

    if settings.debug {
        let log_path = settings.output_path.with_extension("log.txt");
        fs::write(log_path, &log)?;
    }

    Ok(log)
}
