//! Single-slot holder of the loaded spreadsheet and its glossary selection.

pub mod clock;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

pub use clock::{Clock, IdSource, SystemClock, UuidIds};

use crate::sheet::{Dataset, Workbook};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No spreadsheet loaded")]
    NotLoaded,

    #[error("Tab \"{0}\" not found")]
    SheetNotFound(String),
}

/// Holds at most one dataset. Every mutation is a single slot write and readers get a
/// snapshot, so a reader never observes a half-installed dataset.
pub struct SpreadsheetStore {
    slot: RwLock<Option<Dataset>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
}

impl Default for SpreadsheetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SpreadsheetStore {
    pub fn new() -> Self {
        Self::with_sources(Arc::new(SystemClock), Arc::new(UuidIds))
    }

    pub fn with_sources(clock: Arc<dyn Clock>, ids: Arc<dyn IdSource>) -> Self {
        Self {
            slot: RwLock::new(None),
            clock,
            ids,
        }
    }

    // A panic while holding the lock cannot leave a torn slot: writes are whole-value swaps
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<Dataset>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<Dataset>> {
        self.slot.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Install a workbook as the current dataset, discarding any previous one.
    /// Zero-row sheets are dropped and the glossary selection starts unset.
    pub fn load(&self, workbook: Workbook) -> Dataset {
        let Workbook {
            name,
            sheets,
            checksum,
        } = workbook;

        let sheets: Vec<_> = sheets
            .into_iter()
            .filter(|sheet| {
                if sheet.rows.is_empty() {
                    log::debug!("Dropping zero-row sheet '{}' on load", sheet.name);
                }
                !sheet.rows.is_empty()
            })
            .collect();

        let dataset = Dataset {
            id: self.ids.next_id(),
            name,
            sheets: Arc::new(sheets),
            loaded_at: self.clock.now(),
            checksum,
            glossary_sheet: None,
        };

        let previous = self.write_slot().replace(dataset.clone());
        if let Some(previous) = previous {
            log::info!("Replaced spreadsheet '{}' with '{}'", previous.name, dataset.name);
        }
        log::info!(
            "Loaded spreadsheet '{}' with {} sheets",
            dataset.name,
            dataset.sheets.len()
        );

        dataset
    }

    /// Snapshot of the current dataset, or `None` when nothing is loaded
    pub fn current(&self) -> Option<Dataset> {
        self.read_slot().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Mark a sheet (exact, case-sensitive name) as the glossary. Idempotent.
    pub fn select_glossary(&self, sheet_name: &str) -> Result<String, StoreError> {
        let mut slot = self.write_slot();
        let dataset = slot.as_mut().ok_or(StoreError::NotLoaded)?;

        if dataset.sheet(sheet_name).is_none() {
            return Err(StoreError::SheetNotFound(sheet_name.to_string()));
        }

        if dataset.glossary_sheet.as_deref() != Some(sheet_name) {
            dataset.glossary_sheet = Some(sheet_name.to_string());
            log::info!("Selected glossary tab: {}", sheet_name);
        }

        Ok(sheet_name.to_string())
    }

    /// Drop the current dataset
    pub fn clear(&self) {
        self.write_slot().take();
    }
}
