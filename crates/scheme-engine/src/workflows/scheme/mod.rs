//! Scheme configuration engine.
//!
//! Each record's identifier is classified into a tier, its rate is split across the
//! secured and unsecured portions of the loan, and the derived values are written
//! back into the JSON and label cells carried on the record.

pub mod charges;
mod decimal;
pub mod decision;
pub mod patch;
pub mod processes;
pub mod rates;
pub mod record;
mod scan;
pub mod settings;
pub mod signature;
pub mod table;

pub use settings::SchemeSettings;
pub use table::{Column, SchemeTable};

use record::RecordStatus;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum SchemeImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl std::fmt::Display for SchemeImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemeImportError::Io(err) => write!(f, "failed to read scheme export: {}", err),
            SchemeImportError::Csv(err) => write!(f, "invalid scheme CSV data: {}", err),
            SchemeImportError::MissingColumn(column) => {
                write!(f, "scheme CSV has no `{}` column", column)
            }
        }
    }
}

impl std::error::Error for SchemeImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemeImportError::Io(err) => Some(err),
            SchemeImportError::Csv(err) => Some(err),
            SchemeImportError::MissingColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for SchemeImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SchemeImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts reported after a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows_read: usize,
    pub rows_updated: usize,
    pub rows_skipped: usize,
    pub degenerate: usize,
}

/// Applies the record pipeline to every row of a scheme table.
#[derive(Debug, Clone, Default)]
pub struct SchemeBatchProcessor {
    settings: SchemeSettings,
}

impl SchemeBatchProcessor {
    pub fn new(settings: SchemeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SchemeSettings {
        &self.settings
    }

    pub fn process(&self, table: &mut SchemeTable) -> BatchSummary {
        let mut summary = BatchSummary {
            rows_read: table.len(),
            ..BatchSummary::default()
        };

        for index in 0..table.len() {
            let Some(row) = table.row(index) else {
                continue;
            };
            let outcome = record::evaluate(&row, &self.settings);
            match &outcome.status {
                RecordStatus::Updated => summary.rows_updated += 1,
                RecordStatus::MissingIdentifier => {
                    debug!(row = index, "skipping scheme row without identifier");
                    summary.rows_skipped += 1;
                }
                RecordStatus::Invalid(err) => {
                    debug!(row = index, reason = %err, "skipping unreadable scheme identifier");
                    summary.rows_skipped += 1;
                }
                RecordStatus::DegenerateSplit => {
                    warn!(
                        row = index,
                        "secured basis covers the overall LTV; charges left unchanged"
                    );
                    summary.degenerate += 1;
                }
            }
            table.apply(index, outcome.updates);
        }

        info!(
            rows_read = summary.rows_read,
            rows_updated = summary.rows_updated,
            rows_skipped = summary.rows_skipped,
            degenerate = summary.degenerate,
            force_flexi = self.settings.force_flexi,
            "scheme batch processed"
        );
        summary
    }

    pub fn process_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(SchemeTable, BatchSummary), SchemeImportError> {
        let file = std::fs::File::open(path)?;
        self.process_reader(file)
    }

    pub fn process_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<(SchemeTable, BatchSummary), SchemeImportError> {
        let mut table = SchemeTable::from_reader(reader)?;
        let identifier = Column::RefName.header();
        if !table.headers().iter().any(|header| header == identifier) {
            return Err(SchemeImportError::MissingColumn(identifier));
        }
        let summary = self.process(&mut table);
        Ok((table, summary))
    }

    /// Processes CSV text and returns the rewritten CSV text.
    pub fn process_csv(&self, input: &str) -> Result<(String, BatchSummary), SchemeImportError> {
        let (table, summary) = self.process_reader(input.as_bytes())?;
        let mut buffer = Vec::new();
        table.to_writer(&mut buffer)?;
        let output = String::from_utf8(buffer)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        Ok((output, summary))
    }
}
