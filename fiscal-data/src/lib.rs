//! Loading of the fiscal dataset: bracket tables from CSV, rate constants
//! from TOML, and the embedded 2025 snapshot.

mod brackets;
mod rates;
mod source;

pub use brackets::{
    BracketRecord, BracketTableError, BracketTableLoader, BracketTables, NATIONWIDE,
};
pub use rates::{RatesConfig, RatesConfigError};
pub use source::{
    BRACKETS_FILE, DatasetSource, DirectoryDataset, EmbeddedDataset, RATES_FILE, SourceError,
    assemble,
};
