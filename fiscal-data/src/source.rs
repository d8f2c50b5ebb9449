use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use fiscal_core::{DatasetError, FiscalDataset};
use thiserror::Error;
use tracing::info;

use crate::brackets::{BracketTableError, BracketTableLoader};
use crate::rates::{RatesConfig, RatesConfigError};

pub const BRACKETS_FILE: &str = "brackets.csv";
pub const RATES_FILE: &str = "rates.toml";

const EMBEDDED_BRACKETS: &str = include_str!("../data/brackets.csv");
const EMBEDDED_RATES: &str = include_str!("../data/rates.toml");

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Brackets(#[from] BracketTableError),

    #[error(transparent)]
    Rates(#[from] RatesConfigError),

    #[error("Dataset failed validation: {0}")]
    Dataset(#[from] DatasetError),
}

/// Somewhere a validated [`FiscalDataset`] can be loaded from.
pub trait DatasetSource {
    fn load(&self) -> Result<FiscalDataset, SourceError>;
}

/// The 2025 snapshot compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataset;

impl DatasetSource for EmbeddedDataset {
    fn load(&self) -> Result<FiscalDataset, SourceError> {
        assemble(EMBEDDED_BRACKETS.as_bytes(), EMBEDDED_RATES)
    }
}

/// A directory holding `brackets.csv` and `rates.toml`.
#[derive(Debug, Clone)]
pub struct DirectoryDataset {
    root: PathBuf,
}

impl DirectoryDataset {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DatasetSource for DirectoryDataset {
    fn load(&self) -> Result<FiscalDataset, SourceError> {
        let root = self.root();
        let brackets_path = root.join(BRACKETS_FILE);
        let brackets = File::open(&brackets_path).map_err(|source| SourceError::Io {
            path: brackets_path.clone(),
            source,
        })?;

        let rates_path = root.join(RATES_FILE);
        let rates = std::fs::read_to_string(&rates_path).map_err(|source| SourceError::Io {
            path: rates_path.clone(),
            source,
        })?;

        info!(dataset = %root.display(), "Loading dataset from directory");
        assemble(brackets, &rates)
    }
}

/// Builds and validates a dataset from a brackets CSV and a rates TOML.
pub fn assemble<R: Read>(
    brackets: R,
    rates: &str,
) -> Result<FiscalDataset, SourceError> {
    let tables = BracketTableLoader::load(brackets)?;
    let rates = RatesConfig::from_toml_str(rates)?;

    let dataset = FiscalDataset {
        nationwide_brackets: tables.nationwide,
        jurisdictions: tables.jurisdictions,
        income_tax: rates.income_tax,
        social: rates.social,
        excise: rates.excise,
    };
    dataset.validate()?;

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_embedded_dataset_is_valid() {
        let dataset = EmbeddedDataset.load().expect("Embedded dataset should load");

        assert_eq!(dataset.nationwide_brackets.len(), 6);
        assert_eq!(dataset.social.max_annual_base, dec!(58914));
        assert!(dataset.jurisdiction("madrid").is_some());
        assert!(dataset.jurisdiction("navarra").is_some_and(|j| j.is_unified()));
    }

    #[test]
    fn test_embedded_dataset_regions() {
        let dataset = EmbeddedDataset.load().expect("Embedded dataset should load");

        let ids: Vec<&str> = dataset.jurisdictions.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "andalucia",
                "cataluna",
                "galicia",
                "madrid",
                "valencia",
                "navarra",
                "pais_vasco"
            ]
        );
    }

    #[test]
    fn test_assemble_rejects_invalid_brackets() {
        let csv = "jurisdiction,display_name,regime,upper_limit,rate\n\
                   nationwide,Estado,split,20000,0.2\n\
                   nationwide,Estado,split,10000,0.3\n\
                   nationwide,Estado,split,,0.4";

        let result = assemble(csv.as_bytes(), EMBEDDED_RATES);

        assert!(matches!(
            result,
            Err(SourceError::Dataset(DatasetError::UnorderedBrackets { .. }))
        ));
    }

    #[test]
    fn test_assemble_rejects_zero_fuel_price() {
        let rates = EMBEDDED_RATES.replace(
            "default_fuel_unit_price = \"1.60\"",
            "default_fuel_unit_price = \"0\"",
        );
        assert_ne!(rates, EMBEDDED_RATES);

        let result = assemble(EMBEDDED_BRACKETS.as_bytes(), &rates);

        assert!(matches!(
            result,
            Err(SourceError::Dataset(DatasetError::InvalidFuelUnitPrice(_)))
        ));
    }

    #[test]
    fn test_directory_dataset_missing_directory() {
        let source = DirectoryDataset::new("does/not/exist");
        assert_eq!(source.root(), Path::new("does/not/exist"));

        let result = source.load();

        match result {
            Err(SourceError::Io { ref path, .. }) => {
                assert!(path.ends_with(BRACKETS_FILE));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
