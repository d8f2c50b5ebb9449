use std::io::Read;

use fiscal_core::{DatasetError, Jurisdiction, TaxBracket, TaxRegime};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Jurisdiction id whose rows form the nationwide table.
pub const NATIONWIDE: &str = "nationwide";

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum BracketTableError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid regime '{regime}' for jurisdiction '{jurisdiction}'")]
    InvalidRegime {
        jurisdiction: String,
        regime: String,
    },

    #[error("Jurisdiction '{0}' mixes split and unified rows")]
    ConflictingRegime(String),

    #[error("Invalid bracket table: {0}")]
    Dataset(#[from] DatasetError),
}

impl From<csv::Error> for BracketTableError {
    fn from(err: csv::Error) -> Self {
        BracketTableError::CsvParse(err.to_string())
    }
}

/// A single row of the brackets CSV file.
///
/// - `jurisdiction`: Jurisdiction id, or `nationwide` for the state table
/// - `display_name`: Human-readable jurisdiction name
/// - `regime`: `split` or `unified` (ignored for `nationwide`)
/// - `upper_limit`: Upper bound of the bracket (empty for unbounded)
/// - `rate`: The marginal rate as a decimal (e.g., 0.095 for 9.5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub jurisdiction: String,
    pub display_name: String,
    pub regime: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_limit: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// The nationwide table plus every regional table, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketTables {
    pub nationwide: Vec<TaxBracket>,
    pub jurisdictions: Vec<Jurisdiction>,
}

/// Loader for bracket tables from CSV files.
///
/// Rows are grouped by jurisdiction in the order they first appear; within a
/// jurisdiction, rows must already be in ascending order of upper limit.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse and group records into bracket tables.
    pub fn load<R: Read>(reader: R) -> Result<BracketTables, BracketTableError> {
        let records = Self::parse(reader)?;
        Self::group(&records)
    }

    /// Group parsed records into the nationwide table and one
    /// [`Jurisdiction`] per remaining id.
    pub fn group(records: &[BracketRecord]) -> Result<BracketTables, BracketTableError> {
        let mut nationwide = Vec::new();
        let mut jurisdictions: Vec<Jurisdiction> = Vec::new();

        for record in records {
            let bracket = TaxBracket {
                upper_limit: record.upper_limit,
                marginal_rate: record.rate,
            };

            if record.jurisdiction == NATIONWIDE {
                nationwide.push(bracket);
                continue;
            }

            let regime = TaxRegime::parse(&record.regime).ok_or_else(|| {
                BracketTableError::InvalidRegime {
                    jurisdiction: record.jurisdiction.clone(),
                    regime: record.regime.clone(),
                }
            })?;

            match jurisdictions
                .iter_mut()
                .find(|j| j.id == record.jurisdiction)
            {
                Some(existing) if existing.regime != regime => {
                    return Err(BracketTableError::ConflictingRegime(
                        record.jurisdiction.clone(),
                    ));
                }
                Some(existing) => existing.brackets.push(bracket),
                None => jurisdictions.push(Jurisdiction {
                    id: record.jurisdiction.clone(),
                    display_name: record.display_name.clone(),
                    brackets: vec![bracket],
                    regime,
                }),
            }
        }

        if nationwide.is_empty() {
            return Err(DatasetError::EmptyBrackets(NATIONWIDE.to_string()).into());
        }

        debug!(
            nationwide_brackets = nationwide.len(),
            jurisdictions = jurisdictions.len(),
            "Loaded bracket tables"
        );

        Ok(BracketTables {
            nationwide,
            jurisdictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "jurisdiction,display_name,regime,upper_limit,rate\n";

    const TEST_CSV: &str = r#"jurisdiction,display_name,regime,upper_limit,rate
nationwide,Estado,split,12450,0.095
nationwide,Estado,split,20200,0.12
nationwide,Estado,split,,0.15
madrid,Comunidad de Madrid,split,13362.22,0.085
madrid,Comunidad de Madrid,split,,0.205
navarra,Comunidad Foral de Navarra,unified,4484,0.13
navarra,Comunidad Foral de Navarra,unified,,0.52
"#;

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_csv_single_row() {
        let csv = format!("{HEADER}madrid,Comunidad de Madrid,split,13362.22,0.085");

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            BracketRecord {
                jurisdiction: "madrid".to_string(),
                display_name: "Comunidad de Madrid".to_string(),
                regime: "split".to_string(),
                upper_limit: Some(dec!(13362.22)),
                rate: dec!(0.085),
            }
        );
    }

    #[test]
    fn test_parse_csv_unbounded_row() {
        let csv = format!("{HEADER}madrid,Comunidad de Madrid,split,,0.205");

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].upper_limit, None);
        assert_eq!(records[0].rate, dec!(0.205));
    }

    #[test]
    fn test_parse_csv_trims_whitespace() {
        let csv = format!("{HEADER}madrid , Comunidad de Madrid , split , 13362.22 , 0.085");

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].jurisdiction, "madrid");
        assert_eq!(records[0].upper_limit, Some(dec!(13362.22)));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "jurisdiction,display_name,regime,rate\nmadrid,Madrid,split,0.085";

        let result = BracketTableLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let BracketTableError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = format!("{HEADER}madrid,Madrid,split,abc,0.085");

        let result = BracketTableLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(BracketTableError::CsvParse(_))));
    }

    #[test]
    fn test_parse_empty_csv() {
        let records = BracketTableLoader::parse(HEADER.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    // =========================================================================
    // group tests
    // =========================================================================

    #[test]
    fn test_load_groups_by_jurisdiction() {
        let tables = BracketTableLoader::load(TEST_CSV.as_bytes()).expect("Failed to load");

        assert_eq!(
            tables.nationwide,
            vec![
                TaxBracket::bounded(dec!(12450), dec!(0.095)),
                TaxBracket::bounded(dec!(20200), dec!(0.12)),
                TaxBracket::unbounded(dec!(0.15)),
            ]
        );
        assert_eq!(tables.jurisdictions.len(), 2);
        assert_eq!(tables.jurisdictions[0].id, "madrid");
        assert_eq!(tables.jurisdictions[0].regime, TaxRegime::Split);
        assert_eq!(tables.jurisdictions[0].brackets.len(), 2);
        assert_eq!(tables.jurisdictions[1].id, "navarra");
        assert!(tables.jurisdictions[1].is_unified());
    }

    #[test]
    fn test_load_rejects_unknown_regime() {
        let csv = format!("{HEADER}nationwide,Estado,split,,0.15\nmadrid,Madrid,federal,,0.2");

        let result = BracketTableLoader::load(csv.as_bytes());

        match result {
            Err(BracketTableError::InvalidRegime {
                ref jurisdiction,
                ref regime,
            }) => {
                assert_eq!(jurisdiction, "madrid");
                assert_eq!(regime, "federal");
            }
            other => panic!("expected InvalidRegime, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_conflicting_regime() {
        let csv = format!(
            "{HEADER}nationwide,Estado,split,,0.15\n\
             madrid,Madrid,split,10000,0.1\n\
             madrid,Madrid,unified,,0.2"
        );

        let result = BracketTableLoader::load(csv.as_bytes());

        assert!(matches!(
            result,
            Err(BracketTableError::ConflictingRegime(ref id)) if id == "madrid"
        ));
    }

    #[test]
    fn test_load_requires_nationwide_table() {
        let csv = format!("{HEADER}madrid,Madrid,split,,0.2");

        let result = BracketTableLoader::load(csv.as_bytes());

        assert!(matches!(
            result,
            Err(BracketTableError::Dataset(DatasetError::EmptyBrackets(_)))
        ));
    }
}
