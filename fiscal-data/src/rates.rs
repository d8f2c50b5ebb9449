use fiscal_core::{ExciseRates, IncomeTaxParameters, SocialContributionRates};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RatesConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Rate constants read from `rates.toml`.
///
/// Decimal values are written as quoted strings so they parse exactly:
///
/// ```toml
/// [social]
/// max_annual_base = "58914"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesConfig {
    pub income_tax: IncomeTaxParameters,
    pub social: SocialContributionRates,
    pub excise: ExciseRates,
}

impl RatesConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, RatesConfigError> {
        Ok(toml::from_str(source)?)
    }
}
