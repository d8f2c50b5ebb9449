use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ContributionSide, ExciseRates, IncomeTaxParameters, Jurisdiction, SocialContributionRates,
    TaxBracket,
};

/// Tolerance when comparing component rates against the published aggregate.
const RATE_SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Errors reported by [`FiscalDataset::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("bracket table '{0}' is empty")]
    EmptyBrackets(String),

    #[error("bracket table '{0}' has an unbounded bracket before its last entry")]
    UnboundedBracketNotLast(String),

    #[error("bracket table '{0}' does not end with an unbounded bracket")]
    MissingUnboundedBracket(String),

    #[error("bracket table '{table}' has limit {limit} not above the previous limit")]
    UnorderedBrackets { table: String, limit: Decimal },

    #[error("rate {rate} in '{context}' must be between 0 and 1")]
    InvalidRate { context: String, rate: Decimal },

    #[error("maximum annual contribution base must be positive, got {0}")]
    InvalidContributionCap(Decimal),

    #[error("{side} component rates sum to {sum}, aggregate is {aggregate}")]
    ComponentSumMismatch {
        side: &'static str,
        sum: Decimal,
        aggregate: Decimal,
    },

    #[error("child allowance table is empty")]
    EmptyChildAllowances,

    #[error("jurisdiction '{0}' is defined more than once")]
    DuplicateJurisdiction(String),

    #[error("default fuel unit price must be positive, got {0}")]
    InvalidFuelUnitPrice(Decimal),

    #[error("fuel duty per litre must not be negative, got {0}")]
    NegativeFuelDuty(Decimal),
}

/// The complete point-in-time rate and bracket snapshot the engine runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalDataset {
    pub nationwide_brackets: Vec<TaxBracket>,
    pub jurisdictions: Vec<Jurisdiction>,
    pub income_tax: IncomeTaxParameters,
    pub social: SocialContributionRates,
    pub excise: ExciseRates,
}

impl FiscalDataset {
    pub fn jurisdiction(
        &self,
        id: &str,
    ) -> Option<&Jurisdiction> {
        self.jurisdictions.iter().find(|j| j.id == id)
    }

    /// Jurisdictions ordered by display name, for pickers.
    pub fn jurisdictions_by_name(&self) -> Vec<&Jurisdiction> {
        let mut sorted: Vec<_> = self.jurisdictions.iter().collect();
        sorted.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        sorted
    }

    /// Checks the structural invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`DatasetError`] found.
    pub fn validate(&self) -> Result<(), DatasetError> {
        validate_brackets("nationwide", &self.nationwide_brackets)?;

        let mut seen = HashSet::new();
        for jurisdiction in &self.jurisdictions {
            if !seen.insert(jurisdiction.id.as_str()) {
                return Err(DatasetError::DuplicateJurisdiction(
                    jurisdiction.id.clone(),
                ));
            }
            validate_brackets(&jurisdiction.id, &jurisdiction.brackets)?;
        }

        if self.social.max_annual_base <= Decimal::ZERO {
            return Err(DatasetError::InvalidContributionCap(
                self.social.max_annual_base,
            ));
        }
        for side in [ContributionSide::Employee, ContributionSide::Employer] {
            let rates = self.social.side(side);
            for (component, rate) in rates.components() {
                validate_rate(&format!("{}.{component:?}", side.as_str()), rate)?;
            }
            let sum = rates.component_sum();
            if (sum - rates.aggregate).abs() > RATE_SUM_TOLERANCE {
                return Err(DatasetError::ComponentSumMismatch {
                    side: side.as_str(),
                    sum,
                    aggregate: rates.aggregate,
                });
            }
        }

        if self.income_tax.child_allowances.is_empty() {
            return Err(DatasetError::EmptyChildAllowances);
        }

        let excise = &self.excise;
        if excise.default_fuel_unit_price <= Decimal::ZERO {
            return Err(DatasetError::InvalidFuelUnitPrice(
                excise.default_fuel_unit_price,
            ));
        }
        if excise.fuel_duty_per_litre < Decimal::ZERO {
            return Err(DatasetError::NegativeFuelDuty(excise.fuel_duty_per_litre));
        }
        for (context, rate) in [
            ("excise.default_electricity_rate", excise.default_electricity_rate),
            ("excise.gas_share", excise.gas_share),
            ("excise.alcohol_share", excise.alcohol_share),
            ("excise.tobacco_share", excise.tobacco_share),
            (
                "excise.default_insurance_premium_rate",
                excise.default_insurance_premium_rate,
            ),
        ] {
            validate_rate(context, rate)?;
        }

        Ok(())
    }
}

fn validate_rate(
    context: &str,
    rate: Decimal,
) -> Result<(), DatasetError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(DatasetError::InvalidRate {
            context: context.to_string(),
            rate,
        });
    }
    Ok(())
}

fn validate_brackets(
    table: &str,
    brackets: &[TaxBracket],
) -> Result<(), DatasetError> {
    let Some((last, rest)) = brackets.split_last() else {
        return Err(DatasetError::EmptyBrackets(table.to_string()));
    };

    let mut previous = Decimal::ZERO;
    for bracket in rest {
        let Some(limit) = bracket.upper_limit else {
            return Err(DatasetError::UnboundedBracketNotLast(table.to_string()));
        };
        if limit <= previous {
            return Err(DatasetError::UnorderedBrackets {
                table: table.to_string(),
                limit,
            });
        }
        previous = limit;
    }
    if !last.is_unbounded() {
        return Err(DatasetError::MissingUnboundedBracket(table.to_string()));
    }

    for bracket in brackets {
        validate_rate(&format!("{table} brackets"), bracket.marginal_rate)?;
    }
    Ok(())
}
