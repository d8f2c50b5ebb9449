//! Social security contributions for employees and employers.
//!
//! Contributions are levied on the gross salary up to an annual ceiling
//! (the maximum contribution base). Each side pays a set of component rates
//! whose sum is the published aggregate rate:
//!
//! | Component                          | Employee | Employer |
//! |------------------------------------|----------|----------|
//! | Common contingencies               | yes      | yes      |
//! | Unemployment                       | yes      | yes      |
//! | Vocational training                | yes      | yes      |
//! | Intergenerational equity mechanism | yes      | yes      |
//! | Wage guarantee fund                |          | yes      |
//! | Workplace accidents                |          | yes      |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fiscal_core::calculations::contribution;
//!
//! // Above the ceiling only the capped base contributes
//! assert_eq!(contribution(dec!(100000), dec!(0.0648), dec!(58914)), dec!(3817.6272));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::non_negative;
use crate::models::{ContributionComponent, ContributionSide, SocialContributionRates};

/// Contribution at `rate` on `annual_gross` capped at `max_annual_base`.
///
/// Non-positive salaries contribute nothing.
pub fn contribution(
    annual_gross: Decimal,
    rate: Decimal,
    max_annual_base: Decimal,
) -> Decimal {
    non_negative(annual_gross).min(max_annual_base) * rate
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAmount {
    pub component: ContributionComponent,
    pub label: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Annual contribution for one side, in aggregate and per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialContributionBreakdown {
    pub side: ContributionSide,

    /// Salary after applying the annual ceiling.
    pub contribution_base: Decimal,
    pub total_rate: Decimal,
    pub total: Decimal,
    pub components: Vec<ComponentAmount>,
}

impl SocialContributionBreakdown {
    pub fn component(
        &self,
        component: ContributionComponent,
    ) -> Option<Decimal> {
        self.components
            .iter()
            .find(|c| c.component == component)
            .map(|c| c.amount)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SocialContributionCalculator<'a> {
    rates: &'a SocialContributionRates,
}

impl<'a> SocialContributionCalculator<'a> {
    pub fn new(rates: &'a SocialContributionRates) -> Self {
        Self { rates }
    }

    /// Salary subject to contributions: `min(gross, ceiling)`, never negative.
    pub fn contribution_base(
        &self,
        annual_gross: Decimal,
    ) -> Decimal {
        if annual_gross < Decimal::ZERO {
            warn!(
                annual_gross = %annual_gross,
                "Negative salary; contribution base clamped to zero"
            );
        }
        non_negative(annual_gross).min(self.rates.max_annual_base)
    }

    /// Itemized contribution for `side`, every component computed on the
    /// same capped base.
    pub fn breakdown(
        &self,
        annual_gross: Decimal,
        side: ContributionSide,
    ) -> SocialContributionBreakdown {
        let side_rates = self.rates.side(side);
        let base = self.contribution_base(annual_gross);

        let components = side_rates
            .components()
            .into_iter()
            .map(|(component, rate)| ComponentAmount {
                component,
                label: component.label().to_string(),
                rate,
                amount: base * rate,
            })
            .collect();

        SocialContributionBreakdown {
            side,
            contribution_base: base,
            total_rate: side_rates.aggregate,
            total: base * side_rates.aggregate,
            components,
        }
    }

    /// `gross × aggregate rate` with no ceiling.
    ///
    /// This is the figure the income-tax engine deducts and the top-level
    /// aggregation reports; it diverges from [`Self::breakdown`] above the
    /// ceiling.
    pub fn uncapped_estimate(
        &self,
        annual_gross: Decimal,
        side: ContributionSide,
    ) -> Decimal {
        non_negative(annual_gross) * self.rates.side(side).aggregate
    }
}
