//! Personal income tax on employment income.
//!
//! # Calculation steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Gross salary (≤ 0 yields no tax) |
//! | 2    | Employee contribution estimate: gross × flat employee rate, no ceiling |
//! | 3    | Deductible expenses: step 2 + general work-expense allowance |
//! | 4    | Net work income: gross − step 3, minimum 0 |
//! | 5    | Work-income reduction (piecewise, see [`WorkIncomeReduction`]) |
//! | 6    | Reduced net income: step 4 − step 5, minimum 0 |
//! | 7    | Personal and family minimum |
//! | 8    | Taxable base: step 6 − step 7, minimum 0 |
//! | 9    | Tax: unified regime uses the jurisdiction's table alone; split regime adds nationwide and regional tables |
//! | 10   | Effective rate: step 9 ÷ gross |
//!
//! An unknown jurisdiction falls back to the nationwide table alone.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{non_negative, ratio};
use crate::calculations::progressive;
use crate::calculations::social_security::SocialContributionCalculator;
use crate::models::{
    ContributionSide, FiscalDataset, IncomeTaxParameters, TaxBracket, TaxRegime,
    TaxpayerProfile, WorkIncomeReduction,
};

/// Which bracket tables were used for a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedRegime {
    Split,
    Unified,
    /// Jurisdiction unknown: nationwide table only.
    NationwideOnly,
}

impl From<TaxRegime> for AppliedRegime {
    fn from(regime: TaxRegime) -> Self {
        match regime {
            TaxRegime::Split => Self::Split,
            TaxRegime::Unified => Self::Unified,
        }
    }
}

/// Every intermediate figure of the income-tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub gross_annual_salary: Decimal,

    /// Uncapped `gross × employee rate`, used only as a deductible expense.
    pub employee_contribution_estimate: Decimal,
    pub deductible_expenses: Decimal,
    pub net_work_income: Decimal,
    pub work_income_reduction: Decimal,
    pub reduced_net_income: Decimal,
    pub personal_family_minimum: Decimal,
    pub taxable_base: Decimal,

    /// Tax from the nationwide table (zero under the unified regime).
    pub nationwide_tax: Decimal,

    /// Tax from the jurisdiction's own table.
    pub regional_tax: Decimal,
    pub total_tax: Decimal,
    pub effective_rate: Decimal,

    /// Combined rate on the last unit of the taxable base.
    pub marginal_rate: Decimal,
    pub regime: AppliedRegime,
}

impl IncomeTaxResult {
    fn zero(
        gross_annual_salary: Decimal,
        regime: AppliedRegime,
    ) -> Self {
        Self {
            gross_annual_salary,
            employee_contribution_estimate: Decimal::ZERO,
            deductible_expenses: Decimal::ZERO,
            net_work_income: Decimal::ZERO,
            work_income_reduction: Decimal::ZERO,
            reduced_net_income: Decimal::ZERO,
            personal_family_minimum: Decimal::ZERO,
            taxable_base: Decimal::ZERO,
            nationwide_tax: Decimal::ZERO,
            regional_tax: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            marginal_rate: Decimal::ZERO,
            regime,
        }
    }
}

/// Income-tax calculator over a borrowed dataset.
#[derive(Debug, Clone, Copy)]
pub struct IncomeTaxEngine<'a> {
    dataset: &'a FiscalDataset,
}

impl<'a> IncomeTaxEngine<'a> {
    pub fn new(dataset: &'a FiscalDataset) -> Self {
        Self { dataset }
    }

    /// Calculates the tax for the salary and jurisdiction recorded in `profile`.
    pub fn calculate(
        &self,
        profile: &TaxpayerProfile,
    ) -> IncomeTaxResult {
        self.calculate_for(
            profile.gross_annual_salary,
            profile,
            &profile.jurisdiction_id,
        )
    }

    /// Effective income-tax rate (0..1) for `gross` in `jurisdiction_id`.
    ///
    /// Family attributes come from `profile`; its own salary and
    /// jurisdiction fields are ignored.
    pub fn effective_rate(
        &self,
        gross: Decimal,
        profile: &TaxpayerProfile,
        jurisdiction_id: &str,
    ) -> Decimal {
        self.calculate_for(gross, profile, jurisdiction_id)
            .effective_rate
    }

    /// Full calculation for an explicit salary and jurisdiction.
    pub fn calculate_for(
        &self,
        gross: Decimal,
        profile: &TaxpayerProfile,
        jurisdiction_id: &str,
    ) -> IncomeTaxResult {
        let regional = self.regional_table(jurisdiction_id);
        let regime = regional.map_or(AppliedRegime::NationwideOnly, |(regime, _)| {
            regime.into()
        });

        if gross <= Decimal::ZERO {
            if gross < Decimal::ZERO {
                warn!(gross = %gross, "Negative salary; income tax is zero");
            }
            return IncomeTaxResult::zero(gross, regime);
        }

        let params = &self.dataset.income_tax;

        let employee_contribution_estimate = SocialContributionCalculator::new(
            &self.dataset.social,
        )
        .uncapped_estimate(gross, ContributionSide::Employee);
        let deductible_expenses = employee_contribution_estimate + params.general_work_expenses;
        let net_work_income = non_negative(gross - deductible_expenses);

        let work_income_reduction = work_income_reduction(
            net_work_income,
            profile.other_income,
            &params.work_income_reduction,
        );
        let reduced_net_income = non_negative(net_work_income - work_income_reduction);

        let personal_family_minimum = personal_family_minimum(profile, params);
        let taxable_base = non_negative(reduced_net_income - personal_family_minimum);

        let (nationwide_tax, regional_tax, marginal_rate) = match regional {
            Some((TaxRegime::Unified, brackets)) => (
                Decimal::ZERO,
                progressive::evaluate(taxable_base, brackets),
                progressive::marginal_rate(taxable_base, brackets),
            ),
            Some((TaxRegime::Split, brackets)) => (
                progressive::evaluate(taxable_base, &self.dataset.nationwide_brackets),
                progressive::evaluate(taxable_base, brackets),
                progressive::marginal_rate(taxable_base, &self.dataset.nationwide_brackets)
                    + progressive::marginal_rate(taxable_base, brackets),
            ),
            None => (
                progressive::evaluate(taxable_base, &self.dataset.nationwide_brackets),
                Decimal::ZERO,
                progressive::marginal_rate(taxable_base, &self.dataset.nationwide_brackets),
            ),
        };
        let total_tax = nationwide_tax + regional_tax;

        debug!(
            gross = %gross,
            jurisdiction = jurisdiction_id,
            taxable_base = %taxable_base,
            total_tax = %total_tax,
            "Income tax calculated"
        );

        IncomeTaxResult {
            gross_annual_salary: gross,
            employee_contribution_estimate,
            deductible_expenses,
            net_work_income,
            work_income_reduction,
            reduced_net_income,
            personal_family_minimum,
            taxable_base,
            nationwide_tax,
            regional_tax,
            total_tax,
            effective_rate: ratio(total_tax, gross),
            marginal_rate,
            regime,
        }
    }

    /// Highest combined marginal rate in `jurisdiction_id`; effective rates
    /// stay strictly below it.
    pub fn top_marginal_rate(
        &self,
        jurisdiction_id: &str,
    ) -> Decimal {
        let nationwide = progressive::top_marginal_rate(&self.dataset.nationwide_brackets);
        match self.regional_table(jurisdiction_id) {
            Some((TaxRegime::Unified, brackets)) => progressive::top_marginal_rate(brackets),
            Some((TaxRegime::Split, brackets)) => {
                nationwide + progressive::top_marginal_rate(brackets)
            }
            None => nationwide,
        }
    }

    fn regional_table(
        &self,
        jurisdiction_id: &str,
    ) -> Option<(TaxRegime, &'a [TaxBracket])> {
        let found = self.dataset.jurisdiction(jurisdiction_id);
        if found.is_none() {
            warn!(
                jurisdiction = jurisdiction_id,
                "Unknown jurisdiction; using nationwide brackets only"
            );
        }
        found.map(|j| (j.regime, j.brackets.as_slice()))
    }
}

/// Piecewise reduction for low work income.
///
/// Returns zero above the upper threshold or when `other_income` exceeds the
/// allowance.
pub fn work_income_reduction(
    net_work_income: Decimal,
    other_income: Decimal,
    rules: &WorkIncomeReduction,
) -> Decimal {
    if other_income > rules.other_income_allowance {
        return Decimal::ZERO;
    }

    if net_work_income <= rules.lower_threshold {
        rules.max_reduction
    } else if net_work_income <= rules.middle_threshold {
        rules.max_reduction - rules.lower_factor * (net_work_income - rules.lower_threshold)
    } else if net_work_income <= rules.upper_threshold {
        non_negative(
            rules.middle_reduction
                - rules.upper_factor * (net_work_income - rules.middle_threshold),
        )
    } else {
        Decimal::ZERO
    }
}

/// Personal allowance plus per-child allowances by birth order and the
/// under-three bonus. Children past the end of the allowance table reuse
/// its last entry.
pub fn personal_family_minimum(
    profile: &TaxpayerProfile,
    params: &IncomeTaxParameters,
) -> Decimal {
    let allowances = &params.child_allowances;
    let children = profile.number_of_children as usize;

    let listed: Decimal = allowances.iter().take(children).sum();
    let beyond_table = children.saturating_sub(allowances.len());
    let repeated = allowances
        .last()
        .map_or(Decimal::ZERO, |last| *last * Decimal::from(beyond_table));
    let under_three = params.under_three_bonus
        * Decimal::from(profile.number_of_children_under_three);

    params.personal_allowance + listed + repeated + under_three
}
