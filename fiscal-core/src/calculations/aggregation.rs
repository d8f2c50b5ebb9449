//! Top-level reconciliation of the fiscal burden.
//!
//! The total cost of a job to the employer splits into what the state keeps
//! and what the individual enjoys:
//!
//! ```text
//! employer annual cost = gross + employer contribution
//!                      = state share + individual share
//!
//! state share      = employer contribution + income tax
//!                  + employee contribution + indirect taxes
//! individual share = net salary − indirect taxes
//! ```
//!
//! Salary-side figures are annual; consumption-side figures arrive monthly
//! and are annualized (× 12) regardless of how many paychecks the salary is
//! split into.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{non_negative, ratio};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Rates and monthly figures the aggregation is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationInput {
    pub gross_annual_salary: Decimal,
    pub effective_income_tax_rate: Decimal,
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    pub monthly_indirect_taxes: Decimal,

    /// Monthly consumer spend the indirect taxes were computed from.
    pub monthly_spend: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    pub gross_annual_salary: Decimal,
    pub employer_contribution: Decimal,
    pub employer_annual_cost: Decimal,
    pub income_tax_annual: Decimal,

    /// Uncapped `gross × employee rate`.
    pub employee_contribution: Decimal,
    pub net_annual: Decimal,
    pub monthly_indirect_taxes: Decimal,
    pub total_indirect_annual: Decimal,
    pub monthly_spend: Decimal,
    pub state_share: Decimal,
    pub individual_share: Decimal,
}

impl Aggregates {
    pub fn compute(input: &AggregationInput) -> Self {
        if input.gross_annual_salary < Decimal::ZERO {
            warn!(
                gross = %input.gross_annual_salary,
                "Negative salary; aggregation uses zero"
            );
        }
        let gross = non_negative(input.gross_annual_salary);

        let employer_contribution = gross * input.employer_rate;
        let employer_annual_cost = gross * (Decimal::ONE + input.employer_rate);
        let income_tax_annual = gross * input.effective_income_tax_rate;
        let employee_contribution = gross * input.employee_rate;
        let net_annual = gross - income_tax_annual - employee_contribution;
        let total_indirect_annual = input.monthly_indirect_taxes * MONTHS_PER_YEAR;

        Self {
            gross_annual_salary: gross,
            employer_contribution,
            employer_annual_cost,
            income_tax_annual,
            employee_contribution,
            net_annual,
            monthly_indirect_taxes: input.monthly_indirect_taxes,
            total_indirect_annual,
            monthly_spend: input.monthly_spend,
            state_share: employer_contribution
                + income_tax_annual
                + employee_contribution
                + total_indirect_annual,
            individual_share: net_annual - total_indirect_annual,
        }
    }

    /// Fraction of the employer's cost retained by the state; zero when the
    /// cost is zero.
    pub fn state_share_ratio(&self) -> Decimal {
        ratio(self.state_share, self.employer_annual_cost)
    }

    /// `state share + individual share − employer cost`; zero when the
    /// figures reconcile.
    pub fn reconciliation_gap(&self) -> Decimal {
        self.state_share + self.individual_share - self.employer_annual_cost
    }

    /// Scales the figures for presentation.
    pub fn view(
        &self,
        view: DisplayView,
    ) -> ViewFigures {
        let salary_divisor = view.salary_divisor();
        let expense_factor = view.expense_factor();

        ViewFigures {
            view,
            gross_salary: self.gross_annual_salary / salary_divisor,
            employer_contribution: self.employer_contribution / salary_divisor,
            employer_cost: self.employer_annual_cost / salary_divisor,
            income_tax: self.income_tax_annual / salary_divisor,
            employee_contribution: self.employee_contribution / salary_divisor,
            net_salary: self.net_annual / salary_divisor,
            indirect_taxes: self.monthly_indirect_taxes * expense_factor,
            spend: self.monthly_spend * expense_factor,
            state_share_ratio: self.state_share_ratio(),
        }
    }
}

/// Number of salary payments per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PayPeriods {
    Twelve,
    /// Twelve monthly payments plus two extra ones.
    Fourteen,
}

impl PayPeriods {
    pub fn count(&self) -> u8 {
        match self {
            Self::Twelve => 12,
            Self::Fourteen => 14,
        }
    }
}

impl TryFrom<u8> for PayPeriods {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(Self::Twelve),
            14 => Ok(Self::Fourteen),
            other => Err(format!("pay periods must be 12 or 14, got {other}")),
        }
    }
}

impl From<PayPeriods> for u8 {
    fn from(periods: PayPeriods) -> Self {
        periods.count()
    }
}

/// How figures are scaled for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DisplayView {
    /// Salary figures per year, expenses annualized.
    #[default]
    Annual,
    /// Salary figures per paycheck, expenses per month.
    PerPaycheck { pay_periods: PayPeriods },
}

impl DisplayView {
    fn salary_divisor(&self) -> Decimal {
        match self {
            Self::Annual => Decimal::ONE,
            Self::PerPaycheck { pay_periods } => Decimal::from(pay_periods.count()),
        }
    }

    fn expense_factor(&self) -> Decimal {
        match self {
            Self::Annual => MONTHS_PER_YEAR,
            Self::PerPaycheck { .. } => Decimal::ONE,
        }
    }
}

/// Aggregates scaled by a [`DisplayView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFigures {
    pub view: DisplayView,
    pub gross_salary: Decimal,
    pub employer_contribution: Decimal,
    pub employer_cost: Decimal,
    pub income_tax: Decimal,
    pub employee_contribution: Decimal,
    pub net_salary: Decimal,
    pub indirect_taxes: Decimal,
    pub spend: Decimal,
    pub state_share_ratio: Decimal,
}
