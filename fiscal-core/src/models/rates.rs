use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Constants of the piecewise work-income reduction.
///
/// | Net work income            | Reduction                                        |
/// |----------------------------|--------------------------------------------------|
/// | ≤ `lower_threshold`        | `max_reduction`                                  |
/// | ≤ `middle_threshold`       | `max_reduction − lower_factor × (income − lower)` |
/// | ≤ `upper_threshold`        | `middle_reduction − upper_factor × (income − middle)`, floored at 0 |
/// | above                      | 0                                                |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkIncomeReduction {
    pub lower_threshold: Decimal,
    pub middle_threshold: Decimal,
    pub upper_threshold: Decimal,
    pub max_reduction: Decimal,
    pub middle_reduction: Decimal,
    pub lower_factor: Decimal,
    pub upper_factor: Decimal,

    /// Income from other sources above which no reduction applies.
    pub other_income_allowance: Decimal,
}

/// Fixed amounts used by the income-tax engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxParameters {
    /// Flat allowance for general work expenses.
    pub general_work_expenses: Decimal,
    pub work_income_reduction: WorkIncomeReduction,
    pub personal_allowance: Decimal,

    /// Allowance per child by birth order; the last entry applies to every
    /// child beyond the table's length.
    pub child_allowances: Vec<Decimal>,
    pub under_three_bonus: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionSide {
    Employee,
    Employer,
}

impl ContributionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Employer => "employer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionComponent {
    CommonContingencies,
    Unemployment,
    Training,
    IntergenerationalEquity,
    WageGuaranteeFund,
    WorkplaceAccident,
}

impl ContributionComponent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CommonContingencies => "Common contingencies",
            Self::Unemployment => "Unemployment",
            Self::Training => "Vocational training",
            Self::IntergenerationalEquity => "Intergenerational equity mechanism",
            Self::WageGuaranteeFund => "Wage guarantee fund",
            Self::WorkplaceAccident => "Workplace accidents and occupational disease",
        }
    }
}

/// Component rates for one side of the contribution.
///
/// The employer-only components are absent on the employee side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideRates {
    /// Published aggregate rate; equals the sum of the components.
    pub aggregate: Decimal,
    pub common_contingencies: Decimal,
    pub unemployment: Decimal,
    pub training: Decimal,
    pub intergenerational_equity: Decimal,
    #[serde(default)]
    pub wage_guarantee_fund: Option<Decimal>,
    #[serde(default)]
    pub workplace_accident: Option<Decimal>,
}

impl SideRates {
    pub fn components(&self) -> Vec<(ContributionComponent, Decimal)> {
        let mut components = vec![
            (
                ContributionComponent::CommonContingencies,
                self.common_contingencies,
            ),
            (ContributionComponent::Unemployment, self.unemployment),
            (ContributionComponent::Training, self.training),
            (
                ContributionComponent::IntergenerationalEquity,
                self.intergenerational_equity,
            ),
        ];
        if let Some(rate) = self.wage_guarantee_fund {
            components.push((ContributionComponent::WageGuaranteeFund, rate));
        }
        if let Some(rate) = self.workplace_accident {
            components.push((ContributionComponent::WorkplaceAccident, rate));
        }
        components
    }

    pub fn component_sum(&self) -> Decimal {
        self.components().iter().map(|(_, rate)| *rate).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialContributionRates {
    /// Annual salary ceiling for the contribution base.
    pub max_annual_base: Decimal,
    pub employee: SideRates,
    pub employer: SideRates,
}

impl SocialContributionRates {
    pub fn side(
        &self,
        side: ContributionSide,
    ) -> &SideRates {
        match side {
            ContributionSide::Employee => &self.employee,
            ContributionSide::Employer => &self.employer,
        }
    }
}

/// Excise and special-tax constants for the indirect-tax engine.
///
/// The `default_*` values stand in for optional fields a line item omits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExciseRates {
    /// Hydrocarbon duty per litre of fuel.
    pub fuel_duty_per_litre: Decimal,
    pub default_fuel_unit_price: Decimal,
    pub default_electricity_rate: Decimal,

    /// Approximate share of a gas bill that is hydrocarbon duty.
    pub gas_share: Decimal,

    /// Approximate share of the price of alcoholic drinks that is duty.
    pub alcohol_share: Decimal,

    /// Approximate share of the pre-VAT price of tobacco that is duty.
    pub tobacco_share: Decimal,
    pub default_insurance_premium_rate: Decimal,
}
