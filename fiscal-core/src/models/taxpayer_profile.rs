use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Personal attributes that drive the income-tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerProfile {
    pub gross_annual_salary: Decimal,
    #[serde(default)]
    pub number_of_children: u32,
    #[serde(default)]
    pub number_of_children_under_three: u32,
    pub jurisdiction_id: String,

    /// Annual income from sources other than employment.
    /// Above the dataset's allowance it disables the work-income reduction.
    #[serde(default)]
    pub other_income: Decimal,
}

impl TaxpayerProfile {
    pub fn new(
        gross_annual_salary: Decimal,
        jurisdiction_id: impl Into<String>,
    ) -> Self {
        Self {
            gross_annual_salary,
            number_of_children: 0,
            number_of_children_under_three: 0,
            jurisdiction_id: jurisdiction_id.into(),
            other_income: Decimal::ZERO,
        }
    }

    pub fn with_children(
        mut self,
        children: u32,
        under_three: u32,
    ) -> Self {
        self.number_of_children = children;
        self.number_of_children_under_three = under_three;
        self
    }
}
