use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::aggregation::{AggregationInput, Aggregates, DisplayView, ViewFigures};
use crate::calculations::income_tax::{IncomeTaxEngine, IncomeTaxResult};
use crate::calculations::indirect::{IndirectTaxBreakdown, IndirectTaxEngine};
use crate::calculations::social_security::{
    SocialContributionBreakdown, SocialContributionCalculator,
};
use crate::models::{ContributionSide, ExpenseCategory, FiscalDataset, TaxpayerProfile};

/// A taxpayer and their monthly consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalRequest {
    pub profile: TaxpayerProfile,
    #[serde(default)]
    pub categories: Vec<ExpenseCategory>,
    #[serde(default)]
    pub view: DisplayView,
}

/// Complete fiscal burden decomposition for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalReport {
    pub income_tax: IncomeTaxResult,

    /// Withheld contributions, capped at the maximum base.
    pub employee_contributions: SocialContributionBreakdown,
    pub employer_contributions: SocialContributionBreakdown,

    /// Monthly indirect taxes.
    pub indirect_taxes: IndirectTaxBreakdown,
    pub aggregates: Aggregates,
    pub view_figures: ViewFigures,
}

/// Runs every calculator against one dataset.
#[derive(Debug, Clone, Copy)]
pub struct FiscalEngine<'a> {
    dataset: &'a FiscalDataset,
}

impl<'a> FiscalEngine<'a> {
    pub fn new(dataset: &'a FiscalDataset) -> Self {
        Self { dataset }
    }

    pub fn report(
        &self,
        request: &FiscalRequest,
    ) -> FiscalReport {
        let profile = &request.profile;
        let gross = profile.gross_annual_salary;
        debug!(
            jurisdiction = %profile.jurisdiction_id,
            gross = %gross,
            categories = request.categories.len(),
            "Building fiscal report"
        );

        let income_tax = IncomeTaxEngine::new(self.dataset).calculate(profile);

        let social = SocialContributionCalculator::new(&self.dataset.social);
        let employee_contributions = social.breakdown(gross, ContributionSide::Employee);
        let employer_contributions = social.breakdown(gross, ContributionSide::Employer);

        let indirect_taxes =
            IndirectTaxEngine::new(&self.dataset.excise).compute(&request.categories);

        let aggregates = Aggregates::compute(&AggregationInput {
            gross_annual_salary: gross,
            effective_income_tax_rate: income_tax.effective_rate,
            employee_rate: self.dataset.social.employee.aggregate,
            employer_rate: self.dataset.social.employer.aggregate,
            monthly_indirect_taxes: indirect_taxes.grand_total,
            monthly_spend: indirect_taxes.total_spend,
        });
        let view_figures = aggregates.view(request.view);

        FiscalReport {
            income_tax,
            employee_contributions,
            employer_contributions,
            indirect_taxes,
            aggregates,
            view_figures,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::aggregation::PayPeriods;
    use crate::models::{ConsumptionLineItem, TaxTreatment, VatRate};
    use crate::test_support::sample_dataset;

    fn request(gross: Decimal) -> FiscalRequest {
        FiscalRequest {
            profile: TaxpayerProfile::new(gross, "madrid"),
            categories: vec![ExpenseCategory::itemized(
                "food",
                "Food",
                vec![ConsumptionLineItem::new(
                    "groceries",
                    "Groceries",
                    dec!(121),
                    VatRate::General,
                    TaxTreatment::Standard,
                )],
            )],
            view: DisplayView::Annual,
        }
    }

    #[test]
    fn report_wires_indirect_taxes_into_aggregates() {
        let dataset = sample_dataset();

        let report = FiscalEngine::new(&dataset).report(&request(dec!(40000)));

        assert_eq!(report.indirect_taxes.grand_total, dec!(21));
        assert_eq!(report.aggregates.monthly_indirect_taxes, dec!(21));
        assert_eq!(report.aggregates.total_indirect_annual, dec!(252));
        assert_eq!(report.view_figures.spend, dec!(1452));
    }

    #[test]
    fn report_uses_income_tax_effective_rate() {
        let dataset = sample_dataset();

        let report = FiscalEngine::new(&dataset).report(&request(dec!(40000)));

        assert_eq!(
            report.aggregates.income_tax_annual,
            dec!(40000) * report.income_tax.effective_rate
        );
        assert!(report.aggregates.reconciliation_gap().abs() < dec!(0.000001));
    }

    #[test]
    fn report_contribution_breakdowns_apply_ceiling() {
        let dataset = sample_dataset();

        let report = FiscalEngine::new(&dataset).report(&request(dec!(100000)));

        assert_eq!(report.employee_contributions.contribution_base, dec!(58914));
        assert_eq!(report.employer_contributions.contribution_base, dec!(58914));
        assert!(report.aggregates.employee_contribution > report.employee_contributions.total);
    }

    #[test]
    fn report_applies_requested_view() {
        let dataset = sample_dataset();
        let mut req = request(dec!(42000));
        req.view = DisplayView::PerPaycheck {
            pay_periods: PayPeriods::Fourteen,
        };

        let report = FiscalEngine::new(&dataset).report(&req);

        assert_eq!(report.view_figures.gross_salary, dec!(3000));
        assert_eq!(report.view_figures.indirect_taxes, dec!(21));
    }

    #[test]
    fn report_without_salary_or_spend_is_zero() {
        let dataset = sample_dataset();
        let req = FiscalRequest {
            profile: TaxpayerProfile::new(dec!(0), "madrid"),
            categories: Vec::new(),
            view: DisplayView::Annual,
        };

        let report = FiscalEngine::new(&dataset).report(&req);

        assert_eq!(report.income_tax.total_tax, dec!(0));
        assert_eq!(report.aggregates.employer_annual_cost, dec!(0));
        assert_eq!(report.aggregates.state_share_ratio(), dec!(0));
    }
}
