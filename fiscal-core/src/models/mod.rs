mod consumption;
mod dataset;
mod jurisdiction;
mod rates;
mod tax_bracket;
mod taxpayer_profile;

pub use consumption::{
    ConsumptionLineItem, ExpenseCategory, TaxTreatment, VatDistribution, VatRate,
};
pub use dataset::{DatasetError, FiscalDataset};
pub use jurisdiction::{Jurisdiction, TaxRegime};
pub use rates::{
    ContributionComponent, ContributionSide, ExciseRates, IncomeTaxParameters, SideRates,
    SocialContributionRates, WorkIncomeReduction,
};
pub use tax_bracket::TaxBracket;
pub use taxpayer_profile::TaxpayerProfile;
