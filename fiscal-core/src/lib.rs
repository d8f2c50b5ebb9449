pub mod calculations;
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;

pub use calculations::{
    Aggregates, FiscalEngine, FiscalReport, FiscalRequest, IncomeTaxEngine, IncomeTaxResult,
    IndirectTaxBreakdown, IndirectTaxEngine, SocialContributionBreakdown,
    SocialContributionCalculator,
};
pub use models::*;
