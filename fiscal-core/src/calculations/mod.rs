//! Fiscal computation engine.
//!
//! Every calculator here is a pure function of its inputs and the
//! [`FiscalDataset`](crate::FiscalDataset) it borrows: no I/O, no interior
//! state, identical output for identical input.

pub mod aggregation;
pub mod common;
pub mod income_tax;
pub mod indirect;
pub mod progressive;
pub mod report;
pub mod social_security;

pub use aggregation::{AggregationInput, Aggregates, DisplayView, PayPeriods, ViewFigures};
pub use income_tax::{AppliedRegime, IncomeTaxEngine, IncomeTaxResult};
pub use indirect::{
    IndirectTaxBreakdown, IndirectTaxEngine, ItemTaxes, LedgerEntry, SpecialTaxBucket,
    SpecialTaxTotals, VatTotals,
};
pub use report::{FiscalEngine, FiscalReport, FiscalRequest};
pub use social_security::{
    ComponentAmount, SocialContributionBreakdown, SocialContributionCalculator, contribution,
};
