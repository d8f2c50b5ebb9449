//! Shared fixtures for unit tests: a trimmed 2025 snapshot with one
//! split-regime and one unified-regime jurisdiction.

use rust_decimal_macros::dec;

use crate::models::{
    ExciseRates, FiscalDataset, IncomeTaxParameters, Jurisdiction, SideRates,
    SocialContributionRates, TaxBracket, TaxRegime, WorkIncomeReduction,
};

pub fn nationwide_brackets() -> Vec<TaxBracket> {
    vec![
        TaxBracket::bounded(dec!(12450), dec!(0.095)),
        TaxBracket::bounded(dec!(20200), dec!(0.12)),
        TaxBracket::bounded(dec!(35200), dec!(0.15)),
        TaxBracket::bounded(dec!(60000), dec!(0.185)),
        TaxBracket::bounded(dec!(300000), dec!(0.225)),
        TaxBracket::unbounded(dec!(0.245)),
    ]
}

pub fn madrid() -> Jurisdiction {
    Jurisdiction {
        id: "madrid".to_string(),
        display_name: "Comunidad de Madrid".to_string(),
        brackets: vec![
            TaxBracket::bounded(dec!(13362.22), dec!(0.085)),
            TaxBracket::bounded(dec!(19004.63), dec!(0.107)),
            TaxBracket::bounded(dec!(35425.68), dec!(0.128)),
            TaxBracket::bounded(dec!(57320.40), dec!(0.174)),
            TaxBracket::unbounded(dec!(0.205)),
        ],
        regime: TaxRegime::Split,
    }
}

pub fn navarra() -> Jurisdiction {
    Jurisdiction {
        id: "navarra".to_string(),
        display_name: "Comunidad Foral de Navarra".to_string(),
        brackets: vec![
            TaxBracket::bounded(dec!(4484), dec!(0.13)),
            TaxBracket::bounded(dec!(10000), dec!(0.22)),
            TaxBracket::bounded(dec!(16000), dec!(0.25)),
            TaxBracket::bounded(dec!(26500), dec!(0.28)),
            TaxBracket::bounded(dec!(37000), dec!(0.365)),
            TaxBracket::bounded(dec!(49000), dec!(0.415)),
            TaxBracket::bounded(dec!(70000), dec!(0.44)),
            TaxBracket::bounded(dec!(100000), dec!(0.47)),
            TaxBracket::bounded(dec!(150000), dec!(0.49)),
            TaxBracket::bounded(dec!(300000), dec!(0.505)),
            TaxBracket::unbounded(dec!(0.52)),
        ],
        regime: TaxRegime::Unified,
    }
}

pub fn income_tax_parameters() -> IncomeTaxParameters {
    IncomeTaxParameters {
        general_work_expenses: dec!(2000),
        work_income_reduction: WorkIncomeReduction {
            lower_threshold: dec!(14852),
            middle_threshold: dec!(17673.52),
            upper_threshold: dec!(19747.5),
            max_reduction: dec!(7302),
            middle_reduction: dec!(2364.34),
            lower_factor: dec!(1.75),
            upper_factor: dec!(1.14),
            other_income_allowance: dec!(6500),
        },
        personal_allowance: dec!(5550),
        child_allowances: vec![dec!(2400), dec!(2700), dec!(4000), dec!(4500)],
        under_three_bonus: dec!(2800),
    }
}

pub fn social_rates() -> SocialContributionRates {
    SocialContributionRates {
        max_annual_base: dec!(58914),
        employee: SideRates {
            aggregate: dec!(0.0648),
            common_contingencies: dec!(0.047),
            unemployment: dec!(0.0155),
            training: dec!(0.001),
            intergenerational_equity: dec!(0.0013),
            wage_guarantee_fund: None,
            workplace_accident: None,
        },
        employer: SideRates {
            aggregate: dec!(0.3207),
            common_contingencies: dec!(0.236),
            unemployment: dec!(0.055),
            training: dec!(0.006),
            intergenerational_equity: dec!(0.0067),
            wage_guarantee_fund: Some(dec!(0.002)),
            workplace_accident: Some(dec!(0.015)),
        },
    }
}

pub fn excise_rates() -> ExciseRates {
    ExciseRates {
        fuel_duty_per_litre: dec!(0.4007),
        default_fuel_unit_price: dec!(1.60),
        default_electricity_rate: dec!(0.0511269632),
        gas_share: dec!(0.03),
        alcohol_share: dec!(0.15),
        tobacco_share: dec!(0.57),
        default_insurance_premium_rate: dec!(0.08),
    }
}

pub fn sample_dataset() -> FiscalDataset {
    FiscalDataset {
        nationwide_brackets: nationwide_brackets(),
        jurisdictions: vec![madrid(), navarra()],
        income_tax: income_tax_parameters(),
        social: social_rates(),
        excise: excise_rates(),
    }
}

/// Initializes a tracing subscriber for tests that exercise logged fallbacks.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}
