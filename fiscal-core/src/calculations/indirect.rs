//! Indirect taxes embedded in consumer spending.
//!
//! Line-item amounts are final consumer prices (tax included). The engine
//! works backwards from each price to the VAT and special taxes it carries.
//!
//! # Treatments
//!
//! | Treatment            | Special tax                                   | VAT                  |
//! |----------------------|-----------------------------------------------|----------------------|
//! | Standard             | none                                          | `a − a/(1 + v)`      |
//! | Exempt               | none                                          | none                 |
//! | Fuel excise          | `a / unit price × duty per litre`             | `a − a/1.21`         |
//! | Electricity excise   | `a / ((1 + s) × 1.21) × s`                    | `a − a/1.21`         |
//! | Gas excise           | `a × gas share`                               | `a − a/1.21`         |
//! | Alcohol excise       | `a × alcohol share`                           | `a − a/1.21`         |
//! | Tobacco excise       | `a/1.21 × tobacco share`                      | `a − a/1.21`         |
//! | Insurance premium    | `a − a/(1 + s)`                               | none (VAT exempt)    |
//! | Direct tax           | `a`                                           | none                 |
//!
//! VAT lands in the bucket of the rate the line *declares*; special taxes
//! land in the bucket of their treatment. Categories without line items are
//! taxed from their VAT distribution instead.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fiscal_core::{ConsumptionLineItem, ExciseRates, ExpenseCategory, TaxTreatment, VatRate};
//! use fiscal_core::calculations::IndirectTaxEngine;
//!
//! let excise = ExciseRates {
//!     fuel_duty_per_litre: dec!(0.4007),
//!     default_fuel_unit_price: dec!(1.60),
//!     default_electricity_rate: dec!(0.0511269632),
//!     gas_share: dec!(0.03),
//!     alcohol_share: dec!(0.15),
//!     tobacco_share: dec!(0.57),
//!     default_insurance_premium_rate: dec!(0.08),
//! };
//! let transport = ExpenseCategory::itemized(
//!     "transport",
//!     "Transport",
//!     vec![
//!         ConsumptionLineItem::new("fuel", "Fuel", dec!(160), VatRate::General, TaxTreatment::FuelExcise)
//!             .with_unit_price(dec!(1.60)),
//!     ],
//! );
//!
//! let breakdown = IndirectTaxEngine::new(&excise).compute(&[transport]);
//!
//! // 100 litres × 0.4007
//! assert_eq!(breakdown.special.hydrocarbons, dec!(40.07));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::non_negative;
use crate::models::{ConsumptionLineItem, ExciseRates, ExpenseCategory, TaxTreatment, VatRate};

/// Where a line's special tax is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialTaxBucket {
    /// Fuel and gas duty.
    Hydrocarbons,
    Electricity,
    InsurancePremium,
    /// Alcohol and tobacco duty.
    Other,
    /// Taxes paid directly rather than embedded in a price.
    Direct,
}

impl SpecialTaxBucket {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hydrocarbons => "Hydrocarbon duty",
            Self::Electricity => "Electricity tax",
            Self::InsurancePremium => "Insurance premium tax",
            Self::Other => "Alcohol and tobacco duty",
            Self::Direct => "Direct tax",
        }
    }
}

/// Taxes carried by a single line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTaxes {
    pub vat: Decimal,
    pub special: Decimal,
    pub bucket: Option<SpecialTaxBucket>,
}

impl ItemTaxes {
    const NONE: ItemTaxes = ItemTaxes {
        vat: Decimal::ZERO,
        special: Decimal::ZERO,
        bucket: None,
    };

    fn vat_only(vat: Decimal) -> Self {
        Self { vat, ..Self::NONE }
    }

    fn with_special(
        vat: Decimal,
        special: Decimal,
        bucket: SpecialTaxBucket,
    ) -> Self {
        Self {
            vat,
            special,
            bucket: Some(bucket),
        }
    }
}

/// One row of the per-line detail ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub name: String,
    pub vat: Decimal,
    pub special: Decimal,
    pub kind: Option<SpecialTaxBucket>,

    /// Display label of `kind`.
    pub kind_label: Option<String>,
}

impl LedgerEntry {
    fn new(
        name: &str,
        vat: Decimal,
        special: Decimal,
        kind: Option<SpecialTaxBucket>,
    ) -> Self {
        Self {
            name: name.to_string(),
            vat,
            special,
            kind,
            kind_label: kind.map(|k| k.label().to_string()),
        }
    }
}

/// VAT totals keyed by declared rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VatTotals {
    /// VAT computed on excise lines that declare a 0% rate.
    pub at_0: Decimal,
    pub at_4: Decimal,
    pub at_10: Decimal,
    pub at_21: Decimal,
}

impl VatTotals {
    pub fn get(
        &self,
        rate: VatRate,
    ) -> Decimal {
        match rate {
            VatRate::Zero => self.at_0,
            VatRate::SuperReduced => self.at_4,
            VatRate::Reduced => self.at_10,
            VatRate::General => self.at_21,
        }
    }

    fn add(
        &mut self,
        rate: VatRate,
        amount: Decimal,
    ) {
        let slot = match rate {
            VatRate::Zero => &mut self.at_0,
            VatRate::SuperReduced => &mut self.at_4,
            VatRate::Reduced => &mut self.at_10,
            VatRate::General => &mut self.at_21,
        };
        *slot += amount;
    }

    pub fn total(&self) -> Decimal {
        self.at_0 + self.at_4 + self.at_10 + self.at_21
    }
}

/// Embedded special taxes other than direct taxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecialTaxTotals {
    pub hydrocarbons: Decimal,
    pub electricity: Decimal,
    pub insurance_premium: Decimal,
    pub other: Decimal,
}

impl SpecialTaxTotals {
    pub fn total(&self) -> Decimal {
        self.hydrocarbons + self.electricity + self.insurance_premium + self.other
    }
}

/// Indirect taxes carried by a set of expense categories.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndirectTaxBreakdown {
    pub vat: VatTotals,
    pub special: SpecialTaxTotals,
    pub direct_taxes: Decimal,

    /// VAT + special taxes + direct taxes.
    pub grand_total: Decimal,

    /// Sum of all category spend the taxes were computed from.
    pub total_spend: Decimal,
    pub ledger: Vec<LedgerEntry>,
}

impl IndirectTaxBreakdown {
    fn record(
        &mut self,
        name: &str,
        vat_rate: VatRate,
        taxes: ItemTaxes,
    ) {
        self.vat.add(vat_rate, taxes.vat);
        match taxes.bucket {
            Some(SpecialTaxBucket::Hydrocarbons) => self.special.hydrocarbons += taxes.special,
            Some(SpecialTaxBucket::Electricity) => self.special.electricity += taxes.special,
            Some(SpecialTaxBucket::InsurancePremium) => {
                self.special.insurance_premium += taxes.special
            }
            Some(SpecialTaxBucket::Other) => self.special.other += taxes.special,
            Some(SpecialTaxBucket::Direct) => self.direct_taxes += taxes.special,
            None => {}
        }
        self.ledger
            .push(LedgerEntry::new(name, taxes.vat, taxes.special, taxes.bucket));
    }
}

/// `1 + general VAT rate`, the divisor for excise goods.
fn general_vat_divisor() -> Decimal {
    Decimal::ONE + VatRate::General.fraction()
}

/// VAT contained in a tax-inclusive `amount` at `rate` (a fraction).
fn embedded_vat(
    amount: Decimal,
    rate: Decimal,
) -> Decimal {
    amount - amount / (Decimal::ONE + rate)
}

#[derive(Debug, Clone, Copy)]
pub struct IndirectTaxEngine<'a> {
    excise: &'a ExciseRates,
}

impl<'a> IndirectTaxEngine<'a> {
    pub fn new(excise: &'a ExciseRates) -> Self {
        Self { excise }
    }

    /// Computes the full breakdown for `categories`.
    ///
    /// Pure: the same categories always produce the same breakdown.
    pub fn compute(
        &self,
        categories: &[ExpenseCategory],
    ) -> IndirectTaxBreakdown {
        let mut breakdown = IndirectTaxBreakdown::default();

        for category in categories {
            if category.is_itemized() {
                self.compute_itemized(category, &mut breakdown);
            } else {
                self.compute_aggregate(category, &mut breakdown);
            }
        }

        breakdown.grand_total =
            breakdown.vat.total() + breakdown.special.total() + breakdown.direct_taxes;
        breakdown
    }

    fn compute_itemized(
        &self,
        category: &ExpenseCategory,
        breakdown: &mut IndirectTaxBreakdown,
    ) {
        for item in &category.line_items {
            if item.amount <= Decimal::ZERO {
                debug!(item = %item.id, amount = %item.amount, "Skipping non-positive line item");
                continue;
            }
            breakdown.total_spend += item.amount;
            breakdown.record(&item.display_name, item.vat_rate, self.item_taxes(item));
        }
    }

    /// Splits the category total across its VAT distribution.
    fn compute_aggregate(
        &self,
        category: &ExpenseCategory,
        breakdown: &mut IndirectTaxBreakdown,
    ) {
        if category.total_amount <= Decimal::ZERO {
            return;
        }
        let Some(distribution) = category.fallback_vat_distribution else {
            warn!(
                category = %category.id,
                total = %category.total_amount,
                "Category has neither line items nor a VAT distribution; treated as untaxed"
            );
            breakdown.total_spend += category.total_amount;
            return;
        };

        breakdown.total_spend += category.total_amount;
        let mut category_vat = Decimal::ZERO;
        for (rate, percent) in distribution.slices() {
            let percent = non_negative(percent);
            let rate_percent = Decimal::from(rate.percent());
            let vat = category.total_amount * percent / Decimal::ONE_HUNDRED * rate_percent
                / (Decimal::ONE_HUNDRED + rate_percent);
            breakdown.vat.add(rate, vat);
            category_vat += vat;
        }

        if category_vat > Decimal::ZERO {
            breakdown.ledger.push(LedgerEntry::new(
                &category.display_name,
                category_vat,
                Decimal::ZERO,
                None,
            ));
        }
    }

    /// VAT and special tax embedded in one line item's price.
    pub fn item_taxes(
        &self,
        item: &ConsumptionLineItem,
    ) -> ItemTaxes {
        let amount = non_negative(item.amount);
        let excise = self.excise;

        match item.treatment {
            TaxTreatment::Standard => ItemTaxes::vat_only(embedded_vat(
                amount,
                item.vat_rate.fraction(),
            )),
            TaxTreatment::Exempt => ItemTaxes::NONE,
            TaxTreatment::FuelExcise => ItemTaxes::with_special(
                self.general_vat(amount),
                self.fuel_duty(item, amount),
                SpecialTaxBucket::Hydrocarbons,
            ),
            TaxTreatment::ElectricityExcise => {
                let rate = special_rate_or(item, excise.default_electricity_rate);
                let base = amount / ((Decimal::ONE + rate) * general_vat_divisor());
                ItemTaxes::with_special(
                    self.general_vat(amount),
                    base * rate,
                    SpecialTaxBucket::Electricity,
                )
            }
            TaxTreatment::GasExcise => ItemTaxes::with_special(
                self.general_vat(amount),
                amount * excise.gas_share,
                SpecialTaxBucket::Hydrocarbons,
            ),
            TaxTreatment::AlcoholExcise => ItemTaxes::with_special(
                self.general_vat(amount),
                amount * excise.alcohol_share,
                SpecialTaxBucket::Other,
            ),
            TaxTreatment::TobaccoExcise => {
                let price_ex_vat = amount / general_vat_divisor();
                ItemTaxes::with_special(
                    amount - price_ex_vat,
                    price_ex_vat * excise.tobacco_share,
                    SpecialTaxBucket::Other,
                )
            }
            TaxTreatment::InsurancePremiumTax => {
                let rate = special_rate_or(item, excise.default_insurance_premium_rate);
                let premium = amount / (Decimal::ONE + rate);
                ItemTaxes::with_special(
                    Decimal::ZERO,
                    amount - premium,
                    SpecialTaxBucket::InsurancePremium,
                )
            }
            TaxTreatment::DirectTax => {
                ItemTaxes::with_special(Decimal::ZERO, amount, SpecialTaxBucket::Direct)
            }
        }
    }

    fn general_vat(
        &self,
        amount: Decimal,
    ) -> Decimal {
        embedded_vat(amount, VatRate::General.fraction())
    }

    /// Duty on the litres bought for `amount`. Prices so small that the
    /// litre count overflows fall back to the default price.
    fn fuel_duty(
        &self,
        item: &ConsumptionLineItem,
        amount: Decimal,
    ) -> Decimal {
        let default_price = self.excise.default_fuel_unit_price;
        let litres = amount
            .checked_div(self.fuel_unit_price(item))
            .or_else(|| {
                warn!(
                    item = %item.id,
                    amount = %amount,
                    "Fuel litres out of range; using default unit price"
                );
                amount.checked_div(default_price)
            })
            .unwrap_or(Decimal::ZERO);

        litres
            .checked_mul(self.excise.fuel_duty_per_litre)
            .unwrap_or_else(|| {
                warn!(item = %item.id, litres = %litres, "Fuel duty out of range; using zero");
                Decimal::ZERO
            })
    }

    fn fuel_unit_price(
        &self,
        item: &ConsumptionLineItem,
    ) -> Decimal {
        match item.unit_price {
            Some(price) if price > Decimal::ZERO => price,
            Some(price) => {
                warn!(
                    item = %item.id,
                    unit_price = %price,
                    "Non-positive fuel unit price; using default"
                );
                self.excise.default_fuel_unit_price
            }
            None => self.excise.default_fuel_unit_price,
        }
    }
}

fn special_rate_or(
    item: &ConsumptionLineItem,
    default: Decimal,
) -> Decimal {
    match item.special_tax_rate {
        Some(rate) if rate >= Decimal::ZERO => rate,
        Some(rate) => {
            warn!(item = %item.id, rate = %rate, "Negative special tax rate; using default");
            default
        }
        None => default,
    }
}
