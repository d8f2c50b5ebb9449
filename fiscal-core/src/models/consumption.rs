use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The VAT rates a consumption line can be declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VatRate {
    Zero,
    SuperReduced,
    Reduced,
    General,
}

impl VatRate {
    pub const ALL: [VatRate; 4] = [
        VatRate::Zero,
        VatRate::SuperReduced,
        VatRate::Reduced,
        VatRate::General,
    ];

    pub fn percent(&self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::SuperReduced => 4,
            Self::Reduced => 10,
            Self::General => 21,
        }
    }

    pub fn from_percent(percent: u8) -> Option<Self> {
        match percent {
            0 => Some(Self::Zero),
            4 => Some(Self::SuperReduced),
            10 => Some(Self::Reduced),
            21 => Some(Self::General),
            _ => None,
        }
    }

    /// Rate as a fraction, e.g. `0.21` for the general rate.
    pub fn fraction(&self) -> Decimal {
        Decimal::from(self.percent()) / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<u8> for VatRate {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_percent(value).ok_or_else(|| format!("unsupported VAT rate {value}%"))
    }
}

impl From<VatRate> for u8 {
    fn from(rate: VatRate) -> Self {
        rate.percent()
    }
}

/// How a consumption line is taxed beyond (or instead of) plain VAT.
///
/// Every variant is handled explicitly by the indirect-tax engine; adding a
/// variant is a compile error until the engine knows how to tax it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    Standard,
    Exempt,
    FuelExcise,
    ElectricityExcise,
    GasExcise,
    AlcoholExcise,
    TobaccoExcise,
    InsurancePremiumTax,
    DirectTax,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionLineItem {
    pub id: String,
    pub display_name: String,

    /// Price actually paid (tax-inclusive where applicable).
    pub amount: Decimal,
    pub vat_rate: VatRate,
    pub treatment: TaxTreatment,

    /// Ad-valorem rate for electricity and insurance lines.
    #[serde(default)]
    pub special_tax_rate: Option<Decimal>,

    /// Price per litre for fuel lines.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

impl ConsumptionLineItem {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        amount: Decimal,
        vat_rate: VatRate,
        treatment: TaxTreatment,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            amount,
            vat_rate,
            treatment,
            special_tax_rate: None,
            unit_price: None,
        }
    }

    pub fn with_special_tax_rate(
        mut self,
        rate: Decimal,
    ) -> Self {
        self.special_tax_rate = Some(rate);
        self
    }

    pub fn with_unit_price(
        mut self,
        price: Decimal,
    ) -> Self {
        self.unit_price = Some(price);
        self
    }
}

/// Share of a category's spend falling under each non-zero VAT rate, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VatDistribution {
    pub at_4_pct: Decimal,
    pub at_10_pct: Decimal,
    pub at_21_pct: Decimal,
}

impl VatDistribution {
    pub fn slices(&self) -> [(VatRate, Decimal); 3] {
        [
            (VatRate::SuperReduced, self.at_4_pct),
            (VatRate::Reduced, self.at_10_pct),
            (VatRate::General, self.at_21_pct),
        ]
    }
}

/// A group of monthly expenses.
///
/// When `line_items` is non-empty, `total_amount` is the sum of their
/// amounts; the mutators below keep it that way. Otherwise the category is
/// taxed in aggregate using `fallback_vat_distribution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub line_items: Vec<ConsumptionLineItem>,
    #[serde(default)]
    pub fallback_vat_distribution: Option<VatDistribution>,
}

impl ExpenseCategory {
    /// Creates a category taxed in aggregate.
    pub fn aggregate(
        id: impl Into<String>,
        display_name: impl Into<String>,
        total_amount: Decimal,
        distribution: VatDistribution,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            total_amount,
            line_items: Vec::new(),
            fallback_vat_distribution: Some(distribution),
        }
    }

    /// Creates an itemized category; `total_amount` is derived from the items.
    pub fn itemized(
        id: impl Into<String>,
        display_name: impl Into<String>,
        line_items: Vec<ConsumptionLineItem>,
    ) -> Self {
        let mut category = Self {
            id: id.into(),
            display_name: display_name.into(),
            total_amount: Decimal::ZERO,
            line_items,
            fallback_vat_distribution: None,
        };
        category.recompute_total();
        category
    }

    pub fn is_itemized(&self) -> bool {
        !self.line_items.is_empty()
    }

    /// Re-derives `total_amount` from the line items. No-op for aggregate categories.
    pub fn recompute_total(&mut self) {
        if self.is_itemized() {
            self.total_amount = self.line_items.iter().map(|item| item.amount).sum();
        }
    }

    pub fn push_item(
        &mut self,
        item: ConsumptionLineItem,
    ) {
        self.line_items.push(item);
        self.recompute_total();
    }

    /// Updates the amount of the item with `item_id`. Returns `false` if no
    /// such item exists.
    pub fn set_item_amount(
        &mut self,
        item_id: &str,
        amount: Decimal,
    ) -> bool {
        let Some(item) = self.line_items.iter_mut().find(|i| i.id == item_id) else {
            return false;
        };
        item.amount = amount;
        self.recompute_total();
        true
    }

    pub fn remove_item(
        &mut self,
        item_id: &str,
    ) -> Option<ConsumptionLineItem> {
        let index = self.line_items.iter().position(|i| i.id == item_id)?;
        let removed = self.line_items.remove(index);
        // Removing the last item must not leave its amount behind as an aggregate total.
        self.total_amount = self.line_items.iter().map(|item| item.amount).sum();
        Some(removed)
    }
}
