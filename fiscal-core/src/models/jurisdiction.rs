use serde::{Deserialize, Serialize};

use crate::TaxBracket;

/// How a jurisdiction's bracket table relates to total income-tax liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// The table is the regional half; the nationwide table is added on top.
    Split,
    /// The table covers 100% of liability on its own (foral territories).
    Unified,
}

impl TaxRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Unified => "unified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "split" => Some(Self::Split),
            "unified" => Some(Self::Unified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub id: String,
    pub display_name: String,
    pub brackets: Vec<TaxBracket>,
    pub regime: TaxRegime,
}

impl Jurisdiction {
    pub fn is_unified(&self) -> bool {
        self.regime == TaxRegime::Unified
    }
}
