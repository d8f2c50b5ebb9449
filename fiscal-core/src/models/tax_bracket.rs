use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tranche of a progressive schedule.
///
/// `upper_limit` of `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub upper_limit: Option<Decimal>,
    pub marginal_rate: Decimal,
}

impl TaxBracket {
    pub fn bounded(
        upper_limit: Decimal,
        marginal_rate: Decimal,
    ) -> Self {
        Self {
            upper_limit: Some(upper_limit),
            marginal_rate,
        }
    }

    pub fn unbounded(marginal_rate: Decimal) -> Self {
        Self {
            upper_limit: None,
            marginal_rate,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper_limit.is_none()
    }
}
