use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sweetshop_core::{DomainError, DomainResult, ValueObject};

/// Unit price of a catalog item. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self(amount))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    pub fn total_for(&self, quantity: i64) -> DomainResult<Decimal> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| DomainError::validation("total price overflows"))
    }
}

impl ValueObject for Price {}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
