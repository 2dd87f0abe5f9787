//! Promo Codes

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a promo's `discount` value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Whole percent off the total.
    Percentage,

    /// Fixed amount off the total.
    Fixed,
}

impl DiscountType {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = PromoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(PromoError::UnknownDiscountType(other.to_string())),
        }
    }
}

/// Errors raised by promo lookups and registry construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoError {
    /// The code is not in the registry.
    #[error("invalid promo code")]
    InvalidCode,

    /// A registry entry discounts more than 100%.
    #[error("percentage discount {0} exceeds 100")]
    InvalidPercentage(u64),

    /// A stored discount type could not be parsed.
    #[error("unknown discount type \"{0}\"")]
    UnknownDiscountType(String),
}

/// A promo code applied to a cart, or snapshotted onto an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    pub discount: u64,
    pub discount_type: DiscountType,
}

impl AppliedPromo {
    /// Discounted total for `total`.
    #[must_use]
    pub fn apply(&self, total: u64) -> u64 {
        apply_discount(total, self.discount, self.discount_type)
    }
}

/// Apply a discount to a total, never going below zero or above `total`.
#[must_use]
pub fn apply_discount(total: u64, discount: u64, discount_type: DiscountType) -> u64 {
    match discount_type {
        DiscountType::Fixed => total.saturating_sub(discount),
        DiscountType::Percentage => {
            let kept = Decimal::ONE_HUNDRED - Decimal::from(discount.min(100));

            (Decimal::from(total) * kept / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u64()
                .map_or(total, |value| value.min(total))
        }
    }
}

/// Normalise a customer supplied code for lookup.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Fixed registry of valid promo codes.
#[derive(Debug, Clone)]
pub struct PromoRegistry {
    codes: FxHashMap<String, (u64, DiscountType)>,
}

impl PromoRegistry {
    /// Build a registry from `(code, discount, type)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`PromoError::InvalidPercentage`] if a percentage entry
    /// exceeds 100.
    pub fn new<'a, I>(entries: I) -> Result<Self, PromoError>
    where
        I: IntoIterator<Item = (&'a str, u64, DiscountType)>,
    {
        let mut codes = FxHashMap::default();

        for (code, discount, discount_type) in entries {
            if discount_type == DiscountType::Percentage && discount > 100 {
                return Err(PromoError::InvalidPercentage(discount));
            }

            codes.insert(normalize_code(code), (discount, discount_type));
        }

        Ok(Self { codes })
    }

    /// Resolve a customer supplied code.
    ///
    /// # Errors
    ///
    /// Returns [`PromoError::InvalidCode`] if the normalised code is unknown.
    pub fn lookup(&self, code: &str) -> Result<AppliedPromo, PromoError> {
        let code = normalize_code(code);

        let (discount, discount_type) = *self.codes.get(&code).ok_or(PromoError::InvalidCode)?;

        Ok(AppliedPromo {
            code,
            discount,
            discount_type,
        })
    }

    /// Number of registered codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the registry has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for PromoRegistry {
    fn default() -> Self {
        let codes = [
            ("WELCOME10", (10, DiscountType::Percentage)),
            ("SAVE20", (20, DiscountType::Percentage)),
            ("FLAT50", (50, DiscountType::Fixed)),
            ("FLAT100", (100, DiscountType::Fixed)),
        ]
        .into_iter()
        .map(|(code, entry)| (code.to_string(), entry))
        .collect();

        Self { codes }
    }
}
