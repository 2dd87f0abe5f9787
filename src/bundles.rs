//! Bundle Pricing
//!
//! Multi-unit tiers derived from a product's base price. Tiers are computed
//! when the base price is written and stored alongside it, so later price
//! changes never reach prices already captured on carts or orders.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multi-unit purchase tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bundle {
    /// One unit at the base price.
    Single,

    /// Two units with a 5% multi-buy discount.
    Double,

    /// Three units with a 10% multi-buy discount.
    Triple,
}

impl Bundle {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
        }
    }

    /// Number of units in the tier.
    #[must_use]
    pub const fn units(self) -> u64 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }

    /// Fraction of the undiscounted multiple that is charged.
    fn rate(self) -> Decimal {
        match self {
            Self::Single => Decimal::ONE,
            Self::Double => Decimal::new(95, 2),
            Self::Triple => Decimal::new(90, 2),
        }
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown bundle name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown bundle \"{0}\"")]
pub struct UnknownBundle(pub String);

impl FromStr for Bundle {
    type Err = UnknownBundle;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "triple" => Ok(Self::Triple),
            other => Err(UnknownBundle(other.to_string())),
        }
    }
}

/// Stored price for each bundle tier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlePricing {
    pub single: u64,
    pub double: u64,
    pub triple: u64,
}

impl BundlePricing {
    /// Derive all tiers from a base unit price.
    #[must_use]
    pub fn from_base_price(base_price: u64) -> Self {
        Self {
            single: tier_price(base_price, Bundle::Single),
            double: tier_price(base_price, Bundle::Double),
            triple: tier_price(base_price, Bundle::Triple),
        }
    }

    /// Price charged for one line of the given tier.
    #[must_use]
    pub const fn price_for(&self, bundle: Bundle) -> u64 {
        match bundle {
            Bundle::Single => self.single,
            Bundle::Double => self.double,
            Bundle::Triple => self.triple,
        }
    }
}

fn tier_price(base_price: u64, bundle: Bundle) -> u64 {
    let undiscounted = Decimal::from(base_price) * Decimal::from(bundle.units());

    (undiscounted * bundle.rate())
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_for_149() {
        let pricing = BundlePricing::from_base_price(149);

        assert_eq!(pricing.single, 149);
        assert_eq!(pricing.double, 283);
        assert_eq!(pricing.triple, 402);
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        // 5 * 2 * 0.95 = 9.5
        assert_eq!(BundlePricing::from_base_price(5).double, 10);
    }

    #[test]
    fn zero_base_price_is_free_at_every_tier() {
        let pricing = BundlePricing::from_base_price(0);

        assert_eq!(pricing, BundlePricing {
            single: 0,
            double: 0,
            triple: 0
        });
    }

    #[test]
    fn multi_buy_is_cheaper_per_unit() {
        for base in 6..=5_000 {
            let pricing = BundlePricing::from_base_price(base);

            assert!(pricing.double < base * 2, "double not cheaper for {base}");
            assert!(pricing.triple < base * 3, "triple not cheaper for {base}");
        }
    }

    #[test]
    fn price_for_selects_tier() {
        let pricing = BundlePricing::from_base_price(100);

        assert_eq!(pricing.price_for(Bundle::Single), 100);
        assert_eq!(pricing.price_for(Bundle::Double), 190);
        assert_eq!(pricing.price_for(Bundle::Triple), 270);
    }

    #[test]
    fn bundle_parses_storage_names() {
        assert_eq!("double".parse(), Ok(Bundle::Double));
        assert_eq!(
            "quad".parse::<Bundle>(),
            Err(UnknownBundle("quad".to_string()))
        );
    }
}
