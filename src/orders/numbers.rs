//! Order Numbers & Transaction Ids

use std::fmt;

use jiff::Timestamp;
use rand::{Rng, distributions::Alphanumeric};

const ORDER_PREFIX: &str = "ORD";
const TRANSACTION_PREFIX: &str = "TXN";
const SUFFIX_LEN: usize = 6;

/// Customer facing order identifier, e.g. `ORD48213377K3ZQ9A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// `ORD` + last 8 digits of the millisecond timestamp + 6 random
    /// uppercase alphanumerics.
    pub fn generate(now: Timestamp, rng: &mut impl Rng) -> Self {
        let fragment = now.as_millisecond().rem_euclid(100_000_000);

        Self(format!(
            "{ORDER_PREFIX}{fragment:08}{}",
            random_suffix(rng, true)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for OrderNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gateway correlation id, e.g. `TXN1718000000000a9Bc3D`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// `TXN` + millisecond timestamp + 6 random alphanumerics.
    pub fn generate(now: Timestamp, rng: &mut impl Rng) -> Self {
        Self(format!(
            "{TRANSACTION_PREFIX}{}{}",
            now.as_millisecond(),
            random_suffix(rng, false)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_suffix(rng: &mut impl Rng, uppercase: bool) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .map(|c| if uppercase { c.to_ascii_uppercase() } else { c })
        .collect()
}
