//! Exact integer token amounts
//!
//! Token amounts are 256-bit unsigned integers, the on-chain word size.
//! Every `a * b / c` is evaluated through a 512-bit full product so no
//! intermediate result can overflow. There is no floating point anywhere.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ethereum_types::{U256, U512};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Non-negative token amount in raw (smallest) units.
///
/// Serialized as a base-10 string so values above 2^53 survive JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Amount = Amount(U256([0; 4]));

    /// Wrap a raw 256-bit value.
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(U256::from(value))
    }

    /// Inner 256-bit value.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self * numerator / denominator`, truncated toward zero.
    ///
    /// Returns `None` when `denominator` is zero or the quotient does not fit
    /// in 256 bits.
    pub fn mul_div(self, numerator: Amount, denominator: Amount) -> Option<Amount> {
        if denominator.is_zero() {
            return None;
        }
        let product = self.0.full_mul(numerator.0);
        let quotient = product / U512::from(denominator.0);
        U256::try_from(quotient).ok().map(Amount)
    }

    /// Subtract, clamping at zero.
    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }

    /// Add, clamping at the 256-bit maximum.
    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

/// Compare the ratios `a_num / a_den` and `b_num / b_den` exactly.
///
/// Uses cross multiplication in 512 bits, so no division is performed and
/// zero denominators compare as if the ratio were unbounded.
pub fn cmp_ratio(a_num: Amount, a_den: Amount, b_num: Amount, b_den: Amount) -> Ordering {
    let lhs = a_num.0.full_mul(b_den.0);
    let rhs = b_num.0.full_mul(a_den.0);
    lhs.cmp(&rhs)
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

/// Error parsing a decimal amount string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount: {0:?}")]
pub struct ParseAmountError(pub String);

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseAmountError(s.to_string()));
        }
        U256::from_dec_str(trimmed)
            .map(Amount)
            .map_err(|_| ParseAmountError(s.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
