use crate::error::FundingError;
use alloy_primitives::U256;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A raw token quantity in the token's smallest unit.
///
/// Wraps a 256-bit integer, the width of on-chain balances and allowances,
/// so that unlimited approvals (`uint256` max) read back without overflow.
/// Serialized as a decimal string so JSON consumers keep full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const MAX: Self = Self(U256::MAX);

    pub const fn new(value: u128) -> Self {
        Self(U256::from_limbs([value as u64, (value >> 64) as u64, 0, 0]))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Parses the first whitespace-separated token of a command's output.
    ///
    /// Read calls print values like `10000 [1e4]`; only the leading number
    /// is meaningful.
    pub fn from_output(raw: &str) -> Result<Self, FundingError> {
        raw.split_whitespace()
            .next()
            .ok_or_else(|| FundingError::Parse {
                what: "token amount",
                raw: raw.to_string(),
            })?
            .parse()
    }
}

impl FromStr for TokenAmount {
    type Err = FundingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => (hex, 16),
            None => (s, 10),
        };
        let invalid = || FundingError::Parse {
            what: "token amount",
            raw: s.to_string(),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix as u32)) {
            return Err(invalid());
        }
        U256::from_str_radix(digits, radix)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}
