use crate::error::FundingError;
use std::fmt;
use std::str::FromStr;

/// A `0x`-prefixed, 20-byte hex account address.
///
/// Stored lowercase so that two spellings of the same account compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = FundingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| FundingError::Parse {
                what: "address",
                raw: s.to_string(),
            })?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FundingError::Parse {
                what: "address",
                raw: s.to_string(),
            });
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed account roles a funding run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accounts {
    /// Pre-funded source of tokens; impersonated before transfers.
    pub whale: Address,
    /// The wallet being converged.
    pub funding_wallet: Address,
    /// Contract authorized to spend from the funding wallet.
    pub spender: Address,
}
