use super::amount::TokenAmount;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// The state the funding wallet must reach.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetState {
    /// Minimum allowance granted to the spender (checked with `>=`).
    pub allowance_floor: TokenAmount,
    /// Exact balance the funding wallet must hold.
    pub balance_target: TokenAmount,
}

impl TargetState {
    pub fn new(allowance_floor: TokenAmount, balance_target: TokenAmount) -> Self {
        Self {
            allowance_floor,
            balance_target,
        }
    }

    pub fn is_met(&self, allowance: TokenAmount, balance: TokenAmount) -> bool {
        allowance >= self.allowance_floor && balance == self.balance_target
    }
}

/// Live allowance and balance readings, taken together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub balance: TokenAmount,
    pub allowance: TokenAmount,
    pub balance_target: TokenAmount,
    pub allowance_floor: TokenAmount,
    pub converged: bool,
}

impl LedgerSnapshot {
    pub fn observe(target: &TargetState, allowance: TokenAmount, balance: TokenAmount) -> Self {
        Self {
            balance,
            allowance,
            balance_target: target.balance_target,
            allowance_floor: target.allowance_floor,
            converged: target.is_met(allowance, balance),
        }
    }

    /// Writes the snapshot as one line of JSON.
    pub fn write_json<W: Write>(&self, mut out: W) -> Result<()> {
        serde_json::to_writer(&mut out, self)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
