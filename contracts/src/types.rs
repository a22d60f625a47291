//! Common types used across the LP-lock protocol.

use odra::prelude::*;
use odra::casper_types::U256;

/// Policy for computing how many shares a repayment releases
#[odra::odra_type]
#[derive(Copy)]
pub enum ReleasePolicy {
    /// Release `locked * repay / debt`
    Proportional,
    /// Release down to a configured collateralization-ratio target
    TargetRatio,
}

/// Per-engine release configuration
#[odra::odra_type]
pub struct ReleaseConfig {
    /// Which release formula this engine uses
    pub policy: ReleasePolicy,
    /// Target collateralization ratio numerator (e.g. 20000 = 2.0x with normalizer 10000)
    pub target_cr: u32,
    /// Normalizer for `target_cr`
    pub cr_normalizer: u32,
}

/// A user's state in one collateral engine
#[odra::odra_type]
pub struct Position {
    /// Owner address
    pub owner: Address,
    /// Pool shares held in custody for this owner
    pub locked_shares: U256,
    /// Outstanding stablecoin debt (gross, fee included)
    pub debt: U256,
    /// Block time of the owner's last lock/unlock on this engine
    pub last_action_time: u64,
}

impl Position {
    pub fn empty(owner: Address) -> Self {
        Self {
            owner,
            locked_shares: U256::zero(),
            debt: U256::zero(),
            last_action_time: 0,
        }
    }
}

/// Loan terms for one registered collateral engine
#[odra::odra_type]
pub struct EngineTerms {
    /// Fraction of collateral USD value grantable as debt, in parts per million
    pub loan_rate_ppm: u32,
    /// Fraction of the loan retained as protocol fee, in parts per million
    pub fee_rate_ppm: u32,
    /// Whether mint/burn requests from this engine are honored
    pub active: bool,
}

impl EngineTerms {
    pub fn disabled() -> Self {
        Self {
            loan_rate_ppm: 0,
            fee_rate_ppm: 0,
            active: false,
        }
    }
}
