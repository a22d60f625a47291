//! LP-Lock Contracts
//!
//! Casper-native stablecoin lending against AMM pool shares.
//!
//! ## Architecture
//!
//! - **ShareOracle**: prices one pool's shares in USD from reserves plus
//!   external reference feeds, with peg and manipulation checks
//! - **LiquidityLock**: per-pool collateral engine; takes shares into
//!   custody and borrows pUSD against them
//! - **Valuator**: authorization registry; the only address the ledger
//!   trusts, forwarding mint/burn for active engines at per-engine rates
//! - **Stablecoin (pUSD)**: CEP-18 ledger with loan tracking and three-way
//!   fee distribution
//!
//! ## Valuation Safety
//!
//! Every borrow and repay goes through `ShareOracle::valuate`, which
//! refuses to price the pool when the stable leg is off its peg or the
//! reserve-implied price diverges from the feed anchor. Flash skews of the
//! reserves therefore cannot mint unbacked debt.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod interfaces;
pub mod math;
pub mod ownable;

// Contract modules
pub mod oracle;
pub mod registry;
pub mod ledger;
pub mod engine;

// Host-test mocks
pub mod test_support;
