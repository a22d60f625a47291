//! Share price oracle.
//!
//! Converts raw pool reserves plus external reference feeds into a
//! per-share USD value in 18-decimal fixed point, defensible inside a
//! single adversarial block:
//!
//! - the stable leg is priced at exactly 1.0 once its own feed confirms the
//!   peg (otherwise every downstream number is meaningless);
//! - the volatile leg is priced by folding an ordered chain of feeds, so
//!   assets quoted only through an intermediate asset are supported;
//! - the reserve-ratio-implied price is compared against the feed anchor.
//!   An attacker can skew reserves within one block but cannot move the
//!   independent feed, so divergence above the tolerance is treated as
//!   manipulation and the valuation is refused.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::errors::LoanError;
use crate::interfaces::{PriceFeedClient, ReservePoolClient};
use crate::math::{deviation_bps, deviation_ppm, div_base, mul_base, normalize_to_base, BPS_SCALE, PPM_SCALE, SCALE};
use crate::ownable::Ownable2Step;

/// Share price oracle, one instance per reserve pool
#[odra::module]
pub struct ShareOracle {
    /// Ownership handoff state
    ownable: SubModule<Ownable2Step>,
    /// Reserve pool this oracle prices
    pool: Var<Address>,
    /// Native decimals of (asset0, asset1)
    asset_decimals: Var<(u8, u8)>,
    /// Index of the USD-pegged leg (0 or 1)
    stable_leg: Var<u8>,
    /// Feed chain for the stable leg's own USD price (peg check)
    stable_feeds: Var<Vec<Address>>,
    /// Feed chain for the volatile leg's USD price (anchor)
    volatile_feeds: Var<Vec<Address>>,
    /// Max tolerated deviation of the stable leg from 1.0, in ppm
    peg_threshold_ppm: Var<u32>,
    /// Max tolerated divergence between reserve-implied and anchor price, in bps
    deviation_tolerance_bps: Var<u32>,
}

#[odra::module]
impl ShareOracle {
    /// Initialize the oracle for one pool.
    ///
    /// `stable_feeds` and `volatile_feeds` are ordered chains; each feed's
    /// price is normalized to the 18-decimal base and the chain is folded
    /// by multiplication.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        pool: Address,
        asset0_decimals: u8,
        asset1_decimals: u8,
        stable_leg: u8,
        stable_feeds: Vec<Address>,
        volatile_feeds: Vec<Address>,
        peg_threshold_ppm: u32,
        deviation_tolerance_bps: u32,
    ) {
        if asset0_decimals == 0 || asset1_decimals == 0 {
            self.env().revert(LoanError::InvalidConfig);
        }
        if stable_leg > 1 {
            self.env().revert(LoanError::InvalidConfig);
        }
        if peg_threshold_ppm == 0 || peg_threshold_ppm > PPM_SCALE {
            self.env().revert(LoanError::InvalidConfig);
        }
        if deviation_tolerance_bps == 0 || deviation_tolerance_bps > BPS_SCALE {
            self.env().revert(LoanError::InvalidConfig);
        }
        if stable_feeds.is_empty() || volatile_feeds.is_empty() {
            self.env().revert(LoanError::InvalidConfig);
        }

        let deployer = self.env().caller();
        self.ownable.init(deployer);
        self.pool.set(pool);
        self.asset_decimals.set((asset0_decimals, asset1_decimals));
        self.stable_leg.set(stable_leg);
        self.stable_feeds.set(stable_feeds);
        self.volatile_feeds.set(volatile_feeds);
        self.peg_threshold_ppm.set(peg_threshold_ppm);
        self.deviation_tolerance_bps.set(deviation_tolerance_bps);
    }

    // ========== Valuation ==========

    /// USD value of one pool share, in 18-decimal fixed point.
    ///
    /// Each leg's value is `reserve * price` with the reserve normalized
    /// from its native decimals and the stable leg priced at 1.0; the sum
    /// is divided by the total share supply.
    pub fn value_per_share(&self) -> U256 {
        let (stable_norm, volatile_norm) = self.normalized_reserves();
        let total_shares = ReservePoolClient::total_shares(&self.env(), self.pool_address());
        if total_shares.is_zero() {
            self.env().revert(LoanError::EmptyPool);
        }

        let anchor = self.volatile_anchor_price();
        let total_usd = stable_norm + mul_base(volatile_norm, anchor);
        div_base(total_usd, total_shares)
    }

    /// Revert with `StablecoinDepegged` when the stable leg's own feed
    /// strays from 1.0 beyond the configured ppm threshold.
    pub fn check_stable_leg(&self) {
        let feeds = self.stable_feeds.get().unwrap_or_default();
        let price = self.chain_price(&feeds);
        let threshold = self.peg_threshold_ppm.get().unwrap_or(0);
        if deviation_ppm(price, U256::from(SCALE)) > U256::from(threshold) {
            self.env().revert(LoanError::StablecoinDepegged);
        }
    }

    /// Revert with `PriceManipulationEvident` when the reserve-ratio-implied
    /// price of the volatile leg diverges from the feed anchor beyond the
    /// configured bps tolerance.
    pub fn check_no_manipulation(&self) {
        let (stable_norm, volatile_norm) = self.normalized_reserves();
        if volatile_norm.is_zero() || stable_norm.is_zero() {
            self.env().revert(LoanError::EmptyPool);
        }

        // With the stable leg at 1.0, the pool itself quotes the volatile
        // leg at stable_reserve / volatile_reserve.
        let implied = div_base(stable_norm, volatile_norm);
        let anchor = self.volatile_anchor_price();
        let tolerance = self.deviation_tolerance_bps.get().unwrap_or(0);
        if deviation_bps(implied, anchor) > U256::from(tolerance) {
            self.env().revert(LoanError::PriceManipulationEvident);
        }
    }

    /// Fully checked valuation, the entry point collateral engines use:
    /// peg check, then valuation, then manipulation check.
    pub fn valuate(&self) -> U256 {
        self.check_stable_leg();
        let value = self.value_per_share();
        self.check_no_manipulation();
        value
    }

    // ========== Queries ==========

    /// Whether the given leg is the configured USD-pegged one
    pub fn is_leg_pegged(&self, index: u8) -> bool {
        self.stable_leg.get().map_or(false, |leg| leg == index)
    }

    /// Native decimals of (asset0, asset1)
    pub fn asset_decimals(&self) -> (u8, u8) {
        self.asset_decimals.get().unwrap_or((18, 18))
    }

    /// The priced reserve pool
    pub fn get_pool(&self) -> Option<Address> {
        self.pool.get()
    }

    pub fn get_peg_threshold_ppm(&self) -> u32 {
        self.peg_threshold_ppm.get().unwrap_or(0)
    }

    pub fn get_deviation_tolerance_bps(&self) -> u32 {
        self.deviation_tolerance_bps.get().unwrap_or(0)
    }

    // ========== Admin ==========

    /// Re-point the volatile leg's feed chain (owner only)
    pub fn set_volatile_feeds(&mut self, feeds: Vec<Address>) {
        self.ownable.require_owner();
        if feeds.is_empty() {
            self.env().revert(LoanError::InvalidConfig);
        }
        self.volatile_feeds.set(feeds);
    }

    /// Re-point the stable leg's feed chain (owner only)
    pub fn set_stable_feeds(&mut self, feeds: Vec<Address>) {
        self.ownable.require_owner();
        if feeds.is_empty() {
            self.env().revert(LoanError::InvalidConfig);
        }
        self.stable_feeds.set(feeds);
    }

    /// Adjust the peg and divergence thresholds (owner only)
    pub fn set_thresholds(&mut self, peg_threshold_ppm: u32, deviation_tolerance_bps: u32) {
        self.ownable.require_owner();
        if peg_threshold_ppm == 0 || peg_threshold_ppm > PPM_SCALE {
            self.env().revert(LoanError::InvalidConfig);
        }
        if deviation_tolerance_bps == 0 || deviation_tolerance_bps > BPS_SCALE {
            self.env().revert(LoanError::InvalidConfig);
        }
        self.peg_threshold_ppm.set(peg_threshold_ppm);
        self.deviation_tolerance_bps.set(deviation_tolerance_bps);
    }

    pub fn get_owner(&self) -> Option<Address> {
        self.ownable.owner()
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.ownable.transfer_ownership(new_owner);
    }

    pub fn accept_ownership(&mut self) {
        self.ownable.accept_ownership();
    }

    // ========== Internal ==========

    fn pool_address(&self) -> Address {
        match self.pool.get() {
            Some(pool) => pool,
            None => self.env().revert(LoanError::InvalidConfig),
        }
    }

    /// Both reserves normalized to the 18-decimal base, ordered
    /// (stable leg, volatile leg).
    fn normalized_reserves(&self) -> (U256, U256) {
        let (reserve0, reserve1) = ReservePoolClient::reserves(&self.env(), self.pool_address());
        let (dec0, dec1) = self.asset_decimals();
        let r0 = normalize_to_base(reserve0, dec0);
        let r1 = normalize_to_base(reserve1, dec1);
        if self.stable_leg.get().unwrap_or(0) == 0 {
            (r0, r1)
        } else {
            (r1, r0)
        }
    }

    /// Feed-anchored USD price of the volatile leg
    fn volatile_anchor_price(&self) -> U256 {
        let feeds = self.volatile_feeds.get().unwrap_or_default();
        self.chain_price(&feeds)
    }

    /// Fold a feed chain into a single 18-decimal price.
    fn chain_price(&self, feeds: &[Address]) -> U256 {
        if feeds.is_empty() {
            self.env().revert(LoanError::FeedUnavailable);
        }
        let mut price = U256::from(SCALE);
        for feed in feeds {
            let (value, decimals) = PriceFeedClient::latest_price(&self.env(), *feed);
            if value.is_zero() {
                self.env().revert(LoanError::FeedUnavailable);
            }
            price = mul_base(price, normalize_to_base(value, decimals));
        }
        price
    }
}
