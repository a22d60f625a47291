//! Collateral lock engine.
//!
//! One engine per reserve pool. Users lock pool shares, the oracle prices
//! them, and the engine borrows pUSD against that value through the
//! valuator registry at the registry's per-engine rates. Repayment burns
//! debt and releases shares under one of two policies fixed at deployment:
//! proportional to the repaid fraction, or down to a target
//! collateralization ratio.
//!
//! State is written before any external transfer, a reentrancy latch wraps
//! both mutating entry points, and a per-user cooldown bounds how often a
//! single account can act. Pausing blocks new locks only; repayment and
//! release stay open so users can always exit.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::errors::LoanError;
use crate::interfaces::{LedgerClient, OracleClient, ReservePoolClient, TokenClient, ValuatorClient};
use crate::math::{apply_ppm, div_base, mul_base};
use crate::ownable::Ownable2Step;
use crate::types::{Position, ReleaseConfig, ReleasePolicy};

#[odra::module]
pub struct LiquidityLock {
    /// Ownership handoff state
    ownable: SubModule<Ownable2Step>,
    /// Reserve pool whose shares this engine takes into custody
    pool: Var<Address>,
    /// Share price oracle
    oracle: Var<Address>,
    /// Valuator registry fronting the ledger
    valuator: Var<Address>,
    /// pUSD ledger (read-only here; mutation goes through the valuator)
    ledger: Var<Address>,
    /// One position per borrower
    positions: Mapping<Address, Position>,
    /// Sum of all locked shares
    total_locked: Var<U256>,
    /// When set, new locks revert; unlock stays open
    paused: Var<bool>,
    /// Per-user cooldown between actions, in milliseconds
    rate_limit_ms: Var<u64>,
    /// Share release policy, fixed at deployment
    release: Var<ReleaseConfig>,
    /// Reentrancy latch
    entered: Var<bool>,
}

#[odra::module]
impl LiquidityLock {
    /// Initialize the engine.
    ///
    /// For [`ReleasePolicy::TargetRatio`] the ratio is
    /// `target_cr / cr_normalizer`; both must be nonzero and the ratio must
    /// be at least 1 or repayment could strand collateral. Proportional
    /// engines ignore the two fields.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        pool: Address,
        oracle: Address,
        valuator: Address,
        ledger: Address,
        rate_limit_ms: u64,
        release_policy: ReleasePolicy,
        target_cr: u32,
        cr_normalizer: u32,
    ) {
        if release_policy == ReleasePolicy::TargetRatio
            && (cr_normalizer == 0 || target_cr < cr_normalizer)
        {
            self.env().revert(LoanError::InvalidConfig);
        }

        let deployer = self.env().caller();
        self.ownable.init(deployer);
        self.pool.set(pool);
        self.oracle.set(oracle);
        self.valuator.set(valuator);
        self.ledger.set(ledger);
        self.total_locked.set(U256::zero());
        self.paused.set(false);
        self.rate_limit_ms.set(rate_limit_ms);
        self.release.set(ReleaseConfig {
            policy: release_policy,
            target_cr,
            cr_normalizer,
        });
        self.entered.set(false);
    }

    // ========== Borrowing ==========

    /// Lock `share_amount` pool shares and borrow against them.
    ///
    /// The caller receives the loan minus the loan fee; `min_loan` caps the
    /// acceptable slippage between quoting and execution. Reverts when
    /// paused, inside the caller's cooldown window, or when the oracle
    /// refuses to price the pool.
    pub fn lock(&mut self, share_amount: U256, min_loan: U256) {
        self.enter();

        if share_amount.is_zero() {
            self.env().revert(LoanError::ZeroAmount);
        }
        if self.paused.get().unwrap_or(false) {
            self.env().revert(LoanError::EnginePaused);
        }

        let caller = self.env().caller();
        // A fresh account has no prior action to rate-limit against.
        let mut position = match self.positions.get(&caller) {
            Some(position) => {
                self.require_cooldown_elapsed(&position);
                position
            }
            None => Position::empty(caller),
        };

        let pool = self.pool_address();
        let this = self.env().self_address();
        if ReservePoolClient::balance_of(&self.env(), pool, caller) < share_amount {
            self.env().revert(LoanError::InsufficientShareBalance);
        }
        if ReservePoolClient::allowance(&self.env(), pool, caller, this) < share_amount {
            self.env().revert(LoanError::InsufficientAllowance);
        }

        let value_per_share = OracleClient::valuate(&self.env(), self.oracle_address());
        let (loan_rate_ppm, fee_rate_ppm, active) =
            ValuatorClient::get_engine_terms(&self.env(), self.valuator_address(), this);
        if !active {
            self.env().revert(LoanError::EngineNotAuthorized);
        }

        let collateral_value = mul_base(share_amount, value_per_share);
        let loan = apply_ppm(collateral_value, loan_rate_ppm);
        let fee = apply_ppm(loan, fee_rate_ppm);
        if loan <= fee {
            self.env().revert(LoanError::LoanTooSmall);
        }
        if loan - fee < min_loan {
            self.env().revert(LoanError::SlippageExceeded);
        }

        position.locked_shares += share_amount;
        position.debt += loan;
        position.last_action_time = self.env().get_block_time();
        self.positions.set(&caller, position);
        self.total_locked
            .set(self.total_locked.get().unwrap_or(U256::zero()) + share_amount);

        if !ReservePoolClient::transfer_from(&self.env(), pool, caller, this, share_amount) {
            self.env().revert(LoanError::InsufficientShareBalance);
        }
        ValuatorClient::mint_for(&self.env(), self.valuator_address(), caller, loan, fee);

        self.exit();
    }

    /// Repay `repay_amount` pUSD and release shares per the engine's policy.
    ///
    /// Proportional engines release `locked * repay / debt`; target-ratio
    /// engines release everything above what the remaining debt needs at
    /// the configured ratio. Full repayment always releases everything.
    /// Works while paused.
    pub fn unlock(&mut self, repay_amount: U256) {
        self.enter();

        if repay_amount.is_zero() {
            self.env().revert(LoanError::ZeroAmount);
        }

        let caller = self.env().caller();
        let mut position = match self.positions.get(&caller) {
            Some(position) => position,
            None => self.env().revert(LoanError::InsufficientDebt),
        };
        if position.debt < repay_amount || position.debt.is_zero() {
            self.env().revert(LoanError::InsufficientDebt);
        }
        self.require_cooldown_elapsed(&position);

        if LedgerClient::balance_of(&self.env(), self.ledger_address(), caller) < repay_amount {
            self.env().revert(LoanError::InsufficientFunds);
        }

        // Repayment is still gated on a sane price so a manipulated pool
        // cannot be drained through the release computation.
        let value_per_share = OracleClient::valuate(&self.env(), self.oracle_address());
        let release = self.release_amount(&position, repay_amount, value_per_share);

        position.locked_shares -= release;
        position.debt -= repay_amount;
        position.last_action_time = self.env().get_block_time();
        self.positions.set(&caller, position);
        self.total_locked
            .set(self.total_locked.get().unwrap_or(U256::zero()) - release);

        ValuatorClient::burn_for(&self.env(), self.valuator_address(), caller, repay_amount);
        if !release.is_zero()
            && !ReservePoolClient::transfer(&self.env(), self.pool_address(), caller, release)
        {
            self.env().revert(LoanError::InsufficientShareBalance);
        }

        self.exit();
    }

    // ========== Queries ==========

    /// Shares this engine holds for `user`
    pub fn tokens_locked(&self, user: Address) -> U256 {
        self.positions
            .get(&user)
            .map_or(U256::zero(), |position| position.locked_shares)
    }

    /// Outstanding pUSD debt of `user`
    pub fn debt_of(&self, user: Address) -> U256 {
        self.positions
            .get(&user)
            .map_or(U256::zero(), |position| position.debt)
    }

    pub fn get_position(&self, user: Address) -> Option<Position> {
        self.positions.get(&user)
    }

    pub fn get_total_locked(&self) -> U256 {
        self.total_locked.get().unwrap_or(U256::zero())
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get().unwrap_or(false)
    }

    pub fn get_pool(&self) -> Option<Address> {
        self.pool.get()
    }

    pub fn get_oracle(&self) -> Option<Address> {
        self.oracle.get()
    }

    pub fn get_valuator(&self) -> Option<Address> {
        self.valuator.get()
    }

    pub fn get_ledger(&self) -> Option<Address> {
        self.ledger.get()
    }

    pub fn get_rate_limit_ms(&self) -> u64 {
        self.rate_limit_ms.get().unwrap_or(0)
    }

    pub fn get_release_config(&self) -> Option<ReleaseConfig> {
        self.release.get()
    }

    pub fn get_owner(&self) -> Option<Address> {
        self.ownable.owner()
    }

    // ========== Admin Functions ==========

    /// Stop new locks (owner only). Unlock keeps working.
    pub fn set_pause(&mut self) {
        self.ownable.require_owner();
        self.paused.set(true);
    }

    /// Resume locking (owner only)
    pub fn set_unpause(&mut self) {
        self.ownable.require_owner();
        self.paused.set(false);
    }

    /// Swap the oracle (owner only)
    pub fn set_oracle(&mut self, oracle: Address) {
        self.ownable.require_owner();
        self.oracle.set(oracle);
    }

    /// Swap the valuator registry (owner only)
    pub fn set_valuator(&mut self, valuator: Address) {
        self.ownable.require_owner();
        self.valuator.set(valuator);
    }

    /// Adjust the per-user cooldown (owner only)
    pub fn set_rate_limit_ms(&mut self, rate_limit_ms: u64) {
        self.ownable.require_owner();
        self.rate_limit_ms.set(rate_limit_ms);
    }

    /// Retune the target ratio of a target-ratio engine (owner only)
    pub fn set_release_target(&mut self, target_cr: u32, cr_normalizer: u32) {
        self.ownable.require_owner();
        let mut config = match self.release.get() {
            Some(config) if config.policy == ReleasePolicy::TargetRatio => config,
            _ => self.env().revert(LoanError::InvalidConfig),
        };
        if cr_normalizer == 0 || target_cr < cr_normalizer {
            self.env().revert(LoanError::InvalidConfig);
        }
        config.target_cr = target_cr;
        config.cr_normalizer = cr_normalizer;
        self.release.set(config);
    }

    /// Sweep a foreign token accidentally sent to the engine (owner only).
    /// The custody asset itself can never be moved this way.
    pub fn claim_tokens(&mut self, token: Address, to: Address) {
        self.ownable.require_owner();
        if Some(token) == self.pool.get() {
            self.env().revert(LoanError::CannotMoveCustodyAsset);
        }
        let balance = TokenClient::balance_of(&self.env(), token, self.env().self_address());
        if !balance.is_zero() {
            TokenClient::transfer(&self.env(), token, to, balance);
        }
    }

    // ========== Ownership ==========

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.ownable.transfer_ownership(new_owner);
    }

    pub fn accept_ownership(&mut self) {
        self.ownable.accept_ownership();
    }

    // ========== Internal ==========

    fn release_amount(&self, position: &Position, repay_amount: U256, value_per_share: U256) -> U256 {
        let remaining_debt = position.debt - repay_amount;
        if remaining_debt.is_zero() {
            return position.locked_shares;
        }

        let config = match self.release.get() {
            Some(config) => config,
            None => self.env().revert(LoanError::InvalidConfig),
        };
        match config.policy {
            ReleasePolicy::Proportional => {
                position.locked_shares * repay_amount / position.debt
            }
            ReleasePolicy::TargetRatio => {
                let required_value = remaining_debt * U256::from(config.target_cr)
                    / U256::from(config.cr_normalizer);
                let required_shares = div_base(required_value, value_per_share);
                position.locked_shares.saturating_sub(required_shares)
            }
        }
    }

    fn require_cooldown_elapsed(&self, position: &Position) {
        let window = self.rate_limit_ms.get().unwrap_or(0);
        let now = self.env().get_block_time();
        if now.saturating_sub(position.last_action_time) < window {
            self.env().revert(LoanError::RateLimited);
        }
    }

    fn enter(&mut self) {
        if self.entered.get().unwrap_or(false) {
            self.env().revert(LoanError::Reentrancy);
        }
        self.entered.set(true);
    }

    fn exit(&mut self) {
        self.entered.set(false);
    }

    fn pool_address(&self) -> Address {
        match self.pool.get() {
            Some(pool) => pool,
            None => self.env().revert(LoanError::InvalidConfig),
        }
    }

    fn oracle_address(&self) -> Address {
        match self.oracle.get() {
            Some(oracle) => oracle,
            None => self.env().revert(LoanError::InvalidConfig),
        }
    }

    fn valuator_address(&self) -> Address {
        match self.valuator.get() {
            Some(valuator) => valuator,
            None => self.env().revert(LoanError::InvalidConfig),
        }
    }

    fn ledger_address(&self) -> Address {
        match self.ledger.get() {
            Some(ledger) => ledger,
            None => self.env().revert(LoanError::InvalidConfig),
        }
    }
}
