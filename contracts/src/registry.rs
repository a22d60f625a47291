//! Engine authorization registry.
//!
//! The stablecoin ledger only trusts one address: this registry. Collateral
//! engines never talk to the ledger directly; they ask the registry to mint
//! or burn on their behalf, and the registry forwards the call only when the
//! calling engine is registered and still active. Per-engine loan and fee
//! rates live here too, so governance tunes terms in one place.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::errors::LoanError;
use crate::interfaces::LedgerClient;
use crate::math::PPM_SCALE;
use crate::ownable::Ownable2Step;
use crate::types::EngineTerms;

#[odra::module]
pub struct Valuator {
    /// Ownership handoff state
    ownable: SubModule<Ownable2Step>,
    /// The stablecoin ledger this registry fronts
    ledger: Var<Address>,
    /// Terms per registered engine. A record with `active == false` is a
    /// tombstone; the engine can never be re-enabled.
    engines: Mapping<Address, EngineTerms>,
}

#[odra::module]
impl Valuator {
    /// Deployed before the ledger exists; `set_ledger` wires the two
    /// together once both addresses are known.
    pub fn init(&mut self) {
        let deployer = self.env().caller();
        self.ownable.init(deployer);
    }

    /// Point the registry at its ledger (owner only)
    pub fn set_ledger(&mut self, ledger: Address) {
        self.ownable.require_owner();
        self.ledger.set(ledger);
    }

    // ========== Engine administration ==========

    /// Register a collateral engine with its loan and fee rates (owner only).
    ///
    /// Rates are in parts-per-million of, respectively, the collateral value
    /// and the loan amount, and must sit in `(0, 1_000_000]`.
    pub fn add_engine(&mut self, engine: Address, loan_rate_ppm: u32, fee_rate_ppm: u32) {
        self.ownable.require_owner();
        if engine == self.env().self_address() {
            self.env().revert(LoanError::SelfReference);
        }
        if self.ownable.is_owner(engine) {
            self.env().revert(LoanError::TargetIsOwner);
        }
        Self::validate_loan_rate(&self.env(), loan_rate_ppm);
        Self::validate_fee_rate(&self.env(), fee_rate_ppm);
        // A tombstoned record blocks re-registration too; disabling is final.
        if self.engines.get(&engine).is_some() {
            self.env().revert(LoanError::EngineAlreadyActive);
        }

        self.engines.set(
            &engine,
            EngineTerms {
                loan_rate_ppm,
                fee_rate_ppm,
                active: true,
            },
        );
    }

    /// Adjust an active engine's loan rate (owner only)
    pub fn change_loan_rate(&mut self, engine: Address, loan_rate_ppm: u32) {
        self.ownable.require_owner();
        Self::validate_loan_rate(&self.env(), loan_rate_ppm);
        let mut terms = self.active_terms(engine);
        terms.loan_rate_ppm = loan_rate_ppm;
        self.engines.set(&engine, terms);
    }

    /// Adjust an active engine's fee rate (owner only)
    pub fn change_fee_rate(&mut self, engine: Address, fee_rate_ppm: u32) {
        self.ownable.require_owner();
        Self::validate_fee_rate(&self.env(), fee_rate_ppm);
        let mut terms = self.active_terms(engine);
        terms.fee_rate_ppm = fee_rate_ppm;
        self.engines.set(&engine, terms);
    }

    /// Permanently revoke an engine (owner only). Rates are zeroed and the
    /// tombstone record keeps the address from ever being registered again.
    pub fn disable_llc(&mut self, engine: Address) {
        self.ownable.require_owner();
        self.active_terms(engine);
        self.engines.set(&engine, EngineTerms::disabled());
    }

    // ========== Engine-facing ledger access ==========

    /// Mint on behalf of the calling engine. `loan_amount` is the gross
    /// loan; `fee_amount` is withheld by the ledger for later distribution.
    pub fn mint_for(&mut self, to: Address, loan_amount: U256, fee_amount: U256) {
        let engine = self.require_active_caller();
        LedgerClient::mint(&self.env(), self.ledger_address(), to, loan_amount, fee_amount, engine);
    }

    /// Burn repaid debt on behalf of the calling engine
    pub fn burn_for(&mut self, from: Address, amount: U256) {
        let engine = self.require_active_caller();
        LedgerClient::burn(&self.env(), self.ledger_address(), from, amount, engine);
    }

    // ========== Queries ==========

    /// `(loan_rate_ppm, fee_rate_ppm, active)` for the given engine.
    /// Unregistered engines read as fully zeroed and inactive.
    pub fn get_engine_terms(&self, engine: Address) -> (u32, u32, bool) {
        let terms = self.engines.get(&engine).unwrap_or_else(EngineTerms::disabled);
        (terms.loan_rate_ppm, terms.fee_rate_ppm, terms.active)
    }

    pub fn is_engine_active(&self, engine: Address) -> bool {
        self.engines.get(&engine).map_or(false, |terms| terms.active)
    }

    pub fn get_ledger(&self) -> Option<Address> {
        self.ledger.get()
    }

    pub fn get_owner(&self) -> Option<Address> {
        self.ownable.owner()
    }

    // ========== Ownership ==========

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.ownable.transfer_ownership(new_owner);
    }

    pub fn accept_ownership(&mut self) {
        self.ownable.accept_ownership();
    }

    // ========== Internal ==========

    fn ledger_address(&self) -> Address {
        match self.ledger.get() {
            Some(ledger) => ledger,
            None => self.env().revert(LoanError::InvalidConfig),
        }
    }

    fn require_active_caller(&self) -> Address {
        let caller = self.env().caller();
        if !self.engines.get(&caller).map_or(false, |terms| terms.active) {
            self.env().revert(LoanError::EngineNotAuthorized);
        }
        caller
    }

    fn active_terms(&self, engine: Address) -> EngineTerms {
        match self.engines.get(&engine) {
            Some(terms) if terms.active => terms,
            _ => self.env().revert(LoanError::EngineInactive),
        }
    }

    fn validate_loan_rate(env: &ContractEnv, rate: u32) {
        if rate == 0 || rate > PPM_SCALE {
            env.revert(LoanError::InvalidLoanRate);
        }
    }

    fn validate_fee_rate(env: &ContractEnv, rate: u32) {
        if rate == 0 || rate > PPM_SCALE {
            env.revert(LoanError::InvalidFeeRate);
        }
    }
}
