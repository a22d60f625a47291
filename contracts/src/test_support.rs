//! Mock contracts for the host test environment.
//!
//! A minimal two-asset reserve pool with transferable shares, a price
//! feed with a settable answer, and a hostile pool variant that calls
//! back into an engine mid-transfer. All expose exactly the entry points
//! the oracle and engine call on their production counterparts.

use odra::prelude::*;
use odra::casper_types::{runtime_args, U256};
use odra::CallDef;

use crate::errors::LoanError;

/// Settable price feed
#[odra::module]
pub struct MockPriceFeed {
    price: Var<U256>,
    decimals: Var<u8>,
}

#[odra::module]
impl MockPriceFeed {
    pub fn init(&mut self, price: U256, decimals: u8) {
        self.price.set(price);
        self.decimals.set(decimals);
    }

    pub fn set_price(&mut self, price: U256) {
        self.price.set(price);
    }

    pub fn latest_price(&self) -> (U256, u8) {
        (
            self.price.get().unwrap_or(U256::zero()),
            self.decimals.get().unwrap_or(8),
        )
    }
}

/// Two-asset reserve pool with freely mintable, transferable shares
#[odra::module]
pub struct MockSharePool {
    asset0: Var<Address>,
    asset1: Var<Address>,
    reserve0: Var<U256>,
    reserve1: Var<U256>,
    supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl MockSharePool {
    pub fn init(&mut self, asset0: Address, asset1: Address) {
        self.asset0.set(asset0);
        self.asset1.set(asset1);
        self.reserve0.set(U256::zero());
        self.reserve1.set(U256::zero());
        self.supply.set(U256::zero());
    }

    pub fn set_reserves(&mut self, reserve0: U256, reserve1: U256) {
        self.reserve0.set(reserve0);
        self.reserve1.set(reserve1);
    }

    /// Hand shares to an account without touching reserves
    pub fn mint_shares(&mut self, to: Address, amount: U256) {
        let balance = self.balance_of(to);
        self.balances.set(&to, balance + amount);
        self.supply.set(self.total_shares() + amount);
    }

    pub fn reserves(&self) -> (U256, U256) {
        (
            self.reserve0.get().unwrap_or(U256::zero()),
            self.reserve1.get().unwrap_or(U256::zero()),
        )
    }

    pub fn total_shares(&self) -> U256 {
        self.supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(LoanError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), current_allowance - amount);
        self.transfer_internal(owner, recipient, amount);
        true
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(LoanError::InsufficientShareBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
    }
}

/// Misbehaving share pool. Once armed it calls back into the engine from
/// inside every custody transfer (`transfer_from` nests a `lock`,
/// `transfer` nests an `unlock`); it can also be told to refuse
/// transfers outright by returning `false`. The engine under attack must
/// reject the nested call or the refusal and roll the whole action back.
#[odra::module]
pub struct ReentrantSharePool {
    reserve0: Var<U256>,
    reserve1: Var<U256>,
    supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
    reentry_target: Var<Option<Address>>,
    refuse: Var<bool>,
}

#[odra::module]
impl ReentrantSharePool {
    pub fn init(&mut self) {
        self.reserve0.set(U256::zero());
        self.reserve1.set(U256::zero());
        self.supply.set(U256::zero());
        self.reentry_target.set(None);
        self.refuse.set(false);
    }

    /// Start re-entering `engine` on every custody transfer
    pub fn arm(&mut self, engine: Address) {
        self.reentry_target.set(Some(engine));
    }

    pub fn disarm(&mut self) {
        self.reentry_target.set(None);
    }

    /// Make every transfer return `false` without moving anything
    pub fn refuse_transfers(&mut self, refuse: bool) {
        self.refuse.set(refuse);
    }

    pub fn set_reserves(&mut self, reserve0: U256, reserve1: U256) {
        self.reserve0.set(reserve0);
        self.reserve1.set(reserve1);
    }

    pub fn mint_shares(&mut self, to: Address, amount: U256) {
        let balance = self.balance_of(to);
        self.balances.set(&to, balance + amount);
        self.supply.set(self.total_shares() + amount);
    }

    pub fn reserves(&self) -> (U256, U256) {
        (
            self.reserve0.get().unwrap_or(U256::zero()),
            self.reserve1.get().unwrap_or(U256::zero()),
        )
    }

    pub fn total_shares(&self) -> U256 {
        self.supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        if self.refuse.get().unwrap_or(false) {
            return false;
        }
        if let Some(engine) = self.reentry_target.get().flatten() {
            let args = runtime_args! {
                "repay_amount" => U256::one()
            };
            self.env()
                .call_contract::<()>(engine, CallDef::new("unlock", true, args));
        }
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        if self.refuse.get().unwrap_or(false) {
            return false;
        }
        if let Some(engine) = self.reentry_target.get().flatten() {
            let args = runtime_args! {
                "share_amount" => U256::one(),
                "min_loan" => U256::zero()
            };
            self.env()
                .call_contract::<()>(engine, CallDef::new("lock", true, args));
        }
        let spender = self.env().caller();
        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(LoanError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), current_allowance - amount);
        self.transfer_internal(owner, recipient, amount);
        true
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(LoanError::InsufficientShareBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
    }
}
