//! pUSD Stablecoin Ledger
//!
//! CEP-18 compatible stablecoin. Only the valuator registry can mint and
//! burn; collateral engines reach the ledger exclusively through it. Loan
//! fees are withheld at mint time and accrue in `stored_fee` until anyone
//! triggers a three-way distribution to the staking pool, the SAFU reserve
//! and the dev fund.

use odra::prelude::*;
use odra::casper_types::account::AccountHash;
use odra::casper_types::bytesrepr::ToBytes;
use odra::casper_types::{Key, U256};
use crate::errors::LoanError;
use crate::interfaces::TokenClient;
use crate::ownable::Ownable2Step;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

const TOKEN_NAME: &str = "Pool Dollar";
const TOKEN_SYMBOL: &str = "pUSD";
const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";

/// pUSD Stablecoin Ledger
#[odra::module]
pub struct PoolUsd {
    /// Ownership handoff state
    ownable: SubModule<Ownable2Step>,
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Decimals (18 for pUSD)
    decimals: Var<u8>,
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner -> spender -> amount)
    allowances: Mapping<(Address, Address), U256>,
    /// The only address allowed to mint and burn
    valuator: Var<Address>,
    /// Outstanding gross loan per (borrower, engine)
    loans: Mapping<(Address, Address), U256>,
    /// Fees withheld at mint time, pending distribution
    stored_fee: Var<U256>,
    /// Staking pool fee recipient
    stake_addr: Var<Address>,
    /// SAFU reserve fee recipient
    safu_addr: Var<Address>,
    /// Dev fund fee recipient
    dev_fund_addr: Var<Address>,
    /// Staking pool's percent of the accrued fee
    stake_share_pct: Var<u8>,
    /// SAFU's percent of what remains after the staking cut
    safu_share_pct: Var<u8>,
}

#[odra::module]
impl PoolUsd {
    /// Initialize the ledger.
    ///
    /// `stake_share_pct` is taken off the accrued fee first;
    /// `safu_share_pct` off the remainder; the dev fund gets the rest.
    pub fn init(
        &mut self,
        valuator: Address,
        stake_addr: Address,
        safu_addr: Address,
        dev_fund_addr: Address,
        stake_share_pct: u8,
        safu_share_pct: u8,
    ) {
        if stake_share_pct > 100 || safu_share_pct > 100 {
            self.env().revert(LoanError::ShareTooLarge);
        }

        let deployer = self.env().caller();
        self.ownable.init(deployer);
        self.name.set(String::from(TOKEN_NAME));
        self.symbol.set(String::from(TOKEN_SYMBOL));
        self.decimals.set(18);
        self.total_supply.set(U256::zero());
        self.valuator.set(valuator);
        self.stored_fee.set(U256::zero());
        self.stake_addr.set(stake_addr);
        self.safu_addr.set(safu_addr);
        self.dev_fund_addr.set(dev_fund_addr);
        self.stake_share_pct.set(stake_share_pct);
        self.safu_share_pct.set(safu_share_pct);
        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, String::from(TOKEN_NAME));
        self.env().set_named_value(CEP18_SYMBOL_KEY, String::from(TOKEN_SYMBOL));
        self.env().set_named_value(CEP18_DECIMALS_KEY, 18u8);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
    }

    // ========== CEP-18 Standard Functions ==========

    /// Get token name
    pub fn name(&self) -> String {
        self.name.get().unwrap_or_else(|| String::from(TOKEN_NAME))
    }

    /// Get token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_else(|| String::from(TOKEN_SYMBOL))
    }

    /// Get decimals
    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(18)
    }

    /// Get total supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    /// Get balance of an account
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    /// Get allowance for spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer tokens to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to spend tokens
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(LoanError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    /// Raise the caller's allowance for spender
    pub fn increase_allowance(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        let current = self.allowance(owner, spender);
        self.approve_internal(owner, spender, current + amount);
        true
    }

    /// Lower the caller's allowance for spender, flooring at zero
    pub fn decrease_allowance(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        let current = self.allowance(owner, spender);
        let new_allowance = current.saturating_sub(amount);
        self.approve_internal(owner, spender, new_allowance);
        true
    }

    // ========== Protocol Functions (Valuator Only) ==========

    /// Mint a new loan. The borrower receives `loan_amount - fee_amount`;
    /// the fee accrues in `stored_fee` and the gross amount is recorded
    /// against `(to, engine)`.
    pub fn mint(&mut self, to: Address, loan_amount: U256, fee_amount: U256, engine: Address) {
        self.require_valuator();
        if to == Self::null_address() {
            self.env().revert(LoanError::MintToZeroAddress);
        }
        if fee_amount > loan_amount {
            self.env().revert(LoanError::InvalidConfig);
        }

        let outstanding = self.loans.get(&(to, engine)).unwrap_or(U256::zero());
        self.loans.set(&(to, engine), outstanding + loan_amount);

        let fee = self.stored_fee.get().unwrap_or(U256::zero());
        self.stored_fee.set(fee + fee_amount);

        self.mint_internal(to, loan_amount - fee_amount);
    }

    /// Burn a repayment and reduce the borrower's recorded loan
    pub fn burn(&mut self, from: Address, amount: U256, engine: Address) {
        self.require_valuator();
        if from == Self::null_address() {
            self.env().revert(LoanError::BurnFromZeroAddress);
        }

        let outstanding = self.loans.get(&(from, engine)).unwrap_or(U256::zero());
        if outstanding < amount {
            self.env().revert(LoanError::InsufficientDebt);
        }
        self.loans.set(&(from, engine), outstanding - amount);

        self.burn_internal(from, amount);
    }

    // ========== Fee Distribution ==========

    /// Mint the accrued fees out to the three recipients. Permissionless;
    /// the split is fixed by configuration, so anyone may crank it.
    pub fn distribute_fee(&mut self) {
        let fee = self.stored_fee.get().unwrap_or(U256::zero());
        if fee.is_zero() {
            self.env().revert(LoanError::NothingToDistribute);
        }

        let stake_pct = U256::from(self.stake_share_pct.get().unwrap_or(0));
        let safu_pct = U256::from(self.safu_share_pct.get().unwrap_or(0));

        let staking_cut = fee * stake_pct / U256::from(100u8);
        let safu_cut = (fee - staking_cut) * safu_pct / U256::from(100u8);
        let dev_cut = fee - staking_cut - safu_cut;

        self.stored_fee.set(U256::zero());

        if !staking_cut.is_zero() {
            self.mint_internal(self.required_addr(&self.stake_addr), staking_cut);
        }
        if !safu_cut.is_zero() {
            self.mint_internal(self.required_addr(&self.safu_addr), safu_cut);
        }
        if !dev_cut.is_zero() {
            self.mint_internal(self.required_addr(&self.dev_fund_addr), dev_cut);
        }
    }

    // ========== Queries ==========

    /// Outstanding gross loan recorded for `(user, engine)`
    pub fn check_loan(&self, user: Address, engine: Address) -> U256 {
        self.loans.get(&(user, engine)).unwrap_or(U256::zero())
    }

    /// Fees accrued and not yet distributed
    pub fn stored_fee(&self) -> U256 {
        self.stored_fee.get().unwrap_or(U256::zero())
    }

    pub fn get_valuator(&self) -> Option<Address> {
        self.valuator.get()
    }

    pub fn get_stake_addr(&self) -> Option<Address> {
        self.stake_addr.get()
    }

    pub fn get_safu_addr(&self) -> Option<Address> {
        self.safu_addr.get()
    }

    pub fn get_dev_fund_addr(&self) -> Option<Address> {
        self.dev_fund_addr.get()
    }

    pub fn get_shares(&self) -> (u8, u8) {
        (
            self.stake_share_pct.get().unwrap_or(0),
            self.safu_share_pct.get().unwrap_or(0),
        )
    }

    pub fn get_owner(&self) -> Option<Address> {
        self.ownable.owner()
    }

    // ========== Admin Functions ==========

    /// Swap the valuator (owner only)
    pub fn change_valuator(&mut self, valuator: Address) {
        self.ownable.require_owner();
        self.valuator.set(valuator);
    }

    /// Re-point the staking pool fee recipient (owner only)
    pub fn change_staking(&mut self, stake_addr: Address) {
        self.ownable.require_owner();
        self.stake_addr.set(stake_addr);
    }

    /// Re-point the SAFU fee recipient (owner only)
    pub fn change_safu_fund(&mut self, safu_addr: Address) {
        self.ownable.require_owner();
        self.safu_addr.set(safu_addr);
    }

    /// Re-point the dev fund fee recipient (owner only)
    pub fn change_dev_fund(&mut self, dev_fund_addr: Address) {
        self.ownable.require_owner();
        self.dev_fund_addr.set(dev_fund_addr);
    }

    /// Retune the staking pool's cut of the fee (owner only)
    pub fn change_stake_share(&mut self, stake_share_pct: u8) {
        self.ownable.require_owner();
        if stake_share_pct > 100 {
            self.env().revert(LoanError::ShareTooLarge);
        }
        self.stake_share_pct.set(stake_share_pct);
    }

    /// Retune SAFU's cut of the post-staking remainder (owner only)
    pub fn change_safu_share(&mut self, safu_share_pct: u8) {
        self.ownable.require_owner();
        if safu_share_pct > 100 {
            self.env().revert(LoanError::ShareTooLarge);
        }
        self.safu_share_pct.set(safu_share_pct);
    }

    /// Sweep a foreign token accidentally sent to the ledger (owner only)
    pub fn claim_tokens(&mut self, token: Address, to: Address) {
        self.ownable.require_owner();
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

    // ========== Internal Functions ==========

    fn mint_internal(&mut self, to: Address, amount: U256) {
        let current_balance = self.balance_of(to);
        let new_balance = current_balance + amount;
        self.balances.set(&to, new_balance);
        self.set_balance_cep18(to, new_balance);

        let new_supply = self.total_supply() + amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
    }

    fn burn_internal(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(LoanError::InsufficientTokenBalance);
        }

        let new_balance = current_balance - amount;
        self.balances.set(&from, new_balance);
        self.set_balance_cep18(from, new_balance);

        let new_supply = self.total_supply() - amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(LoanError::InsufficientTokenBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let new_to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.set_allowance_cep18(owner, spender, amount);
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = Self::cep18_balance_key(owner);
        self.env().set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn set_allowance_cep18(&self, owner: Address, spender: Address, amount: U256) {
        let key = Self::cep18_allowance_key(owner, spender);
        self.env().set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }

    fn set_total_supply_cep18(&self, amount: U256) {
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, amount);
    }

    fn cep18_balance_key(owner: Address) -> String {
        let key = Key::from(owner);
        let bytes = key.to_bytes().unwrap_or_default();
        BASE64_STANDARD.encode(bytes)
    }

    fn cep18_allowance_key(owner: Address, spender: Address) -> String {
        let owner_key = Key::from(owner);
        let spender_key = Key::from(spender);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&owner_key.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&spender_key.to_bytes().unwrap_or_default());
        BASE64_STANDARD.encode(bytes)
    }

    fn require_valuator(&self) {
        let caller = self.env().caller();
        if self.valuator.get() != Some(caller) {
            self.env().revert(LoanError::NotValuator);
        }
    }

    fn required_addr(&self, var: &Var<Address>) -> Address {
        match var.get() {
            Some(addr) => addr,
            None => self.env().revert(LoanError::InvalidConfig),
        }
    }

    fn null_address() -> Address {
        Address::Account(AccountHash::default())
    }
}
