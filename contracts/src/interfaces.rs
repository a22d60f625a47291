//! Cross-contract call surface for the protocol's collaborators.
//!
//! The reserve pool and the price feeds are external contracts, specified
//! only by the entry points the core consumes. Calls go through `CallDef`
//! so the same helpers work against the mocks in tests and against real
//! deployments.

use odra::prelude::*;
use odra::casper_types::{runtime_args, RuntimeArgs, U256};
use odra::{CallDef, ContractEnv};

/// Constant-product reserve pool: reserve queries plus the standard
/// fungible surface of its share token.
pub struct ReservePoolClient;

impl ReservePoolClient {
    /// Current reserves of both legs, in each asset's native decimals
    pub fn reserves(env: &ContractEnv, pool: Address) -> (U256, U256) {
        env.call_contract(pool, CallDef::new("reserves", false, RuntimeArgs::new()))
    }

    /// Total outstanding pool shares (18 decimals)
    pub fn total_shares(env: &ContractEnv, pool: Address) -> U256 {
        env.call_contract(pool, CallDef::new("total_shares", false, RuntimeArgs::new()))
    }

    pub fn balance_of(env: &ContractEnv, pool: Address, account: Address) -> U256 {
        let args = runtime_args! {
            "account" => account
        };
        env.call_contract(pool, CallDef::new("balance_of", false, args))
    }

    pub fn allowance(env: &ContractEnv, pool: Address, owner: Address, spender: Address) -> U256 {
        let args = runtime_args! {
            "owner" => owner,
            "spender" => spender
        };
        env.call_contract(pool, CallDef::new("allowance", false, args))
    }

    pub fn transfer(env: &ContractEnv, pool: Address, recipient: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "recipient" => recipient,
            "amount" => amount
        };
        env.call_contract(pool, CallDef::new("transfer", true, args))
    }

    pub fn transfer_from(
        env: &ContractEnv,
        pool: Address,
        owner: Address,
        recipient: Address,
        amount: U256,
    ) -> bool {
        let args = runtime_args! {
            "owner" => owner,
            "recipient" => recipient,
            "amount" => amount
        };
        env.call_contract(pool, CallDef::new("transfer_from", true, args))
    }
}

/// External reference price feed
pub struct PriceFeedClient;

impl PriceFeedClient {
    /// Last known price and its decimal precision
    pub fn latest_price(env: &ContractEnv, feed: Address) -> (U256, u8) {
        env.call_contract(feed, CallDef::new("latest_price", false, RuntimeArgs::new()))
    }
}

/// Stablecoin ledger, as seen by the registry and the engines
pub struct LedgerClient;

impl LedgerClient {
    pub fn mint(
        env: &ContractEnv,
        ledger: Address,
        to: Address,
        loan_amount: U256,
        fee_amount: U256,
        engine: Address,
    ) {
        let args = runtime_args! {
            "to" => to,
            "loan_amount" => loan_amount,
            "fee_amount" => fee_amount,
            "engine" => engine
        };
        env.call_contract::<()>(ledger, CallDef::new("mint", true, args));
    }

    pub fn burn(env: &ContractEnv, ledger: Address, from: Address, amount: U256, engine: Address) {
        let args = runtime_args! {
            "from" => from,
            "amount" => amount,
            "engine" => engine
        };
        env.call_contract::<()>(ledger, CallDef::new("burn", true, args));
    }

    pub fn balance_of(env: &ContractEnv, ledger: Address, account: Address) -> U256 {
        let args = runtime_args! {
            "account" => account
        };
        env.call_contract(ledger, CallDef::new("balance_of", false, args))
    }
}

/// Valuation registry, as seen by the engines
pub struct ValuatorClient;

impl ValuatorClient {
    pub fn get_engine_terms(env: &ContractEnv, valuator: Address, engine: Address) -> (u32, u32, bool) {
        let args = runtime_args! {
            "engine" => engine
        };
        env.call_contract(valuator, CallDef::new("get_engine_terms", false, args))
    }

    pub fn mint_for(env: &ContractEnv, valuator: Address, to: Address, loan_amount: U256, fee_amount: U256) {
        let args = runtime_args! {
            "to" => to,
            "loan_amount" => loan_amount,
            "fee_amount" => fee_amount
        };
        env.call_contract::<()>(valuator, CallDef::new("mint_for", true, args));
    }

    pub fn burn_for(env: &ContractEnv, valuator: Address, from: Address, amount: U256) {
        let args = runtime_args! {
            "from" => from,
            "amount" => amount
        };
        env.call_contract::<()>(valuator, CallDef::new("burn_for", true, args));
    }
}

/// Share price oracle, as seen by the engines
pub struct OracleClient;

impl OracleClient {
    /// Checked valuation: depeg check, valuation, manipulation check
    pub fn valuate(env: &ContractEnv, oracle: Address) -> U256 {
        env.call_contract(oracle, CallDef::new("valuate", false, RuntimeArgs::new()))
    }
}

/// Generic fungible token surface, used by the sweep entry points
pub struct TokenClient;

impl TokenClient {
    pub fn balance_of(env: &ContractEnv, token: Address, account: Address) -> U256 {
        let args = runtime_args! {
            "account" => account
        };
        env.call_contract(token, CallDef::new("balance_of", false, args))
    }

    pub fn transfer(env: &ContractEnv, token: Address, recipient: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "recipient" => recipient,
            "amount" => amount
        };
        env.call_contract(token, CallDef::new("transfer", true, args))
    }
}
