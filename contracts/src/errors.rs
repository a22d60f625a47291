//! Error codes shared by every contract in the suite.

use odra::prelude::*;

/// LP-lock protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LoanError {
    // Engine errors (1xx)
    EnginePaused = 100,
    RateLimited = 101,
    InsufficientShareBalance = 102,
    InsufficientAllowance = 103,
    LoanTooSmall = 104,
    SlippageExceeded = 105,
    InsufficientDebt = 106,
    InsufficientFunds = 107,
    CannotMoveCustodyAsset = 108,
    ZeroAmount = 109,
    Reentrancy = 110,

    // Oracle errors (2xx)
    StablecoinDepegged = 200,
    PriceManipulationEvident = 201,
    EmptyPool = 202,
    FeedUnavailable = 203,

    // Registry errors (3xx)
    EngineNotAuthorized = 300,
    EngineInactive = 301,
    EngineAlreadyActive = 302,
    InvalidLoanRate = 303,
    InvalidFeeRate = 304,
    SelfReference = 305,
    TargetIsOwner = 306,

    // Ledger errors (4xx)
    NotValuator = 400,
    MintToZeroAddress = 401,
    BurnFromZeroAddress = 402,
    NothingToDistribute = 403,
    InsufficientTokenBalance = 404,
    ShareTooLarge = 405,

    // Ownership errors (5xx)
    NotOwner = 500,
    NotPendingOwner = 501,
    NoPendingOwner = 502,

    // Configuration errors (9xx)
    InvalidConfig = 900,
}

impl LoanError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Engine
            LoanError::EnginePaused => "Engine is paused",
            LoanError::RateLimited => "User must wait before the next action",
            LoanError::InsufficientShareBalance => "Insufficient pool share balance",
            LoanError::InsufficientAllowance => "Insufficient pool share allowance",
            LoanError::LoanTooSmall => "Loan too small to cover the fee",
            LoanError::SlippageExceeded => "Minting less tokens than minimum amount",
            LoanError::InsufficientDebt => "Insufficient debt to repay",
            LoanError::InsufficientFunds => "Insufficient stablecoin balance to repay",
            LoanError::CannotMoveCustodyAsset => "Cannot move locked pool shares",
            LoanError::ZeroAmount => "Amount must be non-zero",
            LoanError::Reentrancy => "Re-entrant call rejected",

            // Oracle
            LoanError::StablecoinDepegged => "Stable leg has lost its peg",
            LoanError::PriceManipulationEvident => "Reserve price diverges from feed anchor",
            LoanError::EmptyPool => "Pool has no reserves or shares",
            LoanError::FeedUnavailable => "Price feed returned no usable price",

            // Registry
            LoanError::EngineNotAuthorized => "Engine not authorized",
            LoanError::EngineInactive => "Engine is inactive",
            LoanError::EngineAlreadyActive => "Cannot activate an active engine",
            LoanError::InvalidLoanRate => "Invalid loan rate",
            LoanError::InvalidFeeRate => "Invalid fee rate",
            LoanError::SelfReference => "Engine cannot be this contract",
            LoanError::TargetIsOwner => "Engine cannot be the owner",

            // Ledger
            LoanError::NotValuator => "Call does not originate from the valuator",
            LoanError::MintToZeroAddress => "Mint to the zero address",
            LoanError::BurnFromZeroAddress => "Burn from the zero address",
            LoanError::NothingToDistribute => "There is nothing to distribute",
            LoanError::InsufficientTokenBalance => "Insufficient token balance",
            LoanError::ShareTooLarge => "Share percentage exceeds 100",

            // Ownership
            LoanError::NotOwner => "Caller is not the owner",
            LoanError::NotPendingOwner => "Caller is not the pending owner",
            LoanError::NoPendingOwner => "Ownership change was not initialized",

            // Config
            LoanError::InvalidConfig => "Invalid configuration parameter",
        }
    }
}

impl core::fmt::Display for LoanError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<LoanError> for OdraError {
    fn from(error: LoanError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
