//! Fixed-point helpers shared by the oracle and the collateral engine.
//!
//! All protocol math is integer fixed-point on `U256` with an internal
//! 18-decimal base. Token amounts arrive in their native decimals (observed
//! cases: 13, 18, 19) and are normalized before any multiplication or
//! division so that truncation bias cannot creep in.

use odra::casper_types::U256;

/// Internal fixed-point base (1e18)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Parts-per-million scale, used for loan/fee rates and the peg threshold
pub const PPM_SCALE: u32 = 1_000_000;

/// Basis-points scale, used for the manipulation tolerance
pub const BPS_SCALE: u32 = 10_000;

/// Scale an amount from `decimals` precision to the 18-decimal base.
///
/// Works in both directions: 13-decimal amounts are scaled up, 19-decimal
/// amounts are scaled down. Multiplication happens before the division so
/// sub-unit amounts survive the downscale.
pub fn normalize_to_base(value: U256, decimals: u8) -> U256 {
    let unit = U256::from(10u64).pow(U256::from(decimals));
    value * U256::from(SCALE) / unit
}

/// Scale an 18-decimal base amount back to `decimals` precision.
pub fn denormalize_from_base(value: U256, decimals: u8) -> U256 {
    let unit = U256::from(10u64).pow(U256::from(decimals));
    value * unit / U256::from(SCALE)
}

/// Apply a parts-per-million rate to a value.
pub fn apply_ppm(value: U256, rate_ppm: u32) -> U256 {
    value * U256::from(rate_ppm) / U256::from(PPM_SCALE)
}

/// Multiply two 18-decimal fixed-point numbers.
pub fn mul_base(a: U256, b: U256) -> U256 {
    a * b / U256::from(SCALE)
}

/// Divide two 18-decimal fixed-point numbers.
pub fn div_base(a: U256, b: U256) -> U256 {
    a * U256::from(SCALE) / b
}

/// Relative deviation of `value` from `reference`, in basis points.
///
/// Returns zero when there is no reference to compare against.
pub fn deviation_bps(value: U256, reference: U256) -> U256 {
    if reference.is_zero() {
        return U256::zero();
    }
    let diff = if value > reference {
        value - reference
    } else {
        reference - value
    };
    diff * U256::from(BPS_SCALE) / reference
}

/// Relative deviation of `value` from `reference`, in parts per million.
pub fn deviation_ppm(value: U256, reference: U256) -> U256 {
    if reference.is_zero() {
        return U256::zero();
    }
    let diff = if value > reference {
        value - reference
    } else {
        reference - value
    };
    diff * U256::from(PPM_SCALE) / reference
}
