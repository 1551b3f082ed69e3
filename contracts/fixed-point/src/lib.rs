#![no_std]
//! Mantissa arithmetic shared by the market and controller contracts.
//!
//! Values are plain `u128` mantissas: `Exp` values are scaled by 1e18 and
//! `Double` values by 1e36. Every product is formed in 256 bits and narrowed
//! back with an explicit overflow check, so nothing here saturates or wraps.

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

pub const EXP_SCALE: u128 = 1_000_000_000_000_000_000u128; // 1e18
pub const DOUBLE_SCALE: u128 = EXP_SCALE * EXP_SCALE; // 1e36

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MathError {
    Overflow,
    Underflow,
    DivisionByZero,
}

pub type MathResult<T> = Result<T, MathError>;

pub fn add(a: u128, b: u128) -> MathResult<u128> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

pub fn sub(a: u128, b: u128) -> MathResult<u128> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

pub fn mul(a: u128, b: u128) -> MathResult<u128> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

/// `a * b / denominator`, truncated, with a 256-bit intermediate.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> MathResult<u128> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(MathError::Overflow)?;
    narrow(product / U256::from(denominator))
}

/// Converts a 256-bit intermediate back to `u128`.
pub fn narrow(value: U256) -> MathResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}

/// `exp * scalar / 1e18`: an Exp applied to an amount.
pub fn mul_scalar_truncate(exp: u128, scalar: u128) -> MathResult<u128> {
    mul_div(exp, scalar, EXP_SCALE)
}

pub fn mul_scalar_truncate_add(exp: u128, scalar: u128, addend: u128) -> MathResult<u128> {
    add(mul_scalar_truncate(exp, scalar)?, addend)
}

/// `a * b / 1e18` for two Exp mantissas.
pub fn mul_exp(a: u128, b: u128) -> MathResult<u128> {
    mul_div(a, b, EXP_SCALE)
}

/// `a * 1e18 / b`. Used both for Exp / Exp and for amount / Exp.
pub fn div_exp(a: u128, b: u128) -> MathResult<u128> {
    mul_div(a, EXP_SCALE, b)
}

/// `a * 1e36 / b`: the Double ratio of two amounts.
pub fn fraction(a: u128, b: u128) -> MathResult<u128> {
    mul_div(a, DOUBLE_SCALE, b)
}

/// `amount * double / 1e36`.
pub fn mul_double(amount: u128, double: u128) -> MathResult<u128> {
    mul_div(amount, double, DOUBLE_SCALE)
}
