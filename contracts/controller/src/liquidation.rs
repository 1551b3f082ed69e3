use fixed_point::{narrow, MathError, MathResult, U256};

/// Collateral tokens owed for `repay_amount` of the borrowed asset:
/// `repay * incentive * price_borrowed / price_collateral / exchange_rate`.
///
/// The product is formed in 256 bits with a checked multiply at each step and
/// divided in that order, so the result truncates exactly once per division.
pub fn seize_tokens(
    repay_amount: u128,
    liquidation_incentive: u128,
    price_borrowed: u128,
    price_collateral: u128,
    exchange_rate: u128,
) -> MathResult<u128> {
    if price_collateral == 0 || exchange_rate == 0 {
        return Err(MathError::DivisionByZero);
    }
    let numerator = U256::from(repay_amount)
        .checked_mul(U256::from(liquidation_incentive))
        .and_then(|v| v.checked_mul(U256::from(price_borrowed)))
        .ok_or(MathError::Overflow)?;
    let seize_usd_equivalent = numerator / U256::from(price_collateral);
    narrow(seize_usd_equivalent / U256::from(exchange_rate))
}
