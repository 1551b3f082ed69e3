//! Interest accrual and the balance math that depends on the borrow index.
//!
//! Nothing in here touches storage: callers read the ledger, run these
//! functions and commit the result in one write.

use fixed_point::{add, div_exp, mul, mul_div, mul_scalar_truncate, mul_scalar_truncate_add, sub};

use crate::constants::MAX_BORROW_RATE_PER_BLOCK;
use crate::errors::MarketError;
use crate::storage::{BorrowSnapshot, MarketLedger};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccrualOutcome {
    pub ledger: MarketLedger,
    pub interest_accumulated: u128,
}

/// Advances `ledger` to `current_block` at `borrow_rate` per block.
///
/// Returns `None` when the ledger is already current. On any failure the
/// input ledger is left as it was; the caller has nothing to roll back.
pub fn accrue(
    ledger: &MarketLedger,
    borrow_rate: u128,
    current_block: u32,
) -> Result<Option<AccrualOutcome>, MarketError> {
    if current_block == ledger.accrual_block {
        return Ok(None);
    }
    if borrow_rate > MAX_BORROW_RATE_PER_BLOCK {
        return Err(MarketError::BorrowRateAbsurdlyHigh);
    }
    let delta_blocks = current_block
        .checked_sub(ledger.accrual_block)
        .ok_or(MarketError::BlockDeltaNegative)?;

    let simple_interest_factor = mul(borrow_rate, delta_blocks as u128)
        .map_err(|_| MarketError::AccrualSimpleInterestFactor)?;
    let interest_accumulated = mul_scalar_truncate(simple_interest_factor, ledger.total_borrows)
        .map_err(|_| MarketError::AccrualAccumulatedInterest)?;
    let total_borrows = add(interest_accumulated, ledger.total_borrows)
        .map_err(|_| MarketError::AccrualTotalBorrows)?;
    let total_reserves = mul_scalar_truncate_add(
        ledger.reserve_factor,
        interest_accumulated,
        ledger.total_reserves,
    )
    .map_err(|_| MarketError::AccrualTotalReserves)?;
    let borrow_index = mul_scalar_truncate_add(
        simple_interest_factor,
        ledger.borrow_index,
        ledger.borrow_index,
    )
    .map_err(|_| MarketError::AccrualBorrowIndex)?;

    Ok(Some(AccrualOutcome {
        ledger: MarketLedger {
            total_borrows,
            total_reserves,
            borrow_index,
            accrual_block: current_block,
            ..ledger.clone()
        },
        interest_accumulated,
    }))
}

/// `principal * borrow_index / interest_index`.
pub fn borrow_balance(snapshot: &BorrowSnapshot, borrow_index: u128) -> Result<u128, MarketError> {
    if snapshot.principal == 0 {
        return Ok(0);
    }
    mul_div(snapshot.principal, borrow_index, snapshot.interest_index)
        .map_err(|_| MarketError::BorrowBalanceCalculation)
}

/// `(cash + borrows - reserves) / supply`, or the initial rate for an empty market.
pub fn exchange_rate(
    ledger: &MarketLedger,
    total_supply: u128,
    initial_exchange_rate: u128,
) -> Result<u128, MarketError> {
    if total_supply == 0 {
        return Ok(initial_exchange_rate);
    }
    add(ledger.cash, ledger.total_borrows)
        .and_then(|v| sub(v, ledger.total_reserves))
        .and_then(|underlying| div_exp(underlying, total_supply))
        .map_err(|_| MarketError::ExchangeRateCalculation)
}
