use fixed_point::MathResult;
use ledger_interface::{AccountSnapshot, ControllerError, MarketSnapshot};
use soroban_sdk::{log, Address, ConversionError, Env, InvokeError, Symbol};

use crate::accrual;
use crate::errors::MarketError;
use crate::storage::*;

/// Result shape of a `try_` call into a controller hook.
pub(crate) type HookOutcome<T> = Result<Result<T, ConversionError>, Result<ControllerError, InvokeError>>;

pub(crate) fn math<T>(result: MathResult<T>) -> Result<T, MarketError> {
    result.map_err(|_| MarketError::MathError)
}

pub(crate) fn to_i128(amount: u128) -> Result<i128, MarketError> {
    i128::try_from(amount).map_err(|_| MarketError::MathError)
}

/// Maps a controller answer onto the market's error space, keeping the
/// controller's own code in the diagnostic log.
pub(crate) fn check_hook<T>(env: &Env, hook: &str, outcome: HookOutcome<T>) -> Result<T, MarketError> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Err(Ok(code)) => {
            log!(env, "controller rejected", Symbol::new(env, hook), code as u32);
            Err(MarketError::ControllerRejection)
        }
        _ => {
            log!(env, "controller call failed", Symbol::new(env, hook));
            Err(MarketError::ControllerRejection)
        }
    }
}

pub(crate) fn ensure_fresh(env: &Env, ledger: &MarketLedger) -> Result<(), MarketError> {
    if ledger.accrual_block != env.ledger().sequence() {
        return Err(MarketError::StaleLedger);
    }
    Ok(())
}

pub(crate) fn exchange_rate_of(env: &Env, ledger: &MarketLedger) -> Result<u128, MarketError> {
    accrual::exchange_rate(ledger, total_supply(env), read_initial_exchange_rate(env)?)
}

pub(crate) fn market_snapshot_of(env: &Env, ledger: &MarketLedger) -> Result<MarketSnapshot, MarketError> {
    Ok(MarketSnapshot {
        total_supply: total_supply(env),
        total_borrows: ledger.total_borrows,
        borrow_index: ledger.borrow_index,
        exchange_rate: exchange_rate_of(env, ledger)?,
        reserve_factor: ledger.reserve_factor,
    })
}

pub(crate) fn account_snapshot_of(
    env: &Env,
    ledger: &MarketLedger,
    account: &Address,
    exchange_rate: u128,
) -> Result<AccountSnapshot, MarketError> {
    let snapshot = read_borrow_snapshot(env, account);
    Ok(AccountSnapshot {
        tokens: token_balance(env, account),
        borrow_balance: accrual::borrow_balance(&snapshot, ledger.borrow_index)?,
        exchange_rate,
    })
}
