use fixed_point::MathResult;
use ledger_interface::{AccountSnapshot, ControllerError, MarketClient, MarketSnapshot, PriceOracleClient};
use soroban_sdk::{log, Address, Env};

use crate::storage::read_oracle;

pub(crate) fn math<T>(result: MathResult<T>) -> Result<T, ControllerError> {
    result.map_err(|_| ControllerError::MathError)
}

pub(crate) fn to_i128(amount: u128) -> Result<i128, ControllerError> {
    i128::try_from(amount).map_err(|_| ControllerError::MathError)
}

/// Oracle price of `market`'s underlying. Zero or a failed call is a `PriceError`.
pub(crate) fn price_of(env: &Env, market: &Address) -> Result<u128, ControllerError> {
    let oracle = read_oracle(env)?;
    match PriceOracleClient::new(env, &oracle).try_get_underlying_price(market) {
        Ok(Ok(price)) if price > 0 => Ok(price),
        _ => {
            log!(env, "price unavailable", market.clone());
            Err(ControllerError::PriceError)
        }
    }
}

// Must not be used on the market that invoked the current hook.
pub(crate) fn fetch_market_snapshot(env: &Env, market: &Address) -> Result<MarketSnapshot, ControllerError> {
    match MarketClient::new(env, market).try_market_snapshot() {
        Ok(Ok(snapshot)) => Ok(snapshot),
        _ => Err(ControllerError::MarketSnapshotFailure),
    }
}

pub(crate) fn fetch_account_snapshot(
    env: &Env,
    market: &Address,
    account: &Address,
) -> Result<AccountSnapshot, ControllerError> {
    match MarketClient::new(env, market).try_get_account_snapshot(account) {
        Ok(Ok(snapshot)) => Ok(snapshot),
        _ => Err(ControllerError::MarketSnapshotFailure),
    }
}

pub(crate) fn fetch_exchange_rate(env: &Env, market: &Address) -> Result<u128, ControllerError> {
    match MarketClient::new(env, market).try_exchange_rate_stored() {
        Ok(Ok(rate)) => Ok(rate),
        _ => Err(ControllerError::MarketSnapshotFailure),
    }
}
