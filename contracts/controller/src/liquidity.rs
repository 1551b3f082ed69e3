use fixed_point::{mul_exp, mul_scalar_truncate_add};
use ledger_interface::{AccountSnapshot, ControllerError};
use soroban_sdk::{Address, Env};

use crate::helpers::{fetch_account_snapshot, math, price_of};
use crate::storage::{read_assets_in, read_market_config};

/// A hypothetical redeem or borrow applied to one market.
pub(crate) struct Adjustment<'a> {
    pub market: &'a Address,
    pub redeem_tokens: u128,
    pub borrow_amount: u128,
}

/// Account state for the market currently invoking the controller, which
/// cannot be called back.
pub(crate) struct Hint<'a> {
    pub market: &'a Address,
    pub account: &'a AccountSnapshot,
}

/// Returns `(liquidity, shortfall)`, at most one of them nonzero.
///
/// Collateral counts `cf * exchange_rate * price` per token across every
/// entered market; borrows count at `price`.
pub(crate) fn account_liquidity(
    env: &Env,
    account: &Address,
    adjustment: Option<Adjustment>,
    hint: Option<Hint>,
) -> Result<(u128, u128), ControllerError> {
    let mut sum_collateral = 0u128;
    let mut sum_borrow_plus_effects = 0u128;

    for asset in read_assets_in(env, account).iter() {
        let snapshot = match &hint {
            Some(hint) if *hint.market == asset => hint.account.clone(),
            _ => fetch_account_snapshot(env, &asset, account)?,
        };
        let collateral_factor = read_market_config(env, &asset)
            .map(|config| config.collateral_factor)
            .unwrap_or(0);
        let price = price_of(env, &asset)?;
        let tokens_to_denom = math(
            mul_exp(collateral_factor, snapshot.exchange_rate).and_then(|v| mul_exp(v, price)),
        )?;

        sum_collateral = math(mul_scalar_truncate_add(
            tokens_to_denom,
            snapshot.tokens,
            sum_collateral,
        ))?;
        sum_borrow_plus_effects = math(mul_scalar_truncate_add(
            price,
            snapshot.borrow_balance,
            sum_borrow_plus_effects,
        ))?;

        if let Some(adjustment) = &adjustment {
            if *adjustment.market == asset {
                sum_borrow_plus_effects = math(mul_scalar_truncate_add(
                    tokens_to_denom,
                    adjustment.redeem_tokens,
                    sum_borrow_plus_effects,
                ))?;
                sum_borrow_plus_effects = math(mul_scalar_truncate_add(
                    price,
                    adjustment.borrow_amount,
                    sum_borrow_plus_effects,
                ))?;
            }
        }
    }

    if sum_collateral > sum_borrow_plus_effects {
        Ok((sum_collateral - sum_borrow_plus_effects, 0))
    } else {
        Ok((0, sum_borrow_plus_effects - sum_collateral))
    }
}
