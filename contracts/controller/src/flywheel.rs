//! Reward index bookkeeping.
//!
//! Each listed market carries two independent reward indices, one keyed by
//! market token balances and one keyed by borrow principal normalized by the
//! market's borrow index. An index only grows while its market is in the
//! reward set with a nonzero speed; otherwise the block still advances so a
//! later speed change never pays for the idle stretch.

use fixed_point::{add, div_exp, fraction, mul, mul_double, sub};
use ledger_interface::{ControllerError, RewardSide};
use soroban_sdk::{Address, Env};

use crate::events::{DistributedBorrowerReward, DistributedSupplierReward};
use crate::helpers::math;
use crate::storage::*;

fn read_listed_state(
    env: &Env,
    side: RewardSide,
    market: &Address,
) -> Result<RewardMarketState, ControllerError> {
    read_state(env, side, market).ok_or(ControllerError::MarketNotListed)
}

fn update_index(
    env: &Env,
    side: RewardSide,
    market: &Address,
    total_units: u128,
) -> Result<RewardMarketState, ControllerError> {
    let mut state = read_listed_state(env, side, market)?;
    let current_block = env.ledger().sequence();
    if current_block == state.block {
        return Ok(state);
    }
    let delta_blocks = math(sub(current_block as u128, state.block as u128))?;
    let speed = read_speed(env, side, market);
    let eligible = read_market_config(env, market)
        .map(|config| config.is_reward_market)
        .unwrap_or(false);
    if eligible && speed > 0 {
        let accrued = math(mul(speed, delta_blocks))?;
        let ratio = if total_units > 0 {
            math(fraction(accrued, total_units))?
        } else {
            0
        };
        state.index = math(add(state.index, ratio))?;
    }
    state.block = current_block;
    write_state(env, side, market, &state);
    Ok(state)
}

pub(crate) fn update_supply_index(
    env: &Env,
    market: &Address,
    total_supply: u128,
) -> Result<RewardMarketState, ControllerError> {
    update_index(env, RewardSide::Supply, market, total_supply)
}

/// `total_borrows` is divided by `borrow_index` so the index tracks principal.
pub(crate) fn update_borrow_index(
    env: &Env,
    market: &Address,
    total_borrows: u128,
    borrow_index: u128,
) -> Result<RewardMarketState, ControllerError> {
    let total_units = math(div_exp(total_borrows, borrow_index))?;
    update_index(env, RewardSide::Borrow, market, total_units)
}

/// Credits `account` for the index movement since its checkpoint. An account
/// without a checkpoint is primed at the current index and earns nothing.
fn distribute(
    env: &Env,
    side: RewardSide,
    market: &Address,
    account: &Address,
    account_units: u128,
) -> Result<(u128, u128), ControllerError> {
    let market_index = read_listed_state(env, side, market)?.index;
    let delta = match read_checkpoint(env, side, market, account) {
        Some(checkpoint) => {
            let delta_index = math(sub(market_index, checkpoint))?;
            math(mul_double(account_units, delta_index))?
        }
        None => 0,
    };
    write_checkpoint(env, side, market, account, market_index);
    if delta > 0 {
        let accrued = math(add(read_accrued(env, account), delta))?;
        write_accrued(env, account, accrued);
    }
    Ok((delta, market_index))
}

pub(crate) fn distribute_supplier_reward(
    env: &Env,
    market: &Address,
    supplier: &Address,
    supplier_tokens: u128,
) -> Result<u128, ControllerError> {
    let (delta, supply_index) =
        distribute(env, RewardSide::Supply, market, supplier, supplier_tokens)?;
    DistributedSupplierReward {
        market: market.clone(),
        supplier: supplier.clone(),
        delta,
        supply_index,
    }
    .publish(env);
    Ok(delta)
}

pub(crate) fn distribute_borrower_reward(
    env: &Env,
    market: &Address,
    borrower: &Address,
    borrow_balance: u128,
    borrow_index: u128,
) -> Result<u128, ControllerError> {
    let principal = math(div_exp(borrow_balance, borrow_index))?;
    let (delta, index) = distribute(env, RewardSide::Borrow, market, borrower, principal)?;
    DistributedBorrowerReward {
        market: market.clone(),
        borrower: borrower.clone(),
        delta,
        borrow_index: index,
    }
    .publish(env);
    Ok(delta)
}

/// Settles a contributor stream up to the current block.
pub(crate) fn update_contributor_rewards(env: &Env, contributor: &Address) -> Result<(), ControllerError> {
    let speed = read_u128(env, &DataKey::ContributorSpeed(contributor.clone()));
    let current_block = env.ledger().sequence();
    let last_block: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::ContributorBlock(contributor.clone()))
        .unwrap_or(current_block);
    let delta_blocks = math(sub(current_block as u128, last_block as u128))?;
    if delta_blocks > 0 && speed > 0 {
        let earned = math(mul(speed, delta_blocks))?;
        let accrued = math(add(read_accrued(env, contributor), earned))?;
        write_accrued(env, contributor, accrued);
        env.storage()
            .persistent()
            .set(&DataKey::ContributorBlock(contributor.clone()), &current_block);
    }
    Ok(())
}
