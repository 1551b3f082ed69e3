use fixed_point::{add, div_exp, mul_scalar_truncate};
use ledger_interface::{ControllerError, MarketSnapshot, RewardSide};
use soroban_sdk::{Address, Env, Vec};

use crate::events::{RewardMarketAdded, RewardMarketDropped, RewardSpeedUpdated};
use crate::flywheel::{update_borrow_index, update_supply_index};
use crate::helpers::{fetch_market_snapshot, math, price_of};
use crate::storage::*;

/// Brings both indices current at the speeds in force until now.
fn settle_indices(env: &Env, market: &Address, snapshot: &MarketSnapshot) -> Result<(), ControllerError> {
    update_supply_index(env, market, snapshot.total_supply)?;
    update_borrow_index(env, market, snapshot.total_borrows, snapshot.borrow_index)?;
    Ok(())
}

fn write_side_speed(env: &Env, market: &Address, side: RewardSide, new_speed: u128) {
    write_speed(env, side, market, new_speed);
    RewardSpeedUpdated {
        market: market.clone(),
        side,
        new_speed,
    }
    .publish(env);
}

pub(crate) fn join_reward_set(env: &Env, market: &Address, config: &mut MarketConfig) {
    if config.is_reward_market {
        return;
    }
    config.is_reward_market = true;
    write_market_config(env, market, config);
    let mut reward_markets = read_address_list(env, &DataKey::RewardMarkets);
    reward_markets.push_back(market.clone());
    write_address_list(env, &DataKey::RewardMarkets, &reward_markets);
    RewardMarketAdded {
        market: market.clone(),
    }
    .publish(env);
}

fn leave_reward_set(env: &Env, market: &Address, config: &mut MarketConfig) {
    if !config.is_reward_market {
        return;
    }
    config.is_reward_market = false;
    write_market_config(env, market, config);
    let mut reward_markets = read_address_list(env, &DataKey::RewardMarkets);
    if let Some(position) = reward_markets.first_index_of(market) {
        reward_markets.remove(position);
    }
    write_address_list(env, &DataKey::RewardMarkets, &reward_markets);
    RewardMarketDropped {
        market: market.clone(),
    }
    .publish(env);
}

/// Explicit speeds for one market. Zero on both sides takes the market out
/// of the reward set; its indices and checkpoints stay where they are.
pub(crate) fn set_reward_speeds_internal(
    env: &Env,
    market: &Address,
    supply_speed: u128,
    borrow_speed: u128,
) -> Result<(), ControllerError> {
    let mut config = listed_config(env, market)?;
    let snapshot = fetch_market_snapshot(env, market)?;
    settle_indices(env, market, &snapshot)?;

    if read_speed(env, RewardSide::Supply, market) != supply_speed {
        write_side_speed(env, market, RewardSide::Supply, supply_speed);
    }
    if read_speed(env, RewardSide::Borrow, market) != borrow_speed {
        write_side_speed(env, market, RewardSide::Borrow, borrow_speed);
    }

    if supply_speed == 0 && borrow_speed == 0 {
        leave_reward_set(env, market, &mut config);
    } else {
        join_reward_set(env, market, &mut config);
    }
    Ok(())
}

/// Splits the reward rate across the reward set by borrow utility
/// (`price * total_borrows`). Both sides of a market get the same speed.
pub(crate) fn refresh_speeds(env: &Env) -> Result<(), ControllerError> {
    let reward_markets = read_address_list(env, &DataKey::RewardMarkets);
    let mut utilities: Vec<u128> = Vec::new(env);
    let mut total_utility = 0u128;
    for market in reward_markets.iter() {
        let snapshot = fetch_market_snapshot(env, &market)?;
        settle_indices(env, &market, &snapshot)?;
        let price = price_of(env, &market)?;
        let utility = math(mul_scalar_truncate(price, snapshot.total_borrows))?;
        total_utility = math(add(total_utility, utility))?;
        utilities.push_back(utility);
    }

    let reward_rate = read_u128(env, &DataKey::RewardRate);
    for (market, utility) in reward_markets.iter().zip(utilities.iter()) {
        let new_speed = if total_utility == 0 {
            0
        } else {
            let share = math(div_exp(utility, total_utility))?;
            math(mul_scalar_truncate(reward_rate, share))?
        };
        write_side_speed(env, &market, RewardSide::Supply, new_speed);
        write_side_speed(env, &market, RewardSide::Borrow, new_speed);
    }
    Ok(())
}
