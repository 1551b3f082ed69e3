use fixed_point::mul_scalar_truncate;
use ledger_interface::{AccountSnapshot, ControllerError, MarketSnapshot, RewardSide};
use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Vec};

use crate::constants::*;
use crate::events::*;
use crate::flywheel;
use crate::helpers::*;
use crate::liquidation;
use crate::liquidity::{account_liquidity, Adjustment, Hint};
use crate::speeds;
use crate::storage::*;

#[contract]
pub struct LendingController;

#[contractimpl]
impl LendingController {
    pub fn initialize(
        env: Env,
        admin: Address,
        oracle: Address,
        reward_token: Address,
    ) -> Result<(), ControllerError> {
        if is_initialized(&env) {
            return Err(ControllerError::AlreadyInitialized);
        }
        admin.require_auth();
        let persistent = env.storage().persistent();
        persistent.set(&DataKey::Admin, &admin);
        persistent.set(&DataKey::Oracle, &oracle);
        persistent.set(&DataKey::RewardToken, &reward_token);
        persistent.set(&DataKey::CloseFactor, &DEFAULT_CLOSE_FACTOR);
        persistent.set(
            &DataKey::LiquidationIncentive,
            &DEFAULT_LIQUIDATION_INCENTIVE,
        );
        persistent.set(&DataKey::RewardRate, &0u128);
        persistent.set(&DataKey::ClaimThreshold, &0u128);
        bump_core_ttl(&env);
        Ok(())
    }

    // Market admin

    /// Lists `market` with a zero collateral factor and fresh reward indices.
    pub fn support_market(env: Env, market: Address) -> Result<(), ControllerError> {
        require_admin(&env)?;
        if listed_config(&env, &market).is_ok() {
            return Err(ControllerError::MarketAlreadyListed);
        }
        write_market_config(
            &env,
            &market,
            &MarketConfig {
                is_listed: true,
                collateral_factor: 0,
                is_reward_market: false,
            },
        );
        let mut all_markets = read_address_list(&env, &DataKey::AllMarkets);
        all_markets.push_back(market.clone());
        write_address_list(&env, &DataKey::AllMarkets, &all_markets);

        let initial = RewardMarketState {
            index: REWARD_INITIAL_INDEX,
            block: env.ledger().sequence(),
        };
        for side in [RewardSide::Supply, RewardSide::Borrow] {
            if read_state(&env, side, &market).is_none() {
                write_state(&env, side, &market, &initial);
            }
        }
        MarketListed { market }.publish(&env);
        Ok(())
    }

    pub fn set_collateral_factor(
        env: Env,
        market: Address,
        new_collateral_factor: u128,
    ) -> Result<(), ControllerError> {
        require_admin(&env)?;
        let mut config = listed_config(&env, &market)?;
        if new_collateral_factor > COLLATERAL_FACTOR_MAX {
            return Err(ControllerError::InvalidCollateralFactor);
        }
        if new_collateral_factor != 0 {
            price_of(&env, &market)?;
        }
        let old_collateral_factor = config.collateral_factor;
        config.collateral_factor = new_collateral_factor;
        write_market_config(&env, &market, &config);
        CollateralFactorUpdated {
            market,
            old_collateral_factor,
            new_collateral_factor,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_close_factor(env: Env, new_close_factor: u128) -> Result<(), ControllerError> {
        require_admin(&env)?;
        if new_close_factor == 0 || new_close_factor > EXP_SCALE {
            return Err(ControllerError::InvalidCloseFactor);
        }
        let old_close_factor = read_u128(&env, &DataKey::CloseFactor);
        env.storage()
            .persistent()
            .set(&DataKey::CloseFactor, &new_close_factor);
        CloseFactorUpdated {
            old_close_factor,
            new_close_factor,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_liquidation_incentive(env: Env, new_incentive: u128) -> Result<(), ControllerError> {
        require_admin(&env)?;
        if new_incentive < EXP_SCALE {
            return Err(ControllerError::InvalidLiquidationIncentive);
        }
        let old_incentive = read_u128(&env, &DataKey::LiquidationIncentive);
        env.storage()
            .persistent()
            .set(&DataKey::LiquidationIncentive, &new_incentive);
        LiquidationIncentiveUpdated {
            old_incentive,
            new_incentive,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_oracle(env: Env, oracle: Address) -> Result<(), ControllerError> {
        require_admin(&env)?;
        env.storage().persistent().set(&DataKey::Oracle, &oracle);
        OracleUpdated { oracle }.publish(&env);
        Ok(())
    }

    // Reward configuration

    pub fn set_claim_threshold(env: Env, new_threshold: u128) -> Result<(), ControllerError> {
        require_admin(&env)?;
        let old_threshold = read_u128(&env, &DataKey::ClaimThreshold);
        env.storage()
            .persistent()
            .set(&DataKey::ClaimThreshold, &new_threshold);
        ClaimThresholdUpdated {
            old_threshold,
            new_threshold,
        }
        .publish(&env);
        Ok(())
    }

    /// Sets the per-block amount shared by the reward set and re-splits it.
    pub fn set_reward_rate(env: Env, new_rate: u128) -> Result<(), ControllerError> {
        require_admin(&env)?;
        let old_rate = read_u128(&env, &DataKey::RewardRate);
        env.storage()
            .persistent()
            .set(&DataKey::RewardRate, &new_rate);
        RewardRateUpdated { old_rate, new_rate }.publish(&env);
        speeds::refresh_speeds(&env)
    }

    /// Adds listed markets to the reward set. Indices kept from an earlier
    /// membership are reused as they are.
    pub fn add_reward_markets(env: Env, markets: Vec<Address>) -> Result<(), ControllerError> {
        require_admin(&env)?;
        for market in markets.iter() {
            let mut config = listed_config(&env, &market)?;
            if config.is_reward_market {
                return Err(ControllerError::AlreadyRewardMarket);
            }
            speeds::join_reward_set(&env, &market, &mut config);
        }
        speeds::refresh_speeds(&env)
    }

    pub fn set_reward_speeds(
        env: Env,
        markets: Vec<Address>,
        supply_speeds: Vec<u128>,
        borrow_speeds: Vec<u128>,
    ) -> Result<(), ControllerError> {
        require_admin(&env)?;
        if markets.len() != supply_speeds.len() || markets.len() != borrow_speeds.len() {
            return Err(ControllerError::InvalidInput);
        }
        for ((market, supply_speed), borrow_speed) in markets
            .iter()
            .zip(supply_speeds.iter())
            .zip(borrow_speeds.iter())
        {
            speeds::set_reward_speeds_internal(&env, &market, supply_speed, borrow_speed)?;
        }
        Ok(())
    }

    /// Recomputes every reward market's speed from current borrow utility.
    pub fn refresh_speeds(env: Env) -> Result<(), ControllerError> {
        speeds::refresh_speeds(&env)
    }

    /// Admin: pays `amount` of the reward token out of the controller's reserve.
    pub fn grant_reward(env: Env, recipient: Address, amount: u128) -> Result<(), ControllerError> {
        require_admin(&env)?;
        if !transfer_reward(&env, &recipient, amount)? {
            return Err(ControllerError::InsufficientReserve);
        }
        RewardGranted { recipient, amount }.publish(&env);
        Ok(())
    }

    // Flywheel

    pub fn update_supply_index(env: Env, market: Address) -> Result<RewardMarketState, ControllerError> {
        let snapshot = fetch_market_snapshot(&env, &market)?;
        flywheel::update_supply_index(&env, &market, snapshot.total_supply)
    }

    pub fn update_borrow_index(env: Env, market: Address) -> Result<RewardMarketState, ControllerError> {
        let snapshot = fetch_market_snapshot(&env, &market)?;
        flywheel::update_borrow_index(
            &env,
            &market,
            snapshot.total_borrows,
            snapshot.borrow_index,
        )
    }

    /// Credits `supplier` against the supply index as last updated.
    pub fn distribute_supplier_reward(
        env: Env,
        market: Address,
        supplier: Address,
    ) -> Result<u128, ControllerError> {
        let account = fetch_account_snapshot(&env, &market, &supplier)?;
        flywheel::distribute_supplier_reward(&env, &market, &supplier, account.tokens)
    }

    pub fn distribute_borrower_reward(
        env: Env,
        market: Address,
        borrower: Address,
    ) -> Result<u128, ControllerError> {
        let snapshot = fetch_market_snapshot(&env, &market)?;
        let account = fetch_account_snapshot(&env, &market, &borrower)?;
        flywheel::distribute_borrower_reward(
            &env,
            &market,
            &borrower,
            account.borrow_balance,
            snapshot.borrow_index,
        )
    }

    /// Settles `holders` on the requested sides of `markets` and pays out
    /// every balance that clears the claim threshold and the reserve.
    pub fn claim_reward(
        env: Env,
        holders: Vec<Address>,
        markets: Vec<Address>,
        borrowers: bool,
        suppliers: bool,
    ) -> Result<(), ControllerError> {
        for market in markets.iter() {
            listed_config(&env, &market)?;
        }
        claim_internal(&env, &holders, &markets, borrowers, suppliers)
    }

    /// Claims both sides across every listed market for one holder.
    pub fn claim_reward_for(env: Env, holder: Address) -> Result<(), ControllerError> {
        let mut holders = Vec::new(&env);
        holders.push_back(holder);
        let markets = read_address_list(&env, &DataKey::AllMarkets);
        claim_internal(&env, &holders, &markets, true, true)
    }

    // Contributor streams

    pub fn set_contributor_speed(
        env: Env,
        contributor: Address,
        new_speed: u128,
    ) -> Result<(), ControllerError> {
        require_admin(&env)?;
        flywheel::update_contributor_rewards(&env, &contributor)?;
        let persistent = env.storage().persistent();
        if new_speed == 0 {
            persistent.remove(&DataKey::ContributorBlock(contributor.clone()));
        } else {
            persistent.set(
                &DataKey::ContributorBlock(contributor.clone()),
                &env.ledger().sequence(),
            );
        }
        persistent.set(&DataKey::ContributorSpeed(contributor.clone()), &new_speed);
        ContributorSpeedUpdated {
            contributor,
            new_speed,
        }
        .publish(&env);
        Ok(())
    }

    pub fn update_contributor_rewards(env: Env, contributor: Address) -> Result<(), ControllerError> {
        flywheel::update_contributor_rewards(&env, &contributor)
    }

    // Pause guardian

    pub fn set_pause_guardian(env: Env, guardian: Address) -> Result<(), ControllerError> {
        require_admin(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::PauseGuardian, &guardian);
        PauseGuardianUpdated { guardian }.publish(&env);
        Ok(())
    }

    pub fn set_mint_paused(
        env: Env,
        caller: Address,
        market: Address,
        paused: bool,
    ) -> Result<(), ControllerError> {
        require_pause_authority(&env, &caller, paused)?;
        listed_config(&env, &market)?;
        env.storage()
            .persistent()
            .set(&DataKey::MintPaused(market.clone()), &paused);
        MintPauseUpdated { market, paused }.publish(&env);
        Ok(())
    }

    pub fn set_borrow_paused(
        env: Env,
        caller: Address,
        market: Address,
        paused: bool,
    ) -> Result<(), ControllerError> {
        require_pause_authority(&env, &caller, paused)?;
        listed_config(&env, &market)?;
        env.storage()
            .persistent()
            .set(&DataKey::BorrowPaused(market.clone()), &paused);
        BorrowPauseUpdated { market, paused }.publish(&env);
        Ok(())
    }

    pub fn set_transfer_paused(env: Env, caller: Address, paused: bool) -> Result<(), ControllerError> {
        require_pause_authority(&env, &caller, paused)?;
        env.storage()
            .persistent()
            .set(&DataKey::TransferPaused, &paused);
        TransferPauseUpdated { paused }.publish(&env);
        Ok(())
    }

    pub fn set_seize_paused(env: Env, caller: Address, paused: bool) -> Result<(), ControllerError> {
        require_pause_authority(&env, &caller, paused)?;
        env.storage().persistent().set(&DataKey::SeizePaused, &paused);
        SeizePauseUpdated { paused }.publish(&env);
        Ok(())
    }

    // Membership and liquidity

    pub fn enter_markets(env: Env, account: Address, markets: Vec<Address>) -> Result<(), ControllerError> {
        account.require_auth();
        for market in markets.iter() {
            listed_config(&env, &market)?;
            if add_membership(&env, &account, &market) {
                MarketEntered {
                    account: account.clone(),
                    market,
                }
                .publish(&env);
            }
        }
        Ok(())
    }

    /// Leaves a market. Refused while the account borrows there or when its
    /// collateral in that market is still needed.
    pub fn exit_market(env: Env, account: Address, market: Address) -> Result<(), ControllerError> {
        account.require_auth();
        let snapshot = fetch_account_snapshot(&env, &market, &account)?;
        if snapshot.borrow_balance != 0 {
            return Err(ControllerError::NonzeroBorrowBalance);
        }
        if !is_member(&env, &account, &market) {
            return Ok(());
        }
        let (_, shortfall) = account_liquidity(
            &env,
            &account,
            Some(Adjustment {
                market: &market,
                redeem_tokens: snapshot.tokens,
                borrow_amount: 0,
            }),
            None,
        )?;
        if shortfall > 0 {
            return Err(ControllerError::InsufficientLiquidity);
        }
        remove_membership(&env, &account, &market);
        MarketExited { account, market }.publish(&env);
        Ok(())
    }

    /// `(liquidity, shortfall)` in oracle units.
    pub fn get_account_liquidity(env: Env, account: Address) -> Result<(u128, u128), ControllerError> {
        account_liquidity(&env, &account, None, None)
    }

    /// Liquidity after redeeming `redeem_tokens` and borrowing `borrow_amount` in `market`.
    pub fn hypothetical_liquidity(
        env: Env,
        account: Address,
        market: Address,
        redeem_tokens: u128,
        borrow_amount: u128,
    ) -> Result<(u128, u128), ControllerError> {
        account_liquidity(
            &env,
            &account,
            Some(Adjustment {
                market: &market,
                redeem_tokens,
                borrow_amount,
            }),
            None,
        )
    }

    // Market hooks

    pub fn mint_allowed(
        env: Env,
        market: Address,
        minter: Address,
        _mint_amount: u128,
        market_state: MarketSnapshot,
        minter_state: AccountSnapshot,
    ) -> Result<(), ControllerError> {
        market.require_auth();
        listed_config(&env, &market)?;
        if read_flag(&env, &DataKey::MintPaused(market.clone())) {
            return Err(ControllerError::MintPaused);
        }
        flywheel::update_supply_index(&env, &market, market_state.total_supply)?;
        flywheel::distribute_supplier_reward(&env, &market, &minter, minter_state.tokens)?;
        Ok(())
    }

    pub fn redeem_allowed(
        env: Env,
        market: Address,
        redeemer: Address,
        redeem_tokens: u128,
        market_state: MarketSnapshot,
        redeemer_state: AccountSnapshot,
    ) -> Result<(), ControllerError> {
        market.require_auth();
        listed_config(&env, &market)?;
        check_redeem_liquidity(&env, &market, &redeemer, redeem_tokens, &redeemer_state)?;
        flywheel::update_supply_index(&env, &market, market_state.total_supply)?;
        flywheel::distribute_supplier_reward(&env, &market, &redeemer, redeemer_state.tokens)?;
        Ok(())
    }

    /// Enters the borrower into `market` on first borrow.
    pub fn borrow_allowed(
        env: Env,
        market: Address,
        borrower: Address,
        borrow_amount: u128,
        market_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
    ) -> Result<(), ControllerError> {
        market.require_auth();
        listed_config(&env, &market)?;
        if read_flag(&env, &DataKey::BorrowPaused(market.clone())) {
            return Err(ControllerError::BorrowPaused);
        }
        if add_membership(&env, &borrower, &market) {
            MarketEntered {
                account: borrower.clone(),
                market: market.clone(),
            }
            .publish(&env);
        }
        price_of(&env, &market)?;
        let (_, shortfall) = account_liquidity(
            &env,
            &borrower,
            Some(Adjustment {
                market: &market,
                redeem_tokens: 0,
                borrow_amount,
            }),
            Some(Hint {
                market: &market,
                account: &borrower_state,
            }),
        )?;
        if shortfall > 0 {
            return Err(ControllerError::InsufficientLiquidity);
        }
        flywheel::update_borrow_index(
            &env,
            &market,
            market_state.total_borrows,
            market_state.borrow_index,
        )?;
        flywheel::distribute_borrower_reward(
            &env,
            &market,
            &borrower,
            borrower_state.borrow_balance,
            market_state.borrow_index,
        )?;
        Ok(())
    }

    pub fn repay_borrow_allowed(
        env: Env,
        market: Address,
        _payer: Address,
        borrower: Address,
        _repay_amount: u128,
        market_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
    ) -> Result<(), ControllerError> {
        market.require_auth();
        listed_config(&env, &market)?;
        flywheel::update_borrow_index(
            &env,
            &market,
            market_state.total_borrows,
            market_state.borrow_index,
        )?;
        flywheel::distribute_borrower_reward(
            &env,
            &market,
            &borrower,
            borrower_state.borrow_balance,
            market_state.borrow_index,
        )?;
        Ok(())
    }

    /// Requires a shortfall and caps the repay at the close factor, except on
    /// a deprecated market where any amount up to the full debt is allowed.
    pub fn liquidate_borrow_allowed(
        env: Env,
        borrowed_market: Address,
        collateral_market: Address,
        _liquidator: Address,
        borrower: Address,
        repay_amount: u128,
        borrowed_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
    ) -> Result<(), ControllerError> {
        borrowed_market.require_auth();
        let borrowed_config = listed_config(&env, &borrowed_market)?;
        listed_config(&env, &collateral_market)?;

        let borrow_balance = borrower_state.borrow_balance;
        if is_deprecated_config(
            &env,
            &borrowed_market,
            &borrowed_config,
            borrowed_state.reserve_factor,
        ) {
            if repay_amount > borrow_balance {
                return Err(ControllerError::TooMuchRepay);
            }
            return Ok(());
        }

        let (_, shortfall) = account_liquidity(
            &env,
            &borrower,
            None,
            Some(Hint {
                market: &borrowed_market,
                account: &borrower_state,
            }),
        )?;
        if shortfall == 0 {
            return Err(ControllerError::InsufficientShortfall);
        }
        let close_factor = read_u128(&env, &DataKey::CloseFactor);
        let max_close = math(mul_scalar_truncate(close_factor, borrow_balance))?;
        if repay_amount > max_close {
            return Err(ControllerError::TooMuchRepay);
        }
        Ok(())
    }

    pub fn seize_allowed(
        env: Env,
        collateral_market: Address,
        borrowed_market: Address,
        liquidator: Address,
        borrower: Address,
        _seize_tokens: u128,
        collateral_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
        liquidator_state: AccountSnapshot,
    ) -> Result<(), ControllerError> {
        collateral_market.require_auth();
        if read_flag(&env, &DataKey::SeizePaused) {
            return Err(ControllerError::SeizePaused);
        }
        listed_config(&env, &collateral_market)?;
        listed_config(&env, &borrowed_market)?;
        flywheel::update_supply_index(&env, &collateral_market, collateral_state.total_supply)?;
        flywheel::distribute_supplier_reward(
            &env,
            &collateral_market,
            &borrower,
            borrower_state.tokens,
        )?;
        flywheel::distribute_supplier_reward(
            &env,
            &collateral_market,
            &liquidator,
            liquidator_state.tokens,
        )?;
        Ok(())
    }

    pub fn transfer_allowed(
        env: Env,
        market: Address,
        src: Address,
        dst: Address,
        transfer_tokens: u128,
        market_state: MarketSnapshot,
        src_state: AccountSnapshot,
        dst_state: AccountSnapshot,
    ) -> Result<(), ControllerError> {
        market.require_auth();
        listed_config(&env, &market)?;
        if read_flag(&env, &DataKey::TransferPaused) {
            return Err(ControllerError::TransferPaused);
        }
        check_redeem_liquidity(&env, &market, &src, transfer_tokens, &src_state)?;
        flywheel::update_supply_index(&env, &market, market_state.total_supply)?;
        flywheel::distribute_supplier_reward(&env, &market, &src, src_state.tokens)?;
        flywheel::distribute_supplier_reward(&env, &market, &dst, dst_state.tokens)?;
        Ok(())
    }

    pub fn liquidate_calculate_seize_tokens(
        env: Env,
        borrowed_market: Address,
        collateral_market: Address,
        repay_amount: u128,
    ) -> Result<u128, ControllerError> {
        let price_borrowed = price_of(&env, &borrowed_market)?;
        let price_collateral = price_of(&env, &collateral_market)?;
        let exchange_rate = fetch_exchange_rate(&env, &collateral_market)?;
        let incentive = read_u128(&env, &DataKey::LiquidationIncentive);
        math(liquidation::seize_tokens(
            repay_amount,
            incentive,
            price_borrowed,
            price_collateral,
            exchange_rate,
        ))
    }

    // Views

    pub fn admin(env: Env) -> Result<Address, ControllerError> {
        read_admin(&env)
    }

    pub fn oracle(env: Env) -> Result<Address, ControllerError> {
        read_oracle(&env)
    }

    pub fn reward_token(env: Env) -> Result<Address, ControllerError> {
        read_reward_token(&env)
    }

    pub fn pause_guardian(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::PauseGuardian)
    }

    pub fn market_config(env: Env, market: Address) -> Option<MarketConfig> {
        read_market_config(&env, &market)
    }

    /// Collateral factor 0, borrowing paused and a reserve factor of 100%.
    pub fn is_deprecated(env: Env, market: Address) -> Result<bool, ControllerError> {
        let config = listed_config(&env, &market)?;
        let snapshot = fetch_market_snapshot(&env, &market)?;
        Ok(is_deprecated_config(
            &env,
            &market,
            &config,
            snapshot.reserve_factor,
        ))
    }

    pub fn get_all_markets(env: Env) -> Vec<Address> {
        read_address_list(&env, &DataKey::AllMarkets)
    }

    pub fn get_reward_markets(env: Env) -> Vec<Address> {
        read_address_list(&env, &DataKey::RewardMarkets)
    }

    pub fn get_assets_in(env: Env, account: Address) -> Vec<Address> {
        read_assets_in(&env, &account)
    }

    pub fn check_membership(env: Env, account: Address, market: Address) -> bool {
        is_member(&env, &account, &market)
    }

    pub fn supply_state(env: Env, market: Address) -> Option<RewardMarketState> {
        read_state(&env, RewardSide::Supply, &market)
    }

    pub fn borrow_state(env: Env, market: Address) -> Option<RewardMarketState> {
        read_state(&env, RewardSide::Borrow, &market)
    }

    pub fn supplier_index(env: Env, market: Address, account: Address) -> Option<u128> {
        read_checkpoint(&env, RewardSide::Supply, &market, &account)
    }

    pub fn borrower_index(env: Env, market: Address, account: Address) -> Option<u128> {
        read_checkpoint(&env, RewardSide::Borrow, &market, &account)
    }

    pub fn supply_speed(env: Env, market: Address) -> u128 {
        read_speed(&env, RewardSide::Supply, &market)
    }

    pub fn borrow_speed(env: Env, market: Address) -> u128 {
        read_speed(&env, RewardSide::Borrow, &market)
    }

    pub fn reward_accrued(env: Env, account: Address) -> u128 {
        read_accrued(&env, &account)
    }

    pub fn contributor_speed(env: Env, contributor: Address) -> u128 {
        read_u128(&env, &DataKey::ContributorSpeed(contributor))
    }

    pub fn is_mint_paused(env: Env, market: Address) -> bool {
        read_flag(&env, &DataKey::MintPaused(market))
    }

    pub fn is_borrow_paused(env: Env, market: Address) -> bool {
        read_flag(&env, &DataKey::BorrowPaused(market))
    }

    pub fn is_transfer_paused(env: Env) -> bool {
        read_flag(&env, &DataKey::TransferPaused)
    }

    pub fn is_seize_paused(env: Env) -> bool {
        read_flag(&env, &DataKey::SeizePaused)
    }

    pub fn close_factor(env: Env) -> u128 {
        read_u128(&env, &DataKey::CloseFactor)
    }

    pub fn liquidation_incentive(env: Env) -> u128 {
        read_u128(&env, &DataKey::LiquidationIncentive)
    }

    pub fn claim_threshold(env: Env) -> u128 {
        read_u128(&env, &DataKey::ClaimThreshold)
    }

    pub fn reward_rate(env: Env) -> u128 {
        read_u128(&env, &DataKey::RewardRate)
    }
}

fn is_deprecated_config(env: &Env, market: &Address, config: &MarketConfig, reserve_factor: u128) -> bool {
    config.collateral_factor == 0
        && read_flag(env, &DataKey::BorrowPaused(market.clone()))
        && reserve_factor == EXP_SCALE
}

/// The admin may pause and unpause; the guardian may only pause.
fn require_pause_authority(env: &Env, caller: &Address, paused: bool) -> Result<(), ControllerError> {
    caller.require_auth();
    let admin = read_admin(env)?;
    if *caller == admin {
        return Ok(());
    }
    let guardian: Option<Address> = env.storage().persistent().get(&DataKey::PauseGuardian);
    if guardian.as_ref() != Some(caller) || !paused {
        return Err(ControllerError::Unauthorized);
    }
    Ok(())
}

/// Accounts outside the market have no collateral there to protect.
fn check_redeem_liquidity(
    env: &Env,
    market: &Address,
    redeemer: &Address,
    redeem_tokens: u128,
    redeemer_state: &AccountSnapshot,
) -> Result<(), ControllerError> {
    if !is_member(env, redeemer, market) {
        return Ok(());
    }
    let (_, shortfall) = account_liquidity(
        env,
        redeemer,
        Some(Adjustment {
            market,
            redeem_tokens,
            borrow_amount: 0,
        }),
        Some(Hint {
            market,
            account: redeemer_state,
        }),
    )?;
    if shortfall > 0 {
        return Err(ControllerError::InsufficientLiquidity);
    }
    Ok(())
}

/// Sends `amount` of the reward token from the controller's own balance.
/// Returns false, moving nothing, when that balance cannot cover it.
fn transfer_reward(env: &Env, recipient: &Address, amount: u128) -> Result<bool, ControllerError> {
    let reward_token = token::Client::new(env, &read_reward_token(env)?);
    let this = env.current_contract_address();
    let reserve = reward_token.balance(&this).max(0) as u128;
    if amount > reserve {
        return Ok(false);
    }
    if amount > 0 {
        reward_token.transfer(&this, recipient, &to_i128(amount)?);
    }
    Ok(true)
}

fn claim_internal(
    env: &Env,
    holders: &Vec<Address>,
    markets: &Vec<Address>,
    borrowers: bool,
    suppliers: bool,
) -> Result<(), ControllerError> {
    for market in markets.iter() {
        let snapshot = fetch_market_snapshot(env, &market)?;
        if borrowers {
            flywheel::update_borrow_index(
                env,
                &market,
                snapshot.total_borrows,
                snapshot.borrow_index,
            )?;
        }
        if suppliers {
            flywheel::update_supply_index(env, &market, snapshot.total_supply)?;
        }
        for holder in holders.iter() {
            let account = fetch_account_snapshot(env, &market, &holder)?;
            if borrowers {
                flywheel::distribute_borrower_reward(
                    env,
                    &market,
                    &holder,
                    account.borrow_balance,
                    snapshot.borrow_index,
                )?;
            }
            if suppliers {
                flywheel::distribute_supplier_reward(env, &market, &holder, account.tokens)?;
            }
        }
    }

    let threshold = read_u128(env, &DataKey::ClaimThreshold);
    for holder in holders.iter() {
        let accrued = read_accrued(env, &holder);
        if accrued == 0 || accrued < threshold {
            continue;
        }
        if transfer_reward(env, &holder, accrued)? {
            write_accrued(env, &holder, 0);
        } else {
            log!(env, "reward reserve short, claim deferred", holder, accrued);
        }
    }
    Ok(())
}
