use fixed_point::{add, div_exp, mul_scalar_truncate, sub, EXP_SCALE};
use ledger_interface::{
    AccountSnapshot, ControllerClient, InterestRateModelClient, MarketClient, MarketSnapshot,
};
use soroban_sdk::{contract, contractimpl, log, token, Address, Env, String};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::Base as TokenBase;

use crate::accrual;
use crate::constants::*;
use crate::errors::MarketError;
use crate::events::*;
use crate::helpers::*;
use crate::storage::*;

#[contract]
pub struct LendingMarket;

#[contractimpl]
impl LendingMarket {
    /// Sets up an empty market. `initial_exchange_rate` is the underlying
    /// value of one market token (1e18 mantissa) until the first mint.
    pub fn initialize(
        env: Env,
        admin: Address,
        underlying: Address,
        controller: Address,
        interest_model: Address,
        initial_exchange_rate: u128,
        decimals: u32,
        name: String,
        symbol: String,
    ) -> Result<(), MarketError> {
        if is_initialized(&env) {
            return Err(MarketError::AlreadyInitialized);
        }
        admin.require_auth();
        if initial_exchange_rate == 0 {
            return Err(MarketError::InvalidInput);
        }
        let persistent = env.storage().persistent();
        persistent.set(&DataKey::Admin, &admin);
        persistent.set(&DataKey::Underlying, &underlying);
        persistent.set(&DataKey::Controller, &controller);
        persistent.set(&DataKey::InterestModel, &interest_model);
        persistent.set(&DataKey::InitialExchangeRate, &initial_exchange_rate);
        write_ledger(
            &env,
            &MarketLedger {
                cash: 0,
                total_borrows: 0,
                total_reserves: 0,
                borrow_index: EXP_SCALE,
                accrual_block: env.ledger().sequence(),
                reserve_factor: 0,
            },
        );
        TokenBase::set_metadata(&env, decimals, name, symbol);
        bump_core_ttl(&env);
        Ok(())
    }

    /// Brings the ledger to the current block. A no-op when already current.
    pub fn accrue_interest(env: Env) -> Result<(), MarketError> {
        accrue_interest_internal(&env).map(|_| ())
    }

    /// Supplies `mint_amount` of the underlying and returns the tokens minted.
    pub fn mint(env: Env, minter: Address, mint_amount: u128) -> Result<u128, MarketError> {
        minter.require_auth();
        accrue_interest_internal(&env)?;
        mint_fresh(&env, &minter, mint_amount)
    }

    /// Burns `redeem_tokens` and returns the underlying paid out.
    pub fn redeem(env: Env, redeemer: Address, redeem_tokens: u128) -> Result<u128, MarketError> {
        redeemer.require_auth();
        accrue_interest_internal(&env)?;
        redeem_fresh(&env, &redeemer, redeem_tokens, 0).map(|(_, amount)| amount)
    }

    /// Withdraws exactly `redeem_amount` of the underlying and returns the tokens burned.
    pub fn redeem_underlying(
        env: Env,
        redeemer: Address,
        redeem_amount: u128,
    ) -> Result<u128, MarketError> {
        redeemer.require_auth();
        accrue_interest_internal(&env)?;
        redeem_fresh(&env, &redeemer, 0, redeem_amount).map(|(tokens, _)| tokens)
    }

    pub fn borrow(env: Env, borrower: Address, borrow_amount: u128) -> Result<(), MarketError> {
        borrower.require_auth();
        accrue_interest_internal(&env)?;
        borrow_fresh(&env, &borrower, borrow_amount)
    }

    /// `u128::MAX` repays the whole balance. Returns the amount actually repaid.
    pub fn repay_borrow(env: Env, borrower: Address, repay_amount: u128) -> Result<u128, MarketError> {
        borrower.require_auth();
        accrue_interest_internal(&env)?;
        repay_borrow_fresh(&env, &borrower, &borrower, repay_amount)
    }

    pub fn repay_borrow_behalf(
        env: Env,
        payer: Address,
        borrower: Address,
        repay_amount: u128,
    ) -> Result<u128, MarketError> {
        payer.require_auth();
        accrue_interest_internal(&env)?;
        repay_borrow_fresh(&env, &payer, &borrower, repay_amount)
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: u128) -> Result<(), MarketError> {
        from.require_auth();
        if from == to {
            return Err(MarketError::InvalidAccountPair);
        }
        accrue_interest_internal(&env)?;
        transfer_tokens(&env, &from, &to, amount)
    }

    /// Repays part of `borrower`'s debt and takes collateral tokens from the
    /// `collateral` market in exchange. Returns the tokens seized.
    pub fn liquidate_borrow(
        env: Env,
        liquidator: Address,
        borrower: Address,
        repay_amount: u128,
        collateral: Address,
    ) -> Result<u128, MarketError> {
        liquidator.require_auth();
        accrue_interest_internal(&env)?;
        if collateral == env.current_contract_address() {
            return Err(MarketError::InvalidCollateralMarket);
        }
        match MarketClient::new(&env, &collateral).try_accrue_interest() {
            Ok(Ok(())) => {}
            _ => {
                log!(&env, "collateral accrual failed", collateral);
                return Err(MarketError::CollateralAccrualFailure);
            }
        }
        liquidate_borrow_fresh(&env, &liquidator, &borrower, repay_amount, &collateral)
    }

    /// Called by the borrowed market of a liquidation to move collateral
    /// tokens from `borrower` to `liquidator`.
    pub fn seize(
        env: Env,
        seizer_market: Address,
        liquidator: Address,
        borrower: Address,
        seize_tokens: u128,
    ) -> Result<(), MarketError> {
        seizer_market.require_auth();
        seize_internal(&env, &seizer_market, &liquidator, &borrower, seize_tokens)
    }

    pub fn add_reserves(env: Env, from: Address, add_amount: u128) -> Result<(), MarketError> {
        from.require_auth();
        let mut ledger = accrue_interest_internal(&env)?;
        ensure_fresh(&env, &ledger)?;
        let underlying = read_underlying(&env)?;
        token::Client::new(&env, &underlying).transfer(
            &from,
            &env.current_contract_address(),
            &to_i128(add_amount)?,
        );
        ledger.cash = math(add(ledger.cash, add_amount))?;
        ledger.total_reserves = math(add(ledger.total_reserves, add_amount))?;
        write_ledger(&env, &ledger);
        ReservesAdded {
            benefactor: from,
            add_amount,
            new_total_reserves: ledger.total_reserves,
        }
        .publish(&env);
        Ok(())
    }

    /// Admin: withdraws reserves to the admin account.
    pub fn reduce_reserves(env: Env, reduce_amount: u128) -> Result<(), MarketError> {
        let admin = read_admin(&env)?;
        admin.require_auth();
        let mut ledger = accrue_interest_internal(&env)?;
        ensure_fresh(&env, &ledger)?;
        if reduce_amount > ledger.total_reserves {
            return Err(MarketError::InvalidInput);
        }
        if reduce_amount > ledger.cash {
            return Err(MarketError::InsufficientCash);
        }
        ledger.total_reserves -= reduce_amount;
        ledger.cash -= reduce_amount;
        write_ledger(&env, &ledger);
        let underlying = read_underlying(&env)?;
        token::Client::new(&env, &underlying).transfer(
            &env.current_contract_address(),
            &admin,
            &to_i128(reduce_amount)?,
        );
        ReservesReduced {
            admin,
            reduce_amount,
            new_total_reserves: ledger.total_reserves,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_reserve_factor(env: Env, new_reserve_factor: u128) -> Result<(), MarketError> {
        read_admin(&env)?.require_auth();
        let mut ledger = accrue_interest_internal(&env)?;
        ensure_fresh(&env, &ledger)?;
        if new_reserve_factor > RESERVE_FACTOR_MAX {
            return Err(MarketError::InvalidInput);
        }
        let old_reserve_factor = ledger.reserve_factor;
        ledger.reserve_factor = new_reserve_factor;
        write_ledger(&env, &ledger);
        NewReserveFactor {
            old_reserve_factor,
            new_reserve_factor,
        }
        .publish(&env);
        Ok(())
    }

    /// Accrues under the old model before switching.
    pub fn set_interest_model(env: Env, new_model: Address) -> Result<(), MarketError> {
        read_admin(&env)?.require_auth();
        let ledger = accrue_interest_internal(&env)?;
        ensure_fresh(&env, &ledger)?;
        let old_model = read_interest_model(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::InterestModel, &new_model);
        NewInterestRateModel {
            old_model,
            new_model,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_controller(env: Env, new_controller: Address) -> Result<(), MarketError> {
        read_admin(&env)?.require_auth();
        let old_controller = read_controller(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::Controller, &new_controller);
        NewController {
            old_controller,
            new_controller,
        }
        .publish(&env);
        Ok(())
    }

    // Views

    pub fn ledger(env: Env) -> Result<MarketLedger, MarketError> {
        read_ledger(&env)
    }

    pub fn market_snapshot(env: Env) -> Result<MarketSnapshot, MarketError> {
        market_snapshot_of(&env, &read_ledger(&env)?)
    }

    pub fn get_account_snapshot(env: Env, account: Address) -> Result<AccountSnapshot, MarketError> {
        let ledger = read_ledger(&env)?;
        let exchange_rate = exchange_rate_of(&env, &ledger)?;
        account_snapshot_of(&env, &ledger, &account, exchange_rate)
    }

    pub fn exchange_rate_stored(env: Env) -> Result<u128, MarketError> {
        exchange_rate_of(&env, &read_ledger(&env)?)
    }

    pub fn exchange_rate_current(env: Env) -> Result<u128, MarketError> {
        let ledger = accrue_interest_internal(&env)?;
        exchange_rate_of(&env, &ledger)
    }

    pub fn borrow_balance_stored(env: Env, account: Address) -> Result<u128, MarketError> {
        let ledger = read_ledger(&env)?;
        accrual::borrow_balance(&read_borrow_snapshot(&env, &account), ledger.borrow_index)
    }

    pub fn borrow_balance_current(env: Env, account: Address) -> Result<u128, MarketError> {
        let ledger = accrue_interest_internal(&env)?;
        accrual::borrow_balance(&read_borrow_snapshot(&env, &account), ledger.borrow_index)
    }

    pub fn borrow_snapshot(env: Env, account: Address) -> BorrowSnapshot {
        read_borrow_snapshot(&env, &account)
    }

    pub fn accrual_block_number(env: Env) -> Result<u32, MarketError> {
        Ok(read_ledger(&env)?.accrual_block)
    }

    pub fn get_cash(env: Env) -> Result<u128, MarketError> {
        Ok(read_ledger(&env)?.cash)
    }

    pub fn total_borrows(env: Env) -> Result<u128, MarketError> {
        Ok(read_ledger(&env)?.total_borrows)
    }

    pub fn total_reserves(env: Env) -> Result<u128, MarketError> {
        Ok(read_ledger(&env)?.total_reserves)
    }

    pub fn borrow_index(env: Env) -> Result<u128, MarketError> {
        Ok(read_ledger(&env)?.borrow_index)
    }

    pub fn reserve_factor(env: Env) -> Result<u128, MarketError> {
        Ok(read_ledger(&env)?.reserve_factor)
    }

    pub fn admin(env: Env) -> Result<Address, MarketError> {
        read_admin(&env)
    }

    pub fn controller(env: Env) -> Result<Address, MarketError> {
        read_controller(&env)
    }

    pub fn underlying(env: Env) -> Result<Address, MarketError> {
        read_underlying(&env)
    }

    pub fn interest_model(env: Env) -> Result<Address, MarketError> {
        read_interest_model(&env)
    }

    // Market token

    pub fn balance(env: Env, id: Address) -> i128 {
        TokenBase::balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }
}

/// Reads the ledger and, if it is behind, accrues it to the current block
/// and commits the result. Returns the current ledger.
pub(crate) fn accrue_interest_internal(env: &Env) -> Result<MarketLedger, MarketError> {
    let ledger = read_ledger(env)?;
    let current_block = env.ledger().sequence();
    if ledger.accrual_block == current_block {
        return Ok(ledger);
    }
    let model = read_interest_model(env)?;
    let borrow_rate = match InterestRateModelClient::new(env, &model).try_get_borrow_rate(
        &ledger.cash,
        &ledger.total_borrows,
        &ledger.total_reserves,
    ) {
        Ok(Ok(rate)) => rate,
        _ => {
            log!(env, "interest rate model failed", model);
            return Err(MarketError::InterestRateModelFailure);
        }
    };
    let Some(outcome) = accrual::accrue(&ledger, borrow_rate, current_block)? else {
        return Ok(ledger);
    };
    write_ledger(env, &outcome.ledger);
    AccrueInterest {
        cash_prior: ledger.cash,
        interest_accumulated: outcome.interest_accumulated,
        borrow_index: outcome.ledger.borrow_index,
        total_borrows: outcome.ledger.total_borrows,
    }
    .publish(env);
    Ok(outcome.ledger)
}

fn controller(env: &Env) -> Result<ControllerClient<'_>, MarketError> {
    Ok(ControllerClient::new(env, &read_controller(env)?))
}

pub(crate) fn mint_fresh(env: &Env, minter: &Address, mint_amount: u128) -> Result<u128, MarketError> {
    let mut ledger = read_ledger(env)?;
    let market_state = market_snapshot_of(env, &ledger)?;
    let minter_state = account_snapshot_of(env, &ledger, minter, market_state.exchange_rate)?;
    let this = env.current_contract_address();
    check_hook(
        env,
        "mint_allowed",
        controller(env)?.try_mint_allowed(&this, minter, &mint_amount, &market_state, &minter_state),
    )?;
    ensure_fresh(env, &ledger)?;
    if mint_amount == 0 {
        return Err(MarketError::InvalidInput);
    }

    let mint_tokens = math(div_exp(mint_amount, market_state.exchange_rate))?;
    if mint_tokens == 0 {
        return Err(MarketError::InvalidInput);
    }
    token::Client::new(env, &read_underlying(env)?).transfer(minter, &this, &to_i128(mint_amount)?);
    ledger.cash = math(add(ledger.cash, mint_amount))?;
    write_ledger(env, &ledger);
    TokenBase::mint(env, minter, to_i128(mint_tokens)?);

    Mint {
        minter: minter.clone(),
        mint_amount,
        mint_tokens,
    }
    .publish(env);
    Ok(mint_tokens)
}

/// Exactly one of `tokens_in` and `amount_in` is nonzero.
fn redeem_fresh(
    env: &Env,
    redeemer: &Address,
    tokens_in: u128,
    amount_in: u128,
) -> Result<(u128, u128), MarketError> {
    let mut ledger = read_ledger(env)?;
    let market_state = market_snapshot_of(env, &ledger)?;
    let exchange_rate = market_state.exchange_rate;
    let (redeem_tokens, redeem_amount) = if tokens_in > 0 {
        (tokens_in, math(mul_scalar_truncate(exchange_rate, tokens_in))?)
    } else {
        (math(div_exp(amount_in, exchange_rate))?, amount_in)
    };
    if redeem_tokens == 0 || redeem_amount == 0 {
        return Err(MarketError::InvalidInput);
    }
    let redeemer_state = account_snapshot_of(env, &ledger, redeemer, exchange_rate)?;
    let this = env.current_contract_address();
    check_hook(
        env,
        "redeem_allowed",
        controller(env)?.try_redeem_allowed(
            &this,
            redeemer,
            &redeem_tokens,
            &market_state,
            &redeemer_state,
        ),
    )?;
    ensure_fresh(env, &ledger)?;
    if ledger.cash < redeem_amount {
        return Err(MarketError::InsufficientCash);
    }
    if redeemer_state.tokens < redeem_tokens {
        return Err(MarketError::InsufficientBalance);
    }

    let burn = to_i128(redeem_tokens)?;
    TokenBase::update(env, Some(redeemer), None, burn);
    emit_burn(env, redeemer, burn);
    ledger.cash -= redeem_amount;
    write_ledger(env, &ledger);
    token::Client::new(env, &read_underlying(env)?).transfer(
        &this,
        redeemer,
        &to_i128(redeem_amount)?,
    );

    Redeem {
        redeemer: redeemer.clone(),
        redeem_amount,
        redeem_tokens,
    }
    .publish(env);
    Ok((redeem_tokens, redeem_amount))
}

pub(crate) fn borrow_fresh(env: &Env, borrower: &Address, borrow_amount: u128) -> Result<(), MarketError> {
    if borrow_amount == 0 {
        return Err(MarketError::InvalidInput);
    }
    let mut ledger = read_ledger(env)?;
    let market_state = market_snapshot_of(env, &ledger)?;
    let borrower_state = account_snapshot_of(env, &ledger, borrower, market_state.exchange_rate)?;
    let this = env.current_contract_address();
    check_hook(
        env,
        "borrow_allowed",
        controller(env)?.try_borrow_allowed(
            &this,
            borrower,
            &borrow_amount,
            &market_state,
            &borrower_state,
        ),
    )?;
    ensure_fresh(env, &ledger)?;
    if ledger.cash < borrow_amount {
        return Err(MarketError::InsufficientCash);
    }

    let account_borrows = math(add(borrower_state.borrow_balance, borrow_amount))?;
    let total_borrows = math(add(ledger.total_borrows, borrow_amount))?;
    write_borrow_snapshot(
        env,
        borrower,
        &BorrowSnapshot {
            principal: account_borrows,
            interest_index: ledger.borrow_index,
        },
    );
    ledger.total_borrows = total_borrows;
    ledger.cash -= borrow_amount;
    write_ledger(env, &ledger);
    token::Client::new(env, &read_underlying(env)?).transfer(
        &this,
        borrower,
        &to_i128(borrow_amount)?,
    );

    Borrow {
        borrower: borrower.clone(),
        borrow_amount,
        account_borrows,
        total_borrows,
    }
    .publish(env);
    Ok(())
}

fn repay_borrow_fresh(
    env: &Env,
    payer: &Address,
    borrower: &Address,
    repay_amount: u128,
) -> Result<u128, MarketError> {
    let mut ledger = read_ledger(env)?;
    let market_state = market_snapshot_of(env, &ledger)?;
    let borrower_state = account_snapshot_of(env, &ledger, borrower, market_state.exchange_rate)?;
    let this = env.current_contract_address();
    check_hook(
        env,
        "repay_borrow_allowed",
        controller(env)?.try_repay_borrow_allowed(
            &this,
            payer,
            borrower,
            &repay_amount,
            &market_state,
            &borrower_state,
        ),
    )?;
    ensure_fresh(env, &ledger)?;

    let owed = borrower_state.borrow_balance;
    let actual_repay = if repay_amount == u128::MAX {
        owed
    } else {
        repay_amount
    };
    if actual_repay > owed {
        return Err(MarketError::RepayExceedsBorrow);
    }
    if actual_repay > 0 {
        token::Client::new(env, &read_underlying(env)?).transfer(
            payer,
            &this,
            &to_i128(actual_repay)?,
        );
    }

    let account_borrows = owed - actual_repay;
    let total_borrows = math(sub(ledger.total_borrows, actual_repay))?;
    write_borrow_snapshot(
        env,
        borrower,
        &BorrowSnapshot {
            principal: account_borrows,
            interest_index: ledger.borrow_index,
        },
    );
    ledger.total_borrows = total_borrows;
    ledger.cash = math(add(ledger.cash, actual_repay))?;
    write_ledger(env, &ledger);

    RepayBorrow {
        payer: payer.clone(),
        borrower: borrower.clone(),
        repay_amount: actual_repay,
        account_borrows,
        total_borrows,
    }
    .publish(env);
    Ok(actual_repay)
}

fn transfer_tokens(env: &Env, src: &Address, dst: &Address, tokens: u128) -> Result<(), MarketError> {
    let ledger = read_ledger(env)?;
    let market_state = market_snapshot_of(env, &ledger)?;
    let src_state = account_snapshot_of(env, &ledger, src, market_state.exchange_rate)?;
    let dst_state = account_snapshot_of(env, &ledger, dst, market_state.exchange_rate)?;
    check_hook(
        env,
        "transfer_allowed",
        controller(env)?.try_transfer_allowed(
            &env.current_contract_address(),
            src,
            dst,
            &tokens,
            &market_state,
            &src_state,
            &dst_state,
        ),
    )?;
    ensure_fresh(env, &ledger)?;
    if src_state.tokens < tokens {
        return Err(MarketError::InsufficientBalance);
    }
    let amount = to_i128(tokens)?;
    TokenBase::update(env, Some(src), Some(dst), amount);
    stellar_tokens::fungible::emit_transfer(env, src, dst, amount);
    Ok(())
}

fn liquidate_borrow_fresh(
    env: &Env,
    liquidator: &Address,
    borrower: &Address,
    repay_amount: u128,
    collateral: &Address,
) -> Result<u128, MarketError> {
    let ledger = read_ledger(env)?;
    let market_state = market_snapshot_of(env, &ledger)?;
    let borrower_state = account_snapshot_of(env, &ledger, borrower, market_state.exchange_rate)?;
    let this = env.current_contract_address();
    let controller = controller(env)?;
    check_hook(
        env,
        "liquidate_borrow_allowed",
        controller.try_liquidate_borrow_allowed(
            &this,
            collateral,
            liquidator,
            borrower,
            &repay_amount,
            &market_state,
            &borrower_state,
        ),
    )?;
    ensure_fresh(env, &ledger)?;
    let collateral_market = MarketClient::new(env, collateral);
    match collateral_market.try_accrual_block_number() {
        Ok(Ok(block)) if block == env.ledger().sequence() => {}
        _ => return Err(MarketError::StaleCollateral),
    }
    if borrower == liquidator {
        return Err(MarketError::InvalidAccountPair);
    }
    if repay_amount == 0 || repay_amount == u128::MAX {
        return Err(MarketError::InvalidCloseAmount);
    }

    let actual_repay = repay_borrow_fresh(env, liquidator, borrower, repay_amount)?;
    let seize_tokens = match controller.try_liquidate_calculate_seize_tokens(
        &this,
        collateral,
        &actual_repay,
    ) {
        Ok(Ok(tokens)) => tokens,
        Err(Ok(code)) => {
            log!(env, "seize calculation rejected", code as u32);
            return Err(MarketError::SeizeCalculationFailure);
        }
        _ => return Err(MarketError::SeizeCalculationFailure),
    };
    match collateral_market.try_seize(&this, liquidator, borrower, &seize_tokens) {
        Ok(Ok(())) => {}
        _ => {
            log!(env, "collateral seize failed", collateral.clone(), seize_tokens);
            return Err(MarketError::CollateralSeizeFailure);
        }
    }

    LiquidateBorrow {
        liquidator: liquidator.clone(),
        borrower: borrower.clone(),
        repay_amount: actual_repay,
        collateral_market: collateral.clone(),
        seize_tokens,
    }
    .publish(env);
    Ok(seize_tokens)
}

fn seize_internal(
    env: &Env,
    seizer_market: &Address,
    liquidator: &Address,
    borrower: &Address,
    seize_tokens: u128,
) -> Result<(), MarketError> {
    let mut ledger = read_ledger(env)?;
    let market_state = market_snapshot_of(env, &ledger)?;
    let exchange_rate = market_state.exchange_rate;
    let borrower_state = account_snapshot_of(env, &ledger, borrower, exchange_rate)?;
    let liquidator_state = account_snapshot_of(env, &ledger, liquidator, exchange_rate)?;
    let this = env.current_contract_address();
    check_hook(
        env,
        "seize_allowed",
        controller(env)?.try_seize_allowed(
            &this,
            seizer_market,
            liquidator,
            borrower,
            &seize_tokens,
            &market_state,
            &borrower_state,
            &liquidator_state,
        ),
    )?;
    if borrower == liquidator {
        return Err(MarketError::InvalidAccountPair);
    }
    if borrower_state.tokens < seize_tokens {
        return Err(MarketError::InsufficientBalance);
    }

    let protocol_tokens = math(mul_scalar_truncate(PROTOCOL_SEIZE_SHARE, seize_tokens))?;
    let liquidator_tokens = seize_tokens - protocol_tokens;
    let protocol_amount = math(mul_scalar_truncate(exchange_rate, protocol_tokens))?;
    ledger.total_reserves = math(add(ledger.total_reserves, protocol_amount))?;
    write_ledger(env, &ledger);

    let moved = to_i128(liquidator_tokens)?;
    TokenBase::update(env, Some(borrower), Some(liquidator), moved);
    stellar_tokens::fungible::emit_transfer(env, borrower, liquidator, moved);
    if protocol_tokens > 0 {
        let burned = to_i128(protocol_tokens)?;
        TokenBase::update(env, Some(borrower), None, burned);
        emit_burn(env, borrower, burned);
    }

    ReservesAdded {
        benefactor: this,
        add_amount: protocol_amount,
        new_total_reserves: ledger.total_reserves,
    }
    .publish(env);
    Ok(())
}
