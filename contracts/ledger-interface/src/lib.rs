#![no_std]
//! Types and client traits shared between markets, the controller and the
//! external collaborators (price oracle, interest rate model).

use soroban_sdk::{contractclient, contracterror, contracttype, Address, Env};

/// Ledger-wide values a market hands to the controller. Soroban does not let
/// the controller call back into the market that invoked it, so hooks carry
/// this snapshot instead.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketSnapshot {
    pub total_supply: u128,
    pub total_borrows: u128,
    pub borrow_index: u128,
    pub exchange_rate: u128,
    pub reserve_factor: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountSnapshot {
    pub tokens: u128,
    pub borrow_balance: u128,
    pub exchange_rate: u128,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RewardSide {
    Supply,
    Borrow,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ControllerError {
    Unauthorized = 1,
    NotInitialized = 2,
    AlreadyInitialized = 3,
    MarketNotListed = 4,
    MarketAlreadyListed = 5,
    PriceError = 6,
    MathError = 7,
    InsufficientLiquidity = 8,
    InsufficientShortfall = 9,
    TooMuchRepay = 10,
    MintPaused = 11,
    BorrowPaused = 12,
    TransferPaused = 13,
    SeizePaused = 14,
    InvalidInput = 15,
    InsufficientReserve = 16,
    NonzeroBorrowBalance = 17,
    MarketSnapshotFailure = 18,
    AlreadyRewardMarket = 19,
    InvalidCollateralFactor = 20,
    InvalidCloseFactor = 21,
    InvalidLiquidationIncentive = 22,
}

/// Policy hooks and the seize calculation, as seen by a market.
#[contractclient(name = "ControllerClient")]
pub trait ControllerInterface {
    fn mint_allowed(
        env: Env,
        market: Address,
        minter: Address,
        mint_amount: u128,
        market_state: MarketSnapshot,
        minter_state: AccountSnapshot,
    ) -> Result<(), ControllerError>;

    fn redeem_allowed(
        env: Env,
        market: Address,
        redeemer: Address,
        redeem_tokens: u128,
        market_state: MarketSnapshot,
        redeemer_state: AccountSnapshot,
    ) -> Result<(), ControllerError>;

    fn borrow_allowed(
        env: Env,
        market: Address,
        borrower: Address,
        borrow_amount: u128,
        market_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
    ) -> Result<(), ControllerError>;

    fn repay_borrow_allowed(
        env: Env,
        market: Address,
        payer: Address,
        borrower: Address,
        repay_amount: u128,
        market_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
    ) -> Result<(), ControllerError>;

    fn liquidate_borrow_allowed(
        env: Env,
        borrowed_market: Address,
        collateral_market: Address,
        liquidator: Address,
        borrower: Address,
        repay_amount: u128,
        borrowed_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
    ) -> Result<(), ControllerError>;

    fn seize_allowed(
        env: Env,
        collateral_market: Address,
        borrowed_market: Address,
        liquidator: Address,
        borrower: Address,
        seize_tokens: u128,
        collateral_state: MarketSnapshot,
        borrower_state: AccountSnapshot,
        liquidator_state: AccountSnapshot,
    ) -> Result<(), ControllerError>;

    fn transfer_allowed(
        env: Env,
        market: Address,
        src: Address,
        dst: Address,
        transfer_tokens: u128,
        market_state: MarketSnapshot,
        src_state: AccountSnapshot,
        dst_state: AccountSnapshot,
    ) -> Result<(), ControllerError>;

    fn liquidate_calculate_seize_tokens(
        env: Env,
        borrowed_market: Address,
        collateral_market: Address,
        repay_amount: u128,
    ) -> Result<u128, ControllerError>;
}

/// Read surface of a market, plus `seize` for the liquidation path.
#[contractclient(name = "MarketClient")]
pub trait MarketInterface {
    fn market_snapshot(env: Env) -> MarketSnapshot;
    fn get_account_snapshot(env: Env, account: Address) -> AccountSnapshot;
    fn exchange_rate_stored(env: Env) -> u128;
    fn accrue_interest(env: Env);
    fn accrual_block_number(env: Env) -> u32;
    fn seize(
        env: Env,
        seizer_market: Address,
        liquidator: Address,
        borrower: Address,
        seize_tokens: u128,
    );
}

#[contractclient(name = "InterestRateModelClient")]
pub trait InterestRateModel {
    /// Per-block borrow rate as a 1e18 mantissa.
    fn get_borrow_rate(env: Env, cash: u128, borrows: u128, reserves: u128) -> u128;
}

#[contractclient(name = "PriceOracleClient")]
pub trait PriceOracle {
    /// USD price of one unit of the market's underlying, 1e18 mantissa. Zero
    /// means the price is unavailable.
    fn get_underlying_price(env: Env, market: Address) -> u128;
}
