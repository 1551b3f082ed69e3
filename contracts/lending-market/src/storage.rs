use soroban_sdk::{contracttype, Address, Env};
use stellar_tokens::fungible::Base as TokenBase;

use crate::errors::MarketError;

// Storage key types for the contract
#[contracttype]
pub enum DataKey {
    Admin,                    // Address
    Underlying,               // Address
    Controller,               // Address
    InterestModel,            // Address
    InitialExchangeRate,      // u128 (scaled 1e18)
    Ledger,                   // MarketLedger
    BorrowSnapshots(Address), // BorrowSnapshot per account
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

/// Everything interest accrual touches lives in one record so an accrual
/// commits with a single write.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketLedger {
    pub cash: u128,
    pub total_borrows: u128,
    pub total_reserves: u128,
    pub borrow_index: u128,
    pub accrual_block: u32,
    pub reserve_factor: u128,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BorrowSnapshot {
    pub principal: u128,
    pub interest_index: u128,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().persistent().has(&DataKey::Admin)
}

pub fn read_ledger(env: &Env) -> Result<MarketLedger, MarketError> {
    bump_core_ttl(env);
    env.storage()
        .persistent()
        .get(&DataKey::Ledger)
        .ok_or(MarketError::NotInitialized)
}

pub fn write_ledger(env: &Env, ledger: &MarketLedger) {
    env.storage().persistent().set(&DataKey::Ledger, ledger);
}

fn read_address(env: &Env, key: &DataKey) -> Result<Address, MarketError> {
    env.storage()
        .persistent()
        .get(key)
        .ok_or(MarketError::NotInitialized)
}

pub fn read_admin(env: &Env) -> Result<Address, MarketError> {
    read_address(env, &DataKey::Admin)
}

pub fn read_underlying(env: &Env) -> Result<Address, MarketError> {
    read_address(env, &DataKey::Underlying)
}

pub fn read_controller(env: &Env) -> Result<Address, MarketError> {
    read_address(env, &DataKey::Controller)
}

pub fn read_interest_model(env: &Env) -> Result<Address, MarketError> {
    read_address(env, &DataKey::InterestModel)
}

pub fn read_initial_exchange_rate(env: &Env) -> Result<u128, MarketError> {
    env.storage()
        .persistent()
        .get(&DataKey::InitialExchangeRate)
        .ok_or(MarketError::NotInitialized)
}

pub fn read_borrow_snapshot(env: &Env, account: &Address) -> BorrowSnapshot {
    let key = DataKey::BorrowSnapshots(account.clone());
    let persistent = env.storage().persistent();
    match persistent.get(&key) {
        Some(snapshot) => {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
            snapshot
        }
        None => BorrowSnapshot::default(),
    }
}

pub fn write_borrow_snapshot(env: &Env, account: &Address, snapshot: &BorrowSnapshot) {
    let key = DataKey::BorrowSnapshots(account.clone());
    let persistent = env.storage().persistent();
    persistent.set(&key, snapshot);
    persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn token_balance(env: &Env, account: &Address) -> u128 {
    TokenBase::balance(env, account).max(0) as u128
}

pub fn total_supply(env: &Env) -> u128 {
    TokenBase::total_supply(env).max(0) as u128
}

pub fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Admin,
        DataKey::Underlying,
        DataKey::Controller,
        DataKey::InterestModel,
        DataKey::InitialExchangeRate,
        DataKey::Ledger,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}
