#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, Env};

#[contracttype]
enum DataKey {
    BorrowRate,
    Failing,
}

/// Returns a settable per-block borrow rate, or panics when told to fail.
#[contract]
pub struct MockRateModel;

#[contractimpl]
impl MockRateModel {
    pub fn set_borrow_rate(env: Env, rate: u128) {
        env.storage().persistent().set(&DataKey::BorrowRate, &rate);
    }

    pub fn set_failing(env: Env, failing: bool) {
        env.storage().persistent().set(&DataKey::Failing, &failing);
    }

    pub fn get_borrow_rate(env: Env, _cash: u128, _borrows: u128, _reserves: u128) -> u128 {
        if env
            .storage()
            .persistent()
            .get::<_, bool>(&DataKey::Failing)
            .unwrap_or(false)
        {
            panic!("rate model failure");
        }
        env.storage()
            .persistent()
            .get(&DataKey::BorrowRate)
            .unwrap_or(0u128)
    }
}
