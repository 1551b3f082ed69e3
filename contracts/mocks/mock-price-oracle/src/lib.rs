#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, Address, Env};

#[contracttype]
enum DataKey {
    Price(Address),
}

/// Fixed prices per market for tests. Unset markets report 0.
#[contract]
pub struct MockPriceOracle;

#[contractimpl]
impl MockPriceOracle {
    pub fn set_underlying_price(env: Env, market: Address, price: u128) {
        env.storage()
            .persistent()
            .set(&DataKey::Price(market), &price);
    }

    pub fn get_underlying_price(env: Env, market: Address) -> u128 {
        env.storage()
            .persistent()
            .get(&DataKey::Price(market))
            .unwrap_or(0u128)
    }
}
