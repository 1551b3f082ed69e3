#![no_std]
use fixed_point::{add, div_exp, mul, mul_div, mul_exp, sub, EXP_SCALE};
use soroban_sdk::{contract, contracterror, contractevent, contractimpl, contracttype, Address, Env};

/// 5 second ledgers.
pub const BLOCKS_PER_YEAR: u128 = 6_307_200u128;
const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[contracttype]
pub enum DataKey {
    BaseRatePerBlock,       // u128 scaled 1e18
    MultiplierPerBlock,     // u128 scaled 1e18
    JumpMultiplierPerBlock, // u128 scaled 1e18
    Kink,                   // u128 scaled 1e18
    Admin,                  // Address
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RateModelError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidKink = 3,
    MathError = 4,
}

#[contract]
pub struct JumpRateModel;

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewInterestParams {
    pub base_rate_per_block: u128,
    pub multiplier_per_block: u128,
    pub jump_multiplier_per_block: u128,
    pub kink: u128,
}

#[contractimpl]
impl JumpRateModel {
    /// Rates are yearly 1e18 mantissas; they are stored per block.
    pub fn initialize(
        env: Env,
        base_rate_per_year: u128,
        multiplier_per_year: u128,
        jump_multiplier_per_year: u128,
        kink: u128,
        admin: Address,
    ) -> Result<(), RateModelError> {
        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(RateModelError::AlreadyInitialized);
        }
        admin.require_auth();
        env.storage().persistent().set(&DataKey::Admin, &admin);
        write_params(
            &env,
            base_rate_per_year,
            multiplier_per_year,
            jump_multiplier_per_year,
            kink,
        )
    }

    pub fn update_jump_rate_model(
        env: Env,
        base_rate_per_year: u128,
        multiplier_per_year: u128,
        jump_multiplier_per_year: u128,
        kink: u128,
    ) -> Result<(), RateModelError> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(RateModelError::NotInitialized)?;
        admin.require_auth();
        write_params(
            &env,
            base_rate_per_year,
            multiplier_per_year,
            jump_multiplier_per_year,
            kink,
        )
    }

    pub fn get_borrow_rate(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
    ) -> Result<u128, RateModelError> {
        ensure_initialized(&env)?;
        bump_ttl(&env);
        let util = Self::utilization(cash, borrows, reserves)?;
        let base = read(&env, &DataKey::BaseRatePerBlock);
        let mult = read(&env, &DataKey::MultiplierPerBlock);
        let jump = read(&env, &DataKey::JumpMultiplierPerBlock);
        let kink = read(&env, &DataKey::Kink);
        let rate = if util <= kink {
            mul_exp(util, mult).and_then(|v| add(v, base))
        } else {
            mul_exp(kink, mult)
                .and_then(|v| add(v, base))
                .and_then(|normal| add(mul_exp(util - kink, jump)?, normal))
        };
        rate.map_err(|_| RateModelError::MathError)
    }

    pub fn get_supply_rate(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
        reserve_factor: u128,
    ) -> Result<u128, RateModelError> {
        let one_minus_rf = sub(EXP_SCALE, reserve_factor).map_err(|_| RateModelError::MathError)?;
        let borrow_rate = Self::get_borrow_rate(env, cash, borrows, reserves)?;
        let rate_to_pool = mul_exp(borrow_rate, one_minus_rf).map_err(|_| RateModelError::MathError)?;
        let util = Self::utilization(cash, borrows, reserves)?;
        mul_exp(util, rate_to_pool).map_err(|_| RateModelError::MathError)
    }

    /// `borrows / (cash + borrows - reserves)` as a 1e18 mantissa.
    pub fn utilization(cash: u128, borrows: u128, reserves: u128) -> Result<u128, RateModelError> {
        if borrows == 0 {
            return Ok(0);
        }
        add(cash, borrows)
            .and_then(|v| sub(v, reserves))
            .and_then(|denom| div_exp(borrows, denom))
            .map_err(|_| RateModelError::MathError)
    }

    pub fn kink(env: Env) -> u128 {
        read(&env, &DataKey::Kink)
    }

    pub fn base_rate_per_block(env: Env) -> u128 {
        read(&env, &DataKey::BaseRatePerBlock)
    }

    pub fn multiplier_per_block(env: Env) -> u128 {
        read(&env, &DataKey::MultiplierPerBlock)
    }

    pub fn jump_multiplier_per_block(env: Env) -> u128 {
        read(&env, &DataKey::JumpMultiplierPerBlock)
    }
}

fn write_params(
    env: &Env,
    base_rate_per_year: u128,
    multiplier_per_year: u128,
    jump_multiplier_per_year: u128,
    kink: u128,
) -> Result<(), RateModelError> {
    if kink == 0 || kink > EXP_SCALE {
        return Err(RateModelError::InvalidKink);
    }
    let base = base_rate_per_year / BLOCKS_PER_YEAR;
    // The multiplier is quoted at the kink, not at full utilization.
    let multiplier = mul(BLOCKS_PER_YEAR, kink)
        .and_then(|denom| mul_div(multiplier_per_year, EXP_SCALE, denom))
        .map_err(|_| RateModelError::MathError)?;
    let jump = jump_multiplier_per_year / BLOCKS_PER_YEAR;

    let persistent = env.storage().persistent();
    persistent.set(&DataKey::BaseRatePerBlock, &base);
    persistent.set(&DataKey::MultiplierPerBlock, &multiplier);
    persistent.set(&DataKey::JumpMultiplierPerBlock, &jump);
    persistent.set(&DataKey::Kink, &kink);
    bump_ttl(env);
    NewInterestParams {
        base_rate_per_block: base,
        multiplier_per_block: multiplier,
        jump_multiplier_per_block: jump,
        kink,
    }
    .publish(env);
    Ok(())
}

fn read(env: &Env, key: &DataKey) -> u128 {
    env.storage().persistent().get(key).unwrap_or(0u128)
}

fn ensure_initialized(env: &Env) -> Result<(), RateModelError> {
    if !env.storage().persistent().has(&DataKey::Admin) {
        return Err(RateModelError::NotInitialized);
    }
    Ok(())
}

fn bump_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Admin,
        DataKey::BaseRatePerBlock,
        DataKey::MultiplierPerBlock,
        DataKey::JumpMultiplierPerBlock,
        DataKey::Kink,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}
