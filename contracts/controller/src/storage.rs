use ledger_interface::{ControllerError, RewardSide};
use soroban_sdk::{contracttype, Address, Env, Vec};

#[contracttype]
pub enum DataKey {
    Admin,
    Oracle,                          // Address
    RewardToken,                     // Address
    RewardRate,                      // u128 per block, split across reward markets
    ClaimThreshold,                  // u128
    CloseFactor,                     // u128 scaled 1e18
    LiquidationIncentive,            // u128 scaled 1e18
    PauseGuardian,                   // Address (optional)
    Market(Address),                 // MarketConfig
    AllMarkets,                      // Vec<Address>
    RewardMarkets,                   // Vec<Address>
    SupplyState(Address),            // RewardMarketState
    BorrowState(Address),            // RewardMarketState
    SupplierIndex(Address, Address), // (market, account) -> u128 scaled 1e36
    BorrowerIndex(Address, Address), // (market, account) -> u128 scaled 1e36
    Accrued(Address),                // u128
    SupplySpeed(Address),            // u128 per block
    BorrowSpeed(Address),            // u128 per block
    ContributorSpeed(Address),       // u128 per block
    ContributorBlock(Address),       // u32
    MintPaused(Address),             // bool
    BorrowPaused(Address),           // bool
    TransferPaused,                  // bool
    SeizePaused,                     // bool
    AccountMembership(Address, Address), // (account, market) -> bool
    AccountAssets(Address),          // Vec<Address>
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MarketConfig {
    pub is_listed: bool,
    pub collateral_factor: u128,
    pub is_reward_market: bool,
}

/// Cumulative reward per unit (1e36 scaled) and the block it was last brought to.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardMarketState {
    pub index: u128,
    pub block: u32,
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

pub fn is_initialized(env: &Env) -> bool {
    env.storage().persistent().has(&DataKey::Admin)
}

pub fn read_admin(env: &Env) -> Result<Address, ControllerError> {
    env.storage()
        .persistent()
        .get(&DataKey::Admin)
        .ok_or(ControllerError::NotInitialized)
}

pub fn require_admin(env: &Env) -> Result<Address, ControllerError> {
    let admin = read_admin(env)?;
    bump_core_ttl(env);
    admin.require_auth();
    Ok(admin)
}

pub fn read_oracle(env: &Env) -> Result<Address, ControllerError> {
    env.storage()
        .persistent()
        .get(&DataKey::Oracle)
        .ok_or(ControllerError::NotInitialized)
}

pub fn read_reward_token(env: &Env) -> Result<Address, ControllerError> {
    env.storage()
        .persistent()
        .get(&DataKey::RewardToken)
        .ok_or(ControllerError::NotInitialized)
}

pub fn read_u128(env: &Env, key: &DataKey) -> u128 {
    env.storage().persistent().get(key).unwrap_or(0u128)
}

pub fn read_flag(env: &Env, key: &DataKey) -> bool {
    env.storage().persistent().get(key).unwrap_or(false)
}

pub fn read_market_config(env: &Env, market: &Address) -> Option<MarketConfig> {
    env.storage()
        .persistent()
        .get(&DataKey::Market(market.clone()))
}

/// Config of a listed market, or `MarketNotListed`.
pub fn listed_config(env: &Env, market: &Address) -> Result<MarketConfig, ControllerError> {
    match read_market_config(env, market) {
        Some(config) if config.is_listed => Ok(config),
        _ => Err(ControllerError::MarketNotListed),
    }
}

pub fn write_market_config(env: &Env, market: &Address, config: &MarketConfig) {
    let key = DataKey::Market(market.clone());
    let persistent = env.storage().persistent();
    persistent.set(&key, config);
    persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn read_address_list(env: &Env, key: &DataKey) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(key)
        .unwrap_or(Vec::new(env))
}

pub fn write_address_list(env: &Env, key: &DataKey, list: &Vec<Address>) {
    env.storage().persistent().set(key, list);
}

fn state_key(side: RewardSide, market: &Address) -> DataKey {
    match side {
        RewardSide::Supply => DataKey::SupplyState(market.clone()),
        RewardSide::Borrow => DataKey::BorrowState(market.clone()),
    }
}

fn speed_key(side: RewardSide, market: &Address) -> DataKey {
    match side {
        RewardSide::Supply => DataKey::SupplySpeed(market.clone()),
        RewardSide::Borrow => DataKey::BorrowSpeed(market.clone()),
    }
}

fn checkpoint_key(side: RewardSide, market: &Address, account: &Address) -> DataKey {
    match side {
        RewardSide::Supply => DataKey::SupplierIndex(market.clone(), account.clone()),
        RewardSide::Borrow => DataKey::BorrowerIndex(market.clone(), account.clone()),
    }
}

pub fn read_state(env: &Env, side: RewardSide, market: &Address) -> Option<RewardMarketState> {
    let key = state_key(side, market);
    let persistent = env.storage().persistent();
    let state = persistent.get(&key);
    if state.is_some() {
        persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    state
}

pub fn write_state(env: &Env, side: RewardSide, market: &Address, state: &RewardMarketState) {
    env.storage().persistent().set(&state_key(side, market), state);
}

pub fn read_speed(env: &Env, side: RewardSide, market: &Address) -> u128 {
    read_u128(env, &speed_key(side, market))
}

pub fn write_speed(env: &Env, side: RewardSide, market: &Address, speed: u128) {
    env.storage()
        .persistent()
        .set(&speed_key(side, market), &speed);
}

pub fn read_checkpoint(
    env: &Env,
    side: RewardSide,
    market: &Address,
    account: &Address,
) -> Option<u128> {
    env.storage()
        .persistent()
        .get(&checkpoint_key(side, market, account))
}

pub fn write_checkpoint(env: &Env, side: RewardSide, market: &Address, account: &Address, index: u128) {
    let key = checkpoint_key(side, market, account);
    let persistent = env.storage().persistent();
    persistent.set(&key, &index);
    persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn read_accrued(env: &Env, account: &Address) -> u128 {
    read_u128(env, &DataKey::Accrued(account.clone()))
}

pub fn write_accrued(env: &Env, account: &Address, amount: u128) {
    let key = DataKey::Accrued(account.clone());
    let persistent = env.storage().persistent();
    persistent.set(&key, &amount);
    persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn is_member(env: &Env, account: &Address, market: &Address) -> bool {
    read_flag(
        env,
        &DataKey::AccountMembership(account.clone(), market.clone()),
    )
}

pub fn read_assets_in(env: &Env, account: &Address) -> Vec<Address> {
    read_address_list(env, &DataKey::AccountAssets(account.clone()))
}

/// Returns false when the account was already a member.
pub fn add_membership(env: &Env, account: &Address, market: &Address) -> bool {
    if is_member(env, account, market) {
        return false;
    }
    let persistent = env.storage().persistent();
    persistent.set(
        &DataKey::AccountMembership(account.clone(), market.clone()),
        &true,
    );
    let mut assets = read_assets_in(env, account);
    assets.push_back(market.clone());
    persistent.set(&DataKey::AccountAssets(account.clone()), &assets);
    true
}

pub fn remove_membership(env: &Env, account: &Address, market: &Address) {
    let persistent = env.storage().persistent();
    persistent.remove(&DataKey::AccountMembership(
        account.clone(),
        market.clone(),
    ));
    let mut assets = read_assets_in(env, account);
    if let Some(position) = assets.first_index_of(market) {
        assets.remove(position);
    }
    persistent.set(&DataKey::AccountAssets(account.clone()), &assets);
}

pub fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Admin,
        DataKey::Oracle,
        DataKey::RewardToken,
        DataKey::RewardRate,
        DataKey::ClaimThreshold,
        DataKey::CloseFactor,
        DataKey::LiquidationIncentive,
        DataKey::AllMarkets,
        DataKey::RewardMarkets,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}
