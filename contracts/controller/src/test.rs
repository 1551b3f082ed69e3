#![cfg(test)]
use super::*;
use ledger_interface::{AccountSnapshot, ControllerError, MarketSnapshot};
use mock_price_oracle::{MockPriceOracle, MockPriceOracleClient};
use soroban_sdk::testutils::Ledger;
use soroban_sdk::{contract, contractimpl, contracttype};
use soroban_sdk::{testutils::Address as _, token, vec, Address, Env};

const E18: u128 = 1_000_000_000_000_000_000;
const E36: u128 = E18 * E18;

// Stand-in market: serves whatever snapshots the test stores.
#[contracttype]
enum HarnessKey {
    Market,
    Account(Address),
}

#[contract]
pub struct HarnessMarket;

#[contractimpl]
impl HarnessMarket {
    pub fn set_market(env: Env, snapshot: MarketSnapshot) {
        env.storage().persistent().set(&HarnessKey::Market, &snapshot);
    }

    pub fn set_account(env: Env, account: Address, snapshot: AccountSnapshot) {
        env.storage()
            .persistent()
            .set(&HarnessKey::Account(account), &snapshot);
    }

    pub fn market_snapshot(env: Env) -> MarketSnapshot {
        env.storage()
            .persistent()
            .get(&HarnessKey::Market)
            .unwrap_or(market_state(0, 0, E18))
    }

    pub fn get_account_snapshot(env: Env, account: Address) -> AccountSnapshot {
        let exchange_rate = Self::market_snapshot(env.clone()).exchange_rate;
        env.storage()
            .persistent()
            .get(&HarnessKey::Account(account))
            .unwrap_or(AccountSnapshot {
                tokens: 0,
                borrow_balance: 0,
                exchange_rate,
            })
    }

    pub fn exchange_rate_stored(env: Env) -> u128 {
        Self::market_snapshot(env).exchange_rate
    }

    pub fn accrue_interest(_env: Env) {}

    pub fn accrual_block_number(env: Env) -> u32 {
        env.ledger().sequence()
    }
}

fn market_state(total_supply: u128, total_borrows: u128, borrow_index: u128) -> MarketSnapshot {
    MarketSnapshot {
        total_supply,
        total_borrows,
        borrow_index,
        exchange_rate: E18,
        reserve_factor: 0,
    }
}

fn account_state(tokens: u128, borrow_balance: u128) -> AccountSnapshot {
    AccountSnapshot {
        tokens,
        borrow_balance,
        exchange_rate: E18,
    }
}

struct Fixture<'a> {
    env: Env,
    admin: Address,
    controller: LendingControllerClient<'a>,
    oracle: MockPriceOracleClient<'a>,
    reward: token::Client<'a>,
    reward_admin: token::StellarAssetClient<'a>,
}

impl<'a> Fixture<'a> {
    fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_sequence_number(100);

        let admin = Address::generate(&env);
        let oracle_id = env.register(MockPriceOracle, ());
        let reward_id = env
            .register_stellar_asset_contract_v2(admin.clone())
            .address();
        let controller_id = env.register(LendingController, ());
        let controller = LendingControllerClient::new(&env, &controller_id);
        controller.initialize(&admin, &oracle_id, &reward_id);

        Fixture {
            oracle: MockPriceOracleClient::new(&env, &oracle_id),
            reward: token::Client::new(&env, &reward_id),
            reward_admin: token::StellarAssetClient::new(&env, &reward_id),
            controller,
            admin,
            env,
        }
    }

    fn list_market(&self, price: u128, snapshot: MarketSnapshot) -> (Address, HarnessMarketClient<'a>) {
        let id = self.env.register(HarnessMarket, ());
        let market = HarnessMarketClient::new(&self.env, &id);
        market.set_market(&snapshot);
        self.oracle.set_underlying_price(&id, &price);
        self.controller.support_market(&id);
        (id, market)
    }

    fn advance(&self, blocks: u32) {
        let current = self.env.ledger().sequence();
        self.env.ledger().set_sequence_number(current + blocks);
    }

    fn fund_rewards(&self, amount: u128) {
        self.reward_admin
            .mint(&self.controller.address, &(amount as i128));
    }
}

#[test]
fn test_initialize_sets_defaults() {
    let f = Fixture::new();
    assert_eq!(f.controller.admin(), f.admin);
    assert_eq!(f.controller.close_factor(), DEFAULT_CLOSE_FACTOR);
    assert_eq!(f.controller.liquidation_incentive(), DEFAULT_LIQUIDATION_INCENTIVE);
    assert_eq!(f.controller.reward_rate(), 0);

    let other = Address::generate(&f.env);
    let result = f
        .controller
        .try_initialize(&other, &other, &other);
    assert_eq!(result, Err(Ok(ControllerError::AlreadyInitialized)));
}

#[test]
fn test_support_market_creates_reward_states() {
    let f = Fixture::new();
    let (market, _) = f.list_market(E18, market_state(0, 0, E18));

    let initial = RewardMarketState {
        index: E36,
        block: 100,
    };
    assert_eq!(f.controller.supply_state(&market), Some(initial.clone()));
    assert_eq!(f.controller.borrow_state(&market), Some(initial));
    assert_eq!(f.controller.get_all_markets(), vec![&f.env, market.clone()]);
    assert_eq!(
        f.controller.try_support_market(&market),
        Err(Ok(ControllerError::MarketAlreadyListed))
    );
}

#[test]
fn test_risk_parameter_validation() {
    let f = Fixture::new();
    let (market, _) = f.list_market(E18, market_state(0, 0, E18));
    let unlisted = Address::generate(&f.env);

    assert_eq!(
        f.controller.try_set_collateral_factor(&market, &(E18 * 95 / 100)),
        Err(Ok(ControllerError::InvalidCollateralFactor))
    );
    assert_eq!(
        f.controller.try_set_collateral_factor(&unlisted, &(E18 / 2)),
        Err(Ok(ControllerError::MarketNotListed))
    );
    f.oracle.set_underlying_price(&market, &0);
    assert_eq!(
        f.controller.try_set_collateral_factor(&market, &(E18 / 2)),
        Err(Ok(ControllerError::PriceError))
    );
    // A zero factor needs no price.
    f.controller.set_collateral_factor(&market, &0);

    assert_eq!(
        f.controller.try_set_close_factor(&0),
        Err(Ok(ControllerError::InvalidCloseFactor))
    );
    assert_eq!(
        f.controller.try_set_close_factor(&(E18 + 1)),
        Err(Ok(ControllerError::InvalidCloseFactor))
    );
    assert_eq!(
        f.controller.try_set_liquidation_incentive(&(E18 - 1)),
        Err(Ok(ControllerError::InvalidLiquidationIncentive))
    );
    f.controller.set_liquidation_incentive(&E18);
    assert_eq!(f.controller.liquidation_incentive(), E18);
}

#[test]
fn test_supply_index_growth() {
    let f = Fixture::new();
    let (market, _) = f.list_market(E18, market_state(10 * E18, 0, E18));
    f.controller
        .set_reward_speeds(&vec![&f.env, market.clone()], &vec![&f.env, E18 / 2], &vec![&f.env, 0]);
    assert_eq!(f.controller.get_reward_markets(), vec![&f.env, market.clone()]);

    f.advance(100);
    let state = f.controller.update_supply_index(&market);
    assert_eq!(state.index, 6 * E36);
    assert_eq!(state.block, 200);

    // Same block: nothing moves.
    assert_eq!(f.controller.update_supply_index(&market), state);
}

#[test]
fn test_borrower_distribution() {
    let f = Fixture::new();
    let borrower = Address::generate(&f.env);
    let borrow_index = E18 * 11 / 10;
    // 11e18 borrowed at index 1.1 is 10e18 of principal.
    let (market, harness) = f.list_market(E18, market_state(0, 11 * E18, borrow_index));
    harness.set_account(&borrower, &account_state(0, E18 * 55 / 10));
    f.controller
        .set_reward_speeds(&vec![&f.env, market.clone()], &vec![&f.env, 0], &vec![&f.env, E18 / 2]);

    // First touch primes the checkpoint and credits nothing.
    assert_eq!(f.controller.distribute_borrower_reward(&market, &borrower), 0);
    assert_eq!(f.controller.borrower_index(&market, &borrower), Some(E36));

    f.advance(100);
    assert_eq!(f.controller.update_borrow_index(&market).index, 6 * E36);
    assert_eq!(
        f.controller.distribute_borrower_reward(&market, &borrower),
        25 * E18
    );
    assert_eq!(f.controller.reward_accrued(&borrower), 25 * E18);
    assert_eq!(f.controller.borrower_index(&market, &borrower), Some(6 * E36));
}

#[test]
fn test_new_account_is_primed_at_current_index() {
    let f = Fixture::new();
    let late = Address::generate(&f.env);
    let (market, harness) = f.list_market(E18, market_state(10 * E18, 0, E18));
    harness.set_account(&late, &account_state(10 * E18, 0));
    f.controller
        .set_reward_speeds(&vec![&f.env, market.clone()], &vec![&f.env, E18 / 2], &vec![&f.env, 0]);

    f.advance(100);
    f.controller.update_supply_index(&market);
    assert_eq!(f.controller.distribute_supplier_reward(&market, &late), 0);
    assert_eq!(f.controller.supplier_index(&market, &late), Some(6 * E36));
    assert_eq!(f.controller.reward_accrued(&late), 0);
}

#[test]
fn test_index_frozen_outside_reward_set() {
    let f = Fixture::new();
    let (market, _) = f.list_market(E18, market_state(10 * E18, 0, E18));

    f.advance(50);
    let state = f.controller.update_supply_index(&market);
    assert_eq!(state.index, E36);
    assert_eq!(state.block, 150);
}

#[test]
fn test_speed_change_settles_and_drop_preserves_index() {
    let f = Fixture::new();
    let (market, _) = f.list_market(E18, market_state(10 * E18, 0, E18));
    let markets = vec![&f.env, market.clone()];
    f.controller
        .set_reward_speeds(&markets, &vec![&f.env, E18 / 2], &vec![&f.env, 0]);

    f.advance(20);
    // Dropping settles the last 20 blocks at the old speed first.
    f.controller
        .set_reward_speeds(&markets, &vec![&f.env, 0], &vec![&f.env, 0]);
    let dropped = f.controller.supply_state(&market).unwrap();
    assert_eq!(dropped.index, 2 * E36);
    assert_eq!(dropped.block, 120);
    assert_eq!(f.controller.get_reward_markets().len(), 0);
    assert!(!f.controller.market_config(&market).unwrap().is_reward_market);

    f.advance(50);
    let idle = f.controller.update_supply_index(&market);
    assert_eq!(idle.index, 2 * E36);
    assert_eq!(idle.block, 170);

    // Back in the set, accrual resumes from the preserved index.
    f.controller
        .set_reward_speeds(&markets, &vec![&f.env, E18 / 2], &vec![&f.env, 0]);
    assert_eq!(f.controller.supply_state(&market).unwrap().index, 2 * E36);
    f.advance(20);
    assert_eq!(f.controller.update_supply_index(&market).index, 3 * E36);
}

#[test]
fn test_set_reward_speeds_validation() {
    let f = Fixture::new();
    let (market, _) = f.list_market(E18, market_state(0, 0, E18));
    let unlisted = Address::generate(&f.env);

    assert_eq!(
        f.controller.try_set_reward_speeds(
            &vec![&f.env, market.clone()],
            &vec![&f.env, 1, 2],
            &vec![&f.env, 1]
        ),
        Err(Ok(ControllerError::InvalidInput))
    );
    assert_eq!(
        f.controller.try_set_reward_speeds(
            &vec![&f.env, unlisted],
            &vec![&f.env, 1],
            &vec![&f.env, 1]
        ),
        Err(Ok(ControllerError::MarketNotListed))
    );
}

#[test]
fn test_add_reward_markets_preserves_existing_state() {
    let f = Fixture::new();
    let (market, _) = f.list_market(E18, market_state(0, 0, E18));
    let markets = vec![&f.env, market.clone()];
    f.controller
        .set_reward_speeds(&markets, &vec![&f.env, E18], &vec![&f.env, E18]);

    // No supply: the index holds while the block advances.
    f.advance(10);
    let state = f.controller.update_supply_index(&market);
    assert_eq!(state.index, E36);
    assert_eq!(state.block, 110);

    f.controller
        .set_reward_speeds(&markets, &vec![&f.env, 0], &vec![&f.env, 0]);
    f.advance(10);
    f.controller.add_reward_markets(&markets);

    let readded = f.controller.supply_state(&market).unwrap();
    assert_eq!(readded.index, E36);
    assert_eq!(readded.block, 120);
    assert_eq!(f.controller.get_reward_markets(), markets);
    assert_eq!(
        f.controller.try_add_reward_markets(&markets),
        Err(Ok(ControllerError::AlreadyRewardMarket))
    );
    let unlisted = Address::generate(&f.env);
    assert_eq!(
        f.controller.try_add_reward_markets(&vec![&f.env, unlisted]),
        Err(Ok(ControllerError::MarketNotListed))
    );
}

#[test]
fn test_refresh_splits_rate_by_borrow_utility() {
    let f = Fixture::new();
    let (small, _) = f.list_market(E18, market_state(0, 10 * E18, E18));
    let (large, _) = f.list_market(E18, market_state(0, 30 * E18, E18));
    let (idle, _) = f.list_market(E18, market_state(0, 0, E18));

    f.controller
        .add_reward_markets(&vec![&f.env, small.clone(), large.clone(), idle.clone()]);
    f.controller.set_reward_rate(&(4 * E18));

    assert_eq!(f.controller.supply_speed(&small), E18);
    assert_eq!(f.controller.borrow_speed(&small), E18);
    assert_eq!(f.controller.supply_speed(&large), 3 * E18);
    assert_eq!(f.controller.borrow_speed(&large), 3 * E18);
    assert_eq!(f.controller.supply_speed(&idle), 0);
    // Refresh never drops a market.
    assert_eq!(f.controller.get_reward_markets().len(), 3);

    f.oracle.set_underlying_price(&large, &0);
    assert_eq!(
        f.controller.try_refresh_speeds(),
        Err(Ok(ControllerError::PriceError))
    );
}

#[test]
fn test_claim_pays_once() {
    let f = Fixture::new();
    let holder = Address::generate(&f.env);
    let (market, harness) = f.list_market(E18, market_state(10 * E18, 0, E18));
    harness.set_account(&holder, &account_state(10 * E18, 0));
    f.controller
        .set_reward_speeds(&vec![&f.env, market.clone()], &vec![&f.env, E18], &vec![&f.env, 0]);
    f.fund_rewards(100 * E18);
    f.controller.distribute_supplier_reward(&market, &holder);

    f.advance(10);
    // Duplicates in both lists settle once.
    f.controller.claim_reward(
        &vec![&f.env, holder.clone(), holder.clone()],
        &vec![&f.env, market.clone(), market.clone()],
        &false,
        &true,
    );
    assert_eq!(f.reward.balance(&holder), (10 * E18) as i128);
    assert_eq!(f.controller.reward_accrued(&holder), 0);

    f.controller.claim_reward(
        &vec![&f.env, holder.clone()],
        &vec![&f.env, market.clone()],
        &false,
        &true,
    );
    assert_eq!(f.reward.balance(&holder), (10 * E18) as i128);
    assert_eq!(f.reward.balance(&f.controller.address), (90 * E18) as i128);
}

#[test]
fn test_claim_rejects_unlisted_market() {
    let f = Fixture::new();
    let holder = Address::generate(&f.env);
    let (market, harness) = f.list_market(E18, market_state(10 * E18, 0, E18));
    harness.set_account(&holder, &account_state(10 * E18, 0));
    f.controller
        .set_reward_speeds(&vec![&f.env, market.clone()], &vec![&f.env, E18], &vec![&f.env, 0]);
    f.fund_rewards(100 * E18);
    f.controller.distribute_supplier_reward(&market, &holder);
    f.advance(10);

    let unlisted = Address::generate(&f.env);
    let result = f.controller.try_claim_reward(
        &vec![&f.env, holder.clone()],
        &vec![&f.env, market.clone(), unlisted],
        &true,
        &true,
    );
    assert_eq!(result, Err(Ok(ControllerError::MarketNotListed)));
    assert_eq!(f.reward.balance(&holder), 0);
    assert_eq!(f.controller.supply_state(&market).unwrap().block, 100);
}

#[test]
fn test_claim_below_threshold_keeps_accrued() {
    let f = Fixture::new();
    let holder = Address::generate(&f.env);
    let (market, harness) = f.list_market(E18, market_state(10 * E18, 0, E18));
    harness.set_account(&holder, &account_state(10 * E18, 0));
    f.controller
        .set_reward_speeds(&vec![&f.env, market.clone()], &vec![&f.env, E18], &vec![&f.env, 0]);
    f.controller.set_claim_threshold(&(100 * E18));
    f.fund_rewards(100 * E18);
    f.controller.distribute_supplier_reward(&market, &holder);

    f.advance(10);
    f.controller.claim_reward_for(&holder);
    assert_eq!(f.reward.balance(&holder), 0);
    assert_eq!(f.controller.reward_accrued(&holder), 10 * E18);
}

#[test]
fn test_claim_short_reserve_defers_payment() {
    let f = Fixture::new();
    let holder = Address::generate(&f.env);
    let (market, harness) = f.list_market(E18, market_state(10 * E18, 0, E18));
    harness.set_account(&holder, &account_state(10 * E18, 0));
    f.controller
        .set_reward_speeds(&vec![&f.env, market.clone()], &vec![&f.env, E18], &vec![&f.env, 0]);
    f.fund_rewards(5 * E18);
    f.controller.distribute_supplier_reward(&market, &holder);

    f.advance(10);
    f.controller.claim_reward_for(&holder);
    // Never a partial transfer.
    assert_eq!(f.reward.balance(&holder), 0);
    assert_eq!(f.controller.reward_accrued(&holder), 10 * E18);

    f.fund_rewards(5 * E18);
    f.controller.claim_reward_for(&holder);
    assert_eq!(f.reward.balance(&holder), (10 * E18) as i128);
    assert_eq!(f.controller.reward_accrued(&holder), 0);
}

#[test]
fn test_grant_reward_requires_reserve() {
    let f = Fixture::new();
    let recipient = Address::generate(&f.env);
    f.fund_rewards(5 * E18);

    assert_eq!(
        f.controller.try_grant_reward(&recipient, &(10 * E18)),
        Err(Ok(ControllerError::InsufficientReserve))
    );
    f.controller.grant_reward(&recipient, &(5 * E18));
    assert_eq!(f.reward.balance(&recipient), (5 * E18) as i128);
}

#[test]
fn test_contributor_stream() {
    let f = Fixture::new();
    let contributor = Address::generate(&f.env);
    f.controller.set_contributor_speed(&contributor, &2000);
    assert_eq!(f.controller.contributor_speed(&contributor), 2000);

    f.advance(50);
    f.controller.update_contributor_rewards(&contributor);
    assert_eq!(f.controller.reward_accrued(&contributor), 100_000);

    f.advance(10);
    f.controller.set_contributor_speed(&contributor, &0);
    assert_eq!(f.controller.reward_accrued(&contributor), 120_000);

    f.advance(50);
    f.controller.update_contributor_rewards(&contributor);
    assert_eq!(f.controller.reward_accrued(&contributor), 120_000);

    // Accounts that never had a stream are left alone.
    let stranger = Address::generate(&f.env);
    f.controller.update_contributor_rewards(&stranger);
    assert_eq!(f.controller.reward_accrued(&stranger), 0);
}

#[test]
fn test_seize_calculation() {
    let f = Fixture::new();
    let (borrowed, _) = f.list_market(2 * E18, market_state(0, 0, E18));
    let mut collateral_state = market_state(0, 0, E18);
    collateral_state.exchange_rate = E18 * 142 / 100;
    let (collateral, _) = f.list_market(2 * E18, collateral_state);
    f.controller.set_liquidation_incentive(&E18);

    assert_eq!(
        f.controller
            .liquidate_calculate_seize_tokens(&borrowed, &collateral, &E18),
        704_225_352_112_676_056
    );

    f.oracle.set_underlying_price(&collateral, &0);
    assert_eq!(
        f.controller
            .try_liquidate_calculate_seize_tokens(&borrowed, &collateral, &E18),
        Err(Ok(ControllerError::PriceError))
    );
}

#[test]
fn test_account_liquidity_and_borrow_hook() {
    let f = Fixture::new();
    let account = Address::generate(&f.env);
    let (collateral, collateral_market) = f.list_market(E18, market_state(100 * E18, 0, E18));
    let (borrowed, _) = f.list_market(E18, market_state(0, 0, E18));
    f.controller.set_collateral_factor(&collateral, &(E18 / 2));
    collateral_market.set_account(&account, &account_state(100 * E18, 0));
    f.controller
        .enter_markets(&account, &vec![&f.env, collateral.clone()]);

    assert_eq!(f.controller.get_account_liquidity(&account), (50 * E18, 0));

    let state = market_state(0, 0, E18);
    assert_eq!(
        f.controller.try_borrow_allowed(
            &borrowed,
            &account,
            &(60 * E18),
            &state,
            &account_state(0, 0)
        ),
        Err(Ok(ControllerError::InsufficientLiquidity))
    );
    assert!(!f.controller.check_membership(&account, &borrowed));

    f.controller
        .borrow_allowed(&borrowed, &account, &(40 * E18), &state, &account_state(0, 0));
    assert!(f.controller.check_membership(&account, &borrowed));
    assert_eq!(
        f.controller
            .hypothetical_liquidity(&account, &borrowed, &0, &(60 * E18)),
        (0, 10 * E18)
    );
}

#[test]
fn test_liquidation_requires_shortfall_and_close_factor() {
    let f = Fixture::new();
    let account = Address::generate(&f.env);
    let liquidator = Address::generate(&f.env);
    let (collateral, collateral_market) = f.list_market(E18, market_state(100 * E18, 0, E18));
    let (borrowed, borrowed_market) = f.list_market(E18, market_state(0, 40 * E18, E18));
    f.controller.set_collateral_factor(&collateral, &(E18 / 2));
    collateral_market.set_account(&account, &account_state(100 * E18, 0));
    borrowed_market.set_account(&account, &account_state(0, 40 * E18));
    f.controller.enter_markets(
        &account,
        &vec![&f.env, collateral.clone(), borrowed.clone()],
    );

    let state = market_state(0, 40 * E18, E18);
    let debt = account_state(0, 40 * E18);
    assert_eq!(
        f.controller.try_liquidate_borrow_allowed(
            &borrowed,
            &collateral,
            &liquidator,
            &account,
            &(10 * E18),
            &state,
            &debt
        ),
        Err(Ok(ControllerError::InsufficientShortfall))
    );

    // Collateral now worth 25 against 40 borrowed.
    f.oracle.set_underlying_price(&collateral, &(E18 / 2));
    assert_eq!(f.controller.get_account_liquidity(&account), (0, 15 * E18));
    assert_eq!(
        f.controller.try_liquidate_borrow_allowed(
            &borrowed,
            &collateral,
            &liquidator,
            &account,
            &(25 * E18),
            &state,
            &debt
        ),
        Err(Ok(ControllerError::TooMuchRepay))
    );
    f.controller.liquidate_borrow_allowed(
        &borrowed,
        &collateral,
        &liquidator,
        &account,
        &(20 * E18),
        &state,
        &debt,
    );
}

#[test]
fn test_deprecated_market_liquidation() {
    let f = Fixture::new();
    let account = Address::generate(&f.env);
    let liquidator = Address::generate(&f.env);
    let (collateral, collateral_market) = f.list_market(E18, market_state(100 * E18, 0, E18));
    let mut state = market_state(0, 40 * E18, E18);
    state.reserve_factor = E18;
    let (borrowed, _) = f.list_market(E18, state.clone());
    f.controller.set_collateral_factor(&collateral, &(E18 / 2));
    collateral_market.set_account(&account, &account_state(100 * E18, 0));
    f.controller
        .enter_markets(&account, &vec![&f.env, collateral.clone()]);
    f.controller.set_borrow_paused(&f.admin, &borrowed, &true);
    assert!(f.controller.is_deprecated(&borrowed));

    // Healthy account, but the whole debt may be repaid.
    let debt = account_state(0, 40 * E18);
    f.controller.liquidate_borrow_allowed(
        &borrowed,
        &collateral,
        &liquidator,
        &account,
        &(40 * E18),
        &state,
        &debt,
    );
    assert_eq!(
        f.controller.try_liquidate_borrow_allowed(
            &borrowed,
            &collateral,
            &liquidator,
            &account,
            &(40 * E18 + 1),
            &state,
            &debt
        ),
        Err(Ok(ControllerError::TooMuchRepay))
    );
}

#[test]
fn test_exit_market_guards() {
    let f = Fixture::new();
    let account = Address::generate(&f.env);
    let (collateral, collateral_market) = f.list_market(E18, market_state(100 * E18, 0, E18));
    let (borrowed, borrowed_market) = f.list_market(E18, market_state(0, 40 * E18, E18));
    f.controller.set_collateral_factor(&collateral, &(E18 / 2));
    collateral_market.set_account(&account, &account_state(100 * E18, 0));
    borrowed_market.set_account(&account, &account_state(0, 40 * E18));
    f.controller.enter_markets(
        &account,
        &vec![&f.env, collateral.clone(), borrowed.clone()],
    );

    assert_eq!(
        f.controller.try_exit_market(&account, &borrowed),
        Err(Ok(ControllerError::NonzeroBorrowBalance))
    );
    assert_eq!(
        f.controller.try_exit_market(&account, &collateral),
        Err(Ok(ControllerError::InsufficientLiquidity))
    );

    borrowed_market.set_account(&account, &account_state(0, 0));
    f.controller.exit_market(&account, &collateral);
    assert_eq!(f.controller.get_assets_in(&account), vec![&f.env, borrowed]);
}

#[test]
fn test_pause_guardian_rules() {
    let f = Fixture::new();
    let guardian = Address::generate(&f.env);
    let stranger = Address::generate(&f.env);
    let minter = Address::generate(&f.env);
    let (market, _) = f.list_market(E18, market_state(0, 0, E18));
    f.controller.set_pause_guardian(&guardian);

    f.controller.set_mint_paused(&guardian, &market, &true);
    assert!(f.controller.is_mint_paused(&market));
    assert_eq!(
        f.controller
            .try_mint_allowed(&market, &minter, &E18, &market_state(0, 0, E18), &account_state(0, 0)),
        Err(Ok(ControllerError::MintPaused))
    );

    // Only the admin may lift a pause.
    assert_eq!(
        f.controller.try_set_mint_paused(&guardian, &market, &false),
        Err(Ok(ControllerError::Unauthorized))
    );
    assert_eq!(
        f.controller.try_set_seize_paused(&stranger, &true),
        Err(Ok(ControllerError::Unauthorized))
    );
    f.controller.set_mint_paused(&f.admin, &market, &false);
    assert!(!f.controller.is_mint_paused(&market));

    f.controller.set_transfer_paused(&guardian, &true);
    assert!(f.controller.is_transfer_paused());
    f.controller.set_seize_paused(&guardian, &true);
    let other = Address::generate(&f.env);
    assert_eq!(
        f.controller.try_seize_allowed(
            &market,
            &market,
            &minter,
            &other,
            &E18,
            &market_state(0, 0, E18),
            &account_state(0, 0),
            &account_state(0, 0)
        ),
        Err(Ok(ControllerError::SeizePaused))
    );
}

#[test]
fn test_seize_hook_distributes_to_both_parties() {
    let f = Fixture::new();
    let borrower = Address::generate(&f.env);
    let liquidator = Address::generate(&f.env);
    let (collateral, _) = f.list_market(E18, market_state(10 * E18, 0, E18));
    let (borrowed, _) = f.list_market(E18, market_state(0, 0, E18));
    f.controller.set_reward_speeds(
        &vec![&f.env, collateral.clone()],
        &vec![&f.env, E18],
        &vec![&f.env, 0],
    );

    let state = market_state(10 * E18, 0, E18);
    let seize = |borrower_tokens: u128, liquidator_tokens: u128| {
        f.controller.seize_allowed(
            &collateral,
            &borrowed,
            &liquidator,
            &borrower,
            &E18,
            &state,
            &account_state(borrower_tokens, 0),
            &account_state(liquidator_tokens, 0),
        )
    };
    seize(10 * E18, 0);
    f.advance(10);
    seize(10 * E18, 0);

    assert_eq!(f.controller.reward_accrued(&borrower), 10 * E18);
    assert_eq!(f.controller.reward_accrued(&liquidator), 0);
    assert_eq!(
        f.controller.supplier_index(&collateral, &liquidator),
        Some(2 * E36)
    );

    let unlisted = Address::generate(&f.env);
    assert_eq!(
        f.controller.try_seize_allowed(
            &collateral,
            &unlisted,
            &liquidator,
            &borrower,
            &E18,
            &state,
            &account_state(0, 0),
            &account_state(0, 0)
        ),
        Err(Ok(ControllerError::MarketNotListed))
    );
}
