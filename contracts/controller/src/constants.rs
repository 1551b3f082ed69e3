pub use fixed_point::{DOUBLE_SCALE, EXP_SCALE};

/// Starting value of every reward index.
pub const REWARD_INITIAL_INDEX: u128 = DOUBLE_SCALE;
pub const COLLATERAL_FACTOR_MAX: u128 = 900_000_000_000_000_000u128; // 0.9
pub const DEFAULT_CLOSE_FACTOR: u128 = 500_000_000_000_000_000u128; // 0.5
pub const DEFAULT_LIQUIDATION_INCENTIVE: u128 = 1_080_000_000_000_000_000u128; // 1.08
