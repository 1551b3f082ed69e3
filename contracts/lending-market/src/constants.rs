pub use fixed_point::EXP_SCALE;

/// Ceiling on the model's output: 0.0005% per block.
pub const MAX_BORROW_RATE_PER_BLOCK: u128 = 5_000_000_000_000u128;
pub const RESERVE_FACTOR_MAX: u128 = EXP_SCALE;
/// Share of seized collateral kept as reserves (2.8%).
pub const PROTOCOL_SEIZE_SHARE: u128 = 28_000_000_000_000_000u128;
