#![no_std]

mod constants;
mod contract;
mod events;
mod flywheel;
mod helpers;
mod liquidation;
mod liquidity;
mod speeds;
mod storage;

pub use constants::*;
pub use contract::{LendingController, LendingControllerClient};
pub use events::*;
pub use liquidation::seize_tokens;
pub use storage::{MarketConfig, RewardMarketState};

mod test;
