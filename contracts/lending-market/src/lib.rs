#![no_std]

mod accrual;
mod constants;
mod contract;
mod errors;
mod events;
mod helpers;
mod storage;

pub use accrual::{accrue, borrow_balance, exchange_rate, AccrualOutcome};
pub use constants::*;
pub use contract::{LendingMarket, LendingMarketClient};
pub use errors::MarketError;
pub use events::*;
pub use storage::{BorrowSnapshot, MarketLedger};
