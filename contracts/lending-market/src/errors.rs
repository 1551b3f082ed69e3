use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MarketError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    StaleLedger = 4,
    StaleCollateral = 5,
    ControllerRejection = 6,
    InterestRateModelFailure = 7,
    BorrowRateAbsurdlyHigh = 8,
    BlockDeltaNegative = 9,
    AccrualSimpleInterestFactor = 10,
    AccrualAccumulatedInterest = 11,
    AccrualTotalBorrows = 12,
    AccrualTotalReserves = 13,
    AccrualBorrowIndex = 14,
    BorrowBalanceCalculation = 15,
    ExchangeRateCalculation = 16,
    MathError = 17,
    InvalidInput = 18,
    InsufficientCash = 19,
    InsufficientBalance = 20,
    RepayExceedsBorrow = 21,
    InvalidAccountPair = 22,
    InvalidCloseAmount = 23,
    InvalidCollateralMarket = 24,
    CollateralAccrualFailure = 25,
    SeizeCalculationFailure = 26,
    CollateralSeizeFailure = 27,
}
