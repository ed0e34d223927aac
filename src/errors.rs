//! Error definitions for the tokenizer contracts
use odra::prelude::*;

/// Errors raised by the vault accounting engine
#[odra::odra_error]
pub enum TokenizerError {
    /// Operation requires `initialize` to have been called
    NotInitialized = 1,

    /// `initialize` was already called on this instance
    AlreadyInitialized = 2,

    /// Caller is not the owner
    Unauthorized = 3,

    /// Currency is not in the supported set
    UnsupportedCurrency = 4,

    /// Depositor did not approve the engine for the full amount
    InsufficientAllowance = 5,

    /// Caller does not hold enough tokens or shares
    InsufficientBalance = 6,

    /// Engine does not hold enough base currency to pay out a redemption
    InsufficientDirectLiquidity = 7,

    /// Zero amount not allowed
    ZeroAmount = 8,

    /// Price per share is zero (NAV is not positive)
    ZeroPricePerShare = 9,

    /// Deposit is worth less than one share unit
    DepositTooSmall = 10,

    /// A required component binding has not been set
    ComponentNotSet = 11,

    /// The base currency cannot be removed or re-pointed
    BaseCurrencyLocked = 12,

    /// Invalid address provided
    InvalidAddress = 13,

    /// Overflow error
    MathOverflow = 14,

    /// Division by zero
    DivisionByZero = 15,

    /// Custody or engine still holds the currency being removed
    CurrencyStillHeld = 16,
}

/// Custom errors for CEP-18 token contracts
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient allowance for transfer
    InsufficientAllowance = 100,

    /// Insufficient balance for operation
    InsufficientBalance = 101,

    /// Caller may not mint or burn
    Unauthorized = 102,

    /// Supply or a balance would overflow
    MathOverflow = 103,
}

/// Errors raised by the price oracle
#[odra::odra_error]
pub enum OracleError {
    /// No feed registered for the currency, or the feed is disabled
    PriceFeedNotAvailable = 200,

    /// Feed has not been updated within the staleness window
    StalePrice = 201,

    /// Zero price, or an attempt to price the base currency
    InvalidPrice = 202,

    /// Caller is not the oracle admin
    Unauthorized = 203,

    /// Conversion overflowed
    MathOverflow = 204,
}
