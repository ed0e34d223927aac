//! Error types for position valuation and the lending connector

use odra::prelude::*;

/// Errors raised by the position manager and connectors
#[odra::odra_error]
pub enum PositionError {
    /// Caller is not the admin
    Unauthorized = 300,
    /// Asset has no listed market
    MarketNotListed = 301,
    /// Asset already has a market
    MarketAlreadyListed = 302,
    /// A connector with that name already exists
    ConnectorExists = 303,
    /// No connector with that name
    ConnectorNotFound = 304,
    /// Connector names and addresses differ in length
    LengthMismatch = 305,
    /// Collateral value would not cover debt
    InsufficientCollateral = 306,
    /// Connector does not hold enough of the asset
    InsufficientLiquidity = 307,
    /// Zero amount not allowed
    ZeroAmount = 308,
    /// Repayment larger than the outstanding debt
    ExceedsDebt = 309,
    /// A summed value would overflow
    MathOverflow = 310,
}
