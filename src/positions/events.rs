//! Events for position valuation

use odra::prelude::*;
use odra::casper_types::U256;
use super::position_manager::PositionKind;

// ============================================================================
// Position Manager Events
// ============================================================================

/// Event emitted when a connector is registered
#[odra::event]
pub struct ConnectorRegistered {
    pub name: String,
    pub connector: Address,
    pub kind: PositionKind,
}

/// Event emitted when a connector's kind changes
#[odra::event]
pub struct ConnectorKindChanged {
    pub name: String,
    pub kind: PositionKind,
}

// ============================================================================
// Lending Connector Events
// ============================================================================

/// Event emitted when a market is listed
#[odra::event]
pub struct MarketListed {
    pub symbol: String,
    pub asset: Address,
}

/// Event emitted when collateral is supplied
#[odra::event]
pub struct CollateralDeposited {
    /// Position holder
    pub holder: Address,
    /// Collateral asset
    pub asset: Address,
    /// Amount supplied
    pub amount: U256,
}

/// Event emitted when collateral is withdrawn
#[odra::event]
pub struct CollateralWithdrawn {
    pub holder: Address,
    pub asset: Address,
    pub amount: U256,
}

/// Event emitted when an asset is borrowed
#[odra::event]
pub struct Borrowed {
    pub holder: Address,
    pub asset: Address,
    pub amount: U256,
}

/// Event emitted when debt is repaid
#[odra::event]
pub struct Repaid {
    pub holder: Address,
    pub asset: Address,
    pub amount: U256,
}
