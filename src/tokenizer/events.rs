//! Events for the vault engine

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Configuration Events
// ============================================================================

/// Event emitted once the engine is bound to its custody
#[odra::event]
pub struct Initialized {
    /// Custody holding pool funds
    pub custody: Address,
    /// Owner of the configuration
    pub owner: Address,
}

/// Event emitted when a component address is bound
#[odra::event]
pub struct ComponentBound {
    /// "position_manager", "tokenized_share" or "oracle_handler"
    pub component: String,
    pub address: Address,
}

/// Event emitted when a currency is whitelisted or re-pointed
#[odra::event]
pub struct CurrencyAdded {
    pub symbol: String,
    pub token: Address,
    pub is_direct: bool,
}

/// Event emitted when a currency is removed from the whitelist
#[odra::event]
pub struct CurrencyRemoved {
    pub symbol: String,
}

/// Event emitted when ownership changes hands
#[odra::event]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

// ============================================================================
// Settlement Events
// ============================================================================

/// Event emitted on every deposit
#[odra::event]
pub struct Deposited {
    /// Address that deposited and received the shares
    pub depositor: Address,
    /// Currency deposited
    pub currency: String,
    /// Amount in the deposited currency
    pub amount: U256,
    /// Amount in base currency
    pub base_amount: U256,
    /// Shares minted
    pub shares: U256,
    /// Price per share the deposit settled at
    pub price_per_share: U256,
}

/// Event emitted on every redemption
#[odra::event]
pub struct Redeemed {
    /// Address that burned shares and received base currency
    pub redeemer: Address,
    /// Shares burned
    pub shares: U256,
    /// Base currency paid out
    pub base_amount: U256,
    /// Price per share the redemption settled at
    pub price_per_share: U256,
}

/// Event emitted when the owner moves custody funds into the engine
#[odra::event]
pub struct LiquidityPulled {
    pub custody: Address,
    pub currency: String,
    pub amount: U256,
}

/// Event emitted when engine-held funds go back to custody
#[odra::event]
pub struct LiquidityReturned {
    pub custody: Address,
    pub currency: String,
    pub amount: U256,
}
