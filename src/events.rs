//! Event definitions shared by the token contracts
use odra::prelude::*;
use odra::casper_types::U256;

/// Event emitted when tokens are transferred, minted or burned
#[odra::event]
pub struct Transfer {
    /// Sender (the token itself on mint)
    pub from: Address,
    /// Recipient (the token itself on burn)
    pub to: Address,
    /// Amount moved
    pub value: U256,
}

/// Event emitted when approval is granted
#[odra::event]
pub struct Approval {
    /// Token owner
    pub owner: Address,
    /// Approved spender
    pub spender: Address,
    /// New allowance
    pub value: U256,
}
