//! External position valuation
//!
//! Positions the custody holds outside its own balances (lending-market
//! collateral and debt) are valued through the `PositionValuer` capability.
//! The `PositionManager` sums every registered connector so the engine only
//! ever queries one address.

use odra::prelude::*;
use odra::casper_types::U256;

pub mod position_manager;
pub mod lending_connector;
pub mod errors;
pub mod events;

pub use position_manager::{PositionManager, Connector, PositionKind};
pub use lending_connector::{LendingConnector, Market};
pub use errors::PositionError;
pub use events::*;

/// Base-currency value of a holder's external positions
#[odra::odra_type]
pub struct PositionValue {
    /// Value of deposited collateral
    pub collateral: U256,
    /// Value of outstanding debt
    pub debt: U256,
}

impl PositionValue {
    pub fn zero() -> Self {
        Self {
            collateral: U256::zero(),
            debt: U256::zero(),
        }
    }

    /// Collateral minus debt, or `None` when debt exceeds collateral
    pub fn net(&self) -> Option<U256> {
        self.collateral.checked_sub(self.debt)
    }
}

/// Anything that can value a holder's positions in base currency
#[odra::external_contract]
pub trait PositionValuer {
    fn position_value(&self, holder: Address) -> PositionValue;
}
