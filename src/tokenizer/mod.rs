//! Tokenizer - NAV-based share issuance for a custody treasury
//!
//! The vault engine mints shares against the net asset value held by a
//! custody address (a treasury or safe), including positions the custody
//! keeps in external markets, and redeems them for base currency.
//!
//! Deployment is two-phase: the engine is constructed with its base currency,
//! then `initialize` binds the custody and fixes the owner. Components (share
//! ledger, oracle, position manager) are bound afterwards by the owner.

pub mod engine;
pub mod events;


pub use engine::{VaultEngine, NetAssetValue, SupportedCurrency};
pub use events::*;
