//! Position Manager - Aggregates external position connectors
//!
//! Each connector is registered under a name (e.g. "LENDING") with a kind.
//! `LendingMarket` connectors are queried for the holder's collateral and
//! debt; `None` connectors stay registered but contribute nothing, which lets
//! an operator park a connector without losing its binding.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use super::errors::PositionError;
use super::events::{ConnectorRegistered, ConnectorKindChanged};
use super::{PositionValue, PositionValuerContractRef};

/// How a connector contributes to the aggregate value
#[odra::odra_type]
pub enum PositionKind {
    /// Registered, not valued
    None,
    /// Lending-market position: collateral adds, debt subtracts
    LendingMarket,
}

/// A registered position connector
#[odra::odra_type]
pub struct Connector {
    /// Connector name
    pub name: String,
    /// Connector contract address
    pub connector: Address,
    /// Valuation kind
    pub kind: PositionKind,
}

/// Position Manager contract
#[odra::module(events = [ConnectorRegistered, ConnectorKindChanged], errors = PositionError)]
pub struct PositionManager {
    /// Connectors by index, for iteration
    connectors: Mapping<u32, Connector>,
    /// Connector name -> index
    connector_index: Mapping<String, u32>,
    /// Number of connectors
    connector_count: Var<u32>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl PositionManager {
    /// Initialize with a set of lending-market connectors
    ///
    /// # Arguments
    /// * `names` - Connector names
    /// * `connectors` - Connector addresses, same order as `names`
    pub fn init(&mut self, names: Vec<String>, connectors: Vec<Address>) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.connector_count.set(0);

        if names.len() != connectors.len() {
            self.env().revert(PositionError::LengthMismatch);
        }

        for (name, connector) in names.into_iter().zip(connectors) {
            self.register(name, connector, PositionKind::LendingMarket);
        }
    }

    /// Register a new connector (admin only)
    pub fn add_connector(&mut self, name: String, connector: Address, kind: PositionKind) {
        self.only_admin();
        self.register(name, connector, kind);
    }

    /// Change how a connector is valued (admin only)
    pub fn set_connector_kind(&mut self, name: String, kind: PositionKind) {
        self.only_admin();

        let index = self
            .connector_index
            .get(&name)
            .unwrap_or_revert_with(&self.env(), PositionError::ConnectorNotFound);
        let mut entry = self
            .connectors
            .get(&index)
            .unwrap_or_revert_with(&self.env(), PositionError::ConnectorNotFound);
        entry.kind = kind.clone();
        self.connectors.set(&index, entry);

        self.env().emit_event(ConnectorKindChanged { name, kind });
    }

    pub fn get_connector(&self, name: String) -> Option<Connector> {
        let index = self.connector_index.get(&name)?;
        self.connectors.get(&index)
    }

    pub fn get_connectors(&self) -> Vec<Connector> {
        let count = self.connector_count.get_or_default();
        (0..count).filter_map(|i| self.connectors.get(&i)).collect()
    }

    /// Sum of every lending-market connector's valuation for `holder`
    pub fn position_value(&self, holder: Address) -> PositionValue {
        let mut total = PositionValue::zero();

        for entry in self.get_connectors() {
            if entry.kind != PositionKind::LendingMarket {
                continue;
            }
            let valuer = PositionValuerContractRef::new(self.env(), entry.connector);
            let value = valuer.position_value(holder);
            total.collateral = self.add(total.collateral, value.collateral);
            total.debt = self.add(total.debt, value.debt);
        }

        total
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(PositionError::Unauthorized)
    }

    fn register(&mut self, name: String, connector: Address, kind: PositionKind) {
        if self.connector_index.get(&name).is_some() {
            self.env().revert(PositionError::ConnectorExists);
        }

        let index = self.connector_count.get_or_default();
        self.connectors.set(
            &index,
            Connector {
                name: name.clone(),
                connector,
                kind: kind.clone(),
            },
        );
        self.connector_index.set(&name, index);
        self.connector_count.set(index + 1);

        self.env().emit_event(ConnectorRegistered {
            name,
            connector,
            kind,
        });
    }

    fn add(&self, a: U256, b: U256) -> U256 {
        a.checked_add(b)
            .unwrap_or_revert_with(&self.env(), PositionError::MathOverflow)
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        if caller != self.get_admin() {
            self.env().revert(PositionError::Unauthorized);
        }
    }
}
