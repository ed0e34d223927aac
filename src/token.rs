//! CEP-18 token building blocks
//!
//! `Cep18Ledger` keeps balances, allowances and supply and is embedded by
//! every token in this crate. `AssetToken` wraps it with a faucet mint and
//! stands in for USDC, WETH and friends on test networks. `Cep18Token` is
//! how other contracts reach any CEP-18 token.
use odra::prelude::*;
use odra::casper_types::U256;
use crate::events::{Transfer, Approval};
use crate::errors::TokenError;

/// Balances, allowances and supply of a CEP-18 token
///
/// `mint` and `burn` are unguarded; the embedding contract decides who may
/// call them.
#[odra::module(events = [Transfer, Approval], errors = TokenError)]
pub struct Cep18Ledger {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    /// owner -> balance
    balances: Mapping<Address, U256>,
    /// (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl Cep18Ledger {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.move_balance(sender, to, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.set_allowance(owner, spender, amount);
        true
    }

    /// Spend `amount` of `owner`'s allowance to the caller
    pub fn transfer_from(&mut self, owner: Address, to: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        let remaining = self
            .allowance(owner, spender)
            .checked_sub(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::InsufficientAllowance);

        self.set_allowance(owner, spender, remaining);
        self.move_balance(owner, to, amount);
        true
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        let supply = self.add(self.total_supply(), amount);
        self.total_supply.set(supply);
        let balance = self.add(self.balance_of(to), amount);
        self.balances.set(&to, balance);

        self.env().emit_event(Transfer {
            from: self.env().self_address(),
            to,
            value: amount,
        });
    }

    pub fn burn(&mut self, from: Address, amount: U256) {
        let balance = self
            .balance_of(from)
            .checked_sub(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::InsufficientBalance);
        self.balances.set(&from, balance);
        let supply = self.total_supply();
        self.total_supply.set(supply - amount);

        self.env().emit_event(Transfer {
            from,
            to: self.env().self_address(),
            value: amount,
        });
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let remaining = self
            .balance_of(from)
            .checked_sub(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::InsufficientBalance);
        self.balances.set(&from, remaining);
        let credited = self.add(self.balance_of(to), amount);
        self.balances.set(&to, credited);

        self.env().emit_event(Transfer {
            from,
            to,
            value: amount,
        });
    }

    fn add(&self, a: U256, b: U256) -> U256 {
        a.checked_add(b)
            .unwrap_or_revert_with(&self.env(), TokenError::MathOverflow)
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.env().emit_event(Approval {
            owner,
            spender,
            value: amount,
        });
    }
}

/// Test-network asset with a faucet mint
#[odra::module(events = [Transfer, Approval], errors = TokenError)]
pub struct AssetToken {
    ledger: SubModule<Cep18Ledger>,
}

#[odra::module]
impl AssetToken {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.ledger.init(name, symbol, decimals);
    }

    pub fn name(&self) -> String {
        self.ledger.name()
    }

    pub fn symbol(&self) -> String {
        self.ledger.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.ledger.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.ledger.balance_of(owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        self.ledger.transfer(to, amount)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        self.ledger.approve(spender, amount)
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        self.ledger.transfer_from(from, to, amount)
    }

    /// Faucet mint, open to anyone
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.ledger.mint(to, amount);
    }
}

/// External token interface for interacting with CEP-18 tokens
#[odra::external_contract]
pub trait Cep18Token {
    /// Get the balance of an address
    fn balance_of(&self, owner: Address) -> U256;

    /// Transfer tokens
    fn transfer(&mut self, to: Address, amount: U256) -> bool;

    /// Transfer tokens from another address
    fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool;

    /// Approve a spender
    fn approve(&mut self, spender: Address, amount: U256) -> bool;

    /// Get allowance
    fn allowance(&self, owner: Address, spender: Address) -> U256;

    /// Get total supply
    fn total_supply(&self) -> U256;

    /// Get token symbol
    fn symbol(&self) -> String;

    /// Get token decimals
    fn decimals(&self) -> u8;
}
