//! Tokenized Share - CEP-18 share token issued by the vault engine
//!
//! Balances represent proportional ownership of the pool's NAV.
//! Only the minter (the engine) can create or destroy shares.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::events::{Transfer, Approval};
use crate::errors::TokenError;
use crate::math::SHARE_DECIMALS;
use crate::token::Cep18Ledger;

/// Event emitted when the minter is re-pointed
#[odra::event]
pub struct MinterUpdated {
    pub old_minter: Address,
    pub new_minter: Address,
}

/// Share ledger contract
#[odra::module(events = [Transfer, Approval, MinterUpdated], errors = TokenError)]
pub struct TokenizedShare {
    ledger: SubModule<Cep18Ledger>,
    /// Contract allowed to mint and burn
    minter: Var<Address>,
    /// Deployer, may re-point the minter
    admin: Var<Address>,
}

#[odra::module]
impl TokenizedShare {
    /// Initialize the share token
    ///
    /// # Arguments
    /// * `minter` - Address allowed to mint and burn (the vault engine)
    pub fn init(&mut self, name: String, symbol: String, minter: Address) {
        let caller = self.env().caller();
        self.ledger.init(name, symbol, SHARE_DECIMALS);
        self.minter.set(minter);
        self.admin.set(caller);
    }

    // ========================================
    // CEP-18 Token Functions
    // ========================================

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

    pub fn transfer_from(&mut self, owner: Address, to: Address, amount: U256) -> bool {
        self.ledger.transfer_from(owner, to, amount)
    }

    // ========================================
    // Supply Management (Minter Only)
    // ========================================

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.only_minter();
        self.ledger.mint(to, amount);
    }

    pub fn burn(&mut self, from: Address, amount: U256) {
        self.only_minter();
        self.ledger.burn(from, amount);
    }

    pub fn minter(&self) -> Address {
        self.minter.get_or_revert_with(TokenError::Unauthorized)
    }

    /// Re-point the minter, e.g. after redeploying the engine behind a new address
    pub fn set_minter(&mut self, new_minter: Address) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(TokenError::Unauthorized);
        if caller != admin {
            self.env().revert(TokenError::Unauthorized);
        }

        let old_minter = self.minter();
        self.minter.set(new_minter);
        self.env().emit_event(MinterUpdated {
            old_minter,
            new_minter,
        });
    }

    fn only_minter(&self) {
        let caller = self.env().caller();
        if caller != self.minter() {
            self.env().revert(TokenError::Unauthorized);
        }
    }
}

/// External interface the engine uses to drive the share ledger
#[odra::external_contract]
pub trait ShareLedger {
    fn mint(&mut self, to: Address, amount: U256);
    fn burn(&mut self, from: Address, amount: U256);
    fn total_supply(&self) -> U256;
    fn balance_of(&self, owner: Address) -> U256;
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv};

    fn setup() -> (HostEnv, TokenizedShareHostRef, Address) {
        let env = odra_test::env();
        let minter = env.get_account(1);
        let share = TokenizedShare::deploy(
            &env,
            TokenizedShareInitArgs {
                name: String::from("Tokenized Share"),
                symbol: String::from("TSH"),
                minter,
            },
        );
        (env, share, minter)
    }

    #[test]
    fn test_init_uses_share_decimals() {
        let (_, share, minter) = setup();
        assert_eq!(share.decimals(), 6);
        assert_eq!(share.total_supply(), U256::zero());
        assert_eq!(share.minter(), minter);
    }

    #[test]
    fn test_minter_mints_and_burns() {
        let (env, mut share, minter) = setup();
        let holder = env.get_account(2);

        env.set_caller(minter);
        share.mint(holder, U256::from(1_000_000));
        assert_eq!(share.total_supply(), U256::from(1_000_000));
        assert_eq!(share.balance_of(holder), U256::from(1_000_000));

        share.burn(holder, U256::from(400_000));
        assert_eq!(share.total_supply(), U256::from(600_000));
        assert_eq!(share.balance_of(holder), U256::from(600_000));
    }

    #[test]
    fn test_burn_beyond_balance_fails() {
        let (env, mut share, minter) = setup();
        let holder = env.get_account(2);

        env.set_caller(minter);
        share.mint(holder, U256::from(10));
        assert_eq!(
            share.try_burn(holder, U256::from(11)),
            Err(TokenError::InsufficientBalance.into())
        );
        assert_eq!(share.total_supply(), U256::from(10));
    }

    #[test]
    fn test_non_minter_cannot_mint() {
        let (env, mut share, _) = setup();
        env.set_caller(env.get_account(3));
        assert_eq!(
            share.try_mint(env.get_account(3), U256::from(1)),
            Err(TokenError::Unauthorized.into())
        );
        assert_eq!(share.total_supply(), U256::zero());
    }

    #[test]
    fn test_admin_repoints_minter() {
        let (env, mut share, old_minter) = setup();
        let new_minter = env.get_account(4);

        env.set_caller(env.get_account(5));
        assert_eq!(share.try_set_minter(new_minter), Err(TokenError::Unauthorized.into()));

        env.set_caller(env.get_account(0));
        share.set_minter(new_minter);
        assert_eq!(share.minter(), new_minter);

        env.set_caller(old_minter);
        assert_eq!(
            share.try_mint(old_minter, U256::from(1)),
            Err(TokenError::Unauthorized.into())
        );
    }

    #[test]
    fn test_holders_transfer_shares() {
        let (env, mut share, minter) = setup();
        let alice = env.get_account(2);
        let bob = env.get_account(3);

        env.set_caller(minter);
        share.mint(alice, U256::from(500));

        env.set_caller(alice);
        share.transfer(bob, U256::from(200));
        assert_eq!(share.balance_of(alice), U256::from(300));
        assert_eq!(share.balance_of(bob), U256::from(200));
    }
}
