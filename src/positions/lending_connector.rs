//! Lending Connector - Minimal lending-market position book
//!
//! Holders supply collateral and borrow against it. Every listed market is
//! valued in the oracle's base currency, so a holder's position reads as
//! collateral value and debt value. Borrows are capped at the value of the
//! holder's collateral.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use super::errors::PositionError;
use super::events::*;
use super::PositionValue;
use crate::oracle::OracleHandlerContractRef;
use crate::token::Cep18TokenContractRef;

/// A listed market
#[odra::odra_type]
pub struct Market {
    /// Currency symbol, as known to the oracle
    pub symbol: String,
    /// CEP-18 token address
    pub asset: Address,
}

/// Lending Connector contract
#[odra::module(
    events = [MarketListed, CollateralDeposited, CollateralWithdrawn, Borrowed, Repaid],
    errors = PositionError
)]
pub struct LendingConnector {
    /// Oracle used to value positions
    oracle_handler: Var<Address>,
    /// Markets by index, for iteration
    markets: Mapping<u32, Market>,
    /// Asset -> market index
    market_index: Mapping<Address, u32>,
    /// Number of markets
    market_count: Var<u32>,
    /// Supplied collateral: (holder, asset) -> amount
    collateral: Mapping<(Address, Address), U256>,
    /// Outstanding debt: (holder, asset) -> amount
    debt: Mapping<(Address, Address), U256>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl LendingConnector {
    /// Initialize the connector
    ///
    /// # Arguments
    /// * `oracle_handler` - Oracle used to value non-base assets
    pub fn init(&mut self, oracle_handler: Address) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.oracle_handler.set(oracle_handler);
        self.market_count.set(0);
    }

    // ========================================
    // Market Configuration (Admin)
    // ========================================

    /// List a market for an asset
    pub fn list_market(&mut self, symbol: String, asset: Address) {
        self.only_admin();

        if self.market_index.get(&asset).is_some() {
            self.env().revert(PositionError::MarketAlreadyListed);
        }

        let index = self.market_count.get_or_default();
        self.markets.set(&index, Market { symbol: symbol.clone(), asset });
        self.market_index.set(&asset, index);
        self.market_count.set(index + 1);

        self.env().emit_event(MarketListed { symbol, asset });
    }

    pub fn get_markets(&self) -> Vec<Market> {
        let count = self.market_count.get_or_default();
        (0..count).filter_map(|i| self.markets.get(&i)).collect()
    }

    // ========================================
    // Holder Actions
    // ========================================

    /// Supply collateral, pulled from the caller
    pub fn deposit(&mut self, asset: Address, amount: U256) {
        let holder = self.env().caller();
        self.ensure_listed(asset);
        self.ensure_non_zero(amount);

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer_from(holder, self.env().self_address(), amount);

        let supplied = self.collateral_of(holder, asset);
        self.collateral.set(&(holder, asset), self.add(supplied, amount));

        self.env().emit_event(CollateralDeposited { holder, asset, amount });
    }

    /// Withdraw collateral, as long as the rest still covers the debt
    pub fn withdraw(&mut self, asset: Address, amount: U256) {
        let holder = self.env().caller();
        self.ensure_listed(asset);
        self.ensure_non_zero(amount);

        let supplied = self.collateral_of(holder, asset);
        if supplied < amount {
            self.env().revert(PositionError::InsufficientCollateral);
        }

        let position = self.position_value(holder);
        let released = self.value_of(asset, amount);
        if position.collateral.saturating_sub(released) < position.debt {
            self.env().revert(PositionError::InsufficientCollateral);
        }

        self.collateral.set(&(holder, asset), supplied - amount);

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer(holder, amount);

        self.env().emit_event(CollateralWithdrawn { holder, asset, amount });
    }

    /// Borrow an asset against supplied collateral
    pub fn borrow(&mut self, asset: Address, amount: U256) {
        let holder = self.env().caller();
        self.ensure_listed(asset);
        self.ensure_non_zero(amount);

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        if token.balance_of(self.env().self_address()) < amount {
            self.env().revert(PositionError::InsufficientLiquidity);
        }

        let position = self.position_value(holder);
        let borrowed = self.value_of(asset, amount);
        if self.add(position.debt, borrowed) > position.collateral {
            self.env().revert(PositionError::InsufficientCollateral);
        }

        let owed = self.debt_of(holder, asset);
        self.debt.set(&(holder, asset), self.add(owed, amount));

        token.transfer(holder, amount);

        self.env().emit_event(Borrowed { holder, asset, amount });
    }

    /// Repay debt, pulled from the caller
    pub fn repay(&mut self, asset: Address, amount: U256) {
        let holder = self.env().caller();
        self.ensure_listed(asset);
        self.ensure_non_zero(amount);

        let owed = self.debt_of(holder, asset);
        if amount > owed {
            self.env().revert(PositionError::ExceedsDebt);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer_from(holder, self.env().self_address(), amount);

        self.debt.set(&(holder, asset), owed - amount);

        self.env().emit_event(Repaid { holder, asset, amount });
    }

    // ========================================
    // View Functions
    // ========================================

    pub fn collateral_of(&self, holder: Address, asset: Address) -> U256 {
        self.collateral.get(&(holder, asset)).unwrap_or_default()
    }

    pub fn debt_of(&self, holder: Address, asset: Address) -> U256 {
        self.debt.get(&(holder, asset)).unwrap_or_default()
    }

    /// Collateral and debt of `holder`, in base currency
    pub fn position_value(&self, holder: Address) -> PositionValue {
        let mut value = PositionValue::zero();

        for market in self.get_markets() {
            let supplied = self.collateral_of(holder, market.asset);
            let owed = self.debt_of(holder, market.asset);
            if !supplied.is_zero() {
                value.collateral = self.add(value.collateral, self.market_value(&market, supplied));
            }
            if !owed.is_zero() {
                value.debt = self.add(value.debt, self.market_value(&market, owed));
            }
        }

        value
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(PositionError::Unauthorized)
    }

    fn value_of(&self, asset: Address, amount: U256) -> U256 {
        let index = self
            .market_index
            .get(&asset)
            .unwrap_or_revert_with(&self.env(), PositionError::MarketNotListed);
        let market = self
            .markets
            .get(&index)
            .unwrap_or_revert_with(&self.env(), PositionError::MarketNotListed);
        self.market_value(&market, amount)
    }

    fn market_value(&self, market: &Market, amount: U256) -> U256 {
        let oracle_address = self
            .oracle_handler
            .get_or_revert_with(PositionError::MarketNotListed);
        let oracle = OracleHandlerContractRef::new(self.env(), oracle_address);
        let base = oracle.base_currency();
        oracle.convert(amount, market.symbol.clone(), base)
    }

    fn ensure_listed(&self, asset: Address) {
        if self.market_index.get(&asset).is_none() {
            self.env().revert(PositionError::MarketNotListed);
        }
    }

    fn add(&self, a: U256, b: U256) -> U256 {
        a.checked_add(b)
            .unwrap_or_revert_with(&self.env(), PositionError::MathOverflow)
    }

    fn ensure_non_zero(&self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(PositionError::ZeroAmount);
        }
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        if caller != self.get_admin() {
            self.env().revert(PositionError::Unauthorized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv, HostRef};
    use crate::oracle::{OracleHandler, OracleHandlerHostRef, OracleHandlerInitArgs};
    use crate::token::{AssetToken, AssetTokenHostRef, AssetTokenInitArgs};

    const ONE_WETH: u64 = 1_000_000_000_000_000_000;

    struct Setup {
        env: HostEnv,
        usdc: AssetTokenHostRef,
        weth: AssetTokenHostRef,
        _oracle: OracleHandlerHostRef,
        lending: LendingConnectorHostRef,
        holder: Address,
    }

    fn token(env: &HostEnv, name: &str, symbol: &str, decimals: u8) -> AssetTokenHostRef {
        AssetToken::deploy(
            env,
            AssetTokenInitArgs {
                name: String::from(name),
                symbol: String::from(symbol),
                decimals,
            },
        )
    }

    fn setup() -> Setup {
        let env = odra_test::env();
        let mut usdc = token(&env, "USD Coin", "USDC", 6);
        let weth = token(&env, "Wrapped Ether", "WETH", 18);

        let mut oracle = OracleHandler::deploy(
            &env,
            OracleHandlerInitArgs {
                base_currency: String::from("USDC"),
                base_decimals: 6,
            },
        );
        // 2,000 USD, 8 decimals
        oracle.set_price(String::from("WETH"), U256::from(200_000_000_000u64), 8, 18);

        let mut lending = LendingConnector::deploy(
            &env,
            LendingConnectorInitArgs {
                oracle_handler: oracle.address().clone(),
            },
        );
        lending.list_market(String::from("USDC"), usdc.address().clone());
        lending.list_market(String::from("WETH"), weth.address().clone());

        // market liquidity
        usdc.mint(lending.address().clone(), U256::from(1_000_000_000u64));

        let holder = env.get_account(1);
        usdc.mint(holder, U256::from(100_000_000u64));
        env.set_caller(holder);
        usdc.approve(lending.address().clone(), U256::from(100_000_000u64));

        Setup { env, usdc, weth, _oracle: oracle, lending, holder }
    }

    #[test]
    fn test_deposit_values_collateral() {
        let mut s = setup();
        let usdc = s.usdc.address().clone();
        s.lending.deposit(usdc, U256::from(100_000_000u64));

        assert_eq!(s.lending.collateral_of(s.holder, usdc), U256::from(100_000_000u64));
        assert_eq!(s.usdc.balance_of(s.holder), U256::zero());
        let value = s.lending.position_value(s.holder);
        assert_eq!(value.collateral, U256::from(100_000_000u64));
        assert_eq!(value.debt, U256::zero());
    }

    #[test]
    fn test_borrow_records_debt() {
        let mut s = setup();
        let usdc = s.usdc.address().clone();
        s.lending.deposit(usdc, U256::from(100_000_000u64));
        s.lending.borrow(usdc, U256::from(3_000_000u64));

        assert_eq!(s.usdc.balance_of(s.holder), U256::from(3_000_000u64));
        let value = s.lending.position_value(s.holder);
        assert_eq!(value.collateral, U256::from(100_000_000u64));
        assert_eq!(value.debt, U256::from(3_000_000u64));
        assert_eq!(value.net(), Some(U256::from(97_000_000u64)));
    }

    #[test]
    fn test_borrow_beyond_collateral_fails() {
        let mut s = setup();
        let usdc = s.usdc.address().clone();
        s.lending.deposit(usdc, U256::from(10_000_000u64));
        assert_eq!(
            s.lending.try_borrow(usdc, U256::from(10_000_001u64)),
            Err(PositionError::InsufficientCollateral.into())
        );
        assert_eq!(s.lending.debt_of(s.holder, usdc), U256::zero());
    }

    #[test]
    fn test_non_base_collateral_valued_through_oracle() {
        let mut s = setup();
        let weth = s.weth.address().clone();
        s.weth.mint(s.holder, U256::from(ONE_WETH));
        s.weth.approve(s.lending.address().clone(), U256::from(ONE_WETH));
        s.lending.deposit(weth, U256::from(ONE_WETH / 2));

        let value = s.lending.position_value(s.holder);
        assert_eq!(value.collateral, U256::from(1_000_000_000u64)); // 1,000 USDC
    }

    #[test]
    fn test_withdraw_cannot_uncover_debt() {
        let mut s = setup();
        let usdc = s.usdc.address().clone();
        s.lending.deposit(usdc, U256::from(10_000_000u64));
        s.lending.borrow(usdc, U256::from(6_000_000u64));

        assert_eq!(
            s.lending.try_withdraw(usdc, U256::from(5_000_000u64)),
            Err(PositionError::InsufficientCollateral.into())
        );
        s.lending.withdraw(usdc, U256::from(4_000_000u64));
        assert_eq!(s.lending.collateral_of(s.holder, usdc), U256::from(6_000_000u64));
    }

    #[test]
    fn test_repay_reduces_debt() {
        let mut s = setup();
        let usdc = s.usdc.address().clone();
        s.lending.deposit(usdc, U256::from(50_000_000u64));
        s.lending.borrow(usdc, U256::from(3_000_000u64));

        s.usdc.approve(s.lending.address().clone(), U256::from(3_000_000u64));
        assert_eq!(
            s.lending.try_repay(usdc, U256::from(3_000_001u64)),
            Err(PositionError::ExceedsDebt.into())
        );
        s.lending.repay(usdc, U256::from(3_000_000u64));
        assert_eq!(s.lending.debt_of(s.holder, usdc), U256::zero());
    }

    #[test]
    fn test_unlisted_asset_rejected() {
        let mut s = setup();
        let stranger = s.env.get_account(7);
        assert_eq!(
            s.lending.try_deposit(stranger, U256::one()),
            Err(PositionError::MarketNotListed.into())
        );
    }

    #[test]
    fn test_position_value_overflow_reverts() {
        let mut s = setup();
        let mut dai = token(&s.env, "Dai", "DAI", 6);

        // a second dollar-pegged market valued at par with the base currency
        s.env.set_caller(s.env.get_account(0));
        s.lending.list_market(String::from("USDC"), dai.address().clone());

        s.env.set_caller(s.holder);
        let usdc = s.usdc.address().clone();
        s.lending.deposit(usdc, U256::from(100_000_000u64));
        dai.mint(s.holder, U256::MAX);
        dai.approve(s.lending.address().clone(), U256::MAX);
        s.lending.deposit(dai.address().clone(), U256::MAX);

        assert_eq!(
            s.lending.try_position_value(s.holder),
            Err(PositionError::MathOverflow.into())
        );
    }
}
