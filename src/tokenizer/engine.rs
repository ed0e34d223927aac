//! Vault Engine - NAV accounting, share issuance and redemption
//!
//! NAV is never stored. It is recomputed from live balances on each query:
//! - base currency held by the custody and by the engine itself
//! - supported alternate currencies held by either, valued in base currency
//! - collateral minus debt of the custody's external positions
//!
//! Deposits land directly in the custody. Redemptions are paid from the
//! engine's own base-currency balance (the redemption float), which the
//! owner tops up by pulling funds from the custody. Moving funds between
//! custody and engine leaves NAV, and therefore price per share, unchanged.
//!
//! Valuing an oracle-priced currency needs a live feed whenever the custody
//! or engine holds any of it, so anyone can make NAV depend on a feed by
//! sending a dust amount of that currency to the custody. While the feed is
//! stale or disabled, NAV, price per share, deposits and redemptions all
//! revert; refreshing the feed restores them. Such a currency cannot be
//! removed while any of it is held.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::TokenizerError;
use crate::math::{SafeMath, ShareMath};
use crate::oracle::OracleHandlerContractRef;
use crate::positions::{PositionValue, PositionValuerContractRef};
use crate::share::ShareLedgerContractRef;
use crate::token::Cep18TokenContractRef;
use super::events::*;

/// A currency accepted for deposits
#[odra::odra_type]
pub struct SupportedCurrency {
    /// Currency symbol, as known to the oracle
    pub symbol: String,
    /// CEP-18 token address
    pub token: Address,
    /// Direct currencies are worth one base unit per unit (after decimal
    /// rescaling); the rest are converted through the oracle
    pub is_direct: bool,
}

/// Net asset value in base-currency units
///
/// Kept as two non-negative halves so a pool whose debt exceeds its assets
/// can still be reported.
#[odra::odra_type]
pub struct NetAssetValue {
    /// Everything the pool holds or is owed
    pub assets: U256,
    /// Debt in external positions
    pub liabilities: U256,
}

impl NetAssetValue {
    pub fn is_negative(&self) -> bool {
        self.liabilities > self.assets
    }

    /// assets - liabilities, or `None` when negative
    pub fn value(&self) -> Option<U256> {
        self.assets.checked_sub(self.liabilities)
    }

    /// liabilities - assets, zero when NAV is non-negative
    pub fn deficit(&self) -> U256 {
        self.liabilities.saturating_sub(self.assets)
    }
}

/// Vault Engine contract
#[odra::module(
    events = [
        Initialized, ComponentBound, CurrencyAdded, CurrencyRemoved,
        OwnershipTransferred, Deposited, Redeemed, LiquidityPulled, LiquidityReturned
    ],
    errors = TokenizerError
)]
pub struct VaultEngine {
    /// Set once by `initialize`
    initialized: Var<bool>,
    /// Owner of the configuration
    owner: Var<Address>,
    /// Custody holding pool funds and positions
    custody: Var<Address>,
    /// Base currency symbol
    base_currency: Var<String>,
    /// Supported currencies by symbol
    currencies: Mapping<String, SupportedCurrency>,
    /// Currency symbols by index, for iteration
    currency_list: Mapping<u32, String>,
    /// Symbol -> index + 1 (0 when not supported)
    currency_slot: Mapping<String, u32>,
    /// Number of supported currencies
    currency_count: Var<u32>,
    /// Position manager binding
    position_manager: Var<Address>,
    /// Share ledger binding
    tokenized_share: Var<Address>,
    /// Oracle binding
    oracle_handler: Var<Address>,
}

#[odra::module]
impl VaultEngine {
    /// Construct the engine around its base currency
    ///
    /// The instance is unusable until `initialize` binds a custody.
    pub fn init(&mut self, base_currency: String, base_token: Address) {
        self.initialized.set(false);
        self.currency_count.set(0);
        self.base_currency.set(base_currency.clone());
        self.store_currency(SupportedCurrency {
            symbol: base_currency,
            token: base_token,
            is_direct: true,
        });
    }

    /// Bind the custody and make the caller the owner. Callable once.
    pub fn initialize(&mut self, custody: Address) {
        if self.initialized() {
            self.env().revert(TokenizerError::AlreadyInitialized);
        }

        if custody == self.env().self_address() {
            self.env().revert(TokenizerError::InvalidAddress);
        }

        let owner = self.env().caller();
        self.custody.set(custody);
        self.owner.set(owner);
        self.initialized.set(true);

        self.env().emit_event(Initialized { custody, owner });
    }

    // ========================================
    // Configuration (Owner Only)
    // ========================================

    pub fn set_position_manager(&mut self, position_manager: Address) {
        self.only_owner();
        self.position_manager.set(position_manager);
        self.emit_binding("position_manager", position_manager);
    }

    pub fn set_tokenized_share(&mut self, tokenized_share: Address) {
        self.only_owner();
        self.tokenized_share.set(tokenized_share);
        self.emit_binding("tokenized_share", tokenized_share);
    }

    pub fn set_oracle_handler(&mut self, oracle_handler: Address) {
        self.only_owner();
        self.oracle_handler.set(oracle_handler);
        self.emit_binding("oracle_handler", oracle_handler);
    }

    /// Whitelist a deposit currency, or re-point an existing one
    ///
    /// # Arguments
    /// * `symbol` - Currency symbol, as known to the oracle
    /// * `token` - CEP-18 token address
    /// * `is_direct` - `false` when amounts must be converted through the oracle
    pub fn add_supported_currency(&mut self, symbol: String, token: Address, is_direct: bool) {
        self.only_owner();

        if symbol == self.base_currency() {
            self.env().revert(TokenizerError::BaseCurrencyLocked);
        }

        // re-pointing would drop the old token's holdings from NAV
        if let Some(existing) = self.get_supported_currency(symbol.clone()) {
            if existing.token != token && !self.holdings_of(&existing).is_zero() {
                self.env().revert(TokenizerError::CurrencyStillHeld);
            }
        }

        self.store_currency(SupportedCurrency {
            symbol,
            token,
            is_direct,
        });
    }

    pub fn remove_supported_currency(&mut self, symbol: String) {
        self.only_owner();

        if symbol == self.base_currency() {
            self.env().revert(TokenizerError::BaseCurrencyLocked);
        }

        let record = self.supported_currency(&symbol);
        if !self.holdings_of(&record).is_zero() {
            self.env().revert(TokenizerError::CurrencyStillHeld);
        }
        let slot = self.currency_slot.get(&symbol).unwrap_or_default();

        // swap-remove from the iteration list
        let index = slot - 1;
        let last = self.currency_count.get_or_default() - 1;
        if index != last {
            let moved = self
                .currency_list
                .get(&last)
                .unwrap_or_revert_with(&self.env(), TokenizerError::UnsupportedCurrency);
            self.currency_list.set(&index, moved.clone());
            self.currency_slot.set(&moved, slot);
        }
        self.currency_slot.set(&symbol, 0);
        self.currency_count.set(last);

        self.env().emit_event(CurrencyRemoved { symbol });
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.only_owner();

        let previous_owner = self.owner();
        self.owner.set(new_owner);

        self.env().emit_event(OwnershipTransferred {
            previous_owner,
            new_owner,
        });
    }

    /// Move custody funds into the engine, e.g. to fund redemptions
    ///
    /// The custody must have approved the engine for `amount`. The engine is
    /// the only address custody funds can be sent to.
    pub fn pull_from_custody(&mut self, currency: String, amount: U256) {
        self.only_owner();
        self.ensure_non_zero(amount);

        let record = self.supported_currency(&currency);
        let custody = self.custody();
        let engine = self.env().self_address();
        let mut token = Cep18TokenContractRef::new(self.env(), record.token);
        if token.allowance(custody, engine) < amount {
            self.env().revert(TokenizerError::InsufficientAllowance);
        }
        if token.balance_of(custody) < amount {
            self.env().revert(TokenizerError::InsufficientBalance);
        }

        token.transfer_from(custody, engine, amount);

        self.env().emit_event(LiquidityPulled {
            custody,
            currency,
            amount,
        });
    }

    /// Send engine-held funds back to the custody
    pub fn return_to_custody(&mut self, currency: String, amount: U256) {
        self.only_owner();
        self.ensure_non_zero(amount);

        let record = self.supported_currency(&currency);
        let mut token = Cep18TokenContractRef::new(self.env(), record.token);
        if token.balance_of(self.env().self_address()) < amount {
            self.env().revert(TokenizerError::InsufficientDirectLiquidity);
        }

        let custody = self.custody();
        token.transfer(custody, amount);

        self.env().emit_event(LiquidityReturned {
            custody,
            currency,
            amount,
        });
    }

    // ========================================
    // NAV and Pricing
    // ========================================

    /// Current net asset value in base-currency units
    pub fn calculate_nav(&self) -> NetAssetValue {
        self.ensure_initialized();

        let custody = self.custody();
        let mut assets = U256::zero();

        for currency in self.get_supported_currencies() {
            let held = self.holdings_of(&currency);
            if held.is_zero() {
                continue;
            }
            let value = self.to_base_amount(&currency, held);
            assets = self.checked(SafeMath::add(assets, value));
        }

        let positions = self.external_positions(custody);
        assets = self.checked(SafeMath::add(assets, positions.collateral));

        NetAssetValue {
            assets,
            liabilities: positions.debt,
        }
    }

    /// Base units per 10^6 shares
    ///
    /// Returns the initial price while no shares exist and zero while NAV
    /// is not positive.
    pub fn get_price_per_share(&self) -> U256 {
        self.ensure_initialized();

        let supply = self.get_total_shares_outstanding();
        if supply.is_zero() {
            return self.checked(ShareMath::price_per_share(U256::zero(), supply));
        }

        let nav = self.calculate_nav().value().unwrap_or_default();
        self.checked(ShareMath::price_per_share(nav, supply))
    }

    pub fn get_total_shares_outstanding(&self) -> U256 {
        self.share_ledger().total_supply()
    }

    /// Base currency currently owed for `share_amount` shares
    pub fn calc_base_amount(&self, share_amount: U256) -> U256 {
        let price = self.get_price_per_share();
        self.checked(ShareMath::base_for_shares(share_amount, price))
    }

    /// Shares a deposit of `amount` `currency` would mint right now
    pub fn preview_deposit(&self, currency: String, amount: U256) -> U256 {
        self.ensure_initialized();
        let record = self.supported_currency(&currency);
        let base_amount = self.to_base_amount(&record, amount);
        let price = self.get_price_per_share();
        self.checked(ShareMath::shares_for_base(base_amount, price))
    }

    /// Base currency the engine holds for redemptions
    pub fn direct_liquidity(&self) -> U256 {
        self.base_token().balance_of(self.env().self_address())
    }

    // ========================================
    // Settlement
    // ========================================

    /// Deposit `amount` of `currency` and receive shares
    ///
    /// The caller must have approved the engine for `amount`. Funds go
    /// straight to the custody; the price is sampled before they move.
    pub fn deposit(&mut self, currency: String, amount: U256) -> U256 {
        self.ensure_initialized();
        self.ensure_non_zero(amount);

        let depositor = self.env().caller();
        let engine = self.env().self_address();
        let record = self.supported_currency(&currency);

        let base_amount = self.to_base_amount(&record, amount);
        let price_per_share = self.get_price_per_share();
        let shares = self.checked(ShareMath::shares_for_base(base_amount, price_per_share));
        if shares.is_zero() {
            self.env().revert(TokenizerError::DepositTooSmall);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), record.token);
        if token.allowance(depositor, engine) < amount {
            self.env().revert(TokenizerError::InsufficientAllowance);
        }
        if token.balance_of(depositor) < amount {
            self.env().revert(TokenizerError::InsufficientBalance);
        }

        let custody = self.custody();
        token.transfer_from(depositor, custody, amount);
        self.share_ledger().mint(depositor, shares);

        self.env().emit_event(Deposited {
            depositor,
            currency,
            amount,
            base_amount,
            shares,
            price_per_share,
        });

        shares
    }

    /// Burn `share_amount` shares and receive base currency
    ///
    /// Paid from the engine's own balance only; external positions are never
    /// unwound to fund a redemption.
    pub fn redeem(&mut self, share_amount: U256) -> U256 {
        self.ensure_initialized();
        self.ensure_non_zero(share_amount);

        let redeemer = self.env().caller();
        let mut ledger = self.share_ledger();
        if ledger.balance_of(redeemer) < share_amount {
            self.env().revert(TokenizerError::InsufficientBalance);
        }

        let price_per_share = self.get_price_per_share();
        let base_amount = self.checked(ShareMath::base_for_shares(share_amount, price_per_share));
        if base_amount.is_zero() {
            self.env().revert(TokenizerError::ZeroAmount);
        }

        if self.direct_liquidity() < base_amount {
            self.env().revert(TokenizerError::InsufficientDirectLiquidity);
        }

        ledger.burn(redeemer, share_amount);
        let mut base = self.base_token();
        base.transfer(redeemer, base_amount);

        self.env().emit_event(Redeemed {
            redeemer,
            shares: share_amount,
            base_amount,
            price_per_share,
        });

        base_amount
    }

    // ========================================
    // View Functions
    // ========================================

    pub fn initialized(&self) -> bool {
        self.initialized.get_or_default()
    }

    pub fn owner(&self) -> Address {
        self.owner.get_or_revert_with(TokenizerError::NotInitialized)
    }

    pub fn custody(&self) -> Address {
        self.custody.get_or_revert_with(TokenizerError::NotInitialized)
    }

    /// The only address custody funds can be pulled to
    pub fn whitelisted(&self) -> Address {
        self.env().self_address()
    }

    pub fn base_currency(&self) -> String {
        self.base_currency.get_or_default()
    }

    pub fn position_manager(&self) -> Option<Address> {
        self.position_manager.get()
    }

    pub fn tokenized_share(&self) -> Option<Address> {
        self.tokenized_share.get()
    }

    pub fn oracle_handler(&self) -> Option<Address> {
        self.oracle_handler.get()
    }

    pub fn is_supported_currency(&self, symbol: String) -> bool {
        self.currency_slot.get(&symbol).unwrap_or_default() != 0
    }

    pub fn get_supported_currency(&self, symbol: String) -> Option<SupportedCurrency> {
        if !self.is_supported_currency(symbol.clone()) {
            return None;
        }
        self.currencies.get(&symbol)
    }

    pub fn get_supported_currencies(&self) -> Vec<SupportedCurrency> {
        let count = self.currency_count.get_or_default();
        (0..count)
            .filter_map(|i| self.currency_list.get(&i))
            .filter_map(|symbol| self.currencies.get(&symbol))
            .collect()
    }

    // ========================================
    // Internals
    // ========================================

    fn store_currency(&mut self, currency: SupportedCurrency) {
        let symbol = currency.symbol.clone();
        if self.currency_slot.get(&symbol).unwrap_or_default() == 0 {
            let index = self.currency_count.get_or_default();
            self.currency_list.set(&index, symbol.clone());
            self.currency_slot.set(&symbol, index + 1);
            self.currency_count.set(index + 1);
        }

        self.env().emit_event(CurrencyAdded {
            symbol: symbol.clone(),
            token: currency.token,
            is_direct: currency.is_direct,
        });
        self.currencies.set(&symbol, currency);
    }

    fn supported_currency(&self, symbol: &String) -> SupportedCurrency {
        self.get_supported_currency(symbol.clone())
            .unwrap_or_revert_with(&self.env(), TokenizerError::UnsupportedCurrency)
    }

    /// Value of `amount` of `currency` in base-currency units
    fn to_base_amount(&self, currency: &SupportedCurrency, amount: U256) -> U256 {
        let base_currency = self.base_currency();
        if currency.symbol == base_currency {
            return amount;
        }

        if currency.is_direct {
            let token = Cep18TokenContractRef::new(self.env(), currency.token);
            let base_decimals = self.base_token().decimals();
            return self.checked(SafeMath::rescale(amount, token.decimals(), base_decimals));
        }

        let oracle_address = self
            .oracle_handler
            .get_or_revert_with(TokenizerError::ComponentNotSet);
        let oracle = OracleHandlerContractRef::new(self.env(), oracle_address);
        oracle.convert(amount, currency.symbol.clone(), base_currency)
    }

    /// Balance of `currency` held by the custody and the engine together
    fn holdings_of(&self, currency: &SupportedCurrency) -> U256 {
        let token = Cep18TokenContractRef::new(self.env(), currency.token);
        let custody = self.custody();
        let engine = self.env().self_address();
        self.checked(SafeMath::add(
            token.balance_of(custody),
            token.balance_of(engine),
        ))
    }

    fn external_positions(&self, custody: Address) -> PositionValue {
        match self.position_manager.get() {
            Some(manager) => PositionValuerContractRef::new(self.env(), manager).position_value(custody),
            None => PositionValue::zero(),
        }
    }

    fn base_token(&self) -> Cep18TokenContractRef {
        let base = self.supported_currency(&self.base_currency());
        Cep18TokenContractRef::new(self.env(), base.token)
    }

    fn share_ledger(&self) -> ShareLedgerContractRef {
        let address = self
            .tokenized_share
            .get_or_revert_with(TokenizerError::ComponentNotSet);
        ShareLedgerContractRef::new(self.env(), address)
    }

    fn emit_binding(&self, component: &str, address: Address) {
        self.env().emit_event(ComponentBound {
            component: String::from(component),
            address,
        });
    }

    fn checked(&self, result: Result<U256, TokenizerError>) -> U256 {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }

    fn ensure_initialized(&self) {
        if !self.initialized() {
            self.env().revert(TokenizerError::NotInitialized);
        }
    }

    fn ensure_non_zero(&self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(TokenizerError::ZeroAmount);
        }
    }

    fn only_owner(&self) {
        self.ensure_initialized();
        let caller = self.env().caller();
        if caller != self.owner() {
            self.env().revert(TokenizerError::Unauthorized);
        }
    }
}
