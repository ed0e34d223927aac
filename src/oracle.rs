//! Oracle Handler - Converts amounts between currencies
//!
//! Prices are quoted against a common unit (e.g. USD) with their own decimal
//! precision, the way aggregator feeds report them. The base currency is
//! implicitly priced at exactly one unit.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::OracleError;

/// Default staleness window: one hour, in milliseconds
const DEFAULT_MAX_STALENESS: u64 = 3_600_000;

/// Largest power of ten that fits in a U256
const MAX_DECIMALS: u32 = 77;

/// Price feed data for a currency
#[odra::odra_type]
pub struct PriceFeed {
    /// Currency symbol
    pub symbol: String,
    /// Price of one whole token, scaled by 10^price_decimals
    /// Example: 1 WETH = 2,000.5 USD with 8 decimals means price = 200_050_000_000
    pub price: U256,
    /// Decimals of `price`
    pub price_decimals: u8,
    /// Decimals of the token itself
    pub token_decimals: u8,
    /// Block time of last update
    pub last_update: u64,
    /// Whether the feed is active
    pub is_active: bool,
}

/// Event emitted when a feed price is set
#[odra::event]
pub struct PriceUpdated {
    pub symbol: String,
    pub price: U256,
    pub price_decimals: u8,
    pub timestamp: u64,
}

/// Event emitted when a feed is enabled or disabled
#[odra::event]
pub struct FeedStatusChanged {
    pub symbol: String,
    pub is_active: bool,
}

/// Oracle Handler contract
#[odra::module(events = [PriceUpdated, FeedStatusChanged], errors = OracleError)]
pub struct OracleHandler {
    /// Price feeds keyed by currency symbol
    price_feeds: Mapping<String, PriceFeed>,
    /// Base currency symbol
    base_currency: Var<String>,
    /// Base currency token decimals
    base_decimals: Var<u8>,
    /// Admin address
    admin: Var<Address>,
    /// Maximum price staleness (milliseconds)
    max_staleness: Var<u64>,
}

#[odra::module]
impl OracleHandler {
    /// Initialize the oracle for a base currency
    pub fn init(&mut self, base_currency: String, base_decimals: u8) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.base_currency.set(base_currency);
        self.base_decimals.set(base_decimals);
        self.max_staleness.set(DEFAULT_MAX_STALENESS);
    }

    /// Set price for a currency (admin only)
    ///
    /// # Arguments
    /// * `symbol` - Currency symbol
    /// * `price` - Price of one whole token, scaled by 10^price_decimals
    /// * `price_decimals` - Decimals of `price`
    /// * `token_decimals` - Decimals of the token
    pub fn set_price(&mut self, symbol: String, price: U256, price_decimals: u8, token_decimals: u8) {
        self.only_admin();

        if price.is_zero() || symbol == self.base_currency() {
            self.env().revert(OracleError::InvalidPrice);
        }

        let timestamp = self.env().get_block_time();
        let feed = PriceFeed {
            symbol: symbol.clone(),
            price,
            price_decimals,
            token_decimals,
            last_update: timestamp,
            is_active: true,
        };
        self.price_feeds.set(&symbol, feed);

        self.env().emit_event(PriceUpdated {
            symbol,
            price,
            price_decimals,
            timestamp,
        });
    }

    /// Latest price for a currency, scaled by its feed's price decimals
    pub fn get_latest_price(&self, symbol: String) -> U256 {
        self.checked_feed(&symbol).price
    }

    /// Raw feed, without activity or staleness checks
    pub fn get_feed(&self, symbol: String) -> Option<PriceFeed> {
        self.price_feeds.get(&symbol)
    }

    /// Re-expresses a price from `from_decimals` to `to_decimals` precision
    pub fn scale_price(&self, price: U256, from_decimals: u8, to_decimals: u8) -> U256 {
        if from_decimals == to_decimals {
            price
        } else if from_decimals < to_decimals {
            self.mul(price, self.pow10(to_decimals as u32 - from_decimals as u32))
        } else {
            price / self.pow10(from_decimals as u32 - to_decimals as u32)
        }
    }

    /// Convert `amount` of `from` into the equivalent amount of `to`
    ///
    /// out = amount * p_from * 10^(pd_to + td_to) / (p_to * 10^(pd_from + td_from)),
    /// rounded down.
    pub fn convert(&self, amount: U256, from: String, to: String) -> U256 {
        if from == to {
            return amount;
        }

        let (from_price, from_scale) = self.price_terms(&from);
        let (to_price, to_scale) = self.price_terms(&to);

        let numerator = self.mul(self.mul(amount, from_price), self.pow10(to_scale));
        let denominator = self.mul(to_price, self.pow10(from_scale));

        numerator / denominator
    }

    pub fn base_currency(&self) -> String {
        self.base_currency.get_or_default()
    }

    pub fn base_decimals(&self) -> u8 {
        self.base_decimals.get_or_default()
    }

    /// Disable a price feed (admin only)
    pub fn disable_feed(&mut self, symbol: String) {
        self.set_feed_status(symbol, false);
    }

    /// Enable a price feed (admin only)
    pub fn enable_feed(&mut self, symbol: String) {
        self.set_feed_status(symbol, true);
    }

    /// Update max staleness period in milliseconds (admin only)
    pub fn set_max_staleness(&mut self, millis: u64) {
        self.only_admin();
        self.max_staleness.set(millis);
    }

    pub fn max_staleness(&self) -> u64 {
        self.max_staleness.get_or_default()
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(OracleError::Unauthorized)
    }

    fn set_feed_status(&mut self, symbol: String, is_active: bool) {
        self.only_admin();

        let mut feed = self
            .price_feeds
            .get(&symbol)
            .unwrap_or_revert_with(&self.env(), OracleError::PriceFeedNotAvailable);
        feed.is_active = is_active;
        self.price_feeds.set(&symbol, feed);

        self.env().emit_event(FeedStatusChanged { symbol, is_active });
    }

    /// Feed that is active and fresh, or revert
    fn checked_feed(&self, symbol: &String) -> PriceFeed {
        let feed = self
            .price_feeds
            .get(symbol)
            .unwrap_or_revert_with(&self.env(), OracleError::PriceFeedNotAvailable);

        if !feed.is_active {
            self.env().revert(OracleError::PriceFeedNotAvailable);
        }

        let current_time = self.env().get_block_time();
        if current_time.saturating_sub(feed.last_update) > self.max_staleness() {
            self.env().revert(OracleError::StalePrice);
        }

        feed
    }

    /// (price, price_decimals + token_decimals) for a currency
    fn price_terms(&self, symbol: &String) -> (U256, u32) {
        if *symbol == self.base_currency() {
            return (U256::one(), self.base_decimals() as u32);
        }
        let feed = self.checked_feed(symbol);
        (feed.price, feed.price_decimals as u32 + feed.token_decimals as u32)
    }

    fn mul(&self, a: U256, b: U256) -> U256 {
        a.checked_mul(b)
            .unwrap_or_revert_with(&self.env(), OracleError::MathOverflow)
    }

    fn pow10(&self, exponent: u32) -> U256 {
        if exponent > MAX_DECIMALS {
            self.env().revert(OracleError::MathOverflow);
        }
        U256::exp10(exponent as usize)
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        if caller != self.get_admin() {
            self.env().revert(OracleError::Unauthorized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv};

    const ETH_PRICE: u64 = 2_000 * 100_000_000; // 2,000 USD, 8 decimals

    fn setup() -> (HostEnv, OracleHandlerHostRef) {
        let env = odra_test::env();
        let mut oracle = OracleHandler::deploy(
            &env,
            OracleHandlerInitArgs {
                base_currency: String::from("USDC"),
                base_decimals: 6,
            },
        );
        oracle.set_price(String::from("WETH"), U256::from(ETH_PRICE), 8, 18);
        (env, oracle)
    }

    #[test]
    fn test_set_and_get_price() {
        let (_, oracle) = setup();
        assert_eq!(oracle.get_latest_price(String::from("WETH")), U256::from(ETH_PRICE));
        let feed = oracle.get_feed(String::from("WETH")).unwrap();
        assert_eq!(feed.token_decimals, 18);
        assert!(feed.is_active);
    }

    #[test]
    fn test_scale_price() {
        let (_, oracle) = setup();
        assert_eq!(
            oracle.scale_price(U256::from(ETH_PRICE), 8, 6),
            U256::from(2_000_000_000u64)
        );
        assert_eq!(oracle.scale_price(U256::from(15), 6, 8), U256::from(1_500));
    }

    #[test]
    fn test_convert_to_base() {
        let (_, oracle) = setup();
        // 0.005 WETH at 2,000 USD is 10 USDC
        let amount = U256::from(5_000_000_000_000_000u64);
        let base = oracle.convert(amount, String::from("WETH"), String::from("USDC"));
        assert_eq!(base, U256::from(10_000_000));

        let back = oracle.convert(base, String::from("USDC"), String::from("WETH"));
        assert_eq!(back, amount);
    }

    #[test]
    fn test_convert_same_currency_is_identity() {
        let (_, oracle) = setup();
        let amount = U256::from(123);
        assert_eq!(oracle.convert(amount, String::from("DAI"), String::from("DAI")), amount);
    }

    #[test]
    fn test_unknown_feed_rejected() {
        let (_, oracle) = setup();
        assert_eq!(
            oracle.try_get_latest_price(String::from("WBTC")),
            Err(OracleError::PriceFeedNotAvailable.into())
        );
    }

    #[test]
    fn test_disabled_feed_rejected() {
        let (_, mut oracle) = setup();
        oracle.disable_feed(String::from("WETH"));
        assert_eq!(
            oracle.try_convert(U256::one(), String::from("WETH"), String::from("USDC")),
            Err(OracleError::PriceFeedNotAvailable.into())
        );
        oracle.enable_feed(String::from("WETH"));
        assert_eq!(oracle.get_latest_price(String::from("WETH")), U256::from(ETH_PRICE));
    }

    #[test]
    fn test_stale_price_rejection() {
        let (env, oracle) = setup();
        env.advance_block_time(DEFAULT_MAX_STALENESS + 1);
        assert_eq!(
            oracle.try_get_latest_price(String::from("WETH")),
            Err(OracleError::StalePrice.into())
        );
    }

    #[test]
    fn test_only_admin_sets_prices() {
        let (env, mut oracle) = setup();
        env.set_caller(env.get_account(1));
        assert_eq!(
            oracle.try_set_price(String::from("WETH"), U256::one(), 8, 18),
            Err(OracleError::Unauthorized.into())
        );
    }

    #[test]
    fn test_base_currency_cannot_be_priced() {
        let (_, mut oracle) = setup();
        assert_eq!(
            oracle.try_set_price(String::from("USDC"), U256::one(), 0, 6),
            Err(OracleError::InvalidPrice.into())
        );
    }
}
