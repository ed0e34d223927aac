//! Mathematical utilities for share accounting
//! Checked U256 arithmetic plus the NAV / price-per-share formulas
use odra::casper_types::U256;
use crate::errors::TokenizerError;

/// Decimal precision of the share token
pub const SHARE_DECIMALS: u8 = 6;

/// Price per share while no shares exist: 1,000,000 base units per 1,000,000 shares
pub const INITIAL_PRICE_PER_SHARE: u64 = 1_000_000;

/// Largest power of ten that fits in a U256
const MAX_DECIMALS: u8 = 77;

/// Safe math operations for U256
pub struct SafeMath;

impl SafeMath {
    /// Safe addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, TokenizerError> {
        a.checked_add(b).ok_or(TokenizerError::MathOverflow)
    }

    /// Safe multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, TokenizerError> {
        a.checked_mul(b).ok_or(TokenizerError::MathOverflow)
    }

    /// Safe division with zero check, rounding towards zero
    pub fn div(a: U256, b: U256) -> Result<U256, TokenizerError> {
        if b.is_zero() {
            return Err(TokenizerError::DivisionByZero);
        }
        Ok(a / b)
    }

    /// floor(a * b / c)
    pub fn mul_div(a: U256, b: U256, c: U256) -> Result<U256, TokenizerError> {
        Self::div(Self::mul(a, b)?, c)
    }

    /// 10^decimals
    pub fn pow10(decimals: u8) -> Result<U256, TokenizerError> {
        if decimals > MAX_DECIMALS {
            return Err(TokenizerError::MathOverflow);
        }
        Ok(U256::exp10(decimals as usize))
    }

    /// Re-expresses `amount` from `from_decimals` to `to_decimals`, flooring when precision is lost
    pub fn rescale(amount: U256, from_decimals: u8, to_decimals: u8) -> Result<U256, TokenizerError> {
        if from_decimals == to_decimals {
            Ok(amount)
        } else if from_decimals < to_decimals {
            Self::mul(amount, Self::pow10(to_decimals - from_decimals)?)
        } else {
            Self::div(amount, Self::pow10(from_decimals - to_decimals)?)
        }
    }
}

/// Share issuance and redemption formulas
///
/// Every division floors. A deposit followed by a redemption of the same
/// shares can therefore come back a few base units short; callers should
/// budget for that instead of expecting exact round trips.
pub struct ShareMath;

impl ShareMath {
    /// 10^SHARE_DECIMALS
    pub fn share_precision() -> U256 {
        U256::exp10(SHARE_DECIMALS as usize)
    }

    /// Base units per `share_precision()` shares
    ///
    /// price = nav * precision / total_supply, or the initial price when no
    /// shares exist. `nav` is the non-negative part of the pool's NAV.
    pub fn price_per_share(nav: U256, total_supply: U256) -> Result<U256, TokenizerError> {
        if total_supply.is_zero() {
            return Ok(U256::from(INITIAL_PRICE_PER_SHARE));
        }
        SafeMath::mul_div(nav, Self::share_precision(), total_supply)
    }

    /// shares = base_amount * precision / price
    pub fn shares_for_base(base_amount: U256, price_per_share: U256) -> Result<U256, TokenizerError> {
        if price_per_share.is_zero() {
            return Err(TokenizerError::ZeroPricePerShare);
        }
        SafeMath::mul_div(base_amount, Self::share_precision(), price_per_share)
    }

    /// base_amount = shares * price / precision
    pub fn base_for_shares(shares: U256, price_per_share: U256) -> Result<U256, TokenizerError> {
        SafeMath::mul_div(shares, price_per_share, Self::share_precision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_rescale() {
        assert_eq!(SafeMath::rescale(u(1_500_000), 6, 6).unwrap(), u(1_500_000));
        assert_eq!(SafeMath::rescale(u(1_500_000), 6, 8).unwrap(), u(150_000_000));
        assert_eq!(SafeMath::rescale(u(1_500_000_000_000_000_000), 18, 6).unwrap(), u(1_500_000));
        assert_eq!(SafeMath::rescale(u(999), 18, 6).unwrap(), U256::zero());
        assert!(matches!(SafeMath::pow10(78), Err(TokenizerError::MathOverflow)));
    }

    #[test]
    fn test_mul_div_checks() {
        assert!(matches!(SafeMath::mul_div(u(7), u(3), U256::zero()), Err(TokenizerError::DivisionByZero)));
        assert!(matches!(SafeMath::mul(U256::MAX, u(2)), Err(TokenizerError::MathOverflow)));
        assert_eq!(SafeMath::mul_div(u(10), u(3), u(4)).unwrap(), u(7));
    }

    #[test]
    fn test_initial_price_when_supply_is_zero() {
        assert_eq!(ShareMath::price_per_share(u(123_456), U256::zero()).unwrap(), u(1_000_000));
        assert_eq!(ShareMath::price_per_share(U256::zero(), U256::zero()).unwrap(), u(1_000_000));
    }

    #[test]
    fn test_first_deposit_is_one_to_one() {
        let price = ShareMath::price_per_share(U256::zero(), U256::zero()).unwrap();
        assert_eq!(ShareMath::shares_for_base(u(10_000_000), price).unwrap(), u(10_000_000));
    }

    #[test]
    fn test_price_per_share_floors() {
        // 10 base units over 3 shares-with-precision
        assert_eq!(ShareMath::price_per_share(u(10), u(3_000_000)).unwrap(), u(3));
        assert_eq!(ShareMath::price_per_share(u(20_000_000), u(10_000_000)).unwrap(), u(2_000_000));
    }

    #[test]
    fn test_zero_price_rejected() {
        assert!(matches!(
            ShareMath::shares_for_base(u(1_000), U256::zero()),
            Err(TokenizerError::ZeroPricePerShare)
        ));
    }

    #[test]
    fn test_base_for_shares_is_monotonic() {
        let price = u(1_333_337);
        let mut previous = U256::zero();
        for shares in (0..5_000u64).map(|s| s * 997) {
            let base = ShareMath::base_for_shares(u(shares), price).unwrap();
            assert!(base >= previous);
            previous = base;
        }
    }

    #[test]
    fn test_split_redemption_matches_single_redemption() {
        let price = u(1_070_001);
        let total = u(9_999_999);
        for x in [1u64, 2, 500_000, 3_333_333, 9_999_998] {
            let first = ShareMath::base_for_shares(u(x), price).unwrap();
            let second = ShareMath::base_for_shares(total - u(x), price).unwrap();
            let whole = ShareMath::base_for_shares(total, price).unwrap();
            let split = first + second;
            assert!(split <= whole);
            assert!(whole - split <= u(1));
        }
    }

    #[test]
    fn test_deposit_then_redeem_round_trip_within_tolerance() {
        // Pool with 25 base units of NAV per 10 shares after some gains
        let price = ShareMath::price_per_share(u(25_000_001), u(10_000_000)).unwrap();
        let deposit = u(10_000_000);
        let shares = ShareMath::shares_for_base(deposit, price).unwrap();
        let back = ShareMath::base_for_shares(shares, price).unwrap();
        assert!(back <= deposit);
        assert!(deposit - back <= u(10));
    }
}
