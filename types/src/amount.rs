//! Token amount type.
//!
//! Balances, voting power, tallies and total supply are all fixed-point
//! integers (u128) measured in the token's smallest unit. Arithmetic that can
//! leave the representable range is only exposed in checked form.
//!
//! Binary formats carry the full u128. Text formats (JSON, TOML) carry a
//! plain integer while the amount fits in a u64 and a decimal string beyond
//! that, since TOML has no integers wider than 64 bits.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;

/// An amount of the governance token, in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `floor(self * bps / 10_000)` without an intermediate overflow.
    pub fn mul_bps(self, bps: u32) -> Self {
        let bps = u128::from(bps);
        let denom = u128::from(crate::params::BPS_DENOMINATOR);
        let whole = (self.0 / denom) * bps;
        let part = (self.0 % denom) * bps / denom;
        Self(whole.saturating_add(part))
    }
}

impl From<u128> for TokenAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl Sum for TokenAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc.saturating_add(x))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TokenAmount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().replace('_', "").parse().map(Self)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !serializer.is_human_readable() {
            return serializer.serialize_u128(self.0);
        }
        match u64::try_from(self.0) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.collect_str(self),
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TokenAmount(u128::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u128::try_from(v)
            .map(TokenAmount)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(TokenAmount(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(AmountVisitor)
        } else {
            deserializer.deserialize_u128(AmountVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_ops_detect_overflow() {
        assert_eq!(TokenAmount::MAX.checked_add(TokenAmount::new(1)), None);
        assert_eq!(TokenAmount::ZERO.checked_sub(TokenAmount::new(1)), None);
        assert_eq!(
            TokenAmount::new(7).checked_sub(TokenAmount::new(2)),
            Some(TokenAmount::new(5))
        );
    }

    #[test]
    fn mul_bps_floors() {
        assert_eq!(TokenAmount::new(1000).mul_bps(2_000), TokenAmount::new(200));
        assert_eq!(TokenAmount::new(999).mul_bps(2_000), TokenAmount::new(199));
        assert_eq!(TokenAmount::new(5).mul_bps(10_000), TokenAmount::new(5));
        assert_eq!(TokenAmount::new(5).mul_bps(0), TokenAmount::ZERO);
    }

    #[test]
    fn mul_bps_does_not_overflow_near_max() {
        let q = TokenAmount::MAX.mul_bps(10_000);
        assert_eq!(q, TokenAmount::MAX);
        let half = TokenAmount::MAX.mul_bps(5_000);
        assert_eq!(half.raw(), u128::MAX / 2);
    }

    #[test]
    fn text_formats_accept_integers_and_strings() {
        let small: TokenAmount = serde_json::from_str("1000").unwrap();
        assert_eq!(small, TokenAmount::new(1_000));
        let quoted: TokenAmount = serde_json::from_str("\"340282366920938463463374607431768211455\"").unwrap();
        assert_eq!(quoted, TokenAmount::MAX);
        assert!(serde_json::from_str::<TokenAmount>("-1").is_err());
        assert!(serde_json::from_str::<TokenAmount>("\"12ab\"").is_err());
    }

    #[test]
    fn large_amounts_are_strings_in_json() {
        assert_eq!(serde_json::to_string(&TokenAmount::new(42)).unwrap(), "42");
        let big = TokenAmount::new(u128::from(u64::MAX) + 1);
        let text = serde_json::to_string(&big).unwrap();
        assert_eq!(text, "\"18446744073709551616\"");
        assert_eq!(serde_json::from_str::<TokenAmount>(&text).unwrap(), big);
    }

    #[test]
    fn bincode_keeps_full_width() {
        let bytes = bincode::serialize(&TokenAmount::MAX).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bincode::deserialize::<TokenAmount>(&bytes).unwrap(), TokenAmount::MAX);
    }
}
