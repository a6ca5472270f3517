//! 무한대를 표현할 수 있는 비율 타입.
//!
//! Profit Factor나 손익비처럼 분모가 0이 될 수 있는 지표에 사용합니다.
//! `Decimal`은 무한대를 표현할 수 없으므로 별도의 변형으로 나타냅니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::calculations::ratio_or_zero;
use std::fmt;

/// 직렬화 시 무한대를 나타내는 문자열.
pub const INFINITY_LITERAL: &str = "Infinity";

/// 비율 값.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    /// 유한한 값
    Finite(Decimal),
    /// 양의 무한대 (분모 0, 분자 양수)
    Infinite,
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::Finite(Decimal::ZERO)
    }
}

impl Ratio {
    /// 0 비율.
    pub const ZERO: Ratio = Ratio::Finite(Decimal::ZERO);

    /// `numerator / denominator`를 계산합니다.
    ///
    /// - 분모 > 0: 유한 값
    /// - 분모 == 0, 분자 > 0: 무한대
    /// - 그 외: 0
    pub fn of(numerator: Decimal, denominator: Decimal) -> Self {
        if denominator > Decimal::ZERO {
            Ratio::Finite(ratio_or_zero(numerator, denominator))
        } else if numerator > Decimal::ZERO {
            Ratio::Infinite
        } else {
            Ratio::ZERO
        }
    }

    /// 무한대인지 확인합니다.
    pub fn is_infinite(&self) -> bool {
        matches!(self, Ratio::Infinite)
    }

    /// 유한 값이면 반환합니다.
    pub fn finite(&self) -> Option<Decimal> {
        match self {
            Ratio::Finite(v) => Some(*v),
            Ratio::Infinite => None,
        }
    }

    /// f64로 변환합니다 (무한대는 `f64::INFINITY`).
    pub fn to_f64(&self) -> f64 {
        match self {
            Ratio::Finite(v) => v.to_f64().unwrap_or(0.0),
            Ratio::Infinite => f64::INFINITY,
        }
    }
}

impl From<Decimal> for Ratio {
    fn from(value: Decimal) -> Self {
        Ratio::Finite(value)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            Ratio::Infinite => f.write_str("∞"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Finite(v) => Serialize::serialize(v, serializer),
            Ratio::Infinite => serializer.serialize_str(INFINITY_LITERAL),
        }
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Value(Decimal),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Value(v) => Ok(Ratio::Finite(v)),
            Repr::Text(s) if s.eq_ignore_ascii_case(INFINITY_LITERAL) || s == "inf" => {
                Ok(Ratio::Infinite)
            }
            Repr::Text(s) => Err(serde::de::Error::custom(format!("invalid ratio: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_of() {
        assert_eq!(Ratio::of(dec!(300), dec!(100)), Ratio::Finite(dec!(3)));
        assert_eq!(Ratio::of(dec!(50), Decimal::ZERO), Ratio::Infinite);
        assert_eq!(Ratio::of(Decimal::ZERO, Decimal::ZERO), Ratio::ZERO);
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Ratio::Infinite.to_f64(), f64::INFINITY);
        assert_eq!(Ratio::Finite(dec!(1.5)).to_f64(), 1.5);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Ratio::Infinite).unwrap();
        assert_eq!(json, "\"Infinity\"");
        let back: Ratio = serde_json::from_str(&json).unwrap();
        assert!(back.is_infinite());

        let back: Ratio = serde_json::from_str("\"2.5\"").unwrap();
        assert_eq!(back, Ratio::Finite(dec!(2.5)));
    }

    #[test]
    fn test_serialize_finite_as_decimal() {
        let json = serde_json::to_string(&Ratio::Finite(dec!(2.5))).unwrap();
        assert_eq!(json, "\"2.5\"");

        let back: Ratio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Ratio::Finite(dec!(2.5)));
    }

    #[test]
    fn test_of_tiny_denominator_saturates() {
        let ratio = Ratio::of(Decimal::from(1_000_000_000_000_i64), Decimal::new(1, 18));
        assert_eq!(ratio, Ratio::Finite(Decimal::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Ratio::Infinite), "∞");
        assert_eq!(format!("{:.2}", Ratio::Finite(dec!(1.23456))), "1.23");
    }
}
