use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};

#[derive(Copy, Clone, Debug)]
pub(crate) enum NumPriv {
    /// Always non-less than zero.
    PosInt(u64),
    /// Always less than zero.
    NegInt(i64),
    /// Always finite.
    Float(f64),
}

/// Represents a JSON number, whether it was written as an integer or with a fractional part.
///
/// Numbers compare by value across representations, so `Number::from(1)` equals
/// `Number::from_f64(1.0)`. A float with no fractional part counts as an integer.
#[derive(Copy, Clone)]
pub struct Number {
    n: NumPriv,
}

impl Number {
    /// Make a number from a float. Returns `None` for NaN and the infinities, which JSON can't
    /// represent.
    pub fn from_f64(f: f64) -> Option<Number> {
        if f.is_finite() {
            Some(Number {
                n: NumPriv::Float(f),
            })
        } else {
            None
        }
    }

    /// Returns `true` if the number has no fractional part.
    #[inline]
    pub fn is_integer(&self) -> bool {
        match self.n {
            NumPriv::PosInt(_) | NumPriv::NegInt(_) => true,
            NumPriv::Float(f) => f.fract() == 0.0,
        }
    }

    /// Returns `true` if the number was written with a fractional part or exponent.
    #[inline]
    pub fn is_f64(&self) -> bool {
        matches!(self.n, NumPriv::Float(_))
    }

    /// Returns the number represented as `i64` if it is an integer in range, or else `None`.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self.n {
            NumPriv::PosInt(n) => i64::try_from(n).ok(),
            NumPriv::NegInt(n) => Some(n),
            NumPriv::Float(_) => None,
        }
    }

    /// Returns the number represented as `u64` if it is a non-negative integer, or else `None`.
    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match self.n {
            NumPriv::PosInt(n) => Some(n),
            NumPriv::NegInt(_) | NumPriv::Float(_) => None,
        }
    }

    /// Returns the number as `f64`, possibly losing precision for very large integers.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self.n {
            NumPriv::PosInt(n) => n as f64,
            NumPriv::NegInt(n) => n as f64,
            NumPriv::Float(f) => f,
        }
    }

    /// Number of digits after the decimal point in the shortest decimal form of this number.
    pub fn decimal_places(&self) -> usize {
        match self.n {
            NumPriv::PosInt(_) | NumPriv::NegInt(_) => 0,
            NumPriv::Float(f) => {
                let text = f.to_string();
                match text.split_once('.') {
                    Some((_, frac)) => frac.len(),
                    None => 0,
                }
            }
        }
    }

    /// Returns `true` if dividing by `divisor` leaves no remainder. A zero divisor never divides.
    pub fn is_multiple_of(&self, divisor: &Number) -> bool {
        if let (Some(lhs), Some(rhs)) = (self.as_i128(), divisor.as_i128()) {
            return rhs != 0 && lhs % rhs == 0;
        }
        let rhs = divisor.as_f64();
        if rhs == 0.0 {
            return false;
        }
        let quotient = self.as_f64() / rhs;
        (quotient - quotient.round()).abs() < 1e-9
    }

    fn as_i128(&self) -> Option<i128> {
        match self.n {
            NumPriv::PosInt(n) => Some(n as i128),
            NumPriv::NegInt(n) => Some(n as i128),
            NumPriv::Float(_) => None,
        }
    }
}

impl std::default::Default for Number {
    fn default() -> Self {
        Self {
            n: NumPriv::PosInt(0),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self.n, other.n) {
            (NumPriv::NegInt(lhs), NumPriv::NegInt(ref rhs)) => Some(lhs.cmp(rhs)),
            (NumPriv::NegInt(_), NumPriv::PosInt(_)) => Some(Ordering::Less),
            (NumPriv::PosInt(_), NumPriv::NegInt(_)) => Some(Ordering::Greater),
            (NumPriv::PosInt(lhs), NumPriv::PosInt(ref rhs)) => Some(lhs.cmp(rhs)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        Debug::fmt(&self.n, fmt)
    }
}

impl Display for Number {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.n {
            NumPriv::PosInt(v) => Display::fmt(&v, fmt),
            NumPriv::NegInt(v) => Display::fmt(&v, fmt),
            NumPriv::Float(v) => Display::fmt(&v, fmt),
        }
    }
}

macro_rules! impl_from_unsigned {
    ($t: ty) => {
        impl From<$t> for Number {
            fn from(n: $t) -> Self {
                Number {
                    n: NumPriv::PosInt(n as u64),
                }
            }
        }
    };
}

macro_rules! impl_from_signed {
    ($t: ty) => {
        impl From<$t> for Number {
            fn from(n: $t) -> Self {
                if n < 0 {
                    Number {
                        n: NumPriv::NegInt(n as i64),
                    }
                } else {
                    Number {
                        n: NumPriv::PosInt(n as u64),
                    }
                }
            }
        }
    };
}

impl_from_unsigned!(u8);
impl_from_unsigned!(u16);
impl_from_unsigned!(u32);
impl_from_unsigned!(u64);
impl_from_unsigned!(usize);
impl_from_signed!(i8);
impl_from_signed!(i16);
impl_from_signed!(i32);
impl_from_signed!(i64);
impl_from_signed!(isize);

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(v) = n.as_u64() {
            Number::from(v)
        } else if let Some(v) = n.as_i64() {
            Number::from(v)
        } else {
            // serde_json never produces non-finite floats
            Number {
                n: NumPriv::Float(n.as_f64().unwrap_or_default()),
            }
        }
    }
}

use serde::{
    de::{Deserialize, Deserializer},
    ser::{Serialize, Serializer},
};

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.n {
            NumPriv::PosInt(v) => serializer.serialize_u64(v),
            NumPriv::NegInt(v) => serializer.serialize_i64(v),
            NumPriv::Float(v) => serializer.serialize_f64(v),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NumVisitor;
        impl<'de> serde::de::Visitor<'de> for NumVisitor {
            type Value = Number;

            fn expecting(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
                write!(fmt, "a finite number")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Number::from(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Number::from(v))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Number::from_f64(v).ok_or_else(|| E::custom("non-finite number"))
            }
        }

        deserializer.deserialize_any(NumVisitor)
    }
}
