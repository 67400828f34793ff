//! Unbounded integer types of the interface.
//!
//! `Nat` and `Int` are unbounded in the schema and backed by 128-bit integers
//! here. Both travel as decimal strings so no JSON reader truncates them;
//! plain JSON integers are accepted on input.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Natural number (`nat`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nat(pub u128);

/// Signed integer (`int`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(pub i128);

macro_rules! impl_from {
    ($target:ty, $inner:ty, [$($source:ty),*]) => {
        $(
            impl From<$source> for $target {
                fn from(value: $source) -> Self {
                    Self(<$inner>::from(value))
                }
            }
        )*
    };
}

impl_from!(Nat, u128, [u8, u16, u32, u64, u128]);
impl_from!(Int, i128, [i8, i16, i32, i64, i128, u8, u16, u32, u64]);

impl From<usize> for Nat {
    fn from(value: usize) -> Self {
        Self(value as u128)
    }
}

impl PartialEq<u64> for Nat {
    fn eq(&self, other: &u64) -> bool {
        self.0 == u128::from(*other)
    }
}

impl Nat {
    /// Convert to `usize` when the value fits.
    #[must_use]
    pub fn to_usize(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for Nat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Nat {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl FromStr for Int {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Serialize for Nat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl Serialize for Int {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Nat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BigIntVisitor::<Self>(PhantomData))
    }
}

impl<'de> Deserialize<'de> for Int {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BigIntVisitor::<Self>(PhantomData))
    }
}

/// Shared visitor accepting decimal strings and JSON integers.
struct BigIntVisitor<T>(PhantomData<T>);

trait FromWide: FromStr + Sized {
    const EXPECTING: &'static str;
    fn from_u128(value: u128) -> Option<Self>;
    fn from_i128(value: i128) -> Option<Self>;
}

impl FromWide for Nat {
    const EXPECTING: &'static str = "a non-negative integer or decimal string";

    fn from_u128(value: u128) -> Option<Self> {
        Some(Self(value))
    }

    fn from_i128(value: i128) -> Option<Self> {
        u128::try_from(value).ok().map(Self)
    }
}

impl FromWide for Int {
    const EXPECTING: &'static str = "an integer or decimal string";

    fn from_u128(value: u128) -> Option<Self> {
        i128::try_from(value).ok().map(Self)
    }

    fn from_i128(value: i128) -> Option<Self> {
        Some(Self(value))
    }
}

impl<'de, T: FromWide> Visitor<'de> for BigIntVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(T::EXPECTING)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        T::from_u128(u128::from(v)).ok_or_else(|| E::custom(T::EXPECTING))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        T::from_i128(i128::from(v)).ok_or_else(|| E::custom(T::EXPECTING))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<T, E> {
        T::from_u128(v).ok_or_else(|| E::custom(T::EXPECTING))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<T, E> {
        T::from_i128(v).ok_or_else(|| E::custom(T::EXPECTING))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.parse()
            .map_err(|_| E::custom(format!("expected {}, got {v:?}", T::EXPECTING)))
    }
}
