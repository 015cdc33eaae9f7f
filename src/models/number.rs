//! Lenient decoding of persisted numbers.
//!
//! Timestamps, XP values and counts are written as whole numbers, but any JSON
//! number is accepted on load. Fractions are truncated toward zero and values
//! outside the target range saturate.

use serde::{Deserialize, Deserializer};

/// Any JSON number, as written by whatever produced the blob.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredNumber {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl StoredNumber {
    fn to_i64(self) -> i64 {
        match self {
            StoredNumber::Signed(n) => n,
            StoredNumber::Unsigned(n) => i64::try_from(n).unwrap_or(i64::MAX),
            // `as` truncates and saturates
            StoredNumber::Float(f) => f as i64,
        }
    }
}

pub fn whole<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    StoredNumber::deserialize(deserializer).map(StoredNumber::to_i64)
}

pub fn optional_whole<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StoredNumber>::deserialize(deserializer).map(|n| n.map(StoredNumber::to_i64))
}

/// A non-negative count, clamped into `u32`.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    whole(deserializer).map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}
