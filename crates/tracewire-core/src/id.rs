//! Trace and span identifier value types

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing a hex encoded identifier fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseIdError {
    /// The input was empty
    #[error("identifier is empty")]
    Empty,
    /// The input had more hex digits than the identifier can hold
    #[error("identifier has {len} hex digits, at most {max} allowed")]
    TooLong { len: usize, max: usize },
    /// The input contained a non-hex character
    #[error("identifier contains non-hex characters")]
    InvalidHex,
}

/// 128-bit trace identifier split into two 64-bit words.
///
/// A `high` word of zero is the common 64-bit-only form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId {
    /// Upper 64 bits
    pub high: u64,
    /// Lower 64 bits
    pub low: u64,
}

impl TraceId {
    /// Create a trace ID from its two words
    pub const fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// Create a 64-bit trace ID (`high` is zero)
    pub const fn from_low(low: u64) -> Self {
        Self { high: 0, low }
    }

    /// True when both words are zero. Generators never return this value.
    pub const fn is_empty(&self) -> bool {
        self.high == 0 && self.low == 0
    }

    /// The full 128-bit value
    pub const fn to_u128(&self) -> u128 {
        ((self.high as u128) << 64) | self.low as u128
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        Self {
            high: (value >> 64) as u64,
            low: value as u64,
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high == 0 {
            write!(f, "{:016x}", self.low)
        } else {
            write!(f, "{:016x}{:016x}", self.high, self.low)
        }
    }
}

impl FromStr for TraceId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_hex(s, 32)?;
        if s.len() > 16 {
            let (high, low) = s.split_at(s.len() - 16);
            Ok(Self {
                high: parse_word(high)?,
                low: parse_word(low)?,
            })
        } else {
            Ok(Self::from_low(parse_word(s)?))
        }
    }
}

/// 64-bit span identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(pub u64);

impl SpanId {
    /// The raw 64-bit value
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SpanId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_hex(s, 16)?;
        parse_word(s).map(SpanId)
    }
}

fn check_hex(s: &str, max: usize) -> Result<(), ParseIdError> {
    if s.is_empty() {
        return Err(ParseIdError::Empty);
    }
    if s.len() > max {
        return Err(ParseIdError::TooLong { len: s.len(), max });
    }
    // from_str_radix alone would accept a leading '+'
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseIdError::InvalidHex);
    }
    Ok(())
}

fn parse_word(s: &str) -> Result<u64, ParseIdError> {
    u64::from_str_radix(s, 16).map_err(|_| ParseIdError::InvalidHex)
}

// Both IDs travel as hex strings in JSON, the same form used in headers.

impl Serialize for TraceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TraceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for SpanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
