//! # Identifier Newtypes
//!
//! A dealership carries two identifiers: the [`StoreId`] the document store
//! assigns to every document, and the [`DealerNumericId`] the application
//! assigns for human and legacy lookups. Keeping them as separate types means
//! a numeric id can never be handed to a store-id lookup by accident.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, IdentityError};

/// Number of raw bytes in a [`StoreId`].
pub const STORE_ID_BYTES: usize = 12;

/// Store-assigned document identifier.
///
/// Twelve bytes rendered as 24 lowercase hex digits: a 4-byte big-endian
/// creation time in seconds, 5 bytes unique to the process, and a 3-byte
/// counter. Ids generated by one process sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId([u8; STORE_ID_BYTES]);

impl StoreId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
        static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

        let unique = PROCESS_UNIQUE.get_or_init(rand::random);
        let counter =
            COUNTER.get_or_init(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff));

        // Seconds since the epoch fit in u32 until 2106.
        let seconds = chrono::Utc::now().timestamp() as u32;
        let count = counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; STORE_ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parse the 24-digit hex form. Upper and lower case are accepted.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        if !Self::is_valid(s) {
            return Err(IdentityError::InvalidStoreId(s.to_string()));
        }
        let mut bytes = [0u8; STORE_ID_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| IdentityError::InvalidStoreId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }

    /// Whether `s` is a syntactically valid store id.
    pub fn is_valid(s: &str) -> bool {
        s.len() == STORE_ID_BYTES * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for StoreId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StoreId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for StoreId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Application-assigned dealership identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealerNumericId(pub i64);

impl fmt::Display for DealerNumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application-assigned review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub i64);

impl ReviewId {
    /// Id given to the first review of an empty collection.
    pub const FIRST: Self = Self(1);

    /// The id following this one.
    pub fn next(self) -> Result<Self, CoreError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(CoreError::ReviewIdOverflow(self.0))
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a single dealership is addressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DealerLookup {
    /// By the store-assigned document id.
    ByStoreId(StoreId),
    /// By the application-assigned numeric id.
    ByNumericId(DealerNumericId),
    /// A number no dealership id can equal: fractional, infinite, or outside
    /// the `i64` range.
    Unmatchable(f64),
}

impl DealerLookup {
    /// Classify a raw path segment.
    ///
    /// A valid store id wins over a numeric reading: a 24-digit decimal
    /// string is looked up by store id only. Anything else is read as a
    /// number the way JavaScript's `Number()` reads a string.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        if let Ok(store_id) = StoreId::parse(raw) {
            return Ok(Self::ByStoreId(store_id));
        }
        parse_number(raw)
            .map(Self::from_number)
            .ok_or_else(|| IdentityError::InvalidDealerId(raw.to_string()))
    }

    fn from_number(n: f64) -> Self {
        // 2^63 is exact in f64; integral values in [-2^63, 2^63) fit in i64.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if n.fract() == 0.0 && (-LIMIT..LIMIT).contains(&n) {
            Self::ByNumericId(DealerNumericId(n as i64))
        } else {
            Self::Unmatchable(n)
        }
    }
}

/// Numeric reading of `raw` following JavaScript's `Number(string)`.
///
/// Surrounding whitespace is ignored and blank text is zero. Accepts an
/// optional sign, a fraction, an exponent, `Infinity`, and unsigned
/// `0x`/`0o`/`0b` integers. Returns `None` where that conversion gives `NaN`.
fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        return Some(
            digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d)),
        );
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return Some(if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    // Rust also accepts "inf" and "nan"; JavaScript does not.
    let allowed = |b: u8| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-');
    if !text.bytes().all(allowed) {
        return None;
    }
    text.parse::<f64>().ok()
}

impl FromStr for DealerLookup {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DealerLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByStoreId(id) => write!(f, "store:{id}"),
            Self::ByNumericId(id) => write!(f, "numeric:{id}"),
            Self::Unmatchable(n) => write!(f, "number:{n}"),
        }
    }
}
