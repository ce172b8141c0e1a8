//! crates/sim_core/src/ids.rs
//! Name tokens for parties, sub-units and regions.
//! Deterministic, strict shapes; no I/O.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors returned when validating or parsing names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    Empty,
    TooLong,
    BadShape,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Empty => f.write_str("empty name"),
            IdError::TooLong => f.write_str("name too long"),
            IdError::BadShape => f.write_str("name has invalid characters"),
        }
    }
}

impl std::error::Error for IdError {}

const TOKEN_MAX_LEN: usize = 64;
const NAME_MAX_CHARS: usize = 128;

/// Party token: ^[A-Za-z0-9_.:-]{1,64}$ (ASCII only)
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    let bs = s.as_bytes();
    if bs.is_empty() || bs.len() > TOKEN_MAX_LEN {
        return false;
    }
    bs.iter().all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-'))
}

/// Display names (sub-units, regions): non-blank, no control characters,
/// no surrounding whitespace, at most 128 chars. Non-ASCII letters are fine.
#[inline]
pub fn is_valid_name(s: &str) -> bool {
    !s.trim().is_empty()
        && s.trim() == s
        && s.chars().count() <= NAME_MAX_CHARS
        && !s.chars().any(char::is_control)
}

fn check_token(s: &str) -> Result<(), IdError> {
    if s.is_empty() { return Err(IdError::Empty); }
    if s.len() > TOKEN_MAX_LEN { return Err(IdError::TooLong); }
    if !is_valid_token(s) { return Err(IdError::BadShape); }
    Ok(())
}

fn check_name(s: &str) -> Result<(), IdError> {
    if s.trim().is_empty() { return Err(IdError::Empty); }
    if s.chars().count() > NAME_MAX_CHARS { return Err(IdError::TooLong); }
    if !is_valid_name(s) { return Err(IdError::BadShape); }
    Ok(())
}

macro_rules! simple_string_newtype {
    ($(#[$m:meta])* $name:ident, $check:path) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = IdError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $check(s)?;
                Ok($name(s.to_owned()))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                $check(&value)?;
                Ok($name(value))
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(value: $name) -> String { value.0 }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str { &self.0 }
        }
    }
}

simple_string_newtype!(
    /// Party token, e.g. `Labour`, `LibDems`: ^[A-Za-z0-9_.:-]{1,64}$
    PartyId, check_token
);
simple_string_newtype!(
    /// Sub-unit (constituency) display name, e.g. `Ynys Môn`.
    UnitName, check_name
);
simple_string_newtype!(
    /// Region display name, e.g. `North Wales`.
    RegionId, check_name
);
