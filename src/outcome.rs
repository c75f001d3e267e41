//! Results for best-effort work whose failure is tolerated.
//!
//! Storage writes, numeric parsing of counter targets and decoding of form
//! response bodies may all fail without affecting the rest of the page. They
//! return [`BestEffort`] so callers (and tests) can see that the degraded
//! path was taken rather than having the failure vanish.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BestEffort<T> {
    Applied(T),
    Ignored(Ignored),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ignored {
    /// Local storage is missing or rejected the operation.
    StorageUnavailable,
    /// Text that should have held an integer did not.
    InvalidNumber(String),
    /// A response body was not the expected JSON.
    MalformedJson(String),
}

impl<T> BestEffort<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Ignored(_) => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }

    pub fn ignored(&self) -> Option<&Ignored> {
        match self {
            Self::Applied(_) => None,
            Self::Ignored(reason) => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BestEffort<U> {
        match self {
            Self::Applied(value) => BestEffort::Applied(f(value)),
            Self::Ignored(reason) => BestEffort::Ignored(reason),
        }
    }
}

impl Ignored {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageUnavailable => "storage_unavailable",
            Self::InvalidNumber(_) => "invalid_number",
            Self::MalformedJson(_) => "malformed_json",
        }
    }
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageUnavailable => f.write_str("local storage unavailable"),
            Self::InvalidNumber(text) => write!(f, "not an integer: {text:?}"),
            Self::MalformedJson(detail) => write!(f, "malformed JSON: {detail}"),
        }
    }
}
