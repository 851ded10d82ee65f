//! `find -size` expressions.
//!
//! `+N` is strictly greater, `-N` strictly less and a bare `N` exact.
//! `N` may carry a `k`, `m` or `g` suffix (powers of 1024).

use crate::core::error::{QuiverError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeFilter {
    Greater(u64),
    Less(u64),
    Equal(u64),
}

impl SizeFilter {
    /// Parse an expression such as `+1k`, `-3M` or `2048`
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            QuiverError::InvalidArgument(format!("invalid size expression '{expr}': {reason}"))
        };

        let trimmed = expr.trim();
        let (ctor, rest): (fn(u64) -> SizeFilter, &str) = match trimmed.chars().next() {
            Some('+') => (SizeFilter::Greater, &trimmed[1..]),
            Some('-') => (SizeFilter::Less, &trimmed[1..]),
            Some(_) => (SizeFilter::Equal, trimmed),
            None => return Err(invalid("empty")),
        };

        let (digits, multiplier) = match rest.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => {
                let multiplier = match c.to_ascii_lowercase() {
                    'k' => 1024,
                    'm' => 1024 * 1024,
                    'g' => 1024 * 1024 * 1024,
                    _ => return Err(invalid("unit must be k, m or g")),
                };
                (&rest[..rest.len() - 1], multiplier)
            }
            _ => (rest, 1),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a number"));
        }
        let value: u64 = digits.parse().map_err(|_| invalid("number out of range"))?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| invalid("size out of range"))?;

        Ok(ctor(bytes))
    }

    pub fn matches(&self, size: u64) -> bool {
        match *self {
            SizeFilter::Greater(n) => size > n,
            SizeFilter::Less(n) => size < n,
            SizeFilter::Equal(n) => size == n,
        }
    }
}

impl FromStr for SizeFilter {
    type Err = QuiverError;

    fn from_str(s: &str) -> Result<Self> {
        SizeFilter::parse(s)
    }
}

impl fmt::Display for SizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeFilter::Greater(n) => write!(f, "+{n}"),
            SizeFilter::Less(n) => write!(f, "-{n}"),
            SizeFilter::Equal(n) => write!(f, "{n}"),
        }
    }
}
