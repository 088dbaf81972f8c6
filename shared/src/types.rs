//! Common types used across the platform

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical product identifier (digits only, e.g. a JAN code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuId(String);

impl SkuId {
    /// Normalize a raw identifier into its canonical digit string.
    ///
    /// Spreadsheet exports often turn codes into floats, so `"123.0"` and
    /// `"1.23e2"` both become `"123"`. Leading zeros of a plain digit string
    /// are kept. Returns `None` for anything that is not a non-negative
    /// whole number.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Some(Self(trimmed.to_string()));
        }

        if let Some((whole, fraction)) = trimmed.split_once('.') {
            let whole_ok = !whole.is_empty() && whole.chars().all(|c| c.is_ascii_digit());
            let fraction_ok = !fraction.is_empty() && fraction.chars().all(|c| c == '0');
            if whole_ok && fraction_ok {
                return Some(Self(whole.to_string()));
            }
        }

        let number = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()?;
        Self::from_decimal(number)
    }

    /// Build an identifier from a numeric cell value
    pub fn from_decimal(number: Decimal) -> Option<Self> {
        if number.is_sign_negative() || !number.fract().is_zero() {
            return None;
        }
        Some(Self(number.trunc().normalize().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SkuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Offset/limit window for paginated table reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    /// The window following this one
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            limit: self.limit,
        }
    }

    /// The window starting after `rows` rows of this one, for servers that
    /// return short pages
    pub fn advance(&self, rows: usize) -> Self {
        Self {
            offset: self.offset + rows,
            limit: self.limit,
        }
    }

    /// Inclusive last row index, as used by `Range` style headers
    pub fn last_index(&self) -> usize {
        self.offset + self.limit.saturating_sub(1)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(1000)
    }
}
