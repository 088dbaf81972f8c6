//! Validation and coercion utilities for raw table cells
//!
//! Rows arrive as JSON objects from the hosted store or a spreadsheet export,
//! so every numeric field may be a number, a numeric string, an empty string
//! or null. The policy is to degrade to zero (or to "not purchasable") and
//! never fail on a single bad cell.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::types::SkuId;

// ============================================================================
// Numeric Coercion
// ============================================================================

/// Read a cell as a decimal number, if it holds one
pub fn cell_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let s = s.trim().replace(',', "");
            if s.is_empty() {
                return None;
            }
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .ok()
        }
        _ => None,
    }
}

/// Coerce a unit count. Null, non-numeric and negative values become 0;
/// fractional units are truncated.
pub fn coerce_quantity(value: &Value) -> u64 {
    cell_decimal(value)
        .filter(|d| d.is_sign_positive())
        .and_then(|d| d.trunc().to_u64())
        .unwrap_or(0)
}

/// Coerce an order lot size. Returns `None` for anything that cannot be
/// ordered in positive whole lots.
pub fn coerce_lot_size(value: &Value) -> Option<u64> {
    let lot = cell_decimal(value)?.trunc().to_i64()?;
    if lot <= 0 {
        return None;
    }
    Some(lot as u64)
}

/// Coerce a unit price. Null, unparseable and negative prices are `None`.
pub fn coerce_price(value: &Value) -> Option<Decimal> {
    cell_decimal(value).filter(|p| !p.is_sign_negative() || p.is_zero())
}

/// Coerce a flag such as `discontinued`
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(_) => cell_decimal(value).map(|d| !d.is_zero()).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "t" | "1" | "yes" | "y" | "廃番" | "終売"
        ),
        _ => false,
    }
}

/// Coerce a date cell. Accepts `YYYY-MM-DD` and timestamps starting with it.
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Coerce a free-text cell, treating blanks as missing
pub fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ============================================================================
// Identifier Normalization
// ============================================================================

/// Normalize a SKU cell into its canonical digit string
pub fn normalize_sku_id(value: &Value) -> Option<SkuId> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return SkuId::parse(&u.to_string());
            }
            let f = n.as_f64()?;
            if !f.is_finite() {
                return None;
            }
            SkuId::from_decimal(Decimal::from_f64(f)?)
        }
        Value::String(s) => SkuId::parse(s),
        _ => None,
    }
}
