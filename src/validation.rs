//! Field-level parsing shared by the command validators.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ServiceError;
use crate::wire::FlatObject;

pub fn required<'a>(body: &'a FlatObject, key: &str) -> Result<&'a str, ServiceError> {
    body.get(key)
        .ok_or_else(|| ServiceError::malformed(format!("missing field {key}")))
}

/// Text is kept exactly as decoded; absent fields stay `None`.
pub fn optional_text(body: &FlatObject, key: &str) -> Option<String> {
    body.get(key).map(str::to_string)
}

pub fn required_text(body: &FlatObject, key: &str) -> Result<String, ServiceError> {
    required(body, key).map(str::to_string)
}

pub fn parse_id(key: &str, raw: &str) -> Result<i32, ServiceError> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::malformed(format!("{key} is not an integer: {raw:?}")))
}

/// The mandatory `id` of every resource command.
pub fn record_id(body: &FlatObject) -> Result<i32, ServiceError> {
    parse_id("id", required(body, "id")?)
}

/// Integer count no smaller than `min`.
pub fn parse_count(key: &str, raw: &str, min: u32) -> Result<u32, ServiceError> {
    let value: i32 = raw
        .trim()
        .parse()
        .map_err(|_| ServiceError::malformed(format!("{key} is not an integer: {raw:?}")))?;
    u32::try_from(value)
        .ok()
        .filter(|count| *count >= min)
        .ok_or_else(|| ServiceError::malformed(format!("{key} must be at least {min}, got {value}")))
}

/// Non-negative decimal, rounded to cents.
pub fn parse_price(raw: &str) -> Result<Decimal, ServiceError> {
    let raw = raw.trim();
    let price = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ServiceError::malformed(format!("price is not a number: {raw:?}")))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ServiceError::malformed(format!("price must not be negative: {raw}")));
    }
    let mut cents = price.round_dp(2);
    cents.rescale(2);
    Ok(cents)
}

/// Blank values are rejected but stored values keep their padding.
pub fn non_empty(key: &str, value: String) -> Result<String, ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::malformed(format!("{key} must not be empty")));
    }
    Ok(value)
}

pub fn email(value: String) -> Result<String, ServiceError> {
    if !value.contains('@') {
        return Err(ServiceError::malformed(format!("email has no '@': {value:?}")));
    }
    Ok(value)
}
