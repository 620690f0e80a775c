//! Flat-object wire format shared by every service.
//!
//! A flat object is a single-level `{key:value,...}` payload. Keys may be quoted
//! or bare. Values are bare tokens (`12`, `9.50`) or double-quoted strings whose
//! quotes are stripped on decode. Pairs split on top-level commas and each pair
//! splits on its first colon. Nested objects and arrays are rejected, and a bare
//! `null` is read as an absent key.
//!
//! Schema limit: an unquoted value cannot contain a comma. Clients that need
//! one must quote the value.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("payload is not a brace-delimited object")]
    NotAnObject,
    #[error("malformed pair: {0:?}")]
    MalformedPair(String),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("nested value under key {0:?}")]
    Nested(String),
}

/// A single decoded or to-be-encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// Emitted without quotes: integers, decimals and other raw tokens.
    Bare(String),
    /// Emitted as a JSON string literal.
    Text(String),
}

impl WireValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn int(value: impl Into<i64>) -> Self {
        Self::Bare(value.into().to_string())
    }

    /// Prices always travel with exactly two decimal places.
    pub fn price(value: Decimal) -> Self {
        Self::Bare(render_price(value))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bare(raw) | Self::Text(raw) => raw,
        }
    }
}

pub fn render_price(value: Decimal) -> String {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Insertion-ordered flat object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatObject {
    pairs: Vec<(String, WireValue)>,
}

impl FlatObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FlatObject::insert`].
    pub fn with(mut self, key: impl Into<String>, value: WireValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces `key`, keeping its original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: WireValue) {
        let key = key.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.value(key).map(WireValue::as_str)
    }

    pub fn value(&self, key: &str) -> Option<&WireValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn decode(input: &str) -> Result<Self, WireError> {
        let inner = input
            .trim()
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or(WireError::NotAnObject)?
            .trim();

        let mut object = Self::new();
        if inner.is_empty() {
            return Ok(object);
        }

        for segment in split_top_level(inner, ',')? {
            let (raw_key, raw_value) = split_first_colon(segment)
                .ok_or_else(|| WireError::MalformedPair(segment.trim().to_string()))?;

            let key = unquote(raw_key.trim());
            if key.is_empty() {
                return Err(WireError::MalformedPair(segment.trim().to_string()));
            }

            let raw_value = raw_value.trim();
            let value = if raw_value.starts_with('"') {
                if raw_value.len() < 2 || !raw_value.ends_with('"') {
                    return Err(WireError::MalformedPair(segment.trim().to_string()));
                }
                WireValue::Text(unescape(raw_value))
            } else if raw_value.starts_with('{') || raw_value.starts_with('[') {
                return Err(WireError::Nested(key));
            } else if raw_value.is_empty() {
                return Err(WireError::MalformedPair(segment.trim().to_string()));
            } else if raw_value == "null" {
                continue;
            } else {
                WireValue::Bare(raw_value.to_string())
            };

            object.insert(key, value);
        }

        Ok(object)
    }

    pub fn encode(&self) -> String {
        let body = self
            .pairs
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    WireValue::Bare(raw) => raw.clone(),
                    WireValue::Text(text) => quote(text),
                };
                format!("{}:{}", quote(key), rendered)
            })
            .collect::<Vec<_>>()
            .join(",");
        format!("{{{}}}", body)
    }
}

impl fmt::Display for FlatObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn quote(raw: &str) -> String {
    serde_json::Value::String(raw.to_string()).to_string()
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        unescape(raw)
    } else {
        raw.to_string()
    }
}

// Falls back to plain quote stripping for literals serde_json refuses,
// e.g. raw control characters.
fn unescape(quoted: &str) -> String {
    serde_json::from_str::<String>(quoted)
        .unwrap_or_else(|_| quoted[1..quoted.len() - 1].to_string())
}

/// Splits on `separator` outside string literals and brackets.
fn split_top_level(input: &str, separator: char) -> Result<Vec<&str>, WireError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            _ if ch == separator && depth == 0 => {
                segments.push(&input[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }

    if in_string {
        return Err(WireError::UnterminatedString);
    }
    segments.push(&input[start..]);
    Ok(segments)
}

fn split_first_colon(segment: &str) -> Option<(&str, &str)> {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in segment.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            ':' => return Some((&segment[..idx], &segment[idx + 1..])),
            _ => {}
        }
    }
    None
}
