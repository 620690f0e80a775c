//! Replays a workload file against the order service.
//!
//! One command per line, whitespace separated:
//!
//! ```text
//! USER create <id> <username> <email> <password>
//! USER get <id>
//! USER update <id> [username:<v>] [email:<v>] [password:<v>]
//! USER delete <id> <username> <email> <password>
//! PRODUCT create <id> <name> <description> <price> <quantity>
//! PRODUCT info <id>
//! PRODUCT update <id> [name:<v>] [description:<v>] [price:<v>] [quantity:<v>]
//! PRODUCT delete <id> <name> <price> <quantity>
//! ORDER place <product_id> <user_id> <quantity>
//! ```
//!
//! Blank lines are skipped. A line that does not parse is logged and skipped.

use std::path::Path;
use std::str::FromStr;

use axum::http::Method;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::clients::Downstream;
use crate::config::Endpoint;
use crate::domain::PLACE_ORDER_COMMAND;
use crate::error::ResourceKind;
use crate::wire::{FlatObject, WireValue};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("unknown resource {0:?}")]
    UnknownResource(String),
    #[error("unknown {resource} action {action:?}")]
    UnknownAction { resource: String, action: String },
    #[error("{command} takes {expected} tokens, got {got}")]
    Arity {
        command: String,
        expected: usize,
        got: usize,
    },
    #[error("{field} is not a number: {raw:?}")]
    BadNumber { field: String, raw: String },
    #[error("unknown update field {0:?}")]
    UnknownField(String),
}

/// One request to send to the order service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRequest {
    pub method: Method,
    pub path: String,
    pub body: FlatObject,
}

impl WorkloadRequest {
    fn get(resource: ResourceKind, id: i32) -> Self {
        Self {
            method: Method::GET,
            path: resource.item_path(id),
            body: FlatObject::new().with("id", WireValue::int(id)),
        }
    }

    fn post(path: &str, body: FlatObject) -> Self {
        Self {
            method: Method::POST,
            path: path.to_string(),
            body,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadSummary {
    /// Requests that got any HTTP reply.
    pub sent: usize,
    /// Lines that did not parse.
    pub skipped: usize,
    /// Requests that never got a reply.
    pub failed: usize,
}

/// Parses one line. `Ok(None)` means the line was blank.
pub fn parse_line(line: &str) -> Result<Option<WorkloadRequest>, WorkloadError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&resource) = tokens.first() else {
        return Ok(None);
    };
    let action = tokens.get(1).copied().unwrap_or_default();

    let request = match resource {
        "USER" => parse_user(action, &tokens)?,
        "PRODUCT" => parse_product(action, &tokens)?,
        "ORDER" => parse_order(action, &tokens)?,
        other => return Err(WorkloadError::UnknownResource(other.to_string())),
    };
    Ok(Some(request))
}

fn parse_user(action: &str, tokens: &[&str]) -> Result<WorkloadRequest, WorkloadError> {
    let path = ResourceKind::User.collection_path();
    match action.to_ascii_lowercase().as_str() {
        "get" => {
            arity("USER get", tokens, 3)?;
            Ok(WorkloadRequest::get(ResourceKind::User, number("id", tokens[2])?))
        }
        "create" | "delete" => {
            let command = action.to_ascii_lowercase();
            arity(&format!("USER {command}"), tokens, 6)?;
            let body = FlatObject::new()
                .with("command", WireValue::text(command))
                .with("id", WireValue::int(number::<i32>("id", tokens[2])?))
                .with("username", WireValue::text(tokens[3]))
                .with("email", WireValue::text(tokens[4]))
                .with("password", WireValue::text(tokens[5]));
            Ok(WorkloadRequest::post(path, body))
        }
        "update" => {
            let mut body = update_head(tokens, "USER update")?;
            for (field, value) in update_fields(&tokens[3..])? {
                match field {
                    "username" | "email" | "password" => body.insert(field, WireValue::text(value)),
                    other => return Err(WorkloadError::UnknownField(other.to_string())),
                }
            }
            Ok(WorkloadRequest::post(path, body))
        }
        _ => Err(unknown_action("USER", action)),
    }
}

fn parse_product(action: &str, tokens: &[&str]) -> Result<WorkloadRequest, WorkloadError> {
    let path = ResourceKind::Product.collection_path();
    match action.to_ascii_lowercase().as_str() {
        "info" => {
            arity("PRODUCT info", tokens, 3)?;
            Ok(WorkloadRequest::get(ResourceKind::Product, number("id", tokens[2])?))
        }
        "create" => {
            arity("PRODUCT create", tokens, 7)?;
            let body = FlatObject::new()
                .with("command", WireValue::text("create"))
                .with("id", WireValue::int(number::<i32>("id", tokens[2])?))
                .with("name", WireValue::text(tokens[3]))
                .with("description", WireValue::text(tokens[4]))
                .with("price", price(tokens[5])?)
                .with("quantity", WireValue::int(number::<i32>("quantity", tokens[6])?));
            Ok(WorkloadRequest::post(path, body))
        }
        "delete" => {
            arity("PRODUCT delete", tokens, 6)?;
            let body = FlatObject::new()
                .with("command", WireValue::text("delete"))
                .with("id", WireValue::int(number::<i32>("id", tokens[2])?))
                .with("name", WireValue::text(tokens[3]))
                .with("price", price(tokens[4])?)
                .with("quantity", WireValue::int(number::<i32>("quantity", tokens[5])?));
            Ok(WorkloadRequest::post(path, body))
        }
        "update" => {
            let mut body = update_head(tokens, "PRODUCT update")?;
            for (field, value) in update_fields(&tokens[3..])? {
                let value = match field {
                    "name" | "description" => WireValue::text(value),
                    "price" => price(value)?,
                    "quantity" => WireValue::int(number::<i32>("quantity", value)?),
                    other => return Err(WorkloadError::UnknownField(other.to_string())),
                };
                body.insert(field, value);
            }
            Ok(WorkloadRequest::post(path, body))
        }
        _ => Err(unknown_action("PRODUCT", action)),
    }
}

fn parse_order(action: &str, tokens: &[&str]) -> Result<WorkloadRequest, WorkloadError> {
    if !action.eq_ignore_ascii_case("place") {
        return Err(unknown_action("ORDER", action));
    }
    arity("ORDER place", tokens, 5)?;
    let body = FlatObject::new()
        .with("command", WireValue::text(PLACE_ORDER_COMMAND))
        .with("product_id", WireValue::int(number::<i32>("product_id", tokens[2])?))
        .with("user_id", WireValue::int(number::<i32>("user_id", tokens[3])?))
        .with("quantity", WireValue::int(number::<i32>("quantity", tokens[4])?));
    Ok(WorkloadRequest::post("/order", body))
}

fn update_head(tokens: &[&str], command: &str) -> Result<FlatObject, WorkloadError> {
    if tokens.len() < 3 {
        return Err(WorkloadError::Arity {
            command: command.to_string(),
            expected: 3,
            got: tokens.len(),
        });
    }
    Ok(FlatObject::new()
        .with("command", WireValue::text("update"))
        .with("id", WireValue::int(number::<i32>("id", tokens[2])?)))
}

fn update_fields<'a>(tokens: &[&'a str]) -> Result<Vec<(&'a str, &'a str)>, WorkloadError> {
    tokens
        .iter()
        .copied()
        .map(|token| {
            token
                .split_once(':')
                .ok_or_else(|| WorkloadError::UnknownField(token.to_string()))
        })
        .collect()
}

fn arity(command: &str, tokens: &[&str], expected: usize) -> Result<(), WorkloadError> {
    if tokens.len() != expected {
        return Err(WorkloadError::Arity {
            command: command.to_string(),
            expected,
            got: tokens.len(),
        });
    }
    Ok(())
}

fn number<T: FromStr>(field: &str, raw: &str) -> Result<T, WorkloadError> {
    raw.parse().map_err(|_| WorkloadError::BadNumber {
        field: field.to_string(),
        raw: raw.to_string(),
    })
}

/// Prices go out with two decimals so a later delete can match them.
fn price(raw: &str) -> Result<WireValue, WorkloadError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(WireValue::price)
        .map_err(|_| WorkloadError::BadNumber {
            field: "price".to_string(),
            raw: raw.to_string(),
        })
}

fn unknown_action(resource: &str, action: &str) -> WorkloadError {
    WorkloadError::UnknownAction {
        resource: resource.to_string(),
        action: action.to_string(),
    }
}

/// Sends every command in `file` to `target`, one at a time, in file order.
#[instrument(skip(proxy), fields(target = %target))]
pub async fn run_workload(
    file: &Path,
    proxy: &dyn Downstream,
    target: &Endpoint,
) -> std::io::Result<WorkloadSummary> {
    let contents = tokio::fs::read_to_string(file).await?;
    let mut summary = WorkloadSummary::default();

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let request = match parse_line(line) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                warn!(line_no, error = %e, "Invalid input");
                summary.skipped += 1;
                continue;
            }
        };

        let body = request.body.encode();
        match proxy
            .send(request.method.clone(), target, &request.path, Some(&body))
            .await
        {
            Ok(reply) => {
                info!(line_no, status = reply.status.as_u16(), body = %reply.body, "Reply");
                summary.sent += 1;
            }
            Err(e) => {
                warn!(line_no, error = %e, "No reply");
                summary.failed += 1;
            }
        }
    }

    info!(?summary, "Workload finished");
    Ok(summary)
}
