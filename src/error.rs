use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clients::DownstreamError;
use crate::server::FlatReply;
use crate::wire::{FlatObject, WireError};

/// The two resource kinds served by the store services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Product,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Product => "product",
        }
    }

    /// Collection root, also the prefix of item paths.
    pub fn collection_path(self) -> &'static str {
        match self {
            ResourceKind::User => "/user",
            ResourceKind::Product => "/product",
        }
    }

    pub fn item_path(self, id: i32) -> String {
        format!("{}/{}", self.collection_path(), id)
    }

    /// Status for a delete whose verification fields don't match the record.
    /// The two services disagree here and clients depend on both values.
    pub fn mismatch_status(self) -> StatusCode {
        match self {
            ResourceKind::User => StatusCode::NOT_FOUND,
            ResourceKind::Product => StatusCode::UNAUTHORIZED,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised inside a store actor.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("validation error: {0}")]
    Invalid(String),
    #[error("verification fields do not match: {0}")]
    VerificationFailed(String),
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("actor communication error: {0}")]
    ActorCommunication(String),
}

/// Request-level failure taxonomy shared by every HTTP surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{resource} verification fields do not match")]
    DeleteMismatch { resource: ResourceKind },
    #[error("exceeded quantity limit: requested {requested}, available {available}")]
    ExceededQuantity { requested: u32, available: u32 },
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("downstream unavailable: {0}")]
    DownstreamUnavailable(#[from] DownstreamError),
    #[error("commit rejected with status {0}")]
    CommitRejected(StatusCode),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ServiceError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ServiceError::MalformedInput(reason.into())
    }

    pub fn from_store(resource: ResourceKind, error: StoreError) -> Self {
        match error {
            StoreError::NotFound(what) => ServiceError::NotFound(what),
            StoreError::AlreadyExists(what) => ServiceError::Conflict(what),
            StoreError::Invalid(reason) => ServiceError::MalformedInput(reason),
            StoreError::VerificationFailed(_) => ServiceError::DeleteMismatch { resource },
            StoreError::InsufficientStock { .. } => ServiceError::Conflict(error.to_string()),
            StoreError::ActorCommunication(reason) => ServiceError::StoreUnavailable(reason),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::DeleteMismatch { resource } => resource.mismatch_status(),
            ServiceError::ExceededQuantity { .. } => StatusCode::BAD_REQUEST,
            ServiceError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::DownstreamUnavailable(DownstreamError::Timeout) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ServiceError::DownstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            ServiceError::CommitRejected(status) => *status,
            ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Text carried in the `status` field of order-service replies.
    pub fn status_text(&self) -> &'static str {
        match self {
            ServiceError::ExceededQuantity { .. } => "Exceeded quantity limit",
            ServiceError::DownstreamUnavailable(_) | ServiceError::StoreUnavailable(_) => {
                "Service Unavailable"
            }
            _ => "Invalid Request",
        }
    }

    pub fn log(&self) {
        if self.status().is_server_error() {
            warn!(error = %self, status = self.status().as_u16(), "Request failed");
        } else {
            debug!(error = %self, status = self.status().as_u16(), "Request rejected");
        }
    }
}

impl From<WireError> for ServiceError {
    fn from(error: WireError) -> Self {
        ServiceError::MalformedInput(error.to_string())
    }
}

/// Resource services answer every failure with an empty object.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        self.log();
        FlatReply(self.status(), FlatObject::new()).into_response()
    }
}
