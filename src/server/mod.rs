//! HTTP surfaces for every service role.

pub mod order_routes;
pub mod product_routes;
pub mod relay;
pub mod user_routes;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::clients::DownstreamReply;
use crate::error::ServiceError;
use crate::validation::record_id;
use crate::wire::FlatObject;

pub use order_routes::order_router;
pub use product_routes::product_router;
pub use relay::{gateway_router, RelayState};
pub use user_routes::user_router;

/// A flat-object reply with an explicit status.
#[derive(Debug)]
pub struct FlatReply(pub StatusCode, pub FlatObject);

impl FlatReply {
    pub fn ok(body: FlatObject) -> Self {
        Self(StatusCode::OK, body)
    }
}

impl IntoResponse for FlatReply {
    fn into_response(self) -> Response {
        let FlatReply(status, body) = self;
        (status, [(header::CONTENT_TYPE, "application/json")], body.encode()).into_response()
    }
}

/// A downstream reply forwarded verbatim.
#[derive(Debug)]
pub struct RelayedReply(pub DownstreamReply);

impl IntoResponse for RelayedReply {
    fn into_response(self) -> Response {
        let RelayedReply(reply) = self;
        (reply.status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
    }
}

pub fn parse_path_id(raw: &str) -> Result<i32, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::malformed(format!("path id is not an integer: {raw:?}")))
}

/// A GET may repeat the id in its body. Bodies that are empty, `{}` or not a
/// flat object at all are ignored. Any other object must carry the path id.
pub fn check_body_id(path_id: i32, body: &str) -> Result<(), ServiceError> {
    let body = match FlatObject::decode(body) {
        Ok(body) if !body.is_empty() => body,
        _ => return Ok(()),
    };
    let body_id = record_id(&body)?;
    if body_id != path_id {
        return Err(ServiceError::malformed(format!(
            "body id {body_id} does not match path id {path_id}"
        )));
    }
    Ok(())
}

pub async fn method_not_allowed() -> ServiceError {
    ServiceError::MethodNotAllowed
}

pub async fn invalid_path() -> ServiceError {
    ServiceError::malformed("unknown path")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_id_must_match_path() {
        assert!(check_body_id(1, "").is_ok());
        assert!(check_body_id(1, "  ").is_ok());
        assert!(check_body_id(1, "{}").is_ok());
        assert!(check_body_id(1, r#"{"id":1}"#).is_ok());
        assert!(check_body_id(1, r#"{"id":"1"}"#).is_ok());
        assert!(check_body_id(1, r#"{"id":2}"#).is_err());
        assert!(check_body_id(1, r#"{"name":"x"}"#).is_err());
        assert!(check_body_id(1, r#"{"id":"one"}"#).is_err());
        assert!(check_body_id(1, "garbage").is_ok());
        assert!(check_body_id(1, "id=1").is_ok());
    }

    #[test]
    fn path_ids_are_integers() {
        assert_eq!(parse_path_id("12").unwrap(), 12);
        assert_eq!(parse_path_id("-3").unwrap(), -3);
        assert!(parse_path_id("abc").is_err());
        assert!(parse_path_id("1.5").is_err());
    }
}
