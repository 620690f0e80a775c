//! Pass-through routes. The gateway uses them to reach the store services and
//! the order service uses them to reach the gateway.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tracing::{debug, instrument};

use super::{check_body_id, method_not_allowed, parse_path_id, RelayedReply};
use crate::clients::Downstream;
use crate::config::Endpoint;
use crate::error::{ResourceKind, ServiceError};
use crate::product_actor::validate_product_command;
use crate::user_actor::validate_user_command;
use crate::wire::FlatObject;

/// Where each resource's requests are forwarded.
#[derive(Debug, Clone)]
pub struct RelayRoutes {
    pub users: Endpoint,
    pub products: Endpoint,
}

impl RelayRoutes {
    /// Both resources behind one endpoint.
    pub fn single(endpoint: Endpoint) -> Self {
        Self {
            users: endpoint.clone(),
            products: endpoint,
        }
    }

    fn target(&self, resource: ResourceKind) -> &Endpoint {
        match resource {
            ResourceKind::User => &self.users,
            ResourceKind::Product => &self.products,
        }
    }
}

#[derive(Clone)]
pub struct RelayState {
    pub proxy: Arc<dyn Downstream>,
    pub routes: RelayRoutes,
}

/// The four resource routes, without a fallback so they can be merged.
pub fn relay_routes(state: RelayState) -> Router {
    Router::new()
        .route("/user/{id}", get(relay_get_user).fallback(method_not_allowed))
        .route("/user", post(relay_post_user).fallback(method_not_allowed))
        .route("/product/{id}", get(relay_get_product).fallback(method_not_allowed))
        .route("/product", post(relay_post_product).fallback(method_not_allowed))
        .with_state(state)
}

pub fn gateway_router(state: RelayState) -> Router {
    relay_routes(state).fallback(unknown_resource)
}

async fn unknown_resource() -> ServiceError {
    ServiceError::NotFound("unknown path".to_string())
}

async fn forward(
    state: &RelayState,
    resource: ResourceKind,
    method: Method,
    path: &str,
    body: &str,
) -> Result<RelayedReply, ServiceError> {
    let reply = state
        .proxy
        .send(method, state.routes.target(resource), path, Some(body))
        .await?;
    debug!(status = reply.status.as_u16(), "Relayed");
    Ok(RelayedReply(reply))
}

/// Bad ids are answered here and the forwarded path is rebuilt from the
/// parsed integer.
fn checked_get(raw_id: &str, body: &str) -> Result<i32, ServiceError> {
    let id = parse_path_id(raw_id)?;
    check_body_id(id, body)?;
    Ok(id)
}

#[instrument(skip(state, body))]
async fn relay_get_user(
    State(state): State<RelayState>,
    Path(id): Path<String>,
    body: String,
) -> Result<RelayedReply, ServiceError> {
    let path = ResourceKind::User.item_path(checked_get(&id, &body)?);
    forward(&state, ResourceKind::User, Method::GET, &path, &body).await
}

#[instrument(skip(state, body))]
async fn relay_get_product(
    State(state): State<RelayState>,
    Path(id): Path<String>,
    body: String,
) -> Result<RelayedReply, ServiceError> {
    let path = ResourceKind::Product.item_path(checked_get(&id, &body)?);
    forward(&state, ResourceKind::Product, Method::GET, &path, &body).await
}

/// Malformed commands are answered here without a network call.
#[instrument(skip_all)]
async fn relay_post_user(
    State(state): State<RelayState>,
    body: String,
) -> Result<RelayedReply, ServiceError> {
    validate_user_command(&FlatObject::decode(&body)?)?;
    let path = ResourceKind::User.collection_path();
    forward(&state, ResourceKind::User, Method::POST, path, &body).await
}

#[instrument(skip_all)]
async fn relay_post_product(
    State(state): State<RelayState>,
    body: String,
) -> Result<RelayedReply, ServiceError> {
    validate_product_command(&FlatObject::decode(&body)?)?;
    let path = ResourceKind::Product.collection_path();
    forward(&state, ResourceKind::Product, Method::POST, path, &body).await
}
