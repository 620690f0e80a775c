use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tracing::instrument;

use super::relay::{relay_routes, RelayState};
use super::{invalid_path, FlatReply};
use crate::domain::PlaceOrder;
use crate::error::ServiceError;
use crate::orchestrator::Orchestrator;
use crate::wire::{FlatObject, WireValue};

/// Order-service failures carry a `status` text instead of an empty object.
#[derive(Debug)]
pub struct OrderRejection(pub ServiceError);

impl From<ServiceError> for OrderRejection {
    fn from(error: ServiceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for OrderRejection {
    fn into_response(self) -> Response {
        let OrderRejection(error) = self;
        let body = FlatObject::new().with("status", WireValue::text(error.status_text()));
        error.log();
        FlatReply(error.status(), body).into_response()
    }
}

/// `POST /order` plus the resource relay routes through the gateway.
pub fn order_router(orchestrator: Arc<Orchestrator>, relay: RelayState) -> Router {
    Router::new()
        .route("/order", post(place_order).fallback(order_method_not_allowed))
        .with_state(orchestrator)
        .merge(relay_routes(relay))
        .fallback(invalid_path)
}

async fn order_method_not_allowed() -> OrderRejection {
    OrderRejection(ServiceError::MethodNotAllowed)
}

#[instrument(skip_all)]
async fn place_order(
    State(orchestrator): State<Arc<Orchestrator>>,
    body: String,
) -> Result<FlatReply, OrderRejection> {
    let order = PlaceOrder::try_from(&FlatObject::decode(&body).map_err(ServiceError::from)?)?;
    let snapshot = orchestrator.place_order(order).await?;
    Ok(FlatReply::ok(snapshot))
}
