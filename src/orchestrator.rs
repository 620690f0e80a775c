//! The order-placement workflow.
//!
//! Every step goes through the gateway: look up the user, look up the
//! product, compare stock, then commit the decrement. Nothing is rolled back
//! because only the commit mutates.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use tracing::{info, instrument, warn};

use crate::clients::{Downstream, DownstreamError, DownstreamReply};
use crate::config::Endpoint;
use crate::domain::{CommitStrategy, PlaceOrder};
use crate::error::{ResourceKind, ServiceError};
use crate::wire::{FlatObject, WireValue};

pub struct Orchestrator {
    proxy: Arc<dyn Downstream>,
    gateway: Endpoint,
    commit: CommitStrategy,
}

impl Orchestrator {
    pub fn new(proxy: Arc<dyn Downstream>, gateway: Endpoint, commit: CommitStrategy) -> Self {
        Self {
            proxy,
            gateway,
            commit,
        }
    }

    /// Runs one order to completion and returns the committed product
    /// snapshot tagged with `"status":"success"`.
    #[instrument(skip(self), fields(commit = ?self.commit))]
    pub async fn place_order(&self, order: PlaceOrder) -> Result<FlatObject, ServiceError> {
        // Both lookups always run, in this order.
        let user = self.lookup(ResourceKind::User, order.user_id).await?;
        let product = self.lookup(ResourceKind::Product, order.product_id).await?;

        if !user.is_success() || !product.is_success() {
            info!(
                user_status = user.status.as_u16(),
                product_status = product.status.as_u16(),
                "Order references a missing record"
            );
            return Err(ServiceError::NotFound(format!(
                "user {} or product {}",
                order.user_id, order.product_id
            )));
        }

        let available = stock_on_hand(&product)?;
        if order.quantity > available {
            info!(available, "Order exceeds stock");
            return Err(ServiceError::ExceededQuantity {
                requested: order.quantity,
                available,
            });
        }

        let reply = self.send_commit(&order, available).await?;
        if reply.status == StatusCode::OK {
            let mut snapshot = reply.flat_body()?;
            snapshot.insert("status", WireValue::text("success"));
            info!("Order placed");
            return Ok(snapshot);
        }
        // Another order drained the stock between the check and the reserve.
        if reply.status == StatusCode::CONFLICT && self.commit == CommitStrategy::Reserve {
            info!("Reservation lost to a concurrent order");
            return Err(ServiceError::ExceededQuantity {
                requested: order.quantity,
                available,
            });
        }
        warn!(status = reply.status.as_u16(), "Commit rejected");
        Err(ServiceError::CommitRejected(reply.status))
    }

    async fn lookup(&self, resource: ResourceKind, id: i32) -> Result<DownstreamReply, ServiceError> {
        let body = FlatObject::new().with("id", WireValue::int(id)).encode();
        let reply = self
            .proxy
            .send(Method::GET, &self.gateway, &resource.item_path(id), Some(&body))
            .await?;
        Ok(reply)
    }

    async fn send_commit(&self, order: &PlaceOrder, available: u32) -> Result<DownstreamReply, ServiceError> {
        let body = match self.commit {
            CommitStrategy::Reserve => FlatObject::new()
                .with("command", WireValue::text("reserve"))
                .with("id", WireValue::int(order.product_id))
                .with("quantity", WireValue::int(order.quantity)),
            CommitStrategy::Update => FlatObject::new()
                .with("command", WireValue::text("update"))
                .with("id", WireValue::int(order.product_id))
                .with("quantity", WireValue::int(available - order.quantity)),
        };
        let reply = self
            .proxy
            .send(
                Method::POST,
                &self.gateway,
                ResourceKind::Product.collection_path(),
                Some(&body.encode()),
            )
            .await?;
        Ok(reply)
    }
}

fn stock_on_hand(product: &DownstreamReply) -> Result<u32, DownstreamError> {
    let body = product.flat_body()?;
    body.get("quantity")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| DownstreamError::Decode(format!("product reply has no usable quantity: {}", product.body)))
}
