use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, instrument};

use super::{check_body_id, invalid_path, method_not_allowed, parse_path_id, FlatReply};
use crate::clients::ProductClient;
use crate::error::{ResourceKind, ServiceError, StoreError};
use crate::product_actor::{validate_product_command, ProductCommand};
use crate::wire::FlatObject;

pub fn product_router(products: ProductClient) -> Router {
    Router::new()
        .route("/product/{id}", get(get_product).fallback(method_not_allowed))
        .route("/product", post(post_product).fallback(method_not_allowed))
        .fallback(invalid_path)
        .with_state(products)
}

fn store_error(error: StoreError) -> ServiceError {
    ServiceError::from_store(ResourceKind::Product, error)
}

#[instrument(skip(products, body))]
async fn get_product(
    State(products): State<ProductClient>,
    Path(id): Path<String>,
    body: String,
) -> Result<FlatReply, ServiceError> {
    let id = parse_path_id(&id)?;
    check_body_id(id, &body)?;
    let product = products.get_product(id).await.map_err(store_error)?;
    Ok(FlatReply::ok(product.to_flat()))
}

#[instrument(skip_all)]
async fn post_product(
    State(products): State<ProductClient>,
    body: String,
) -> Result<FlatReply, ServiceError> {
    let command = validate_product_command(&FlatObject::decode(&body)?)?;
    let id = command.id();

    let product = match command {
        ProductCommand::Create { id, draft } => products.create_product(id, draft).await,
        ProductCommand::Update { id, patch } => products.update_product(id, patch).await,
        ProductCommand::Reserve { id, quantity } => products.reserve_stock(id, quantity).await,
        ProductCommand::Delete { id, proof } => {
            products.delete_product(id, proof).await.map_err(store_error)?;
            info!(id, "Product deleted");
            return Ok(FlatReply::ok(FlatObject::new()));
        }
    }
    .map_err(store_error)?;

    info!(id, quantity = product.quantity, "Product command applied");
    Ok(FlatReply::ok(product.to_flat()))
}
