use tracing::{debug, instrument};

use crate::actor_framework::StoreClient;
use crate::domain::{Product, ProductAction};
use crate::error::StoreError;

/// Client for interacting with the Product store actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: StoreClient<Product>,
}

impl_store_client!(ProductClient, Product, product);

impl ProductClient {
    /// Takes `quantity` units out of stock if that many are on hand.
    /// Returns the product as it stands after the decrement.
    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: i32, quantity: u32) -> Result<Product, StoreError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, ProductAction::Reserve(quantity))
            .await
    }
}
