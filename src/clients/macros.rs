/// Generates the CRUD surface of a typed store client wrapping
/// `StoreClient<$entity>` in a field named `inner`.
///
/// `get_*` turns a missing record into `StoreError::NotFound`.
macro_rules! impl_store_client {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                pub fn new(inner: $crate::actor_framework::StoreClient<$entity>) -> Self {
                    Self { inner }
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](
                    &self,
                    id: i32,
                ) -> Result<$entity, $crate::error::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await?.ok_or_else(|| {
                        $crate::error::StoreError::NotFound(format!(
                            "{} {}",
                            <$entity as $crate::actor_framework::Entity>::KIND,
                            id
                        ))
                    })
                }

                #[tracing::instrument(skip(self, draft))]
                pub async fn [<create_ $entity_name_snake>](
                    &self,
                    id: i32,
                    draft: <$entity as $crate::actor_framework::Entity>::Draft,
                ) -> Result<$entity, $crate::error::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner.create(id, draft).await
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<update_ $entity_name_snake>](
                    &self,
                    id: i32,
                    patch: <$entity as $crate::actor_framework::Entity>::Patch,
                ) -> Result<$entity, $crate::error::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner.update(id, patch).await
                }

                #[tracing::instrument(skip(self, proof))]
                pub async fn [<delete_ $entity_name_snake>](
                    &self,
                    id: i32,
                    proof: <$entity as $crate::actor_framework::Entity>::Proof,
                ) -> Result<(), $crate::error::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner.delete(id, proof).await
                }

                pub async fn shutdown(&self) -> Result<(), $crate::error::StoreError> {
                    self.inner.shutdown().await
                }
            }
        }
    };
}
