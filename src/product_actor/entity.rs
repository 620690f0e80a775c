use crate::actor_framework::Entity;
use crate::domain::{Product, ProductAction, ProductDraft, ProductPatch, ProductProof};
use crate::error::{ResourceKind, StoreError};

impl Entity for Product {
    type Id = i32;
    type Draft = ProductDraft;
    type Patch = ProductPatch;
    type Proof = ProductProof;
    type Action = ProductAction;
    /// Snapshot of the product after the action applied.
    type ActionResult = Product;

    const KIND: ResourceKind = ResourceKind::Product;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_draft(id: i32, draft: ProductDraft) -> Result<Self, StoreError> {
        if draft.quantity == 0 {
            return Err(StoreError::Invalid("initial quantity must be at least 1".to_string()));
        }
        Ok(Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            quantity: draft.quantity,
        })
    }

    /// Overwrites only the supplied fields.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), StoreError> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        Ok(())
    }

    /// Price and quantity are compared in their stored renderings, so `9.5`
    /// does not match a stored `9.50`.
    fn verify(&self, proof: &ProductProof) -> bool {
        self.name == proof.name
            && self.price_text() == proof.price
            && self.quantity.to_string() == proof.quantity
    }

    /// # Errors
    /// `InsufficientStock` if the reservation exceeds what is on hand. The
    /// product is left unchanged in that case.
    fn handle_action(&mut self, action: ProductAction) -> Result<Product, StoreError> {
        match action {
            ProductAction::Reserve(requested) => {
                if requested > self.quantity {
                    return Err(StoreError::InsufficientStock {
                        requested,
                        available: self.quantity,
                    });
                }
                self.quantity -= requested;
                Ok(self.clone())
            }
        }
    }
}
