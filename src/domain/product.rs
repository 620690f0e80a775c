use rust_decimal::Decimal;

use crate::wire::{render_price, FlatObject, WireValue};

/// Represents a product in the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Always held at two decimal places.
    pub price: Decimal,
    pub quantity: u32,
}

impl Product {
    pub fn to_flat(&self) -> FlatObject {
        FlatObject::new()
            .with("id", WireValue::int(self.id))
            .with("name", WireValue::text(&self.name))
            .with("description", WireValue::text(&self.description))
            .with("price", WireValue::price(self.price))
            .with("quantity", WireValue::int(self.quantity))
    }

    pub fn price_text(&self) -> String {
        render_price(self.price)
    }
}

#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
}

/// Delete verification. Price and quantity are kept as the caller wrote them
/// and compared against the stored renderings.
#[derive(Debug, Clone)]
pub struct ProductProof {
    pub name: String,
    pub price: String,
    pub quantity: String,
}

/// Custom actions for Product entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    /// Decrements stock by the amount, only if at least that much is available.
    Reserve(u32),
}
