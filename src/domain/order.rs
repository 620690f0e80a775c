use serde::Deserialize;

use crate::error::ServiceError;
use crate::validation::{parse_count, parse_id, required};
use crate::wire::FlatObject;

pub const PLACE_ORDER_COMMAND: &str = "place order";

/// A validated place-order request. Orders are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOrder {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: u32,
}

impl TryFrom<&FlatObject> for PlaceOrder {
    type Error = ServiceError;

    fn try_from(body: &FlatObject) -> Result<Self, Self::Error> {
        let command = required(body, "command")?;
        let user_id = parse_id("user_id", required(body, "user_id")?)?;
        let product_id = parse_id("product_id", required(body, "product_id")?)?;
        let quantity = parse_count("quantity", required(body, "quantity")?, 0)?;

        if command != PLACE_ORDER_COMMAND {
            return Err(ServiceError::malformed(format!("unknown order command {command:?}")));
        }

        Ok(Self {
            user_id,
            product_id,
            quantity,
        })
    }
}

/// How the orchestrator commits the stock decrement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitStrategy {
    /// Conditional decrement applied atomically by the product store.
    #[default]
    Reserve,
    /// Unconditional `update` to the quantity computed at check time.
    /// Concurrent orders for the same product can oversell.
    Update,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_body(raw: &str) -> FlatObject {
        FlatObject::decode(raw).unwrap()
    }

    #[test]
    fn accepts_quoted_or_bare_integers() {
        let order = PlaceOrder::try_from(&order_body(
            r#"{"command":"place order","user_id":"7","product_id":1,"quantity":"3"}"#,
        ))
        .unwrap();
        assert_eq!(
            order,
            PlaceOrder {
                user_id: 7,
                product_id: 1,
                quantity: 3
            }
        );
    }

    #[test]
    fn zero_quantity_is_allowed() {
        let order = PlaceOrder::try_from(&order_body(
            r#"{"command":"place order","user_id":1,"product_id":1,"quantity":0}"#,
        ))
        .unwrap();
        assert_eq!(order.quantity, 0);
    }

    #[test]
    fn rejects_structural_problems() {
        let cases = [
            r#"{"user_id":1,"product_id":1,"quantity":1}"#,
            r#"{"command":"place order","product_id":1,"quantity":1}"#,
            r#"{"command":"place order","user_id":1,"quantity":1}"#,
            r#"{"command":"place order","user_id":1,"product_id":1}"#,
            r#"{"command":"place order","user_id":"x","product_id":1,"quantity":1}"#,
            r#"{"command":"place order","user_id":1,"product_id":1,"quantity":-1}"#,
            r#"{"command":"cancel order","user_id":1,"product_id":1,"quantity":1}"#,
        ];
        for raw in cases {
            let err = PlaceOrder::try_from(&order_body(raw)).unwrap_err();
            assert!(matches!(err, ServiceError::MalformedInput(_)), "{raw}");
        }
    }
}
