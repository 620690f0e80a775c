use crate::domain::{ProductDraft, ProductPatch, ProductProof};
use crate::error::ServiceError;
use crate::validation::{
    non_empty, optional_text, parse_count, parse_price, record_id, required, required_text,
};
use crate::wire::FlatObject;

/// A structurally valid `POST /product` body.
#[derive(Debug)]
pub enum ProductCommand {
    Create { id: i32, draft: ProductDraft },
    Update { id: i32, patch: ProductPatch },
    Delete { id: i32, proof: ProductProof },
    /// Conditional stock decrement, applied atomically by the store.
    Reserve { id: i32, quantity: u32 },
}

impl ProductCommand {
    pub fn id(&self) -> i32 {
        match self {
            ProductCommand::Create { id, .. }
            | ProductCommand::Update { id, .. }
            | ProductCommand::Delete { id, .. }
            | ProductCommand::Reserve { id, .. } => *id,
        }
    }
}

pub fn validate_product_command(body: &FlatObject) -> Result<ProductCommand, ServiceError> {
    let command = required(body, "command")?;
    let id = record_id(body)?;

    match command {
        "create" => Ok(ProductCommand::Create {
            id,
            draft: ProductDraft {
                name: non_empty("name", required_text(body, "name")?)?,
                description: non_empty("description", required_text(body, "description")?)?,
                price: parse_price(required(body, "price")?)?,
                quantity: parse_count("quantity", required(body, "quantity")?, 1)?,
            },
        }),
        "update" => Ok(ProductCommand::Update {
            id,
            patch: ProductPatch {
                name: optional_text(body, "name")
                    .map(|value| non_empty("name", value))
                    .transpose()?,
                description: optional_text(body, "description")
                    .map(|value| non_empty("description", value))
                    .transpose()?,
                price: body.get("price").map(parse_price).transpose()?,
                quantity: body
                    .get("quantity")
                    .map(|raw| parse_count("quantity", raw, 0))
                    .transpose()?,
            },
        }),
        "delete" => {
            let price = required(body, "price")?.trim().to_string();
            let quantity = required(body, "quantity")?.trim().to_string();
            parse_price(&price)?;
            parse_count("quantity", &quantity, 0)?;
            Ok(ProductCommand::Delete {
                id,
                proof: ProductProof {
                    name: required_text(body, "name")?,
                    price,
                    quantity,
                },
            })
        }
        "reserve" => Ok(ProductCommand::Reserve {
            id,
            quantity: parse_count("quantity", required(body, "quantity")?, 0)?,
        }),
        other => Err(ServiceError::malformed(format!("unknown product command {other:?}"))),
    }
}
