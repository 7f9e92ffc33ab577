//! Core types for the item API

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::validation::{FromJsonBody, ObjectFields, ValidationError};

/// An item submitted for creation. Never stored; echoed back as received.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Item {
    /// Item name
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Optional tax amount
    pub tax: Option<f64>,
}

impl FromJsonBody for Item {
    fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let mut fields = ObjectFields::new("body", value)?;

        let name = fields.required_str("name");
        let description = fields.optional_str("description");
        let price = fields.required_f64("price");
        let tax = fields.optional_f64("tax");

        match (name, price) {
            (Some(name), Some(price)) => {
                fields.finish()?;
                Ok(Item {
                    name,
                    description,
                    price,
                    tax,
                })
            }
            _ => Err(fields.into_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_minimal_item_defaults_optionals_to_null() {
        let item = Item::from_json(&json!({"name": "widget", "price": 9.99})).unwrap();
        assert_eq!(
            item,
            Item {
                name: "widget".into(),
                description: None,
                price: 9.99,
                tax: None,
            }
        );
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"name": "widget", "description": null, "price": 9.99, "tax": null})
        );
    }

    #[test]
    fn test_full_item_with_coercion() {
        let item = Item::from_json(&json!({
            "name": "gadget",
            "description": "shiny",
            "price": 10,
            "tax": "1.5",
            "colour": "red"
        }))
        .unwrap();

        assert_eq!(item.description.as_deref(), Some("shiny"));
        assert_eq!(item.price, 10.0);
        assert_eq!(item.tax, Some(1.5));
        // integers are echoed as floats
        assert_eq!(serde_json::to_string(&item.price).unwrap(), "10.0");
    }

    #[test]
    fn test_missing_required_fields_reported_together() {
        let err = Item::from_json(&json!({"description": "x"})).unwrap_err();
        assert_eq!(err.fields(), vec!["name", "price"]);
        assert!(err.detail.iter().all(|e| e.kind == ErrorKind::Missing));
    }

    #[test]
    fn test_wrong_types() {
        let err = Item::from_json(&json!({
            "name": 5,
            "description": ["a"],
            "price": "cheap",
            "tax": {}
        }))
        .unwrap_err();

        let kinds: Vec<ErrorKind> = err.detail.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::StringType,
                ErrorKind::StringType,
                ErrorKind::FloatParsing,
                ErrorKind::FloatType
            ]
        );
        assert_eq!(err.fields(), vec!["name", "description", "price", "tax"]);
    }

    #[test]
    fn test_optional_error_with_valid_required_fields() {
        let err = Item::from_json(&json!({"name": "n", "price": 1.0, "tax": "lots"})).unwrap_err();
        assert_eq!(err.fields(), vec!["tax"]);
    }

    #[test]
    fn test_null_required_field_is_type_error() {
        let err = Item::from_json(&json!({"name": null, "price": null})).unwrap_err();
        let kinds: Vec<ErrorKind> = err.detail.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::StringType, ErrorKind::FloatType]);
    }
}
