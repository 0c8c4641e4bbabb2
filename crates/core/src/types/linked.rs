//! Linked component references stored in the `bundle/linked_product_ids` metafield.
//!
//! The metafield value is free-form text written by merchants or by other
//! tooling, so it is validated here into a typed list before any lookup is
//! issued. Each entry must carry a `productId` and a `quantity`; `variantId`
//! is optional. Numeric fields may be JSON numbers or numeric strings, and the
//! snake_case spellings `product_id` / `variant_id` are accepted as well.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{ProductId, VariantId};

/// Errors produced while parsing a `linked_product_ids` value.
#[derive(Debug, Error)]
pub enum LinkedComponentsError {
    /// The value is not valid JSON.
    #[error("linked_product_ids is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The value is valid JSON but not an array.
    #[error("linked_product_ids must be a JSON array, found {0}")]
    NotAnArray(&'static str),

    /// An entry in the array does not match the component reference schema.
    #[error("linked_product_ids entry {index} is invalid: {reason}")]
    InvalidEntry {
        /// Zero-based position of the entry.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// A reference from a bundle to one of its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedComponentRef {
    /// Component product.
    pub product_id: ProductId,
    /// Component variant, when the bundle consumes a specific variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    /// Units of the component consumed by one bundle.
    pub quantity: i64,
}

/// Wire shape of a single entry before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLinkedComponent {
    #[serde(alias = "product_id")]
    product_id: Option<Numeric>,
    #[serde(default, alias = "variant_id")]
    variant_id: Option<Numeric>,
    quantity: Option<Numeric>,
}

/// A number that may have been written as a JSON string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Text(String),
}

impl Numeric {
    fn as_i64(&self, field: &str) -> Result<i64, String> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("{field} must be an integer, got {s:?}")),
        }
    }

    fn as_id(&self, field: &str) -> Result<u64, String> {
        let value = self.as_i64(field)?;
        u64::try_from(value).map_err(|_| format!("{field} must be positive, got {value}"))
    }
}

/// Parse the raw `linked_product_ids` metafield value.
///
/// A `variantId` of `0` or `null` means "no variant". Quantities are kept as
/// written, including zero or negative values; [`super::max_bundles`] clamps
/// those to zero buildable bundles.
///
/// # Errors
///
/// Returns [`LinkedComponentsError`] if the value is not a JSON array or any
/// entry is missing `productId`/`quantity` or holds a non-integer value.
pub fn parse_linked_components(raw: &str) -> Result<Vec<LinkedComponentRef>, LinkedComponentsError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let serde_json::Value::Array(entries) = value else {
        return Err(LinkedComponentsError::NotAnArray(json_kind(&value)));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_entry(entry).map_err(|reason| LinkedComponentsError::InvalidEntry { index, reason })
        })
        .collect()
}

fn parse_entry(entry: serde_json::Value) -> Result<LinkedComponentRef, String> {
    if !entry.is_object() {
        return Err(format!("expected an object, found {}", json_kind(&entry)));
    }

    let raw: RawLinkedComponent = serde_json::from_value(entry).map_err(|e| e.to_string())?;

    let product_id = raw
        .product_id
        .ok_or_else(|| "missing productId".to_string())?
        .as_id("productId")?;
    let variant_id = match raw.variant_id {
        Some(v) => Some(v.as_id("variantId")?).filter(|id| *id != 0),
        None => None,
    };
    let quantity = raw
        .quantity
        .ok_or_else(|| "missing quantity".to_string())?
        .as_i64("quantity")?;

    Ok(LinkedComponentRef {
        product_id: ProductId::new(product_id),
        variant_id: variant_id.map(VariantId::new),
        quantity,
    })
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_and_variant_references() {
        let refs = parse_linked_components(
            r#"[{"productId":20,"quantity":2},{"productId":21,"variantId":5,"quantity":1}]"#,
        )
        .unwrap();

        assert_eq!(
            refs,
            vec![
                LinkedComponentRef {
                    product_id: ProductId::new(20),
                    variant_id: None,
                    quantity: 2,
                },
                LinkedComponentRef {
                    product_id: ProductId::new(21),
                    variant_id: Some(VariantId::new(5)),
                    quantity: 1,
                },
            ]
        );
    }

    #[test]
    fn test_parse_accepts_strings_and_snake_case() {
        let refs =
            parse_linked_components(r#"[{"product_id":"30","variant_id":"8","quantity":"3"}]"#)
                .unwrap();
        assert_eq!(refs[0].product_id, ProductId::new(30));
        assert_eq!(refs[0].variant_id, Some(VariantId::new(8)));
        assert_eq!(refs[0].quantity, 3);
    }

    #[test]
    fn test_zero_or_null_variant_means_product() {
        let refs = parse_linked_components(
            r#"[{"productId":1,"variantId":0,"quantity":1},{"productId":2,"variantId":null,"quantity":1}]"#,
        )
        .unwrap();
        assert!(refs.iter().all(|r| r.variant_id.is_none()));
    }

    #[test]
    fn test_non_positive_quantity_is_kept() {
        let refs = parse_linked_components(r#"[{"productId":1,"quantity":0}]"#).unwrap();
        assert_eq!(refs[0].quantity, 0);
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_linked_components("[]").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = parse_linked_components("[{productId: 1").unwrap_err();
        assert!(matches!(err, LinkedComponentsError::InvalidJson(_)));
    }

    #[test]
    fn test_object_instead_of_array() {
        let err = parse_linked_components(r#"{"productId":1,"quantity":1}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "linked_product_ids must be a JSON array, found an object"
        );
    }

    #[test]
    fn test_missing_fields_name_the_entry() {
        let err = parse_linked_components(r#"[{"productId":1,"quantity":1},{"quantity":2}]"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "linked_product_ids entry 1 is invalid: missing productId"
        );

        let err = parse_linked_components(r#"[{"productId":1}]"#).unwrap_err();
        assert!(err.to_string().contains("missing quantity"));
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(parse_linked_components(r#"[{"productId":-4,"quantity":1}]"#).is_err());
        assert!(parse_linked_components(r#"[{"productId":"abc","quantity":1}]"#).is_err());
        assert!(parse_linked_components(r#"[{"productId":1,"quantity":1.5}]"#).is_err());
        assert!(parse_linked_components("[42]").is_err());
    }
}
