//! Catalog record types.
//!
//! Product documents are open-ended: the storefront contract only requires
//! `id` and a non-negative `price`. Everything else (images, category,
//! description) is display payload carried through untouched, so it lives in
//! a flattened attribute map rather than typed fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use export_apparels_core::{CategoryId, ProductId};

/// A product document from the catalog collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Display attributes not interpreted by the storefront core.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Category display attribute, if the document carries one.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.attributes.get("category").and_then(Value::as_str)
    }

    /// First usable image reference: `imageUrls[0]`, else `imageUrl`.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        first_image_url(&self.attributes)
    }
}

/// A category document from the catalog collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Shared image-fallback chain for product-shaped attribute maps.
///
/// Empty strings count as absent, matching how the product cards treat them.
pub(crate) fn first_image_url(attributes: &Map<String, Value>) -> Option<&str> {
    attributes
        .get("imageUrls")
        .and_then(Value::as_array)
        .and_then(|urls| urls.first())
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .or_else(|| {
            attributes
                .get("imageUrl")
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_with_passthrough_fields() {
        let json = r#"{
            "id": "p1",
            "name": "Linen Kurta",
            "price": 1500,
            "category": "Menswear",
            "description": "Hand-stitched",
            "imageUrls": ["https://img.example.com/a.jpg"]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new("p1"));
        assert_eq!(product.name, "Linen Kurta");
        assert_eq!(product.price, "1500".parse().unwrap());
        assert_eq!(product.category(), Some("Menswear"));
        assert_eq!(
            product.attributes.get("description").and_then(Value::as_str),
            Some("Hand-stitched")
        );
    }

    #[test]
    fn test_product_serde_round_trip_preserves_unknown_fields() {
        let json = serde_json::json!({
            "id": "p2",
            "name": "Shawl",
            "price": 999.5,
            "weave": "twill",
            "tags": ["wool", "winter"]
        });

        let product: Product = serde_json::from_value(json.clone()).unwrap();
        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn test_product_name_defaults_to_empty() {
        let product: Product = serde_json::from_str(r#"{"id": "p3", "price": 10}"#).unwrap();
        assert_eq!(product.name, "");
    }

    #[test]
    fn test_image_url_fallback_chain() {
        let with_list: Product = serde_json::from_value(serde_json::json!({
            "id": "a", "price": 1,
            "imageUrls": ["first.jpg", "second.jpg"],
            "imageUrl": "legacy.jpg"
        }))
        .unwrap();
        assert_eq!(with_list.image_url(), Some("first.jpg"));

        let legacy_only: Product = serde_json::from_value(serde_json::json!({
            "id": "b", "price": 1,
            "imageUrls": [],
            "imageUrl": "legacy.jpg"
        }))
        .unwrap();
        assert_eq!(legacy_only.image_url(), Some("legacy.jpg"));

        let empty_first: Product = serde_json::from_value(serde_json::json!({
            "id": "c", "price": 1,
            "imageUrls": [""],
            "imageUrl": "legacy.jpg"
        }))
        .unwrap();
        assert_eq!(empty_first.image_url(), Some("legacy.jpg"));

        let none: Product =
            serde_json::from_value(serde_json::json!({"id": "d", "price": 1})).unwrap();
        assert_eq!(none.image_url(), None);
    }
}
