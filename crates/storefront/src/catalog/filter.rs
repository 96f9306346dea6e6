//! Product list filtering.
//!
//! The shop page narrows the catalog by a free-text search box and a
//! category dropdown. Both are optional; an empty selection means "all".

use super::types::Product;

/// Criteria applied to the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against the product name.
    pub search: Option<String>,
    /// Exact category name; empty or absent selects every category.
    pub category: Option<String>,
}

impl ProductFilter {
    /// Whether a product passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|term| {
            product
                .name
                .to_lowercase()
                .contains(&term.to_lowercase())
        });
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|wanted| wanted.is_empty() || product.category() == Some(wanted));
        search_ok && category_ok
    }
}

/// Filter a product slice, preserving catalog order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], filter: &ProductFilter) -> Vec<&'a Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, category: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "price": 100,
            "category": category,
        }))
        .unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("p1", "Linen Kurta", "Menswear"),
            product("p2", "Silk Scarf", "Accessories"),
            product("p3", "Cotton Kurta", "Menswear"),
        ]
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let products = catalog();
        let filtered = filter_products(&products, &ProductFilter::default());
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let products = catalog();
        let filter = ProductFilter {
            search: Some("kUrTa".to_owned()),
            category: None,
        };
        let filtered = filter_products(&products, &filter);
        let ids: Vec<&str> = filtered.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p3"]);
    }

    #[test]
    fn test_category_must_match_exactly() {
        let products = catalog();
        let filter = ProductFilter {
            search: None,
            category: Some("Accessories".to_owned()),
        };
        let filtered = filter_products(&products, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.first().map(|p| p.id.as_str()), Some("p2"));
    }

    #[test]
    fn test_empty_category_selects_all() {
        let products = catalog();
        let filter = ProductFilter {
            search: None,
            category: Some(String::new()),
        };
        assert_eq!(filter_products(&products, &filter).len(), 3);
    }

    #[test]
    fn test_search_and_category_combine() {
        let products = catalog();
        let filter = ProductFilter {
            search: Some("cotton".to_owned()),
            category: Some("Menswear".to_owned()),
        };
        let filtered = filter_products(&products, &filter);
        assert_eq!(filtered.first().map(|p| p.id.as_str()), Some("p3"));
        assert_eq!(filtered.len(), 1);
    }
}
