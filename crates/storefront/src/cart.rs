//! Shopping cart state and persistence.
//!
//! The cart is the one piece of client-local state the shop keeps across
//! sessions. [`CartStore`] owns it exclusively: callers mutate through four
//! operations, every mutation rewrites the durable slot wholesale, and a
//! slot that cannot be read or written never surfaces as an error - the
//! in-memory cart stays authoritative for the running session.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, warn};

use export_apparels_core::{ProductId, line_total};

use crate::catalog::Product;
use crate::storage::SlotStore;

/// Storage key of the durable cart slot.
pub const CART_SLOT_KEY: &str = "cart";

/// One product/quantity pair held in the cart.
///
/// Besides the typed fields, a line carries every display attribute its
/// product record had (image references, category, description). Those are
/// opaque payload: merges never touch them and persistence round-trips them
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl LineItem {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            attributes: product.attributes.clone(),
        }
    }

    /// Price times quantity for this line, in decimal arithmetic.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }

    /// First usable image reference carried in the display attributes.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        crate::catalog::first_image_url(&self.attributes)
    }
}

/// Immutable cart view handed to the order flow at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

/// Errors for cart mutations.
///
/// Only malformed product records are rejected; persistence failures are
/// contained (logged, never raised) because the in-memory cart is the
/// source of truth for the session.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product record has an empty id.
    #[error("product is missing an id")]
    MissingProductId,

    /// Product price is negative.
    #[error("product {id} has a negative price")]
    NegativePrice { id: ProductId },
}

/// The cart state machine with an injected durable slot.
///
/// Mutations take `&mut self`, so a single owner is serialized by the borrow
/// checker; wrap the store in a `Mutex` if independent call sites share it.
/// No operation suspends - persistence is one synchronous local write.
pub struct CartStore<S> {
    slot: S,
    items: Vec<LineItem>,
}

impl<S: SlotStore> CartStore<S> {
    /// Open the cart, restoring persisted state when possible.
    ///
    /// An absent, empty or malformed slot (including restored data that
    /// violates the cart's invariants) starts an empty cart; the condition
    /// is logged and never surfaced.
    pub fn open(slot: S) -> Self {
        let items = match slot.get(CART_SLOT_KEY) {
            Ok(Some(raw)) if !raw.trim().is_empty() => {
                match serde_json::from_str::<Vec<LineItem>>(&raw) {
                    Ok(items) if lines_are_valid(&items) => items,
                    Ok(_) => {
                        warn!("persisted cart violates cart invariants, starting empty");
                        Vec::new()
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to parse persisted cart, starting empty");
                        Vec::new()
                    }
                }
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted cart, starting empty");
                Vec::new()
            }
        };

        Self { slot, items }
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart has its quantity incremented by 1 and
    /// keeps every other field as first seen - the merge never refreshes
    /// display attributes from the new record. Unknown products are appended
    /// with quantity 1, preserving insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] for a record with an empty id or a negative
    /// price; the cart is left unchanged in both cases.
    pub fn add_item(&mut self, product: &Product) -> Result<(), CartError> {
        if product.id.is_empty() {
            return Err(CartError::MissingProductId);
        }
        if product.price < Decimal::ZERO {
            return Err(CartError::NegativePrice {
                id: product.id.clone(),
            });
        }

        if let Some(line) = self.items.iter_mut().find(|l| l.id == product.id) {
            line.quantity += 1;
        } else {
            self.items.push(LineItem::from_product(product));
        }
        self.persist();
        Ok(())
    }

    /// Replace the quantity of an existing line from raw form input.
    ///
    /// The requested value is parsed with a documented default: integer
    /// parse, else float parse truncated toward zero, else 1. A result below
    /// 1 is a no-op - zeroing a line is only possible through
    /// [`Self::remove_item`]. An id not in the cart is also a no-op.
    pub fn update_quantity(&mut self, id: &ProductId, requested: &str) {
        let requested = parse_requested_quantity(requested);
        if requested < 1 {
            return;
        }
        let quantity = u32::try_from(requested).unwrap_or(u32::MAX);

        let Some(line) = self.items.iter_mut().find(|l| &l.id == id) else {
            return;
        };
        line.quantity = quantity;
        self.persist();
    }

    /// Remove the line matching `id`, if present.
    pub fn remove_item(&mut self, id: &ProductId) {
        let before = self.items.len();
        self.items.retain(|l| &l.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    /// Empty the cart. The durable write completes before this returns, so
    /// a caller starting a fresh transaction sees an empty slot.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(LineItem::total).sum()
    }

    /// Sum of quantities over all lines (the badge count, distinct from the
    /// number of lines).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Snapshot handed to the order flow at submission time.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            total: self.total_price(),
        }
    }

    /// Serialize the whole cart into the durable slot.
    ///
    /// A failed write is logged and otherwise ignored: durability is best
    /// effort, the in-memory cart remains authoritative for the session.
    fn persist(&self) {
        let payload = match serde_json::to_string(&self.items) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to serialize cart, durable slot left stale");
                return;
            }
        };
        if let Err(e) = self.slot.set(CART_SLOT_KEY, &payload) {
            error!(error = %e, "failed to persist cart, in-memory cart remains authoritative");
        }
    }
}

/// Restored carts must satisfy the same invariants live mutations maintain:
/// every quantity at least 1, at most one line per product id, no empty ids.
fn lines_are_valid(items: &[LineItem]) -> bool {
    let mut seen = HashSet::new();
    items
        .iter()
        .all(|l| l.quantity >= 1 && !l.id.is_empty() && seen.insert(l.id.clone()))
}

/// Parse a requested quantity the way the quantity input box does: integer
/// parse, else float parse truncated toward zero, else fallback 1.
#[allow(clippy::cast_possible_truncation)]
fn parse_requested_quantity(input: &str) -> i64 {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n;
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return f as i64;
        }
    }
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::storage::{MemoryStore, StorageError};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(id: &str, price: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Product {id}"),
            "price": price.parse::<f64>().unwrap(),
        }))
        .unwrap()
    }

    fn product_with(id: &str, price: &str, extra: serde_json::Value) -> Product {
        let mut value = serde_json::json!({
            "id": id,
            "name": format!("Product {id}"),
            "price": price.parse::<f64>().unwrap(),
        });
        value
            .as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        serde_json::from_value(value).unwrap()
    }

    /// Slot store whose writes always fail; reads succeed and find nothing.
    struct BrokenSlot;

    impl SlotStore for BrokenSlot {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_duplicate_add_merges_into_one_line() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product("p1", "20")).unwrap();
        cart.add_item(&product("p1", "20")).unwrap();

        assert_eq!(cart.items().len(), 1);
        let line = cart.items().first().unwrap();
        assert_eq!(line.id, ProductId::new("p1"));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = CartStore::open(MemoryStore::new());
        for id in ["c", "a", "b"] {
            cart.add_item(&product(id, "10")).unwrap();
        }
        cart.add_item(&product("a", "10")).unwrap();

        let ids: Vec<&str> = cart.items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn test_merge_keeps_first_seen_display_fields() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product_with(
            "p1",
            "20",
            serde_json::json!({"imageUrl": "old.jpg"}),
        ))
        .unwrap();
        // Same id, different display payload: the merge is quantity-only.
        cart.add_item(&product_with(
            "p1",
            "20",
            serde_json::json!({"imageUrl": "new.jpg", "badge": "sale"}),
        ))
        .unwrap();

        let line = cart.items().first().unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.image_url(), Some("old.jpg"));
        assert!(!line.attributes.contains_key("badge"));
    }

    #[test]
    fn test_add_rejects_malformed_products() {
        let mut cart = CartStore::open(MemoryStore::new());

        assert!(matches!(
            cart.add_item(&product("", "10")),
            Err(CartError::MissingProductId)
        ));
        assert!(matches!(
            cart.add_item(&product("p1", "-1")),
            Err(CartError::NegativePrice { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_floor_is_a_noop() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product("p1", "10")).unwrap();
        cart.update_quantity(&ProductId::new("p1"), "4");

        cart.update_quantity(&ProductId::new("p1"), "0");
        assert_eq!(cart.items().first().unwrap().quantity, 4);

        cart.update_quantity(&ProductId::new("p1"), "-5");
        assert_eq!(cart.items().first().unwrap().quantity, 4);
    }

    #[test]
    fn test_update_quantity_unparsable_falls_back_to_one() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product("p1", "10")).unwrap();
        cart.update_quantity(&ProductId::new("p1"), "4");

        cart.update_quantity(&ProductId::new("p1"), "abc");
        assert_eq!(cart.items().first().unwrap().quantity, 1);
    }

    #[test]
    fn test_update_quantity_replaces_absolute_value() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product("p1", "10")).unwrap();

        cart.update_quantity(&ProductId::new("p1"), "7");
        assert_eq!(cart.items().first().unwrap().quantity, 7);

        // Fractional input truncates toward zero.
        cart.update_quantity(&ProductId::new("p1"), "2.9");
        assert_eq!(cart.items().first().unwrap().quantity, 2);
    }

    #[test]
    fn test_update_quantity_unknown_id_is_a_noop() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product("p1", "10")).unwrap();

        cart.update_quantity(&ProductId::new("ghost"), "3");
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items().first().unwrap().quantity, 1);
    }

    #[test]
    fn test_remove_item_keeps_relative_order() {
        let mut cart = CartStore::open(MemoryStore::new());
        for id in ["a", "b", "c"] {
            cart.add_item(&product(id, "10")).unwrap();
        }

        cart.remove_item(&ProductId::new("b"));
        let ids: Vec<&str> = cart.items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);

        // Absent id is a no-op.
        cart.remove_item(&ProductId::new("b"));
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_total_price_is_decimal_exact() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product("p1", "10")).unwrap();
        cart.add_item(&product("p1", "10")).unwrap();
        cart.add_item(&product("p2", "5.5")).unwrap();
        cart.update_quantity(&ProductId::new("p2"), "3");

        assert_eq!(cart.total_price(), d("36.5"));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_clear_empties_cart_and_slot() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());
        cart.add_item(&product("p1", "10")).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(store.get(CART_SLOT_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_shop_scenario() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(&product("p1", "20")).unwrap();
        cart.add_item(&product("p1", "20")).unwrap();
        cart.add_item(&product("p2", "15")).unwrap();

        let lines: Vec<(&str, u32)> = cart
            .items()
            .iter()
            .map(|l| (l.id.as_str(), l.quantity))
            .collect();
        assert_eq!(lines, [("p1", 2), ("p2", 1)]);
        assert_eq!(cart.total_price(), d("55"));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_persistence_round_trip() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());
        cart.add_item(&product_with(
            "p1",
            "20",
            serde_json::json!({"category": "Menswear"}),
        ))
        .unwrap();
        cart.add_item(&product("p2", "15")).unwrap();
        cart.update_quantity(&ProductId::new("p2"), "4");
        cart.remove_item(&ProductId::new("p1"));
        cart.add_item(&product("p3", "5.5")).unwrap();

        let reopened = CartStore::open(store);
        assert_eq!(reopened.items(), cart.items());
        assert_eq!(reopened.total_price(), cart.total_price());
    }

    #[test]
    fn test_slot_stores_prices_as_numbers() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());
        cart.add_item(&product("p1", "15.5")).unwrap();

        let raw = store.get(CART_SLOT_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        let price = &value.as_array().unwrap().first().unwrap()["price"];
        assert!(price.is_number());
        assert_eq!(price.as_f64(), Some(15.5));
    }

    #[test]
    fn test_malformed_slot_recovers_empty() {
        let store = MemoryStore::new();
        store.set(CART_SLOT_KEY, "{ not json").unwrap();

        let cart = CartStore::open(store);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_invariant_violating_slot_recovers_empty() {
        let store = MemoryStore::new();
        // Zero quantity and a duplicate id are both invalid restored states.
        store
            .set(
                CART_SLOT_KEY,
                r#"[{"id":"p1","name":"x","price":10,"quantity":0}]"#,
            )
            .unwrap();
        assert!(CartStore::open(store.clone()).is_empty());

        store
            .set(
                CART_SLOT_KEY,
                r#"[{"id":"p1","name":"x","price":10,"quantity":1},
                    {"id":"p1","name":"x","price":10,"quantity":2}]"#,
            )
            .unwrap();
        assert!(CartStore::open(store).is_empty());
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let mut cart = CartStore::open(BrokenSlot);
        cart.add_item(&product("p1", "10")).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 1);
    }
}
