//! Order construction, submission and tracking.
//!
//! An order is the cart snapshot plus the customer details collected by the
//! checkout form. It is written to the `orders` collection of the remote
//! document store and then handed to the vendor over WhatsApp. Fulfillment
//! is manual from there; the storefront only reads the order back for the
//! tracking page and never updates it.

pub mod checkout;
pub mod sink;
pub mod whatsapp;

pub use checkout::{CheckoutOutcome, place_order};
pub use sink::{DocumentStoreSink, OrderSink};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use export_apparels_core::{Email, EmailError, OrderId, OrderStatus};

use crate::cart::{CartSnapshot, LineItem};

/// Image used for ordered items that carry no image reference.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400";

/// Errors that can occur while building, submitting or fetching orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A required checkout field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The customer email does not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Orders need at least one line.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Base URL or request path could not be parsed.
    #[error("invalid order store URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No order document has this id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),
}

/// Customer contact details collected by the checkout form.
///
/// Construct through [`CustomerDetails::new`], which enforces the form's
/// required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub additional_message: Option<String>,
}

impl CustomerDetails {
    /// Validate checkout form input.
    ///
    /// Name, phone and address must be non-empty after trimming; the email
    /// must parse. The optional message is trimmed and dropped when empty.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingField`] or [`OrderError::InvalidEmail`].
    pub fn new(
        name: &str,
        email: &str,
        phone: &str,
        address: &str,
        additional_message: Option<&str>,
    ) -> Result<Self, OrderError> {
        let name = required(name, "name")?;
        let email = Email::parse(email.trim())?;
        let phone = required(phone, "phone")?;
        let address = required(address, "address")?;
        let additional_message = additional_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            name,
            email,
            phone,
            address,
            additional_message,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, OrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(OrderError::MissingField(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

/// A finalized order as stored in the `orders` collection.
///
/// Serialized field names are camelCase to match the existing order
/// documents. The id is the document key, not part of the stored body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip)]
    pub id: OrderId,
    pub customer_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub additional_message: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a `Pending` order from a cart snapshot.
    ///
    /// The id is the submission timestamp in milliseconds, which doubles as
    /// the tracking code the customer types in later. Every item is
    /// normalized to carry an `imageUrl` attribute so the vendor-facing
    /// documents always render a picture.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] for a snapshot without lines.
    pub fn from_cart(
        customer: CustomerDetails,
        snapshot: CartSnapshot,
    ) -> Result<Self, OrderError> {
        if snapshot.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let created_at = Utc::now();
        let items = snapshot
            .items
            .into_iter()
            .map(normalize_item_image)
            .collect();

        Ok(Self {
            id: OrderId::new(created_at.timestamp_millis().to_string()),
            customer_name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            additional_message: customer.additional_message,
            items,
            total: snapshot.total,
            status: OrderStatus::Pending,
            created_at,
        })
    }
}

/// Pin down a single `imageUrl` attribute on an ordered item, falling back
/// to [`PLACEHOLDER_IMAGE_URL`].
fn normalize_item_image(mut item: LineItem) -> LineItem {
    let url = item
        .image_url()
        .unwrap_or(PLACEHOLDER_IMAGE_URL)
        .to_owned();
    item.attributes
        .insert("imageUrl".to_owned(), Value::String(url));
    item
}
