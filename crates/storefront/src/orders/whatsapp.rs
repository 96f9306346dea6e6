//! WhatsApp hand-off for manual fulfillment.
//!
//! After an order is persisted, the customer is redirected to a `wa.me`
//! deep link whose prefilled text carries the whole order. The vendor reads
//! it in chat and coordinates payment and delivery from there.

use url::Url;

use export_apparels_core::format_amount;

use super::Order;

/// Compose the vendor-facing order message.
///
/// Bold headers, one line per item, total, then the optional customer note.
#[must_use]
pub fn order_message(order: &Order) -> String {
    let mut message = format!("*New Order: {}*\n\n", order.id);

    message.push_str("*Customer Details:*\n");
    message.push_str(&format!("Name: {}\n", order.customer_name));
    message.push_str(&format!("Email: {}\n", order.email));
    message.push_str(&format!("Phone: {}\n", order.phone));
    message.push_str(&format!("Address: {}\n\n", order.address));

    message.push_str("*Order Items:*\n");
    for item in &order.items {
        message.push_str(&format!(
            "- {} (Qty: {}) - {}\n",
            item.name,
            item.quantity,
            format_amount(item.total())
        ));
    }

    message.push_str(&format!("\n*Total: {}*\n", format_amount(order.total)));

    if let Some(note) = &order.additional_message {
        message.push_str(&format!("\n*Additional Message:*\n{note}\n"));
    }

    message
}

/// Build the `wa.me` deep link carrying the order message.
///
/// # Errors
///
/// Returns [`url::ParseError`] if the composed link is not a valid URL.
pub fn handoff_url(vendor_phone: &str, order: &Order) -> Result<Url, url::ParseError> {
    let message = order_message(order);
    Url::parse(&format!(
        "https://wa.me/{vendor_phone}?text={}",
        urlencoding::encode(&message)
    ))
}
