//! The order submission flow.

use url::Url;

use export_apparels_core::OrderId;

use crate::cart::CartStore;
use crate::storage::SlotStore;

use super::{CustomerDetails, Order, OrderError, OrderSink, whatsapp};

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// Tracking id of the persisted order.
    pub order_id: OrderId,
    /// WhatsApp deep link the caller redirects the customer to.
    pub handoff_url: Url,
}

/// Submit the current cart as an order.
///
/// Builds a `Pending` order from the cart snapshot, writes it to the sink
/// and, once the sink accepts it, clears the cart and returns the hand-off
/// link. The cart is cleared before the caller performs the redirect; that
/// ordering is this flow's policy, not the cart's. A sink failure leaves
/// the cart untouched so the customer can retry.
///
/// # Errors
///
/// Returns [`OrderError`] for an empty cart, invalid hand-off URL, or a
/// sink that refuses the order.
pub async fn place_order<S, K>(
    cart: &mut CartStore<S>,
    sink: &K,
    customer: CustomerDetails,
    vendor_phone: &str,
) -> Result<CheckoutOutcome, OrderError>
where
    S: SlotStore,
    K: OrderSink,
{
    let order = Order::from_cart(customer, cart.snapshot())?;
    sink.submit(&order).await?;
    cart.clear();

    let handoff_url = whatsapp::handoff_url(vendor_phone, &order)?;
    Ok(CheckoutOutcome {
        order_id: order.id,
        handoff_url,
    })
}
