//! Currency display helpers.
//!
//! The shop quotes every price in rupees with two decimal places. Amounts
//! are carried as [`rust_decimal::Decimal`] end to end; floats only appear
//! at the serialization boundary.

use rust_decimal::Decimal;

/// Currency prefix used everywhere an amount is rendered.
pub const CURRENCY_PREFIX: &str = "Rs.";

/// Format a decimal amount for display, e.g. `Rs. 1500.00`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{CURRENCY_PREFIX} {amount:.2}")
}

/// Total for a price/quantity pair, computed in decimal arithmetic.
#[must_use]
pub fn line_total(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity)
}
