//! Order persistence against the remote document store.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use url::Url;

use export_apparels_core::OrderId;

use crate::config::DocumentStoreConfig;

use super::{Order, OrderError};

/// Receives finalized orders.
///
/// The checkout flow is generic over the sink so tests can swap in a
/// recording double.
#[allow(async_fn_in_trait)]
pub trait OrderSink {
    /// Persist one order document.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] if the order could not be accepted.
    async fn submit(&self, order: &Order) -> Result<(), OrderError>;
}

/// Sink writing order documents to the `orders` collection.
#[derive(Clone)]
pub struct DocumentStoreSink {
    client: reqwest::Client,
    base_url: Url,
}

impl DocumentStoreSink {
    /// Create a new sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: &DocumentStoreConfig) -> Result<Self, OrderError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key.expose_secret());
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| OrderError::Parse(format!("Invalid API key format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Read an order back by its tracking id.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] if no document has this id, or
    /// another [`OrderError`] on transport and parse failures.
    pub async fn fetch_order(&self, id: &OrderId) -> Result<Order, OrderError> {
        let url = self.base_url.join(&format!("orders/{id}"))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(OrderError::NotFound(id.clone()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut order: Order = response
            .json()
            .await
            .map_err(|e| OrderError::Parse(e.to_string()))?;
        // The id is the document key, not part of the stored body.
        order.id = id.clone();
        Ok(order)
    }
}

impl OrderSink for DocumentStoreSink {
    async fn submit(&self, order: &Order) -> Result<(), OrderError> {
        let url = self.base_url.join(&format!("orders/{}", order.id))?;
        let response = self.client.put(url).json(order).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
