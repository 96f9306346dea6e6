//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DOCUMENT_STORE_URL` - Base URL of the remote document store
//! - `STOREFRONT_VENDOR_WHATSAPP` - Vendor WhatsApp number in international
//!   format, digits only (e.g. 923429715809)
//!
//! ## Optional
//! - `STOREFRONT_DOCUMENT_STORE_API_KEY` - Bearer token for the document store
//! - `STOREFRONT_CART_DIR` - Directory holding the durable cart slot
//!   (default: ./data)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote document store holding products, categories and orders.
    pub document_store: DocumentStoreConfig,
    /// Vendor WhatsApp number used for the order hand-off, digits only.
    pub vendor_whatsapp: String,
    /// Directory holding the durable cart slot.
    pub cart_dir: PathBuf,
}

/// Remote document store configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct DocumentStoreConfig {
    /// Base URL of the document store API.
    pub base_url: String,
    /// Optional bearer token sent with every request.
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for DocumentStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStoreConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("STOREFRONT_DOCUMENT_STORE_URL")?;
        let api_key =
            get_optional_env("STOREFRONT_DOCUMENT_STORE_API_KEY").map(SecretString::from);
        let vendor_whatsapp = validate_whatsapp_number(
            &get_required_env("STOREFRONT_VENDOR_WHATSAPP")?,
            "STOREFRONT_VENDOR_WHATSAPP",
        )?;
        let cart_dir = PathBuf::from(get_env_or_default("STOREFRONT_CART_DIR", "./data"));

        Ok(Self {
            document_store: DocumentStoreConfig { base_url, api_key },
            vendor_whatsapp,
            cart_dir,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a WhatsApp number: optional leading +, then 8-15 digits (E.164).
///
/// Returns the digits without the plus, the form `wa.me` links expect.
fn validate_whatsapp_number(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let digits = value.trim().trim_start_matches('+');
    let valid = (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(digits.to_owned())
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("not an international phone number: {value:?}"),
        ))
    }
}
