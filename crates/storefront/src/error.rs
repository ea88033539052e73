//! Error types for storefront operations.

use platform_client::PlatformError;
use thiserror::Error;

/// Errors from content repositories and image uploads.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The caller is not an admin.
    #[error("Admin access required")]
    Forbidden,

    /// A draft failed validation before reaching the data service.
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// The addressed row does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The data or storage service failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A row did not have the expected shape.
    #[error("Malformed row: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorefrontError {
    pub(crate) fn required(field: &'static str) -> Self {
        StorefrontError::Validation {
            field,
            reason: "is required".to_string(),
        }
    }
}

pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Errors from cart and checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Your cart is empty")]
    Empty,

    /// Checkout needs a signed-in customer.
    #[error("Sign in to check out")]
    NotSignedIn,

    #[error("Missing checkout field: {0}")]
    MissingDetail(&'static str),

    #[error("No such item in cart: {0}")]
    UnknownItem(String),

    #[error("Quantity must be at least 1")]
    ZeroQuantity,
}
