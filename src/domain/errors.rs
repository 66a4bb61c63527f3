use thiserror::Error;

use super::order::OrderStatus;

/// Failure of the backing key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Import failed: {0}")]
    Import(String),
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not configured: {0}")]
    NotConfigured(String),
    #[error("Failed to build notification: {0}")]
    Format(String),
}
