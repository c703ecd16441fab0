use sea_orm::DbErr;
use std::time::Duration;
use thiserror::Error;

/// The caller's request cannot be relayed. Never persisted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Content 'text' is required")]
    MissingText,
    #[error("Target 'chat_id' is required (env or param)")]
    MissingTarget,
}

/// The provider could not be reached or its answer could not be read.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

#[derive(Debug, Error)]
pub enum ProviderSetupError {
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}
