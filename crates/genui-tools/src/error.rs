//! Error Types for Tool Adapters
//!
//! These never leave the adapters: each one is logged and turned into the
//! adapter's user-facing failure text.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid invoice: {0}")]
    InvalidInvoice(String),
}
