//! Shared error types and the core traits used across gpk.

pub mod error;

pub use error::{ErrorContext, GpkError, user_friendly_error};
