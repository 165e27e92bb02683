//! Request-independent handler plumbing

pub mod error;

pub use error::{not_found, status_for, ApiError};
