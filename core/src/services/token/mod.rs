//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Access and refresh token issuance, each kind with its own HS256 secret
//! - Verification of signature, issuer, audience, kind and expiry
//! - Bearer header parsing

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::{extract_bearer, TokenService};
