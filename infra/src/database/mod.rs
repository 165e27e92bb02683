//! Database module - credential persistence
//!
//! This module provides repository implementations for the core ports.
//! The in-memory store keeps every credential in one process and is the
//! storage used by the bundled server.

pub mod memory;


// Re-export commonly used types
pub use memory::InMemoryCredentialRepository;
