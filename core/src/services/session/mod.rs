//! Per-credential refresh-token session management

mod store;

#[cfg(test)]
mod tests;

pub use store::{SessionChange, SessionStore, MAX_WRITE_ATTEMPTS};
