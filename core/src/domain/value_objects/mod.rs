//! Value objects for domain modeling.

pub mod identity;

pub use identity::Identity;
