pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
#[cfg(test)]
pub mod mock;

pub use r#trait::CredentialRepository;
#[cfg(test)]
pub use mock::MockCredentialRepository;
