pub mod credential;

pub use credential::CredentialRepository;

#[cfg(test)]
pub use credential::MockCredentialRepository;
