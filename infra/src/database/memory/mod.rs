mod credential_repository_impl;

pub use credential_repository_impl::InMemoryCredentialRepository;
