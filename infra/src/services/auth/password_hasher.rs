//! bcrypt implementation of the password hasher trait

use ks_core::services::auth::PasswordHasher;

use crate::InfrastructureError;

/// bcrypt password hasher
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher with bcrypt's default cost
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Hasher with an explicit cost; bcrypt accepts 4 through 31
    pub fn with_cost(cost: u32) -> Result<Self, InfrastructureError> {
        if !(4..=31).contains(&cost) {
            return Err(InfrastructureError::Config(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, String> {
        bcrypt::hash(password, self.cost).map_err(|e| e.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, String> {
        bcrypt::verify(password, hash).map_err(|e| e.to_string())
    }
}
