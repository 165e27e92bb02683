//! Minimal identity attached to an authenticated request

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{AccountStatus, Credential, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
}

impl Identity {
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

impl From<&Credential> for Identity {
    fn from(credential: &Credential) -> Self {
        Self {
            user_id: credential.id,
            email: credential.email.clone(),
            role: credential.role,
            status: credential.status,
        }
    }
}
