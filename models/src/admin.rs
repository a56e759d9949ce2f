// models/src/admin.rs

use bcrypt::{BcryptError, DEFAULT_COST, hash, verify};
use serde::{Deserialize, Serialize};

use crate::resident::Id;

/// DTO for seeding or registering an admin; the plaintext password only
/// lives here long enough to be hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdmin {
    pub email: String,
    pub password: String,
}

/// Stored admin credential row: bcrypt hash only, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub id: Id,
    pub email: String,
    pub password_hash: String,
}

impl AdminAccount {
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        hash(password, DEFAULT_COST)
    }

    pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, BcryptError> {
        verify(password, stored_hash)
    }

    pub fn from_new_admin(new_admin: NewAdmin, id: Id) -> Result<Self, BcryptError> {
        let password_hash = Self::hash_password(&new_admin.password)?;
        Ok(AdminAccount {
            id,
            email: new_admin.email,
            password_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_hash_and_verify_password() {
        let admin = AdminAccount::from_new_admin(
            NewAdmin {
                email: "warden@example.com".to_string(),
                password: "let-me-in".to_string(),
            },
            1,
        )
        .unwrap();
        assert_ne!(admin.password_hash, "let-me-in");
        assert!(AdminAccount::verify_password("let-me-in", &admin.password_hash).unwrap());
        assert!(!AdminAccount::verify_password("wrong", &admin.password_hash).unwrap());
    }
}
