use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {}", e)))
}

/// `false` for a wrong password and for an unreadable stored hash.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        tracing::warn!("Stored password hash could not be parsed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("correct-horse-battery").unwrap();

        assert!(verify_password("correct-horse-battery", &hash));
        assert!(!verify_password("wrong-horse-battery", &hash));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let first = hash_password("correct-horse-battery").unwrap();
        let second = hash_password("correct-horse-battery").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
