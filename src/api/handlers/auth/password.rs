use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password with Argon2id and a fresh random salt.
/// # Errors
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("Failed to hash password: {err}"))
}

/// Verify a password against a stored PHC-format hash.
/// # Errors
/// Returns an error if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| anyhow!("Failed to parse stored password hash: {err}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() -> Result<()> {
        let hash = hash_password("Str0ng!pass")?;
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Str0ng!pass", &hash)?);
        assert!(!verify_password("wrong-password", &hash)?);
        Ok(())
    }

    #[test]
    fn same_password_hashes_differently() -> Result<()> {
        let first = hash_password("Str0ng!pass")?;
        let second = hash_password("Str0ng!pass")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("Str0ng!pass", "not-a-phc-hash").is_err());
    }
}
