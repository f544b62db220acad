use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{debug, error};

/// PHC prefix shared by every Argon2 hash this service produces.
const ARGON2_PREFIX: &str = "$argon2";

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Mismatches and malformed hashes both yield `false`.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, "stored hash is not a valid PHC string");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

lazy_static! {
    static ref DUMMY_HASH: String =
        hash_password("contactdesk-dummy-password").unwrap_or_default();
}

/// Spends the same Argon2 work as a real check when there is no stored hash,
/// so unknown accounts are not distinguishable by response time.
pub fn verify_against_dummy(plain: &str) -> bool {
    verify_password(plain, &DUMMY_HASH)
}

pub fn is_password_hash(value: &str) -> bool {
    value.starts_with(ARGON2_PREFIX)
}

/// Seed and bulk imports hand in pre-hashed values; those are stored as-is.
pub fn hash_unless_prehashed(value: &str) -> anyhow::Result<String> {
    if is_password_hash(value) {
        Ok(value.to_string())
    } else {
        hash_password(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn dummy_verification_does_real_work_and_fails() {
        assert!(is_password_hash(&DUMMY_HASH));
        assert!(!verify_against_dummy("password123"));
        assert!(!verify_against_dummy(""));
    }

    #[test]
    fn prehashed_values_pass_through() {
        let hash = hash_password("seeded").unwrap();
        assert!(is_password_hash(&hash));
        assert_eq!(hash_unless_prehashed(&hash).unwrap(), hash);

        let fresh = hash_unless_prehashed("plaintext").unwrap();
        assert!(is_password_hash(&fresh));
        assert!(verify_password("plaintext", &fresh));
    }
}
