//! Argon2id password hashing and verification.
//!
//! Hashes use the Argon2id variant with a random salt from [`OsRng`], stored
//! as PHC strings so parameters and salt travel with the hash. Strength rules
//! live in `futurist_core::validation`.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a plaintext password, returning the PHC-formatted string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Hash checked when no account matches, so unknown emails cost one Argon2
/// verification just like wrong passwords.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("futurist-cards-no-such-account").expect("hashing a constant password")
});

/// Verify `password` against the account's hash, or against [`DUMMY_HASH`]
/// when there is no account. A missing account always yields `Ok(false)`.
pub fn verify_credentials(
    password: &str,
    stored_hash: Option<&str>,
) -> Result<bool, argon2::password_hash::Error> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            verify_password(password, &DUMMY_HASH)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn hash_is_argon2id_and_verifies() {
        let hash = hash_password("Passw0rd!").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "Passw0rd!");
        assert!(verify_password("Passw0rd!", &hash).expect("verify should succeed"));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("Passw0rd!").expect("hashing should succeed");
        assert!(!verify_password("Passw0rd?", &hash).expect("verify should succeed"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("Passw0rd!").unwrap();
        let b = hash_password("Passw0rd!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("Passw0rd!", "not-a-phc-string").is_err());
    }

    #[test]
    fn unknown_account_never_verifies() {
        assert!(DUMMY_HASH.starts_with("$argon2id$"));
        assert!(!verify_credentials("futurist-cards-no-such-account", None).unwrap());
        assert!(!verify_credentials("Passw0rd!", None).unwrap());
    }

    #[test]
    fn known_account_uses_its_own_hash() {
        let hash = hash_password("Passw0rd!").unwrap();
        assert!(verify_credentials("Passw0rd!", Some(&hash)).unwrap());
        assert!(!verify_credentials("Passw0rd?", Some(&hash)).unwrap());
    }

    fn median_of(mut samples: Vec<Duration>) -> Duration {
        samples.sort();
        samples[samples.len() / 2]
    }

    #[test]
    fn unknown_account_costs_as_much_as_wrong_password() {
        let hash = hash_password("Passw0rd!").unwrap();
        LazyLock::force(&DUMMY_HASH);

        let time = |stored: Option<&str>| {
            let samples = (0..5)
                .map(|_| {
                    let start = Instant::now();
                    verify_credentials("Wr0ng-pass!", stored).unwrap();
                    start.elapsed()
                })
                .collect();
            median_of(samples)
        };

        let wrong_password = time(Some(&hash));
        let unknown_account = time(None);
        assert!(
            unknown_account * 4 >= wrong_password,
            "unknown={unknown_account:?} wrong={wrong_password:?}"
        );
    }
}
