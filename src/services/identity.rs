// navdesk Identity Provider
// Checks admin credentials against users.json and produces the Actor that
// mutating operations carry for audit logging.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::{hmac, pbkdf2};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{info, warn};

use crate::storage::Repository;
use crate::types::errors::NavError;
use crate::types::user::{Actor, User};

/// Prefix marking a PBKDF2-hashed password in users.json.
pub const PBKDF2_SCHEME: &str = "pbkdf2_sha256";

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Trait defining credential checks.
pub trait IdentityProviderTrait {
    fn authenticate(&self, username: &str, password: &str) -> Result<Actor, NavError>;
    /// The reserved `secretKey` value, empty when unset.
    fn secret_key(&self) -> Result<String, NavError>;
}

/// Identity provider reading users through the repository on every call.
pub struct IdentityProvider<'a> {
    repo: &'a dyn Repository,
}

impl<'a> IdentityProvider<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }
}

/// Hashes `password` into the `pbkdf2_sha256$<iter>$<salt>$<hash>` form.
pub fn hash_password(password: &str) -> Result<String, ring::error::Unspecified> {
    let iterations = NonZeroU32::new(PBKDF2_ITERATIONS).ok_or(ring::error::Unspecified)?;
    let mut salt = [0u8; SALT_LENGTH];
    SystemRandom::new().fill(&mut salt)?;

    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &mut hash,
    );
    Ok(format!(
        "{}${}${}${}",
        PBKDF2_SCHEME,
        PBKDF2_ITERATIONS,
        BASE64.encode(salt),
        BASE64.encode(hash)
    ))
}

/// Compares a submitted password with the stored value.
///
/// Stored values in the PBKDF2 form are verified by re-derivation; anything
/// else is treated as plaintext. Both paths compare in constant time.
pub fn verify_password(stored: &str, submitted: &str) -> bool {
    match stored.strip_prefix(PBKDF2_SCHEME).and_then(|s| s.strip_prefix('$')) {
        Some(encoded) => verify_pbkdf2(encoded, submitted),
        None => verify_plaintext(stored, submitted),
    }
}

// Compares HMAC tags under a throwaway key instead of the raw strings.
fn verify_plaintext(stored: &str, submitted: &str) -> bool {
    let Ok(key) = hmac::Key::generate(hmac::HMAC_SHA256, &SystemRandom::new()) else {
        return false;
    };
    let expected = hmac::sign(&key, stored.as_bytes());
    hmac::verify(&key, submitted.as_bytes(), expected.as_ref()).is_ok()
}

fn verify_pbkdf2(encoded: &str, submitted: &str) -> bool {
    let mut parts = encoded.splitn(3, '$');
    let (Some(iterations), Some(salt), Some(hash)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (BASE64.decode(salt), BASE64.decode(hash)) else {
        return false;
    };
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        submitted.as_bytes(),
        &hash,
    )
    .is_ok()
}

impl<'a> IdentityProviderTrait for IdentityProvider<'a> {
    fn authenticate(&self, username: &str, password: &str) -> Result<Actor, NavError> {
        let directory = self.repo.load_users()?;
        let found: Option<&User> = directory
            .users
            .values()
            .find(|u| u.username == username && verify_password(&u.password, password));

        match found {
            Some(user) => {
                info!(user = %user.username, role = %user.role, "login succeeded");
                Ok(Actor::new(user.username.clone(), user.role.clone()))
            }
            None => {
                warn!(user = username, "login failed: bad username or password");
                Err(NavError::Unauthorized)
            }
        }
    }

    fn secret_key(&self) -> Result<String, NavError> {
        Ok(self.repo.load_users()?.secret_key)
    }
}
