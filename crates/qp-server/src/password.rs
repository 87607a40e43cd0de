//! bcrypt password hashing.

use qp_core::{Error, Result};

/// Hashes and verifies passwords at a fixed bcrypt cost.
///
/// Holds a precomputed hash of a throwaway password so that a login for an
/// unknown email spends the same time in bcrypt as one with a wrong password.
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self> {
        let dummy_hash = bcrypt::hash("quillpost-timing-equalizer", cost)
            .map_err(|e| Error::Internal(format!("bcrypt error: {e}")))?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).map_err(|e| Error::Internal(format!("bcrypt error: {e}")))
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Run a verification whose result is discarded.
    pub fn verify_dummy(&self, password: &str) {
        let _ = bcrypt::verify(password, &self.dummy_hash);
    }
}
