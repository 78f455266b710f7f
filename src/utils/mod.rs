use sha2::{Digest, Sha256};

/// Seam for the credential check: the stored `password_hash` column is
/// compared against `hash(plaintext)`. Swapping the scheme (e.g. for a
/// salted KDF) swaps every comparison at once without touching handlers.
pub trait CredentialScheme {
    fn hash(&self, password: &str) -> String;

    fn verify(&self, password: &str, stored: &str) -> bool {
        self.hash(password) == stored
    }
}

/// Unsalted SHA-256 hex digest. Compatible with every `password_hash` row
/// written so far; not a scheme to reach for in new designs.
pub struct Sha256Hex;

impl CredentialScheme for Sha256Hex {
    fn hash(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}
