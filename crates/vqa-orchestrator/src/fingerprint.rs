use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 12;

/// Short content hash used to spot changed inputs between runs.
pub fn content_fingerprint(bytes: &[u8]) -> String {
    let mut digest = hex::encode(Sha256::digest(bytes));
    digest.truncate(FINGERPRINT_LEN);
    digest
}
