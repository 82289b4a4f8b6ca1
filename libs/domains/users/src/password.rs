use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `plain`, the format stored in `users.password`.
pub fn hash_password(plain: &str) -> String {
    const_hex::encode(Sha256::digest(plain.as_bytes()))
}
