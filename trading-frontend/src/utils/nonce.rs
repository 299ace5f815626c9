use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Nonce pair binding a Google One Tap prompt to its token exchange.
///
/// The hashed half is baked into the identity widget's config (and thus
/// into the id token Google issues); the raw half is what the identity
/// provider hashes and compares during the exchange. Both always derive
/// from the same 32 random bytes.
#[derive(Debug, Clone)]
pub struct NoncePair {
    pub raw: String,
    pub hashed: String,
}

/// Generate a fresh nonce pair from the OS secure RNG.
///
/// Fails only when the platform RNG is unavailable; callers treat that as
/// a soft failure and skip the One Tap prompt entirely.
pub fn generate() -> Result<NoncePair, rand::Error> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes)?;

    let raw = general_purpose::STANDARD.encode(bytes);
    let hashed = hex::encode(Sha256::digest(raw.as_bytes()));

    Ok(NoncePair { raw, hashed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_nonce_matches_raw() {
        let pair = generate().unwrap();
        let expected = hex::encode(Sha256::digest(pair.raw.as_bytes()));
        assert_eq!(pair.hashed, expected);
    }

    #[test]
    fn raw_nonce_encodes_32_bytes() {
        let pair = generate().unwrap();
        let decoded = general_purpose::STANDARD.decode(&pair.raw).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn nonces_are_fresh_per_generation() {
        let a = generate().unwrap();
        let b = generate().unwrap();
        assert_ne!(a.raw, b.raw);
        assert_ne!(a.hashed, b.hashed);
    }
}
