//! Ed25519 keys for signing wallet messages.
//!
//! Uses ed25519-dalek. A wallet's signing key is the first 32 bytes of its
//! mnemonic seed (see [`crate::mnemonic`]); the matching public key goes into
//! the wallet contract's data cell and so determines the address.

use ed25519_dalek::{Signer, Verifier};
use std::fmt;

/// Ed25519 keypair for signing wallet messages.
///
/// Wraps [`ed25519_dalek::SigningKey`]; the secret is zeroized on drop by the
/// underlying library.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Create a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message, returning the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

/// Check an Ed25519 signature against a raw public key.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    key.verify(message, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let kp = KeyPair::from_seed(&[7u8; 32]);
        let sig = kp.sign(b"hello");
        assert!(verify(&kp.public_key(), b"hello", &sig));
        assert!(!verify(&kp.public_key(), b"hell0", &sig));
    }

    #[test]
    fn same_seed_same_key() {
        let a = KeyPair::from_seed(&[1u8; 32]);
        let b = KeyPair::from_seed(&[1u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), KeyPair::from_seed(&[2u8; 32]).public_key());
    }

    #[test]
    fn clone_keeps_key() {
        let kp = KeyPair::from_seed(&[9u8; 32]);
        assert_eq!(kp.clone().public_key(), kp.public_key());
    }

    #[test]
    fn debug_hides_secret() {
        let kp = KeyPair::from_seed(&[3u8; 32]);
        let dbg = format!("{kp:?}");
        assert!(dbg.contains("public_key"));
        assert!(!dbg.contains(&hex::encode([3u8; 32])));
    }
}
