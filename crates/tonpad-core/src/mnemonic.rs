//! TON mnemonic validation, key derivation and generation.
//!
//! TON phrases are 24 words from the BIP-39 English list but do not use the
//! BIP-39 checksum or seed. Instead:
//!
//! - entropy = HMAC-SHA512(key = words joined by single spaces, msg = "")
//! - a phrase is valid when PBKDF2-HMAC-SHA512(entropy, "TON seed version",
//!   390 rounds)[0] == 0
//! - seed = PBKDF2-HMAC-SHA512(entropy, "TON default seed", 100000 rounds);
//!   the first 32 bytes are the Ed25519 signing key seed.

use bip39::Language;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::constants::{
    DEFAULT_SEED_SALT, MNEMONIC_WORD_COUNT, PBKDF_ITERATIONS, SEED_VERSION_ITERATIONS,
    SEED_VERSION_SALT,
};
use crate::crypto::KeyPair;
use crate::error::MnemonicError;

type HmacSha512 = Hmac<Sha512>;

/// Split a phrase on whitespace and lowercase every word.
pub fn normalize(phrase: &str) -> Vec<String> {
    phrase
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

/// Check word count, word list membership and the TON seed marker.
pub fn validate(words: &[String]) -> Result<(), MnemonicError> {
    if words.len() != MNEMONIC_WORD_COUNT {
        return Err(MnemonicError::WrongWordCount {
            expected: MNEMONIC_WORD_COUNT,
            got: words.len(),
        });
    }
    for (position, word) in words.iter().enumerate() {
        if Language::English.find_word(word).is_none() {
            return Err(MnemonicError::UnknownWord {
                position,
                word: word.clone(),
            });
        }
    }
    if !is_basic_seed(&entropy(words)) {
        return Err(MnemonicError::NotBasicSeed);
    }
    Ok(())
}

/// Validate a phrase and derive its wallet keypair.
pub fn to_keypair(phrase: &str) -> Result<KeyPair, MnemonicError> {
    let words = Zeroizing::new(normalize(phrase));
    validate(&words)?;
    let entropy = entropy(&words);
    let mut seed = Zeroizing::new([0u8; 64]);
    pbkdf2::pbkdf2_hmac::<Sha512>(
        entropy.as_slice(),
        DEFAULT_SEED_SALT.as_bytes(),
        PBKDF_ITERATIONS,
        seed.as_mut_slice(),
    );
    let mut key_seed = Zeroizing::new([0u8; 32]);
    key_seed.copy_from_slice(&seed[..32]);
    Ok(KeyPair::from_seed(&key_seed))
}

/// Generate a fresh 24-word phrase that passes [`validate`].
///
/// Draws random words until the seed marker matches, about 256 attempts on
/// average.
pub fn generate() -> String {
    let list = Language::English.word_list();
    let mut rng = rand::rngs::OsRng;
    loop {
        let words: Zeroizing<Vec<String>> = Zeroizing::new(
            (0..MNEMONIC_WORD_COUNT)
                .map(|_| list[rng.gen_range(0..list.len())].to_string())
                .collect(),
        );
        if is_basic_seed(&entropy(&words)) {
            return words.join(" ");
        }
    }
}

fn entropy(words: &[String]) -> Zeroizing<[u8; 64]> {
    let phrase = Zeroizing::new(words.join(" "));
    let mut mac = HmacSha512::new_from_slice(phrase.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(b"");
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

fn is_basic_seed(entropy: &[u8; 64]) -> bool {
    let mut out = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha512>(
        entropy,
        SEED_VERSION_SALT.as_bytes(),
        SEED_VERSION_ITERATIONS,
        &mut out,
    );
    out[0] == 0
}
