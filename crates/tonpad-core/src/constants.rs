//! Protocol constants. All monetary values in nanotons (1 TON = 10^9 nanotons).

pub const NANOTONS_PER_TON: u64 = 1_000_000_000;

/// Number of decimal places in a TON amount.
pub const TON_DECIMALS: usize = 9;

/// Basechain workchain id. The only workchain wallets are derived for.
pub const BASECHAIN: i8 = 0;

/// Words in a TON mnemonic.
pub const MNEMONIC_WORD_COUNT: usize = 24;

/// PBKDF2-HMAC-SHA512 rounds for seed derivation.
pub const PBKDF_ITERATIONS: u32 = 100_000;

/// Rounds for the "basic seed" validity check (`PBKDF_ITERATIONS / 256`).
pub const SEED_VERSION_ITERATIONS: u32 = PBKDF_ITERATIONS / 256;

/// Salt for the Ed25519 seed of a mnemonic.
pub const DEFAULT_SEED_SALT: &str = "TON default seed";

/// Salt for the basic-seed validity check.
pub const SEED_VERSION_SALT: &str = "TON seed version";

/// Representation hash of the wallet v4r2 code cell.
pub const WALLET_V4R2_CODE_HASH: [u8; 32] = [
    0xfe, 0xb5, 0xff, 0x68, 0x20, 0xe2, 0xff, 0x0d, 0x94, 0x83, 0xe7, 0xe0, 0xd6, 0x2c, 0x81, 0x7d,
    0x84, 0x67, 0x89, 0xfb, 0x4a, 0xe5, 0x80, 0xc8, 0x78, 0x86, 0x6d, 0x95, 0x9d, 0xab, 0xd5, 0xc0,
];

/// Depth of the wallet v4r2 code cell tree.
pub const WALLET_V4R2_CODE_DEPTH: u16 = 7;

/// Base subwallet id; the effective id is `WALLET_ID_BASE + workchain`.
pub const WALLET_ID_BASE: u32 = 698_983_191;

/// Seconds an external transfer message stays valid after signing.
pub const TRANSFER_TTL_SECS: u32 = 60;

/// Comment attached to outgoing transfers unless configured otherwise.
pub const DEFAULT_TRANSFER_COMMENT: &str = "Test Transfer";

/// Maximum data bits in an ordinary cell.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum references from one cell.
pub const MAX_CELL_REFS: usize = 4;

/// Send mode flag: pay forwarding fees separately from the message value.
pub const SEND_MODE_PAY_GAS_SEPARATELY: u8 = 1;

/// Send mode flag: ignore errors during the action phase.
pub const SEND_MODE_IGNORE_ERRORS: u8 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_version_iterations_matches_reference() {
        assert_eq!(SEED_VERSION_ITERATIONS, 390);
    }

    #[test]
    fn nanotons_match_decimals() {
        assert_eq!(NANOTONS_PER_TON, 10u64.pow(TON_DECIMALS as u32));
    }

    #[test]
    fn code_hash_hex() {
        assert_eq!(
            hex::encode(WALLET_V4R2_CODE_HASH),
            "feb5ff6820e2ff0d9483e7e0d62c817d846789fb4ae580c878866d959dabd5c0"
        );
    }
}
