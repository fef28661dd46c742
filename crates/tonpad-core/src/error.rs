//! Error types for tonpad primitives and provider seams.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    #[error("cell overflow: {bits} bits > {max}")] BitOverflow { bits: usize, max: usize },
    #[error("cell overflow: {refs} refs > {max}")] RefOverflow { refs: usize, max: usize },
    #[error("value {value} does not fit in {bits} bits")] ValueTooWide { value: u128, bits: usize },
    #[error("coin amount needs {0} bytes, at most 15 allowed")] CoinsTooWide(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid base64: {0}")] InvalidBase64(String),
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid tag byte: {0:#04x}")] InvalidTag(u8),
    #[error("invalid workchain: {0}")] InvalidWorkchain(String),
    #[error("invalid hash part: {0}")] InvalidHash(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("expected {expected} words, got {got}")] WrongWordCount { expected: usize, got: usize },
    #[error("unknown word at position {position}: {word}")] UnknownWord { position: usize, word: String },
    #[error("phrase is not a TON seed")] NotBasicSeed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")] Empty,
    #[error("malformed amount: {0}")] Malformed(String),
    #[error("more than 9 decimal places: {0}")] TooPrecise(String),
    #[error("amount overflow: {0}")] Overflow(String),
}

/// Failure reported by an external provider (RPC node, price API, asset index).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transport: {0}")] Transport(String),
    #[error("http status {status}: {body}")] Status { status: u16, body: String },
    #[error("rpc error{}: {message}", .code.map(|c| format!(" {c}")).unwrap_or_default())] Rpc { code: Option<i64>, message: String },
    #[error("unexpected response: {0}")] Decode(String),
    #[error("get method {method} exited with code {exit_code}")] GetMethod { method: String, exit_code: i64 },
    #[error("no healthy endpoint for {0}")] NoEndpoint(String),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)] Cell(#[from] CellError),
    #[error(transparent)] Address(#[from] AddressError),
    #[error(transparent)] Mnemonic(#[from] MnemonicError),
    #[error(transparent)] Amount(#[from] AmountError),
    #[error(transparent)] Provider(#[from] ProviderError),
}
