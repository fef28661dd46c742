//! Conversions between decimal TON strings and nanotons.

use crate::constants::{NANOTONS_PER_TON, TON_DECIMALS};
use crate::error::AmountError;

/// Parse a decimal TON amount such as `"1.5"` into nanotons.
///
/// Accepts an optional fractional part of up to nine digits. Signs, exponents
/// and thousands separators are rejected. Surrounding whitespace is ignored.
pub fn parse_ton(input: &str) -> Result<u64, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
        return Err(AmountError::Malformed(s.to_string()));
    }
    if frac.len() > TON_DECIMALS {
        return Err(AmountError::TooPrecise(s.to_string()));
    }

    let overflow = || AmountError::Overflow(s.to_string());
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = TON_DECIMALS);
        padded.parse().map_err(|_| AmountError::Malformed(s.to_string()))?
    };
    whole
        .checked_mul(NANOTONS_PER_TON)
        .and_then(|n| n.checked_add(frac))
        .ok_or_else(overflow)
}

/// Render nanotons as a decimal TON string without trailing zeros.
pub fn format_ton(nanotons: u64) -> String {
    let whole = nanotons / NANOTONS_PER_TON;
    let frac = nanotons % NANOTONS_PER_TON;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = TON_DECIMALS);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Nanotons as a floating-point TON value, for display only.
pub fn nanotons_to_ton(nanotons: u64) -> f64 {
    nanotons as f64 / NANOTONS_PER_TON as f64
}
