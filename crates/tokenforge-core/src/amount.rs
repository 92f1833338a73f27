//! Conversion between UI amounts ("1.5") and raw token units (1_500_000 for 6 decimals)
//!
//! Parsing is exact: no floating point is involved on the way in.

use crate::error::AmountError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// SPL mints support up to 255 decimals on-chain, but wallets and explorers
/// stop rendering sensibly past 9 (the SOL precision).
pub const MAX_DECIMALS: u8 = 9;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub fn validate_decimals(decimals: u8) -> Result<u8, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::InvalidDecimals {
            found: decimals,
            max: MAX_DECIMALS,
        });
    }
    Ok(decimals)
}

/// Parse a UI amount into raw units for a mint with `decimals` decimals.
pub fn parse_ui_amount(text: &str, decimals: u8) -> Result<u64, AmountError> {
    validate_decimals(decimals)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }
    if text.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(AmountError::Invalid(text.to_string()));
    }

    // "1.500" is fine for a 1-decimal mint
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            found: frac_part.len() as u32,
            decimals,
        });
    }

    let scale = 10u128.pow(decimals as u32);
    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| AmountError::Overflow)?
    };

    let frac_value: u128 = if frac_part.is_empty() {
        0
    } else {
        let padding = 10u128.pow((decimals as usize - frac_part.len()) as u32);
        frac_part.parse::<u128>().map_err(|_| AmountError::Overflow)? * padding
    };

    let raw = int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or(AmountError::Overflow)?;

    u64::try_from(raw).map_err(|_| AmountError::Overflow)
}

/// Parse a UI amount that must be strictly positive
pub fn parse_positive_ui_amount(text: &str, decimals: u8) -> Result<u64, AmountError> {
    match parse_ui_amount(text, decimals)? {
        0 => Err(AmountError::Invalid("amount must be greater than zero".to_string())),
        raw => Ok(raw),
    }
}

fn to_decimal(raw: u64, decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(raw as i128, decimals.min(28) as u32)
}

/// Render raw units as a UI amount with trailing zeros trimmed
pub fn format_ui_amount(raw: u64, decimals: u8) -> String {
    to_decimal(raw, decimals).normalize().to_string()
}

/// Lossy UI amount for display fields
pub fn ui_amount_f64(raw: u64, decimals: u8) -> f64 {
    to_decimal(raw, decimals).to_f64().unwrap_or(0.0)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    ui_amount_f64(lamports, 9)
}
