//! Fixed-point conversion between decimal amounts and atomic units
//!
//! Amounts travel through the bridge as `U256` atomic units
//! (`amount * 10^decimals`). Parsing goes through [`BigDecimal`] so no
//! floating point rounding is ever involved.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::error::{BridgeError, Result};

/// Decimals used when a token does not override them
pub const DEFAULT_DECIMALS: u8 = 18;

/// Convert a human-readable decimal string to atomic units.
///
/// Accepts plain numerals (`"100"`, `"100.5"`, `".5"`, `"7."`). Signs,
/// exponents and anything carrying more than `decimals` significant
/// fractional digits are rejected with [`BridgeError::InvalidAmount`].
pub fn to_atomic(input: &str, decimals: u8) -> Result<U256> {
    let trimmed = input.trim();
    validate_numeral(input, trimmed)?;

    let value = BigDecimal::from_str(trimmed)
        .map_err(|e| BridgeError::invalid_amount(input, e.to_string()))?;

    // Rescaling to `decimals` fractional digits truncates; a changed value
    // means the input cannot be represented exactly.
    let scaled = value.with_scale(decimals as i64);
    if scaled != value {
        return Err(BridgeError::invalid_amount(
            input,
            format!("more than {} fractional digits", decimals),
        ));
    }

    let (digits, _) = scaled.into_bigint_and_exponent();
    let (_, bytes) = digits.to_bytes_be();

    U256::try_from_be_slice(&bytes).ok_or_else(|| BridgeError::FieldOverflow {
        field: "amount",
        value: trimmed.to_string(),
        bits: 256,
    })
}

/// Convert atomic units back to a canonical decimal string.
///
/// Canonical form has no leading zeros in the integer part, no trailing
/// fractional zeros and no dangling `.`.
pub fn from_atomic(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    let (integer, fraction) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        let padding = "0".repeat(decimals - digits.len());
        ("0".to_string(), format!("{}{}", padding, digits))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, fraction)
    }
}

/// Atomic amount as the 64-hex-character big-endian field used on the wire
pub fn to_atomic_hex(input: &str, decimals: u8) -> Result<String> {
    let atomic = to_atomic(input, decimals)?;
    Ok(hex::encode(atomic.to_be_bytes::<32>()))
}

fn validate_numeral(input: &str, trimmed: &str) -> Result<()> {
    if trimmed.is_empty() {
        return Err(BridgeError::invalid_amount(input, "empty amount"));
    }

    let mut seen_point = false;
    let mut seen_digit = false;
    for c in trimmed.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            '.' => return Err(BridgeError::invalid_amount(input, "multiple decimal points")),
            '-' | '+' => {
                return Err(BridgeError::invalid_amount(input, "signed amounts are not allowed"))
            }
            other => {
                return Err(BridgeError::invalid_amount(
                    input,
                    format!("unexpected character {:?}", other),
                ))
            }
        }
    }

    if !seen_digit {
        return Err(BridgeError::invalid_amount(input, "no digits"));
    }
    Ok(())
}
