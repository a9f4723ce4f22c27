use alloy::primitives::U256;
use snafu::{ensure, Snafu};

/// Decimals used for every chain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

// 10^77 is the largest power of ten that fits in a U256.
const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum UnitsError {
    #[snafu(display("Amount is empty"))]
    Empty,

    #[snafu(display("Amount {input:?} is not a plain decimal number"))]
    Malformed { input: String },

    #[snafu(display("Token precision of {decimals} decimals is not supported"))]
    UnsupportedPrecision { decimals: u8 },

    #[snafu(display("Amount {input:?} does not fit in 256 bits"))]
    Overflow { input: String },
}

/// Scales a human-readable decimal amount to base units
/// (`amount * 10^decimals`). Extra fractional digits are truncated, never
/// rounded.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let input = amount.trim();
    ensure!(!input.is_empty(), EmptySnafu);
    ensure!(decimals <= MAX_DECIMALS, UnsupportedPrecisionSnafu { decimals });

    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    ensure!(
        !(whole.is_empty() && fraction.is_empty())
            && whole.bytes().all(|b| b.is_ascii_digit())
            && fraction.bytes().all(|b| b.is_ascii_digit()),
        MalformedSnafu { input }
    );

    let precision = usize::from(decimals);
    let mut digits = String::with_capacity(whole.len() + precision);
    digits.push_str(whole);
    digits.push_str(&fraction[..fraction.len().min(precision)]);
    for _ in fraction.len()..precision {
        digits.push('0');
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(significant, 10).map_err(|_| UnitsError::Overflow {
        input: input.to_string(),
    })
}

/// Renders base units as a decimal string without trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let precision = usize::from(decimals);
    if precision == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = precision + 1);
    let (whole, fraction) = padded.split_at(padded.len() - precision);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
