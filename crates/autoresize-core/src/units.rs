//! Decimal (base-1000) human-readable sizes.
//!
//! Volume sizes are billed and reported in SI units, so `"100GB"` means
//! 100 × 10⁹ bytes. A binary-looking suffix such as `GiB` is tolerated on
//! input but is still interpreted in decimal.

use crate::error::{ResizeError, ResizeResult};

const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Parse a size like `"100GB"`, `"1.5 t"` or `"500000"` into bytes.
pub fn parse_human_size(input: &str) -> ResizeResult<u64> {
    let invalid = || ResizeError::Config(format!("invalid size '{input}'"));

    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(split);
    if number.is_empty() {
        return Err(invalid());
    }

    let value: f64 = number.parse().map_err(|_| invalid())?;
    let multiplier = unit_multiplier(suffix.trim_start()).ok_or_else(invalid)?;

    let bytes = value * multiplier as f64;
    if bytes >= u64::MAX as f64 {
        return Err(ResizeError::Config(format!("size '{input}' is too large")));
    }

    Ok(bytes as u64)
}

fn unit_multiplier(suffix: &str) -> Option<u64> {
    let lower = suffix.to_ascii_lowercase();
    let unit = lower.strip_suffix('b').unwrap_or(&lower);
    let unit = unit.strip_suffix('i').unwrap_or(unit);

    match unit {
        "" => Some(1),
        "k" => Some(1_000),
        "m" => Some(1_000_000),
        "g" => Some(1_000_000_000),
        "t" => Some(1_000_000_000_000),
        "p" => Some(1_000_000_000_000_000),
        _ => None,
    }
}

/// Format bytes with four significant digits, e.g. `85000000000 → "85GB"`.
pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    let int_digits = if value < 1.0 {
        1
    } else {
        value.log10().floor() as usize + 1
    };
    let decimals = 4usize.saturating_sub(int_digits);

    let mut formatted = format!("{value:.decimals$}");
    if formatted.contains('.') {
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.').len();
        formatted.truncate(trimmed);
    }

    format!("{formatted}{}", UNITS[unit])
}
