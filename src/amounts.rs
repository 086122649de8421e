//! Fixed-point amount handling.
//!
//! User-entered amounts are free-form decimal strings. They are sanitized
//! and converted to raw smallest-unit `U256` values at the token's decimal
//! precision. No floating point is involved anywhere amounts are compared.

use alloy_primitives::U256;

use crate::errors::{ Error, Result };

/// Strip everything a numeric amount field cannot contain. Commas are
/// treated as decimal separators.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| {
            match c {
                '0'..='9' | '.' => Some(c),
                ',' => Some('.'),
                _ => None,
            }
        })
        .collect()
}

/// Parse a decimal amount string into raw smallest units at `decimals`
/// precision. Rejects empty input, multiple separators and fractional
/// digits beyond the token's precision.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256> {
    let cleaned = sanitize(input);

    let mut parts = cleaned.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next().unwrap_or("");

    if frac_part.contains('.') {
        return Err(Error::Parse(format!("multiple decimal separators in '{}'", input)));
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::Parse(format!("empty amount '{}'", input)));
    }
    if frac_part.len() > decimals as usize {
        return Err(
            Error::Parse(
                format!("'{}' has more than {} fractional digits", input, decimals)
            )
        );
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_value = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|e|
            Error::Parse(format!("invalid amount '{}': {}", input, e))
        )?
    };

    let frac_value = if frac_part.is_empty() {
        U256::ZERO
    } else {
        let padded = frac_part.len() < decimals as usize;
        let raw = U256::from_str_radix(frac_part, 10).map_err(|e|
            Error::Parse(format!("invalid amount '{}': {}", input, e))
        )?;
        if padded {
            let pad = U256::from(10u64).pow(U256::from(decimals as usize - frac_part.len()));
            raw.checked_mul(pad).ok_or_else(|| Error::Parse("amount overflow".to_string()))?
        } else {
            raw
        }
    };

    int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| Error::Parse("amount overflow".to_string()))
}

/// Render a raw smallest-unit amount as a decimal string, trimming
/// trailing fractional zeros.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_part = amount / scale;
    let frac_part = amount % scale;

    if frac_part.is_zero() {
        return int_part.to_string();
    }

    let frac = format!("{:0>width$}", frac_part, width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    format!("{}.{}", int_part, frac)
}

/// Fixed-width display rendering (e.g. balances at 3 decimal places).
pub fn format_fixed(amount: U256, decimals: u8, display_decimals: usize) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_part = amount / scale;
    let frac_part = amount % scale;

    if display_decimals == 0 {
        return int_part.to_string();
    }

    let frac = format!("{:0>width$}", frac_part, width = decimals as usize);
    let shown: String = frac.chars().take(display_decimals).collect();
    let shown = format!("{:0<width$}", shown, width = display_decimals);
    format!("{}.{}", int_part, shown)
}

/// True iff the string holds a parseable amount strictly greater than zero.
pub fn is_positive(input: &str) -> bool {
    let cleaned = sanitize(input);
    !cleaned.is_empty() && cleaned.chars().any(|c| ('1'..='9').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_numbers() {
        assert_eq!(parse_units("1", 18).unwrap(), U256::from(10u64).pow(U256::from(18)));
        assert_eq!(parse_units("250", 6).unwrap(), U256::from(250_000_000u64));
        assert_eq!(parse_units("0", 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_parse_fractions() {
        assert_eq!(parse_units("0.5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(parse_units(".5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(parse_units("1.000001", 6).unwrap(), U256::from(1_000_001u64));
        // comma accepted as separator
        assert_eq!(parse_units("0,25", 2).unwrap(), U256::from(25u64));
    }

    #[test]
    fn test_sanitize_strips_garbage() {
        assert_eq!(sanitize("1a2b.3c"), "12.3");
        assert_eq!(parse_units("1e5", 0).unwrap(), U256::from(15u64));
    }

    #[test]
    fn test_parse_rejections() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units("abc", 18).is_err());
        assert!(parse_units(".", 18).is_err());
        assert!(parse_units("1.2.3", 18).is_err());
        // too many fractional digits for the token
        assert!(parse_units("0.1234567", 6).is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(1u64), 6), "0.000001");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(U256::from(1_234_567u64), 6, 3), "1.234");
        assert_eq!(format_fixed(U256::from(1_000_000u64), 6, 3), "1.000");
        assert_eq!(format_fixed(U256::ZERO, 18, 3), "0.000");
    }

    #[test]
    fn test_roundtrip_precision() {
        let raw = parse_units("123.456789", 18).unwrap();
        assert_eq!(format_units(raw, 18), "123.456789");
    }

    #[test]
    fn test_is_positive() {
        assert!(is_positive("1"));
        assert!(is_positive("0.001"));
        assert!(!is_positive("0"));
        assert!(!is_positive("0.00"));
        assert!(!is_positive(""));
        assert!(!is_positive("abc"));
    }
}
