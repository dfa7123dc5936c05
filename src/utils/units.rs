// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Length units; everything downstream works in millimetres

use crate::error::{Result, ScadError};

pub const MM_PER_INCH: f64 = 25.4;

pub fn inch2mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

pub fn mm2inch(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

fn invalid(text: &str) -> ScadError {
    ScadError::InvalidOption {
        option: "length".to_string(),
        value: text.to_string(),
    }
}

/// Millimetres per unit for a unit suffix
fn unit_scale(unit: &str) -> Option<f64> {
    match unit {
        "" | "mm" => Some(1.0),
        "cm" => Some(10.0),
        "m" => Some(1000.0),
        "in" | "inch" | "inches" | "\"" => Some(MM_PER_INCH),
        _ => None,
    }
}

/// `0.5`, `.177`, `3/16` or a mixed `1 1/4`
fn parse_quantity(text: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut parts = 0;
    for part in text.split_whitespace() {
        let value = match part.split_once('/') {
            Some((num, den)) => {
                let den: f64 = den.parse().ok()?;
                if den == 0.0 {
                    return None;
                }
                num.parse::<f64>().ok()? / den
            }
            None => part.parse().ok()?,
        };
        total += value;
        parts += 1;
    }
    (parts > 0 && total.is_finite()).then_some(total)
}

/// Parse a length such as `"1/2 inch"`, `"0.1765in"`, `"4.5 mm"` or `"3"` (mm)
pub fn parse_length(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let split = trimmed
        .rfind(|c: char| c.is_ascii_digit() || c == '.')
        .map_or(0, |i| i + 1);
    let (quantity, unit) = trimmed.split_at(split);
    let scale = unit_scale(&unit.trim().to_ascii_lowercase()).ok_or_else(|| invalid(text))?;
    let quantity = parse_quantity(quantity).ok_or_else(|| invalid(text))?;
    Ok(quantity * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_length_units() {
        assert_relative_eq!(parse_length("1/2 inch").unwrap(), 12.7);
        assert_relative_eq!(parse_length("0.1765in").unwrap(), 0.1765 * 25.4);
        assert_relative_eq!(parse_length(".25\"").unwrap(), 6.35);
        assert_relative_eq!(parse_length("1 1/4 in").unwrap(), 31.75);
        assert_relative_eq!(parse_length("4.5 mm").unwrap(), 4.5);
        assert_relative_eq!(parse_length("2cm").unwrap(), 20.0);
        assert_relative_eq!(parse_length("3").unwrap(), 3.0);
    }

    #[test]
    fn test_parse_length_rejects_garbage() {
        for text in ["", "inch", "1/0 in", "3 furlongs", "abc mm"] {
            assert!(
                matches!(parse_length(text), Err(ScadError::InvalidOption { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn test_inch_conversions() {
        assert_relative_eq!(inch2mm(1.0), 25.4);
        assert_relative_eq!(mm2inch(12.7), 0.5);
    }
}
