// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Drill charts and nearest-size lookup
//!
//! Diameters are stored in millimetres. The imperial chart merges the
//! fractional, number (wire gauge) and letter series.

use super::units::{inch2mm, parse_length};
use crate::error::{Result, ScadError};
use once_cell::sync::Lazy;
use std::fmt;

/// Diameters closer than this count as the same size
const SIZE_TOLERANCE: f64 = 1e-6;

/// Number drills #1 to #60, in inches
const WIRE_INCHES: [f64; 60] = [
    0.2280, 0.2210, 0.2130, 0.2090, 0.2055, 0.2040, 0.2010, 0.1990, 0.1960, 0.1935,
    0.1910, 0.1890, 0.1850, 0.1820, 0.1800, 0.1770, 0.1730, 0.1695, 0.1660, 0.1610,
    0.1590, 0.1570, 0.1540, 0.1520, 0.1495, 0.1470, 0.1440, 0.1405, 0.1360, 0.1285,
    0.1200, 0.1160, 0.1130, 0.1110, 0.1100, 0.1065, 0.1040, 0.1015, 0.0995, 0.0980,
    0.0960, 0.0935, 0.0890, 0.0860, 0.0820, 0.0810, 0.0785, 0.0760, 0.0730, 0.0700,
    0.0670, 0.0635, 0.0595, 0.0550, 0.0520, 0.0465, 0.0430, 0.0420, 0.0410, 0.0400,
];

/// Letter drills A to Z, in inches
const LETTER_INCHES: [f64; 26] = [
    0.234, 0.238, 0.242, 0.246, 0.250, 0.257, 0.261, 0.266, 0.272, 0.277, 0.281, 0.290, 0.295,
    0.302, 0.316, 0.323, 0.332, 0.339, 0.348, 0.358, 0.368, 0.377, 0.386, 0.397, 0.404, 0.413,
];

#[derive(Debug, Clone, PartialEq)]
pub struct DrillSize {
    pub name: String,
    /// Diameter in millimetres
    pub diameter: f64,
    pub metric: bool,
}

impl DrillSize {
    pub fn metric(diameter: f64) -> Self {
        Self {
            name: format!("{diameter}mm"),
            diameter,
            metric: true,
        }
    }

    pub fn imperial(name: impl Into<String>, inches: f64) -> Self {
        Self {
            name: name.into(),
            diameter: inch2mm(inches),
            metric: false,
        }
    }
}

impl fmt::Display for DrillSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.metric {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({:.4}\")", self.name, super::units::mm2inch(self.diameter))
        }
    }
}

/// A named chart of drill sizes, kept sorted by diameter
#[derive(Debug, Clone)]
pub struct DrillTable {
    name: String,
    sizes: Vec<DrillSize>,
}

impl DrillTable {
    pub fn new(name: impl Into<String>, sizes: impl IntoIterator<Item = DrillSize>) -> Self {
        let mut sizes: Vec<DrillSize> = sizes.into_iter().collect();
        sizes.sort_by(|a, b| a.diameter.total_cmp(&b.diameter));
        Self {
            name: name.into(),
            sizes,
        }
    }

    /// One chart holding every size of `tables`; earlier tables win ties
    pub fn merged(name: impl Into<String>, tables: &[&DrillTable]) -> Self {
        Self::new(
            name,
            tables.iter().flat_map(|table| table.sizes.iter().cloned()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sizes(&self) -> &[DrillSize] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Size by chart name (`"1/4"`, `"#16"`, `"Q"`, `"3.5mm"`)
    pub fn find(&self, name: &str) -> Option<&DrillSize> {
        self.sizes.iter().find(|size| size.name == name)
    }

    /// Drill for a hole of `diameter` mm
    ///
    /// Without `nearest` only an exact match is accepted. Otherwise the closest
    /// size wins, and an exact tie goes to the larger drill.
    pub fn lookup(&self, diameter: f64, nearest: bool) -> Result<&DrillSize> {
        if !diameter.is_finite() {
            return Err(ScadError::InvalidOption {
                option: "diameter".to_string(),
                value: diameter.to_string(),
            });
        }
        let no_match = || ScadError::NoExactSize {
            table: self.name.clone(),
            size: diameter,
        };
        let index = self
            .sizes
            .partition_point(|size| size.diameter < diameter - SIZE_TOLERANCE);
        let above = self.sizes.get(index);
        if let Some(size) = above {
            if (size.diameter - diameter).abs() <= SIZE_TOLERANCE {
                return Ok(size);
            }
        }
        if !nearest {
            return Err(no_match());
        }
        let below = index.checked_sub(1).and_then(|i| self.sizes.get(i));
        match (below, above) {
            (Some(below), Some(above)) => {
                if diameter - below.diameter < above.diameter - diameter {
                    Ok(below)
                } else {
                    Ok(above)
                }
            }
            (Some(only), None) | (None, Some(only)) => Ok(only),
            (None, None) => Err(no_match()),
        }
    }

    /// [`lookup`](Self::lookup) with a size written with units, e.g. `"0.1765 inch"`
    pub fn lookup_str(&self, size: &str, nearest: bool) -> Result<&DrillSize> {
        self.lookup(parse_length(size)?, nearest)
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// 1/64" to 1/2" in 64ths, named in lowest terms
pub static FRACTIONAL: Lazy<DrillTable> = Lazy::new(|| {
    DrillTable::new(
        "fractional",
        (1..=32u32).map(|n| {
            let d = gcd(n, 64);
            DrillSize::imperial(format!("{}/{}", n / d, 64 / d), f64::from(n) / 64.0)
        }),
    )
});

pub static WIRE: Lazy<DrillTable> = Lazy::new(|| {
    DrillTable::new(
        "wire",
        WIRE_INCHES
            .iter()
            .enumerate()
            .map(|(i, inches)| DrillSize::imperial(format!("#{}", i + 1), *inches)),
    )
});

pub static LETTER: Lazy<DrillTable> = Lazy::new(|| {
    DrillTable::new(
        "letter",
        ('A'..='Z')
            .zip(LETTER_INCHES)
            .map(|(letter, inches)| DrillSize::imperial(letter.to_string(), inches)),
    )
});

pub static IMPERIAL: Lazy<DrillTable> =
    Lazy::new(|| DrillTable::merged("imperial", &[&FRACTIONAL, &WIRE, &LETTER]));

/// Jobber series: 0.1 mm steps from 0.5 to 10 mm, then 0.5 mm steps to 13 mm
pub static METRIC: Lazy<DrillTable> = Lazy::new(|| {
    let fine = (5..=100u32).map(|tenths| f64::from(tenths) / 10.0);
    let coarse = (21..=26u32).map(|halves| f64::from(halves) / 2.0);
    DrillTable::new("metric", fine.chain(coarse).map(DrillSize::metric))
});

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_imperial_lookup() {
        let drill = IMPERIAL.lookup_str("1/2 inch", false).unwrap();
        assert_eq!(drill.name, "1/2");
        assert_relative_eq!(drill.diameter, 12.7);
        // E and 1/4 share a diameter; the fractional chart is listed first
        assert_eq!(IMPERIAL.lookup_str("0.25 in", false).unwrap().name, "1/4");
    }

    #[test]
    fn test_inexact_size_needs_nearest() {
        match IMPERIAL.lookup_str("0.1765 inch", false) {
            Err(ScadError::NoExactSize { table, .. }) => assert_eq!(table, "imperial"),
            other => panic!("unexpected: {other:?}"),
        }
        let drill = IMPERIAL.lookup_str("0.1765 inch", true).unwrap();
        assert_eq!(drill.name, "#16");
        assert_relative_eq!(drill.diameter, inch2mm(0.177));
    }

    #[test]
    fn test_nearest_at_the_ends_of_the_chart() {
        assert_eq!(METRIC.lookup(0.01, true).unwrap().name, "0.5mm");
        assert_eq!(METRIC.lookup(40.0, true).unwrap().name, "13mm");
        assert_eq!(METRIC.lookup(3.43, true).unwrap().name, "3.4mm");
        // halfway picks the larger drill
        let pair = DrillTable::new("pair", [DrillSize::metric(2.0), DrillSize::metric(1.0)]);
        assert_eq!(pair.sizes()[0].name, "1mm");
        assert_eq!(pair.lookup(1.5, true).unwrap().name, "2mm");
        assert!(METRIC.lookup(f64::NAN, true).is_err());
        assert!(DrillTable::new("empty", []).lookup(1.0, true).is_err());
    }

    #[test]
    fn test_chart_contents() {
        assert_eq!(FRACTIONAL.len(), 32);
        assert_eq!(FRACTIONAL.find("3/16").map(|d| d.diameter), Some(inch2mm(0.1875)));
        assert_eq!(WIRE.find("#60").map(|d| d.diameter), Some(inch2mm(0.04)));
        assert_eq!(LETTER.find("Q").map(|d| d.diameter), Some(inch2mm(0.332)));
        assert_eq!(IMPERIAL.len(), 32 + 60 + 26);
        assert!(IMPERIAL.sizes().windows(2).all(|w| w[0].diameter <= w[1].diameter));
        assert_eq!(METRIC.find("6.8mm").map(|d| d.metric), Some(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(METRIC.lookup(3.5, false).unwrap().to_string(), "3.5mm");
        assert_eq!(LETTER.find("E").unwrap().to_string(), "E (0.2500\")");
    }
}
