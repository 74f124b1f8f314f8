//! Human readable sizes such as `10m`: an integer magnitude followed by a single unit letter,
//! k = 1024, m = 1024², g = 1024³. Units are case-insensitive.
use crate::err::Error;
use std::str::FromStr;

const UNITS: [(char, u64); 3] = [('k', 1 << 10), ('m', 1 << 20), ('g', 1 << 30)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeSpec {
    pub magnitude: u64,
    /// Always stored in lower case by the parser
    pub unit: char,
}

impl SizeSpec {
    /// Multiplier for `unit`, if it is one of the known units
    pub fn multiplier(unit: char) -> Option<u64> {
        let unit = unit.to_ascii_lowercase();
        UNITS.iter().find(|(u, _)| *u == unit).map(|(_, m)| *m)
    }

    /// Size in bytes
    pub fn byte_size(&self) -> Result<u64, Error> {
        let multiplier = Self::multiplier(self.unit).ok_or(Error::UnknownUnit { unit: self.unit })?;
        self.magnitude
            .checked_mul(multiplier)
            .ok_or_else(|| Error::InvalidSizeFormat {
                input: format!("{}{}", self.magnitude, self.unit),
            })
    }
}

impl FromStr for SizeSpec {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidSizeFormat {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let unit = trimmed.chars().last().ok_or_else(invalid)?;
        if Self::multiplier(unit).is_none() {
            return Err(invalid());
        }
        let digits = &trimmed[..trimmed.len() - unit.len_utf8()];
        // `u64::from_str` accepts a leading '+', a size does not
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude: u64 = digits.parse().map_err(|_| invalid())?;
        if magnitude == 0 {
            return Err(invalid());
        }
        Ok(SizeSpec {
            magnitude,
            unit: unit.to_ascii_lowercase(),
        })
    }
}

/// Parse a size string straight to a number of bytes.
pub fn parse_size(s: &str) -> Result<u64, Error> {
    s.parse::<SizeSpec>()?.byte_size()
}
