//! Kubernetes resource quantities such as `500Mi`, `2Gi` or `4k`.
//!
//! A quantity keeps its magnitude in base units next to the unit it is
//! displayed in, so quantities written in different units compare directly.
//!
//! The unit suffix is the last character, or the last two when the text ends
//! in `i`, matched case-insensitively. Lenient parsing ([`Quantity::parse`])
//! reads an unknown suffix as `M`; strict parsing rejects it.

use std::fmt;
use std::str::FromStr;

/// Errors raised while parsing quantities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    #[error("Empty quantity")]
    Empty,
    #[error("Invalid quantity '{text}': not an integer followed by a unit")]
    InvalidNumber { text: String },
    #[error("Unknown quantity unit '{suffix}'")]
    UnknownUnit { suffix: String },
    #[error("Quantity '{text}' is too large")]
    Overflow { text: String },
}

/// Display unit of a quantity: decimal (powers of 1000) or binary (powers of
/// 1024).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    K,
    M,
    G,
    T,
    P,
    Ki,
    Mi,
    Gi,
    Ti,
    Pi,
}

impl Unit {
    pub const ALL: [Unit; 10] = [
        Unit::K,
        Unit::M,
        Unit::G,
        Unit::T,
        Unit::P,
        Unit::Ki,
        Unit::Mi,
        Unit::Gi,
        Unit::Ti,
        Unit::Pi,
    ];

    /// Reads a suffix leniently: unknown suffixes are `M`.
    pub fn from_suffix(suffix: &str) -> Unit {
        suffix.parse().unwrap_or(Unit::M)
    }

    /// Base units per one of this unit.
    pub fn multiplier(&self) -> i64 {
        match self {
            Unit::K => 1_000,
            Unit::M => 1_000_000,
            Unit::G => 1_000_000_000,
            Unit::T => 1_000_000_000_000,
            Unit::P => 1_000_000_000_000_000,
            Unit::Ki => 1 << 10,
            Unit::Mi => 1 << 20,
            Unit::Gi => 1 << 30,
            Unit::Ti => 1 << 40,
            Unit::Pi => 1 << 50,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::K => "k",
            Unit::M => "M",
            Unit::G => "G",
            Unit::T => "T",
            Unit::P => "P",
            Unit::Ki => "Ki",
            Unit::Mi => "Mi",
            Unit::Gi => "Gi",
            Unit::Ti => "Ti",
            Unit::Pi => "Pi",
        }
    }
}

impl FromStr for Unit {
    type Err = QuantityError;

    /// Strict, case-insensitive suffix lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|u| u.suffix().eq_ignore_ascii_case(s))
            .ok_or_else(|| QuantityError::UnknownUnit {
                suffix: s.to_string(),
            })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A scaled resource amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantity {
    absolute_value: i64,
    unit: Unit,
}

impl Quantity {
    pub fn new(absolute_value: i64, unit: Unit) -> Self {
        Self {
            absolute_value,
            unit,
        }
    }

    /// Parses leniently; an unknown unit suffix is read as `M`.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::InvalidNumber`] when the text before the
    /// suffix is not an integer.
    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        Self::parse_with(text, false)
    }

    /// Parses strictly; an unknown unit suffix is an error.
    pub fn parse_strict(text: &str) -> Result<Self, QuantityError> {
        Self::parse_with(text, true)
    }

    pub fn parse_with(text: &str, strict: bool) -> Result<Self, QuantityError> {
        if text.is_empty() {
            return Err(QuantityError::Empty);
        }

        let unit_len = if text.ends_with('i') { 2 } else { 1 };
        let split = text
            .char_indices()
            .rev()
            .nth(unit_len - 1)
            .map(|(idx, _)| idx)
            .filter(|idx| *idx > 0)
            .ok_or_else(|| QuantityError::InvalidNumber {
                text: text.to_string(),
            })?;
        let (number, suffix) = text.split_at(split);

        let unit = if strict {
            suffix.parse()?
        } else {
            Unit::from_suffix(suffix)
        };
        let value: i64 = number.parse().map_err(|_| QuantityError::InvalidNumber {
            text: text.to_string(),
        })?;
        let absolute_value =
            value
                .checked_mul(unit.multiplier())
                .ok_or_else(|| QuantityError::Overflow {
                    text: text.to_string(),
                })?;

        Ok(Self {
            absolute_value,
            unit,
        })
    }

    /// Magnitude in base units (bytes or millicores).
    pub fn absolute_value(&self) -> i64 {
        self.absolute_value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Magnitude in the display unit, truncated toward zero.
    pub fn display_value(&self) -> i64 {
        self.absolute_value / self.unit.multiplier()
    }

    /// The same amount displayed in `unit`.
    pub fn convert_to(&self, unit: Unit) -> Quantity {
        Quantity {
            absolute_value: self.absolute_value,
            unit,
        }
    }

    pub fn convert_to_unit_of(&self, other: &Quantity) -> Quantity {
        self.convert_to(other.unit)
    }

    /// True if this amount is strictly greater than `other`.
    pub fn exceeds(&self, other: &Quantity) -> bool {
        self.absolute_value > other.absolute_value
    }

    /// True if `other` is more than `ratio_limit` times this amount.
    ///
    /// Typically called on a request with its limit as `other`.
    pub fn exceeds_ratio(&self, ratio_limit: i32, other: &Quantity) -> bool {
        (other.absolute_value as f64 / self.absolute_value as f64) > f64::from(ratio_limit)
    }

    /// `maximum` expressed in this quantity's unit if this exceeds it,
    /// otherwise this quantity unchanged.
    pub fn cap_to(&self, maximum: &Quantity) -> Quantity {
        if self.exceeds(maximum) {
            maximum.convert_to(self.unit)
        } else {
            *self
        }
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.display_value(), self.unit)
    }
}
