//! Arbitrary-magnitude decimal arithmetic for currency quantities.
//!
//! RULE: Every currency amount in the core is a `Decimal`. Components may
//! read an amount as a native f64 only for display or heuristic ranking,
//! never for comparison, storage, or balance math.
//!
//! Representation: `mantissa × 10^exponent` with the mantissa canonically
//! in [1.0, 10.0) (or exactly 0.0 for zero). This keeps values far past
//! 1e308 distinguishable instead of collapsing to infinity. Values are
//! non-negative; subtraction clamps at zero.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Mantissas more than this many decimal orders apart cannot interact
/// within f64 precision; add/sub treat the smaller operand as zero.
const ALIGN_LIMIT: i64 = 17;

#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    mantissa: f64,
    exponent: i64,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { mantissa: 0.0, exponent: 0 };
    pub const ONE: Decimal = Decimal { mantissa: 1.0, exponent: 0 };

    /// Build a canonical value from an arbitrary mantissa/exponent pair.
    /// Non-finite or non-positive mantissas collapse to zero.
    pub fn new(mantissa: f64, exponent: i64) -> Self {
        if !mantissa.is_finite() || mantissa <= 0.0 {
            return Self::ZERO;
        }
        let shift = mantissa.log10().floor() as i64;
        let mut m = mantissa / 10f64.powi(shift as i32);
        let mut e = exponent + shift;
        // log10/floor rounding can leave m a hair outside [1, 10).
        if m >= 10.0 {
            m /= 10.0;
            e += 1;
        } else if m < 1.0 {
            m *= 10.0;
            e -= 1;
        }
        Self { mantissa: m, exponent: e }
    }

    pub fn from_f64(value: f64) -> Self {
        Self::new(value, 0)
    }

    pub fn from_u64(value: u64) -> Self {
        Self::new(value as f64, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    /// Native-float view. Saturates to infinity past 1e308. Display and
    /// heuristic ranking only.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        if self.exponent > 308 {
            return f64::INFINITY;
        }
        if self.exponent < -324 {
            return 0.0;
        }
        self.mantissa * 10f64.powi(self.exponent as i32)
    }

    /// Saturating integer view, used for prestige-seed counts.
    pub fn to_u64_saturating(&self) -> u64 {
        let v = self.to_f64();
        if v >= u64::MAX as f64 {
            u64::MAX
        } else if v <= 0.0 {
            0
        } else {
            v as u64
        }
    }

    pub fn add(&self, other: &Decimal) -> Decimal {
        if self.is_zero() {
            return *other;
        }
        if other.is_zero() {
            return *self;
        }
        let (hi, lo) = if self.exponent >= other.exponent {
            (self, other)
        } else {
            (other, self)
        };
        let diff = hi.exponent - lo.exponent;
        if diff > ALIGN_LIMIT {
            return *hi;
        }
        Decimal::new(hi.mantissa + lo.mantissa / 10f64.powi(diff as i32), hi.exponent)
    }

    /// Subtraction clamped at zero: currency can never go negative.
    pub fn saturating_sub(&self, other: &Decimal) -> Decimal {
        if other >= self {
            return Decimal::ZERO;
        }
        let diff = self.exponent - other.exponent;
        if diff > ALIGN_LIMIT {
            return *self;
        }
        Decimal::new(
            self.mantissa - other.mantissa / 10f64.powi(diff as i32),
            self.exponent,
        )
    }

    pub fn mul(&self, other: &Decimal) -> Decimal {
        if self.is_zero() || other.is_zero() {
            return Decimal::ZERO;
        }
        Decimal::new(self.mantissa * other.mantissa, self.exponent + other.exponent)
    }

    /// Scale by a plain non-negative factor (multiplier stacks, ratios).
    pub fn mul_f64(&self, factor: f64) -> Decimal {
        if self.is_zero() || !factor.is_finite() || factor <= 0.0 {
            return Decimal::ZERO;
        }
        Decimal::new(self.mantissa * factor, self.exponent)
    }

    pub fn div(&self, other: &Decimal) -> Decimal {
        if self.is_zero() || other.is_zero() {
            return Decimal::ZERO;
        }
        Decimal::new(self.mantissa / other.mantissa, self.exponent - other.exponent)
    }

    /// Integer power by repeated squaring, exact in the exponent.
    pub fn powi(&self, mut n: u32) -> Decimal {
        let mut result = Decimal::ONE;
        let mut base = *self;
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            n >>= 1;
        }
        result
    }

    pub fn sqrt(&self) -> Decimal {
        if self.is_zero() {
            return Decimal::ZERO;
        }
        let (m, e) = if self.exponent.rem_euclid(2) == 1 {
            (self.mantissa * 10.0, self.exponent - 1)
        } else {
            (self.mantissa, self.exponent)
        };
        Decimal::new(m.sqrt(), e / 2)
    }

    /// Round down to a whole number. Values at 1e15 and beyond carry no
    /// fractional part in this representation.
    pub fn floor(&self) -> Decimal {
        if self.is_zero() || self.exponent >= 15 {
            return *self;
        }
        Decimal::from_f64(self.to_f64().floor())
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Decimal::ZERO
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .exponent
                .cmp(&other.exponent)
                .then_with(|| self.mantissa.total_cmp(&other.mantissa)),
        }
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::from_u64(value)
    }
}

impl From<f64> for Decimal {
    fn from(value: f64) -> Self {
        Decimal::from_f64(value)
    }
}

/// String form is `<mantissa>e<exponent>` (or `0`). Rust prints f64 with the
/// shortest round-trip representation, so re-parsing reproduces an equal
/// value exactly.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "0")
        } else {
            write!(f, "{}e{}", self.mantissa, self.exponent)
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseDecimalError);
        }
        if let Some(idx) = s.rfind(['e', 'E']) {
            // Reject a bare leading sign or exponent marker.
            if idx == 0 || idx == s.len() - 1 {
                return Err(ParseDecimalError);
            }
            let mantissa: f64 = s[..idx].parse().map_err(|_| ParseDecimalError)?;
            let exponent: i64 = s[idx + 1..].parse().map_err(|_| ParseDecimalError)?;
            if !mantissa.is_finite() || mantissa < 0.0 {
                return Err(ParseDecimalError);
            }
            Ok(Decimal::new(mantissa, exponent))
        } else {
            let value: f64 = s.parse().map_err(|_| ParseDecimalError)?;
            if !value.is_finite() || value < 0.0 {
                return Err(ParseDecimalError);
            }
            Ok(Decimal::from_f64(value))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseDecimalError;

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid decimal string")
    }
}

impl std::error::Error for ParseDecimalError {}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| de::Error::custom(format!("invalid decimal string '{s}'")))
    }
}
