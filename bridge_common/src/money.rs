use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Type;
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "ZAR";

//--------------------------------------       Money        ----------------------------------------------------------
/// A monetary amount, stored as an integer number of cents.
///
/// Payment providers hand us amounts as JSON numbers, decimal strings, or floats depending on the payload shape, so
/// all conversions funnel through [`Money::try_from_json`] or [`FromStr`] and fail loudly rather than round silently.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(pub String);

/// The raw value is in cents.
impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(MoneyConversionError(s.to_string()));
        }
        if !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyConversionError(s.to_string()));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| MoneyConversionError(s.to_string()))?
        };
        // Fractions are padded or rounded (half-up on the third digit) to exactly two places.
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| MoneyConversionError(s.to_string()))? * 10,
            _ => {
                let cents = frac[..2].parse::<i64>().map_err(|_| MoneyConversionError(s.to_string()))?;
                let round_up = frac.as_bytes().get(2).is_some_and(|d| *d >= b'5');
                cents + i64::from(round_up)
            },
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(|| MoneyConversionError(s.to_string()))?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_major_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// The amount as a float in major units. Lossy above 2^53 cents; only use this at API boundaries that demand a
    /// JSON number.
    pub fn to_major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Coerce a JSON value into an amount. Accepts integers (major units), floats (major units, rounded to the
    /// nearest cent) and decimal strings.
    pub fn try_from_json(value: &Value) -> Result<Self, MoneyConversionError> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.checked_mul(100).map(Self).ok_or_else(|| MoneyConversionError(n.to_string()))
                } else if let Some(f) = n.as_f64() {
                    Self::try_from_f64(f)
                } else {
                    Err(MoneyConversionError(n.to_string()))
                }
            },
            Value::String(s) => s.parse(),
            other => Err(MoneyConversionError(other.to_string())),
        }
    }

    /// Round a float amount in major units to the nearest cent. Rejects non-finite and out-of-range inputs.
    pub fn try_from_f64(value: f64) -> Result<Self, MoneyConversionError> {
        if !value.is_finite() {
            return Err(MoneyConversionError(value.to_string()));
        }
        let cents = (value * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return Err(MoneyConversionError(value.to_string()));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(cents as i64))
    }
}
