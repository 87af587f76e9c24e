use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Input-contract violations for fraction terms.
///
/// These indicate a defect in whatever produced the terms (usually the
/// exercise generator), never a learner-facing condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FractionError {
    #[error("denominator must be non-zero")]
    ZeroDenominator,

    #[error("numerator must be at least 1")]
    ZeroNumerator,

    #[error("malformed fraction: {raw}")]
    Malformed { raw: String },
}

//
// ─── INTEGER HELPERS ───────────────────────────────────────────────────────────
//

/// Greatest common divisor. `gcd(a, 0) == a`.
#[must_use]
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple over positive integers. Returns 0 if either side is 0.
#[must_use]
pub fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}

//
// ─── FRACTION ──────────────────────────────────────────────────────────────────
//

/// A positive fraction `numerator/denominator`.
///
/// Terms are kept exactly as constructed; equality is structural, so `1/2` and
/// `2/4` are different values here even though they compare as equal under
/// every comparison method. Use [`Fraction::simplify`] to normalize.
///
/// # Examples
///
/// ```
/// # use fraction_core::fraction::Fraction;
/// let f = Fraction::new(6, 8)?;
/// assert_eq!(f.to_string(), "6/8");
/// assert_eq!(f.simplify().to_string(), "3/4");
/// assert_eq!(f.to_decimal(), 0.75);
/// # Ok::<(), fraction_core::fraction::FractionError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFraction", into = "RawFraction")]
pub struct Fraction {
    numerator: u32,
    denominator: u32,
}

impl Fraction {
    /// Build a fraction from its terms.
    ///
    /// # Errors
    ///
    /// Returns `FractionError::ZeroDenominator` or `FractionError::ZeroNumerator`
    /// when either term is zero.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, FractionError> {
        if denominator == 0 {
            return Err(FractionError::ZeroDenominator);
        }
        if numerator == 0 {
            return Err(FractionError::ZeroNumerator);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Terms already known to be non-zero (generator output, gcd quotients).
    pub(crate) fn from_terms(numerator: u32, denominator: u32) -> Self {
        debug_assert!(numerator > 0 && denominator > 0);
        Self {
            numerator,
            denominator,
        }
    }

    #[must_use]
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    #[must_use]
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Reduce to lowest terms.
    #[must_use]
    pub fn simplify(self) -> Self {
        let divisor = gcd(u64::from(self.numerator), u64::from(self.denominator));
        // divisor divides both u32 terms, so the quotients fit back into u32
        let divisor = u32::try_from(divisor).unwrap_or(1);
        Self::from_terms(self.numerator / divisor, self.denominator / divisor)
    }

    #[must_use]
    pub fn is_simplified(&self) -> bool {
        gcd(u64::from(self.numerator), u64::from(self.denominator)) == 1
    }

    /// Proper fractions are strictly less than one.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        self.numerator < self.denominator
    }

    #[must_use]
    pub fn to_decimal(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Fraction {
    type Err = FractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || FractionError::Malformed { raw: s.to_string() };
        let (numerator, denominator) = s.trim().split_once('/').ok_or_else(malformed)?;
        let numerator = numerator.trim().parse::<u32>().map_err(|_| malformed())?;
        let denominator = denominator.trim().parse::<u32>().map_err(|_| malformed())?;
        Self::new(numerator, denominator)
    }
}

#[derive(Serialize, Deserialize)]
struct RawFraction {
    numerator: u32,
    denominator: u32,
}

impl TryFrom<RawFraction> for Fraction {
    type Error = FractionError;

    fn try_from(raw: RawFraction) -> Result<Self, Self::Error> {
        Self::new(raw.numerator, raw.denominator)
    }
}

impl From<Fraction> for RawFraction {
    fn from(f: Fraction) -> Self {
        Self {
            numerator: f.numerator,
            denominator: f.denominator,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: u32, d: u32) -> Fraction {
        Fraction::new(n, d).unwrap()
    }

    #[test]
    fn gcd_and_lcm_basics() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(lcm(4, 6), 12);
        assert_eq!(lcm(5, 7), 35);
        assert_eq!(lcm(3, 0), 0);
    }

    #[test]
    fn zero_terms_are_rejected() {
        assert_eq!(Fraction::new(1, 0), Err(FractionError::ZeroDenominator));
        assert_eq!(Fraction::new(0, 3), Err(FractionError::ZeroNumerator));
    }

    #[test]
    fn simplify_reduces_to_lowest_terms() {
        assert_eq!(frac(6, 8).simplify(), frac(3, 4));
        assert_eq!(frac(5, 10).simplify(), frac(1, 2));
        assert_eq!(frac(3, 7).simplify(), frac(3, 7));
        assert!(frac(6, 8).simplify().is_simplified());
    }

    #[test]
    fn simplify_is_idempotent() {
        for d in 1..=24 {
            for n in 1..=24 {
                let once = frac(n, d).simplify();
                assert_eq!(once.simplify(), once, "{n}/{d}");
            }
        }
    }

    #[test]
    fn format_keeps_terms_as_given() {
        assert_eq!(frac(2, 4).to_string(), "2/4");
        assert_eq!(frac(11, 12).to_string(), "11/12");
    }

    #[test]
    fn decimal_conversion() {
        assert!((frac(1, 3).to_decimal() - 0.333_333).abs() < 1e-6);
        assert!((frac(3, 4).to_decimal() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("3/5".parse::<Fraction>().unwrap(), frac(3, 5));
        assert_eq!(" 7 / 9 ".parse::<Fraction>().unwrap(), frac(7, 9));
        assert!(matches!(
            "3-5".parse::<Fraction>(),
            Err(FractionError::Malformed { .. })
        ));
        assert_eq!("3/0".parse::<Fraction>(), Err(FractionError::ZeroDenominator));
    }

    #[test]
    fn deserialization_enforces_invariant() {
        let ok: Fraction = serde_json::from_str(r#"{"numerator":2,"denominator":3}"#).unwrap();
        assert_eq!(ok, frac(2, 3));

        let bad = serde_json::from_str::<Fraction>(r#"{"numerator":2,"denominator":0}"#);
        assert!(bad.is_err());
    }
}
