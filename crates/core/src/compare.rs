use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::fraction::{Fraction, lcm};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseComparisonError {
    #[error("unknown comparison symbol: {0}")]
    UnknownSymbol(String),

    #[error("unknown comparison method: {0}")]
    UnknownMethod(String),
}

//
// ─── COMPARISON RESULT ─────────────────────────────────────────────────────────
//

/// Relation between the first and second fraction of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
}

impl Comparison {
    pub const ALL: [Self; 3] = [Self::Less, Self::Equal, Self::Greater];

    #[must_use]
    pub fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::Less,
            Ordering::Equal => Self::Equal,
            Ordering::Greater => Self::Greater,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::Equal => "=",
            Self::Greater => ">",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparison {
    type Err = ParseComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Self::Less),
            "=" => Ok(Self::Equal),
            ">" => Ok(Self::Greater),
            other => Err(ParseComparisonError::UnknownSymbol(other.to_string())),
        }
    }
}

//
// ─── METHODS ───────────────────────────────────────────────────────────────────
//

/// The three comparison methods taught in every session, in teaching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMethod {
    Benchmark,
    CommonDenominator,
    CrossMultiplication,
}

impl ComparisonMethod {
    pub const ALL: [Self; 3] = [
        Self::Benchmark,
        Self::CommonDenominator,
        Self::CrossMultiplication,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Benchmark => "benchmark",
            Self::CommonDenominator => "common-denominator",
            Self::CrossMultiplication => "cross-multiplication",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Benchmark => "Using Benchmarks",
            Self::CommonDenominator => "Common Denominators",
            Self::CrossMultiplication => "Cross-Multiplication",
        }
    }
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMethod {
    type Err = ParseComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ParseComparisonError::UnknownMethod(s.to_string()))
    }
}

//
// ─── STRATEGIES ────────────────────────────────────────────────────────────────
//

/// Exact comparison of `a/b` and `c/d` via `a×d` against `c×b`.
#[must_use]
pub fn cross_multiplication(f1: Fraction, f2: Fraction) -> Comparison {
    let left = u64::from(f1.numerator()) * u64::from(f2.denominator());
    let right = u64::from(f2.numerator()) * u64::from(f1.denominator());
    Comparison::from_ordering(left.cmp(&right))
}

/// Exact comparison after scaling both fractions to the LCM of the denominators.
#[must_use]
pub fn common_denominator(f1: Fraction, f2: Fraction) -> Comparison {
    let d1 = u64::from(f1.denominator());
    let d2 = u64::from(f2.denominator());
    let common = lcm(d1, d2);
    let n1 = u64::from(f1.numerator()) * (common / d1);
    let n2 = u64::from(f2.numerator()) * (common / d2);
    Comparison::from_ordering(n1.cmp(&n2))
}

const BENCHMARKS: [f64; 3] = [0.0, 0.5, 1.0];
const NEAR_BENCHMARK: f64 = 0.1;
const FAR_FROM_BENCHMARK: f64 = 0.2;
const CLEARLY_BELOW_HALF: f64 = 0.4;
const CLEARLY_ABOVE_HALF: f64 = 0.6;

/// Approximate comparison against the benchmarks 0, ½ and 1.
///
/// Returns `None` when the heuristic is inconclusive. The result is never used
/// as ground truth on its own; see [`compare_fractions`].
#[must_use]
pub fn try_benchmark(f1: Fraction, f2: Fraction) -> Option<Comparison> {
    let v1 = f1.to_decimal();
    let v2 = f2.to_decimal();

    for benchmark in BENCHMARKS {
        let near = (v1 - benchmark).abs() < NEAR_BENCHMARK;
        let far = (v2 - benchmark).abs() > FAR_FROM_BENCHMARK;
        if !(near && far) {
            continue;
        }
        if v1 < benchmark && v2 > benchmark {
            return Some(Comparison::Less);
        }
        if v1 > benchmark && v2 < benchmark {
            return Some(Comparison::Greater);
        }
    }

    if v1 < CLEARLY_BELOW_HALF && v2 > CLEARLY_ABOVE_HALF {
        return Some(Comparison::Less);
    }
    if v1 > CLEARLY_ABOVE_HALF && v2 < CLEARLY_BELOW_HALF {
        return Some(Comparison::Greater);
    }

    None
}

/// Compare two fractions with the requested method.
///
/// Benchmark comparisons fall back to cross-multiplication when inconclusive;
/// no method means cross-multiplication.
///
/// # Examples
///
/// ```
/// # use fraction_core::compare::{compare_fractions, Comparison, ComparisonMethod};
/// # use fraction_core::fraction::Fraction;
/// let half = Fraction::new(1, 2)?;
/// let two_quarters = Fraction::new(2, 4)?;
/// for method in ComparisonMethod::ALL {
///     assert_eq!(compare_fractions(half, two_quarters, Some(method)), Comparison::Equal);
/// }
/// # Ok::<(), fraction_core::fraction::FractionError>(())
/// ```
#[must_use]
pub fn compare_fractions(
    f1: Fraction,
    f2: Fraction,
    method: Option<ComparisonMethod>,
) -> Comparison {
    match method {
        Some(ComparisonMethod::Benchmark) => {
            try_benchmark(f1, f2).unwrap_or_else(|| cross_multiplication(f1, f2))
        }
        Some(ComparisonMethod::CommonDenominator) => common_denominator(f1, f2),
        Some(ComparisonMethod::CrossMultiplication) | None => cross_multiplication(f1, f2),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
