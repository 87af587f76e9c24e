use crate::compare::{
    Comparison, ComparisonMethod, common_denominator, compare_fractions, cross_multiplication,
};
use crate::fraction::{Fraction, lcm};

/// Number of steps the learner walks through for each method.
pub const LESSON_STEPS: usize = 3;

/// Worked example pair shown for a method.
#[must_use]
pub fn example_pair(method: ComparisonMethod) -> (Fraction, Fraction) {
    let (a, b, c, d) = match method {
        ComparisonMethod::Benchmark => (1, 3, 2, 3),
        ComparisonMethod::CommonDenominator => (3, 4, 5, 6),
        ComparisonMethod::CrossMultiplication => (2, 5, 3, 7),
    };
    (Fraction::from_terms(a, b), Fraction::from_terms(c, d))
}

/// Teaching content for one comparison method.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub method: ComparisonMethod,
    pub fraction1: Fraction,
    pub fraction2: Fraction,
    pub answer: Comparison,
    /// `LESSON_STEPS` pages: the idea, the worked example, the takeaway.
    pub steps: Vec<Vec<String>>,
}

impl Lesson {
    #[must_use]
    pub fn for_method(method: ComparisonMethod) -> Self {
        let (f1, f2) = example_pair(method);
        let answer = compare_fractions(f1, f2, Some(method));
        let steps = match method {
            ComparisonMethod::Benchmark => benchmark_steps(f1, f2, answer),
            ComparisonMethod::CommonDenominator => common_denominator_steps(f1, f2),
            ComparisonMethod::CrossMultiplication => cross_multiplication_steps(f1, f2),
        };
        Self {
            method,
            fraction1: f1,
            fraction2: f2,
            answer,
            steps,
        }
    }

    /// Lines visible at `step`; earlier pages stay on screen.
    #[must_use]
    pub fn visible_lines(&self, step: usize) -> Vec<&str> {
        self.steps
            .iter()
            .take(step.min(LESSON_STEPS - 1) + 1)
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

fn side_of_half(f: Fraction) -> &'static str {
    match compare_fractions(f, Fraction::from_terms(1, 2), None) {
        Comparison::Less => "less than",
        Comparison::Equal => "equal to",
        Comparison::Greater => "greater than",
    }
}

fn benchmark_steps(f1: Fraction, f2: Fraction, answer: Comparison) -> Vec<Vec<String>> {
    vec![
        vec!["Benchmarks are reference points: 0, 1/2 and 1.".to_string()],
        vec![
            format!("Example: compare {f1} and {f2}"),
            format!("{f1} is {} 1/2", side_of_half(f1)),
            format!("{f2} is {} 1/2", side_of_half(f2)),
            format!("So {f1} {answer} {f2}"),
        ],
        vec![
            "Compare each fraction to 1/2. If one is below and the other above, you know which is larger."
                .to_string(),
        ],
    ]
}

fn common_denominator_steps(f1: Fraction, f2: Fraction) -> Vec<Vec<String>> {
    let d1 = u64::from(f1.denominator());
    let d2 = u64::from(f2.denominator());
    let common = lcm(d1, d2);
    let (k1, k2) = (common / d1, common / d2);
    let n1 = u64::from(f1.numerator()) * k1;
    let n2 = u64::from(f2.numerator()) * k2;
    let answer = common_denominator(f1, f2);
    vec![
        vec!["Make the denominators the same, then compare the numerators.".to_string()],
        vec![
            format!("Example: compare {f1} and {f2}"),
            format!("{d1} and {d2} -> the LCM is {common}"),
            format!(
                "{f1} = ({} x {k1})/({d1} x {k1}) = {n1}/{common}",
                f1.numerator()
            ),
            format!(
                "{f2} = ({} x {k2})/({d2} x {k2}) = {n2}/{common}",
                f2.numerator()
            ),
            format!("Since {n1} {} {n2}, {f1} {answer} {f2}", Comparison::from_ordering(n1.cmp(&n2))),
        ],
        vec!["Write out each conversion step so your work can be checked.".to_string()],
    ]
}

fn cross_multiplication_steps(f1: Fraction, f2: Fraction) -> Vec<Vec<String>> {
    let left = u64::from(f1.numerator()) * u64::from(f2.denominator());
    let right = u64::from(f2.numerator()) * u64::from(f1.denominator());
    let answer = cross_multiplication(f1, f2);
    vec![
        vec!["Multiply diagonally across and compare the products.".to_string()],
        vec![
            format!("Example: compare {f1} and {f2}"),
            format!("{} x {} = {left} (left fraction)", f1.numerator(), f2.denominator()),
            format!("{} x {} = {right} (right fraction)", f2.numerator(), f1.denominator()),
            format!("Since {left} {answer} {right}, {f1} {answer} {f2}"),
        ],
        vec!["a/b compared with c/d has the same answer as a x d compared with c x b.".to_string()],
    ]
}

/// Step cursor within one lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LessonCursor {
    step: usize,
}

impl LessonCursor {
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Advance one page; returns `false` if already on the last page.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.step += 1;
        true
    }

    /// Go back one page; returns `false` on the first page.
    pub fn previous(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    /// Only the last page lets the learner confirm the method.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.step + 1 >= LESSON_STEPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_has_three_steps_and_matching_answer() {
        for method in ComparisonMethod::ALL {
            let lesson = Lesson::for_method(method);
            assert_eq!(lesson.steps.len(), LESSON_STEPS);
            assert_eq!(lesson.answer, Comparison::Less);
        }
    }

    #[test]
    fn common_denominator_example_shows_conversions() {
        let lesson = Lesson::for_method(ComparisonMethod::CommonDenominator);
        let text = lesson.steps[1].join("\n");
        assert!(text.contains("the LCM is 12"));
        assert!(text.contains("= 9/12"));
        assert!(text.contains("= 10/12"));
        assert!(text.contains("3/4 < 5/6"));
    }

    #[test]
    fn cross_multiplication_example_shows_products() {
        let lesson = Lesson::for_method(ComparisonMethod::CrossMultiplication);
        let text = lesson.steps[1].join("\n");
        assert!(text.contains("= 14"));
        assert!(text.contains("= 15"));
    }

    #[test]
    fn pages_accumulate() {
        let lesson = Lesson::for_method(ComparisonMethod::Benchmark);
        assert_eq!(lesson.visible_lines(0).len(), 1);
        assert_eq!(lesson.visible_lines(2).len(), 6);
        assert_eq!(lesson.visible_lines(9).len(), 6);
    }

    #[test]
    fn cursor_is_bounded() {
        let mut cursor = LessonCursor::default();
        assert!(!cursor.previous());
        assert!(cursor.next());
        assert!(cursor.next());
        assert!(cursor.is_last());
        assert!(!cursor.next());
        assert_eq!(cursor.step(), 2);
    }
}
