//! Line-based front end for a curriculum session.

use std::io::{self, BufRead, Write};

use fraction_core::adaptive::Adjustment;
use fraction_core::compare::{Comparison, ComparisonMethod};
use fraction_core::instruction::LESSON_STEPS;
use fraction_core::model::{SessionNumber, SubmissionDraft};
use fraction_core::phase::SessionPhase;
use services::{CurriculumSession, NextStep, SessionError, SessionLoopService};

/// Reads learner input and writes prompts.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    /// Prompt and read one trimmed line.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` once input is closed.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }
}

/// `<`, `=`, `>` or their words; anything else counts as no answer.
pub fn parse_answer(raw: &str) -> Option<Comparison> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "less" | "l" => Some(Comparison::Less),
        "equal" | "e" => Some(Comparison::Equal),
        "greater" | "g" => Some(Comparison::Greater),
        other => other.parse().ok(),
    }
}

fn describe(adjustment: Adjustment) -> String {
    match adjustment {
        Adjustment::Raised { to, .. } => format!("Nice streak! Difficulty raised to {to:.1}."),
        Adjustment::Lowered { to, .. } => format!("Let's ease off. Difficulty lowered to {to:.1}."),
    }
}

/// Drive one session to completion or until the learner stops.
///
/// # Errors
///
/// Returns the first service or I/O error; incomplete submissions are
/// reported to the learner and asked again.
pub async fn run_session<R: BufRead, W: Write>(
    loop_svc: &SessionLoopService,
    number: SessionNumber,
    prompter: &mut Prompter<R, W>,
) -> Result<Option<NextStep>, Box<dyn std::error::Error>> {
    let mut session = loop_svc.start_session(number).await?;
    prompter.say(format!("=== Session {number} ==="))?;

    loop {
        match session.phase() {
            SessionPhase::Instruction { method_index } => {
                teach(&mut session, method_index, prompter)?;
                loop_svc.acknowledge_method(&mut session).await?;
            }
            SessionPhase::Practice | SessionPhase::Assessment => {
                answer_one(loop_svc, &mut session, prompter).await?;
            }
            SessionPhase::Retry { score } => {
                prompter.say(format!(
                    "Assessment score {score:.2}%. You need {:.0}% to pass.",
                    session.settings().mastery_threshold()
                ))?;
                let again = prompter.ask("Review the methods and try again? [Y/n] ")?;
                if again.eq_ignore_ascii_case("n") {
                    return Ok(None);
                }
                loop_svc.retry(&mut session)?;
            }
            SessionPhase::Complete { score } => {
                prompter.say(format!("Session {number} mastered with {score:.2}%!"))?;
                return Ok(session.next_step());
            }
        }
    }
}

fn teach<R: BufRead, W: Write>(
    session: &mut CurriculumSession,
    method_index: usize,
    prompter: &mut Prompter<R, W>,
) -> io::Result<()> {
    let Some(lesson) = session.lesson() else {
        return Ok(());
    };
    prompter.say(format!(
        "\n--- Method {} of {}: {} ---",
        method_index + 1,
        ComparisonMethod::ALL.len(),
        lesson.method.title()
    ))?;
    loop {
        let cursor = session.lesson_cursor();
        for line in lesson.steps.get(cursor.step()).into_iter().flatten() {
            prompter.say(line)?;
        }
        let reply = if cursor.is_last() {
            prompter.ask("Press Enter when you understand this method (b = back). ")?
        } else {
            prompter.ask(&format!(
                "(page {} of {LESSON_STEPS}; Enter = next, b = back) ",
                cursor.step() + 1
            ))?
        };
        if reply.eq_ignore_ascii_case("b") {
            session.previous_lesson_step();
        } else if !session.next_lesson_step() {
            return Ok(());
        }
    }
}

async fn answer_one<R: BufRead, W: Write>(
    loop_svc: &SessionLoopService,
    session: &mut CurriculumSession,
    prompter: &mut Prompter<R, W>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(exercise) = session.current_exercise().cloned() else {
        return Err(SessionError::NoExercise.into());
    };
    let progress = session.progress();
    let heading = match (session.phase(), session.practice()) {
        (SessionPhase::Practice, Some(round)) => format!(
            "\nPractice {}/{} (difficulty {:.1})",
            progress.answered + 1,
            progress.total,
            round.difficulty()
        ),
        _ => format!("\nAssessment {}/{}", progress.answered + 1, progress.total),
    };
    prompter.say(heading)?;
    prompter.say(format!(
        "Compare {} using {}",
        exercise.prompt(),
        exercise.method().title()
    ))?;

    let answer = parse_answer(&prompter.ask("Your answer (<, =, >): ")?);
    let justification = prompter.ask("Explain your reasoning: ")?;
    let draft = SubmissionDraft {
        answer,
        justification,
    };

    let result = match loop_svc.submit_answer(session, draft).await {
        Ok(result) => result,
        Err(SessionError::Submission(reason)) => {
            prompter.say(format!("! {reason}"))?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if result.response.is_correct() {
        prompter.say(format!("Correct: {}", result.solution))?;
    } else {
        prompter.say(format!("Not quite. {}", result.solution))?;
    }
    if let Some(step) = result.adjustment {
        prompter.say(describe(step))?;
    }
    if let Some(outcome) = result.outcome {
        prompter.say(format!(
            "\nAssessment: {}/{} correct ({:.2}%)",
            outcome.correct,
            outcome.total,
            outcome.rounded_score()
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbols_and_words() {
        assert_eq!(parse_answer("<"), Some(Comparison::Less));
        assert_eq!(parse_answer(" = "), Some(Comparison::Equal));
        assert_eq!(parse_answer("Greater"), Some(Comparison::Greater));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn ask_reports_closed_input() {
        let mut prompter = Prompter::new(io::Cursor::new(""), Vec::new());
        let err = prompter.ask("> ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn lesson_pages_back_and_ends_on_last_page() {
        use fraction_core::settings::CurriculumSettings;
        use fraction_core::time::fixed_clock;
        use services::AppServices;

        let app = AppServices::in_memory(fixed_clock(), CurriculumSettings::default(), Some(3));
        let loop_svc = app.session_loop();
        let mut session = loop_svc.start_session(SessionNumber::FIRST).await.unwrap();

        let mut output = Vec::new();
        let mut prompter = Prompter::new(io::Cursor::new("\nb\n\n\n\n"), &mut output);
        teach(&mut session, 0, &mut prompter).unwrap();

        assert!(session.lesson_cursor().is_last());
        assert!(loop_svc.acknowledge_method(&mut session).await.is_ok());
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("page 1 of 3").count(), 2);
    }

    #[test]
    fn ask_trims_the_line() {
        let mut prompter = Prompter::new(io::Cursor::new("  > \n"), Vec::new());
        assert_eq!(prompter.ask("? ").unwrap(), ">");
    }
}
