//! The `gutscore take` command.
//!
//! On a terminal the questions are asked with `dialoguer` menus. Piped
//! input is read line by line, one score or command per line.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Select};

use gutscore_core::config::load_config_from;
use gutscore_core::engine::{AssessmentEngine, NavigationResult, SessionPhase};
use gutscore_core::model::MAX_QUESTION_SCORE;
use gutscore_core::report::AssessmentReport;

use crate::output::{render_results, render_section};

/// Menu labels for each point on the 0-4 scale.
const SCORE_LABELS: [&str; 5] = [
    "0 = Never",
    "1 = Rare",
    "2 = Sometimes",
    "3 = Often",
    "4 = Almost daily",
];

pub fn execute(
    assessment_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<super::SaveFormat>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let assessment = super::resolve_assessment(assessment_path.as_deref(), &config)?;
    let output_dir = super::output_dir(output, &config);
    let format = super::save_format(format, &config)?;

    let mut engine = AssessmentEngine::new(assessment)?;
    println!("{}", engine.assessment().name);
    if !engine.assessment().description.is_empty() {
        println!("{}", engine.assessment().description);
    }

    let save = |engine: &AssessmentEngine| -> Result<()> {
        let Some(dir) = &output_dir else {
            return Ok(());
        };
        let report = AssessmentReport::from_engine(engine)?;
        for path in super::save_report(&report, dir, format)? {
            eprintln!("Results saved to: {}", path.display());
        }
        Ok(())
    };

    let stdin = io::stdin();
    let completed = if stdin.is_terminal() {
        run_session(&mut engine, &mut TermPrompter::default(), save)?
    } else {
        let mut prompter = LinePrompter::new(stdin.lock(), io::stdout().lock());
        run_session(&mut engine, &mut prompter, save)?
    };

    tracing::info!(completed, "session finished");
    Ok(())
}

/// Choice after a section has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionChoice {
    Next,
    Previous,
    Edit,
    Restart,
    Quit,
}

/// Choice on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsChoice {
    Restart,
    Quit,
}

/// Source of answers and menu choices for a session.
pub trait Prompter {
    type Out: Write;

    /// Where section headers, results, and messages are written.
    fn out(&mut self) -> &mut Self::Out;

    /// Score for question `number` (1-based); `None` quits the session.
    fn ask_score(&mut self, number: usize, question: &str, current: u8) -> Result<Option<u8>>;

    /// `is_last` is set on the final section, where "next" shows results.
    fn ask_section_choice(&mut self, is_last: bool) -> Result<SectionChoice>;

    fn ask_results_choice(&mut self) -> Result<ResultsChoice>;
}

/// Arrow-key menus on the controlling terminal.
pub struct TermPrompter {
    theme: ColorfulTheme,
    out: io::Stdout,
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            out: io::stdout(),
        }
    }
}

impl Prompter for TermPrompter {
    type Out = io::Stdout;

    fn out(&mut self) -> &mut io::Stdout {
        &mut self.out
    }

    fn ask_score(&mut self, number: usize, question: &str, current: u8) -> Result<Option<u8>> {
        self.out.flush()?;
        let choice = Select::with_theme(&self.theme)
            .with_prompt(format!("{number}. {question}"))
            .items(&SCORE_LABELS)
            .default(usize::from(current))
            .interact_opt()?;
        Ok(choice.and_then(|i| u8::try_from(i).ok()))
    }

    fn ask_section_choice(&mut self, is_last: bool) -> Result<SectionChoice> {
        let next = if is_last { "View results" } else { "Next section" };
        let items = [next, "Previous section", "Edit this section", "Restart", "Quit"];
        self.out.flush()?;
        let choice = Select::with_theme(&self.theme)
            .with_prompt("What next?")
            .items(&items)
            .default(0)
            .interact_opt()?;
        Ok(match choice {
            Some(0) => SectionChoice::Next,
            Some(1) => SectionChoice::Previous,
            Some(2) => SectionChoice::Edit,
            Some(3) => SectionChoice::Restart,
            _ => SectionChoice::Quit,
        })
    }

    fn ask_results_choice(&mut self) -> Result<ResultsChoice> {
        self.out.flush()?;
        let choice = Select::with_theme(&self.theme)
            .with_prompt("Take it again?")
            .items(&["Restart", "Quit"])
            .default(1)
            .interact_opt()?;
        Ok(match choice {
            Some(0) => ResultsChoice::Restart,
            _ => ResultsChoice::Quit,
        })
    }
}

/// One score or command per line, for piped input.
///
/// Enter keeps the current score or moves to the next section. End of input
/// quits.
pub struct LinePrompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    type Out = W;

    fn out(&mut self) -> &mut W {
        &mut self.out
    }

    fn ask_score(&mut self, number: usize, question: &str, current: u8) -> Result<Option<u8>> {
        loop {
            write!(
                self.out,
                "  {number}. {question} [0-{MAX_QUESTION_SCORE}, current {current}]: "
            )?;
            self.out.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.as_str() {
                "" => return Ok(Some(current)),
                "q" | "quit" => return Ok(None),
                other => match other.parse::<u8>() {
                    Ok(score) if score <= MAX_QUESTION_SCORE => return Ok(Some(score)),
                    _ => writeln!(
                        self.out,
                        "Please enter a score between 0 and {MAX_QUESTION_SCORE}."
                    )?,
                },
            }
        }
    }

    fn ask_section_choice(&mut self, is_last: bool) -> Result<SectionChoice> {
        let next = if is_last { "view results" } else { "next" };
        loop {
            write!(
                self.out,
                "[n] {next}, [p] previous, [e] edit, [r] restart, [q] quit: "
            )?;
            self.out.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(SectionChoice::Quit);
            };
            match line.as_str() {
                "" | "n" | "next" => return Ok(SectionChoice::Next),
                "p" | "prev" | "previous" => return Ok(SectionChoice::Previous),
                "e" | "edit" => return Ok(SectionChoice::Edit),
                "r" | "restart" => return Ok(SectionChoice::Restart),
                "q" | "quit" => return Ok(SectionChoice::Quit),
                other => writeln!(self.out, "Unknown command: {other}")?,
            }
        }
    }

    fn ask_results_choice(&mut self) -> Result<ResultsChoice> {
        loop {
            write!(self.out, "\n[r] restart, [q] quit: ")?;
            self.out.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(ResultsChoice::Quit);
            };
            match line.as_str() {
                "r" | "restart" => return Ok(ResultsChoice::Restart),
                "" | "q" | "quit" => return Ok(ResultsChoice::Quit),
                other => writeln!(self.out, "Unknown command: {other}")?,
            }
        }
    }
}

/// Ask every question of the active section; `false` if the user quit.
fn ask_section<P: Prompter>(engine: &mut AssessmentEngine, prompter: &mut P) -> Result<bool> {
    let section = engine.current_section().clone();
    for (i, question) in section.questions.iter().enumerate() {
        let key = section.key(i);
        let current = engine.score(&key).unwrap_or(0);
        match prompter.ask_score(i + 1, question, current)? {
            Some(score) => engine.record_answer(&key, score)?,
            None => return Ok(false),
        }
    }
    Ok(true)
}

/// Drive `engine` with `prompter` until the user quits.
///
/// `on_complete` runs every time the results are reached. Returns the number
/// of completed attempts.
pub fn run_session<P, F>(
    engine: &mut AssessmentEngine,
    prompter: &mut P,
    mut on_complete: F,
) -> Result<usize>
where
    P: Prompter,
    F: FnMut(&AssessmentEngine) -> Result<()>,
{
    let mut completed = 0usize;

    'session: loop {
        match engine.phase() {
            SessionPhase::InProgress(index) => {
                render_section(engine, prompter.out())?;
                if !ask_section(engine, prompter)? {
                    quit(engine, prompter.out())?;
                    break 'session;
                }

                let max_score = engine.current_section().max_score;
                writeln!(
                    prompter.out(),
                    "Section score: {} / {max_score}",
                    engine.section_totals()[index]
                )?;

                let is_last = index + 1 == engine.section_count();
                loop {
                    match prompter.ask_section_choice(is_last)? {
                        SectionChoice::Next => {
                            if engine.advance_section() == NavigationResult::ReachedResults {
                                completed += 1;
                                on_complete(&*engine)?;
                            }
                            break;
                        }
                        SectionChoice::Previous => match engine.retreat_section() {
                            NavigationResult::AtStart => {
                                writeln!(prompter.out(), "Already at the first section.")?;
                            }
                            _ => break,
                        },
                        SectionChoice::Edit => break,
                        SectionChoice::Restart => {
                            engine.reset();
                            writeln!(prompter.out(), "Restarting assessment.")?;
                            break;
                        }
                        SectionChoice::Quit => {
                            quit(engine, prompter.out())?;
                            break 'session;
                        }
                    }
                }
            }
            SessionPhase::Complete => {
                render_results(engine, prompter.out())?;
                match prompter.ask_results_choice()? {
                    ResultsChoice::Restart => {
                        engine.reset();
                        writeln!(prompter.out(), "Restarting assessment.")?;
                    }
                    ResultsChoice::Quit => break 'session,
                }
            }
        }
    }

    let out = prompter.out();
    writeln!(out)?;
    out.flush()?;
    Ok(completed)
}

fn quit(engine: &AssessmentEngine, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    if engine.warns_on_exit() {
        writeln!(out, "Your progress will be lost.")?;
    }
    writeln!(out, "Goodbye.")
}
