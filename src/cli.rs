use crate::Error;
use colored::Colorize;
use log::{debug, error, warn};
use rand::rng;
use std::io::{self, Write};
use std::thread;
use std::time::Instant;
use text_io::try_read;

use tikulianxi::libtiku::cuoti::ErrorStore;
use tikulianxi::libtiku::db::SqliteStore;
use tikulianxi::libtiku::question::Bank;
use tikulianxi::libtiku::session::{
    build_session_with, Feedback, Mode, Outcome, Session, SessionError, Submission,
};

#[derive(Debug, PartialEq)]
enum Choice {
    Option(usize),
    Next,
    Previous,
    Finish,
    Quit,
    Unknown,
}

impl Choice {
    fn from_str(options_count: usize, input: &str) -> Choice {
        match input.trim() {
            "n" => Choice::Next,
            "p" => Choice::Previous,
            "f" => Choice::Finish,
            "q" => Choice::Quit,
            input => match input.parse::<usize>() {
                Ok(num) if (1..=options_count).contains(&num) => Choice::Option(num - 1),
                Ok(_) => {
                    println!(
                        "{}",
                        format!("There are only {} options available!", options_count)
                            .bright_red()
                    );
                    Choice::Unknown
                }
                Err(_) => Choice::Unknown,
            },
        }
    }
}

/// `None` only once stdin is exhausted.
fn read_line() -> Option<String> {
    let _ = io::stdout().flush();
    line_or_eof(try_read!("{}\n"))
}

/// An unreadable line comes back empty, which every prompt rejects as an
/// unknown choice.
fn line_or_eof(read: Result<String, text_io::Error>) -> Option<String> {
    match read {
        Ok(line) => Some(line),
        Err(text_io::Error::UnexpectedValue(_, None)) => None,
        Err(err) => {
            warn!("[Input] Unreadable line: {}", err);
            Some(String::new())
        }
    }
}

/// Mode selection screen. Runs sessions until the user quits; the bank
/// stays loaded throughout.
pub fn mode_loop(
    store: &SqliteStore,
    bank: &Bank,
    mut preset: Option<Mode>,
    exam_size: usize,
) -> Result<(), Error> {
    let errors = ErrorStore::new(store);
    loop {
        println!(
            "{}",
            format!("Missed questions on record: {}", errors.count(&bank.key)).yellow()
        );
        let mode = match preset.take() {
            Some(mode) => mode,
            None => match prompt_mode() {
                Some(mode) => mode,
                None => return Ok(()),
            },
        };

        let error_set = errors.load(&bank.key);
        match build_session_with(bank, mode, &error_set, exam_size, &mut rng()) {
            Ok(session) => run_session(session, &errors)?,
            Err(SessionError::NoErrorsToReview) => {
                println!("{}", "There are no missed questions to review yet!".yellow());
            }
            Err(err) => {
                error!("[Session] Cannot start {} session: {}", mode, err);
                return Err(err.into());
            }
        }
    }
}

fn prompt_mode() -> Option<Mode> {
    loop {
        println!("{}", "Choose a mode:".cyan());
        for (i, mode) in Mode::ALL.iter().enumerate() {
            println!("  {}. {}", format!("{}", i + 1).bold(), mode.label());
        }
        print!("{} ", "Mode (1-4 or name, q to quit):".cyan());
        let input = read_line()?;
        let input = input.trim();
        if input == "q" {
            return None;
        }
        let picked = match input.parse::<usize>() {
            Ok(num) if (1..=Mode::ALL.len()).contains(&num) => Ok(Mode::ALL[num - 1]),
            _ => input.parse::<Mode>(),
        };
        match picked {
            Ok(mode) => return Some(mode),
            Err(err) => {
                warn!("[Setup] {}", err);
                println!("{}", format!("{err}!").bright_red());
            }
        }
    }
}

fn render(session: &Session) {
    let nav = session.nav();
    let leading = format!("{} / {}  ", nav.position + 1, nav.total);
    println!();
    println!("{}{}", leading.cyan(), session.mode().label().cyan().italic());

    if let Err(err) = session.check_current() {
        println!("{}", format!("✘ {err}. Press n to skip it.").bright_red().bold());
        print_nav(session);
        return;
    }
    let Ok(question) = session.current_question() else {
        return;
    };
    println!("{}", question.question.bold());

    let recorded = session.recorded_answer();
    for (i, option) in question.options.iter().enumerate() {
        let line = format!("  {}. {}", i + 1, option);
        if recorded == Some(i) {
            println!("{} {}", line.black().on_white(), "(selected)".dimmed());
        } else {
            println!("{}", line);
        }
    }
    print_nav(session);
}

fn print_nav(session: &Session) {
    let nav = session.nav();
    let mut keys = Vec::new();
    if nav.show_previous {
        keys.push("p = previous");
    }
    if nav.show_next {
        keys.push("n = next");
    }
    if nav.show_finish {
        keys.push(if session.mode() == Mode::Exam {
            "f = submit exam"
        } else {
            "f = end practice"
        });
    }
    keys.push("q = back to menu");
    println!("{}", keys.join(", ").dimmed());
}

fn show_feedback(feedback: &Feedback, options: &[String]) {
    if feedback.is_correct {
        println!("{}", "✓ Correct".bright_green().bold());
    } else {
        println!("{}", "✗ Wrong".bright_red().bold());
        let correct = options
            .get(feedback.correct_index)
            .map(String::as_str)
            .unwrap_or_default();
        println!(
            "{}",
            format!("The correct choice was {}. {}", feedback.correct_index + 1, correct).green()
        );
    }
    if feedback.explanation.is_empty() {
        println!("{}", "No explanation available.".dimmed());
    } else {
        println!("{}", feedback.explanation);
    }
    if let Some(source) = &feedback.source {
        println!("{}", format!("Source: {source}").dimmed());
    }
}

fn run_session(mut session: Session, errors: &ErrorStore<'_, SqliteStore>) -> Result<(), Error> {
    let mut needs_render = true;
    while !session.is_finished() {
        if needs_render {
            render(&session);
            needs_render = false;
        }
        let options_count = session
            .current_question()
            .map(|q| q.options.len())
            .unwrap_or(0);

        print!("{} ", "›".cyan());
        let Some(input) = read_line() else {
            return Ok(());
        };
        let choice = Choice::from_str(options_count, &input);
        debug!("choice: {:?}", choice);

        match choice {
            Choice::Option(selected) => match session.submit_answer(errors, selected, Instant::now()) {
                Ok(Submission::Evaluated(feedback)) => {
                    let options = session
                        .current_question()
                        .map(|q| q.options.clone())
                        .unwrap_or_default();
                    show_feedback(&feedback, &options);
                }
                Ok(Submission::Recorded { advance_at }) => {
                    println!("{}", format!("Answer {} recorded.", selected + 1).cyan());
                    if let Some(due) = advance_at {
                        thread::sleep(due.saturating_duration_since(Instant::now()));
                        needs_render = session.tick(Instant::now());
                    } else {
                        print_nav(&session);
                    }
                }
                Err(SessionError::AlreadyAnswered) => {
                    println!("{}", "Already answered, move on with n or p.".yellow());
                }
                Err(SessionError::Store(err)) => return Err(SessionError::Store(err).into()),
                Err(err) => println!("{}", format!("✘ {err}").bright_red()),
            },
            Choice::Next => {
                if session.advance() {
                    needs_render = true;
                } else {
                    println!("{}", "This is the last question, press f to finish.".yellow());
                }
            }
            Choice::Previous => {
                if session.retreat() {
                    needs_render = true;
                } else if session.mode() == Mode::Exam {
                    println!("{}", "Exams only go forward.".yellow());
                } else {
                    println!("{}", "This is the first question.".yellow());
                }
            }
            Choice::Finish => match session.finish(errors)? {
                Outcome::Exam(score) => {
                    println!(
                        "{}",
                        format!(
                            "==========> Score: {} ({} / {}) <==========",
                            score.percentage, score.correct, score.total
                        )
                        .bright_green()
                        .bold()
                    );
                }
                Outcome::Practice { answered } => {
                    println!(
                        "{}",
                        format!("Practice complete ({answered} answered). Back to the menu.").cyan()
                    );
                }
            },
            Choice::Quit => {
                println!("{}", "Leaving the session early!".cyan());
                return Ok(());
            }
            Choice::Unknown => println!("{}", "Enter an option number, n, p, f or q.".yellow()),
        }
    }
    Ok(())
}
