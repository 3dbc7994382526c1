//! Practice sessions.
//!
//! A [`Session`] is built from a loaded [`Bank`] for one [`Mode`] and then
//! driven one call at a time by whatever front end owns it. It never
//! renders anything: every operation returns plain data.
//!
//! Exam answers are only recorded; feedback and error bookkeeping wait
//! until [`Session::finish`]. The other modes evaluate each answer on the
//! spot and update the error store immediately.

use crate::libtiku::cuoti::ErrorStore;
use crate::libtiku::db::{KeyValueStore, StoreError};
use crate::libtiku::question::{Bank, Question, QuestionId};
use crate::libtiku::scorer::{self, Score};
use crate::libtiku::shuffle::shuffle_with;
use log::{debug, info, warn};
use rand::{rng, Rng};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const EXAM_SIZE: usize = 40;
/// How long an exam answer stays on screen before moving on.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sequence,
    Random,
    Exam,
    Error,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Sequence, Mode::Random, Mode::Exam, Mode::Error];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Sequence => "sequence",
            Mode::Random => "random",
            Mode::Exam => "exam",
            Mode::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Sequence => "Sequential practice",
            Mode::Random => "Random practice (no repeats)",
            Mode::Exam => "Mock exam",
            Mode::Error => "Review missed questions",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequence" => Ok(Mode::Sequence),
            "random" => Ok(Mode::Random),
            "exam" => Ok(Mode::Exam),
            "error" => Ok(Mode::Error),
            other => Err(SessionError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no missed questions to review")]
    NoErrorsToReview,
    #[error("unknown mode '{0}'")]
    UnknownMode(String),
    #[error("question {id} is malformed: {reason}")]
    MalformedQuestion { id: QuestionId, reason: String },
    #[error("option {selected} does not exist, there are {len}")]
    OptionOutOfRange { selected: usize, len: usize },
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("the session is finished")]
    Finished,
    #[error("there are no questions to practise")]
    NoQuestions,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    /// `advance` was called on the last question.
    ReadyToFinish,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub is_correct: bool,
    pub correct_index: usize,
    pub explanation: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Exam answer stored without judgement. `advance_at` is set when an
    /// automatic advance has been scheduled.
    Recorded { advance_at: Option<Instant> },
    Evaluated(Feedback),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Practice { answered: usize },
    Exam(Score),
}

/// What the front end should offer for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nav {
    pub position: usize,
    pub total: usize,
    pub show_previous: bool,
    pub show_next: bool,
    pub show_finish: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    due: Instant,
    position: usize,
}

#[derive(Debug)]
pub struct Session {
    mode: Mode,
    bank_key: String,
    working_set: Vec<Question>,
    position: usize,
    answers: Vec<Option<usize>>,
    locked: bool,
    /// Positions answered at least once.
    answered: HashSet<usize>,
    phase: Phase,
    pending: Option<PendingAdvance>,
}

pub fn build_session(
    bank: &Bank,
    mode: Mode,
    error_set: &HashSet<QuestionId>,
) -> Result<Session, SessionError> {
    build_session_with(bank, mode, error_set, EXAM_SIZE, &mut rng())
}

pub fn build_session_with<R: Rng + ?Sized>(
    bank: &Bank,
    mode: Mode,
    error_set: &HashSet<QuestionId>,
    exam_size: usize,
    rng: &mut R,
) -> Result<Session, SessionError> {
    let all = &bank.questions;
    let (working_set, answers) = match mode {
        Mode::Sequence => (all.clone(), Vec::new()),
        Mode::Random => (shuffle_with(all, rng), Vec::new()),
        Mode::Exam => {
            let mut picked = shuffle_with(all, rng);
            picked.truncate(exam_size.min(all.len()));
            let answers = vec![None; picked.len()];
            (picked, answers)
        }
        Mode::Error => {
            let picked: Vec<Question> = all
                .iter()
                .filter(|q| error_set.contains(&q.id))
                .cloned()
                .collect();
            if picked.is_empty() {
                info!("[Session] No missed questions recorded for '{}'", bank.key);
                return Err(SessionError::NoErrorsToReview);
            }
            (picked, Vec::new())
        }
    };
    if working_set.is_empty() {
        warn!("[Session] Refusing to start an empty {} session", mode);
        return Err(SessionError::NoQuestions);
    }

    info!(
        "[Session] Started {} session on '{}' with {} question(s)",
        mode,
        bank.key,
        working_set.len()
    );
    Ok(Session {
        mode,
        bank_key: bank.key.clone(),
        working_set,
        position: 0,
        answers,
        locked: false,
        answered: HashSet::new(),
        phase: Phase::Active,
        pending: None,
    })
}

impl Session {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn bank_key(&self) -> &str {
        &self.bank_key
    }

    pub fn working_set(&self) -> &[Question] {
        &self.working_set
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.working_set.len()
    }

    /// Always `false` for a built session.
    pub fn is_empty(&self) -> bool {
        self.working_set.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_last(&self) -> bool {
        self.position + 1 == self.working_set.len()
    }

    /// Whether the current practice question has been answered already.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn current_question(&self) -> Result<&Question, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        Ok(&self.working_set[self.position])
    }

    /// Returns the correct option of the current question, or
    /// `MalformedQuestion` if it cannot be answered. The session itself
    /// stays usable and can move past it.
    pub fn check_current(&self) -> Result<usize, SessionError> {
        let question = self.current_question()?;
        match (question.defect(), question.correct_index()) {
            (None, Some(correct)) => Ok(correct),
            (reason, _) => {
                let reason = reason.unwrap_or_else(|| "no correct option".to_string());
                warn!("[Session] Question {} is malformed: {}", question.id, reason);
                Err(SessionError::MalformedQuestion {
                    id: question.id.clone(),
                    reason,
                })
            }
        }
    }

    /// The exam answer already recorded for the current question.
    pub fn recorded_answer(&self) -> Option<usize> {
        self.answers.get(self.position).copied().flatten()
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn submit_answer<S: KeyValueStore + ?Sized>(
        &mut self,
        errors: &ErrorStore<'_, S>,
        selected: usize,
        now: Instant,
    ) -> Result<Submission, SessionError> {
        let correct = self.check_current()?;
        let question = &self.working_set[self.position];
        if selected >= question.options.len() {
            return Err(SessionError::OptionOutOfRange {
                selected,
                len: question.options.len(),
            });
        }

        if self.mode == Mode::Exam {
            self.answered.insert(self.position);
            self.answers[self.position] = Some(selected);
            self.pending = if self.is_last() {
                None
            } else {
                Some(PendingAdvance {
                    due: now + AUTO_ADVANCE_DELAY,
                    position: self.position,
                })
            };
            debug!(
                "[Session] Recorded option {} for exam question {}",
                selected,
                self.position + 1
            );
            return Ok(Submission::Recorded {
                advance_at: self.pending.map(|p| p.due),
            });
        }

        if self.locked {
            return Err(SessionError::AlreadyAnswered);
        }
        let is_correct = selected == correct;
        if !is_correct {
            errors.add(&self.bank_key, &question.id)?;
        } else if self.mode == Mode::Error {
            errors.remove(&self.bank_key, &question.id)?;
        }
        self.locked = true;
        self.answered.insert(self.position);
        debug!(
            "[Session] Question {} answered {}",
            question.id,
            if is_correct { "correctly" } else { "wrongly" }
        );

        Ok(Submission::Evaluated(Feedback {
            is_correct,
            correct_index: correct,
            explanation: question.explanation.clone(),
            source: question.source.clone(),
        }))
    }

    /// Runs the scheduled exam advance if it is due. A schedule left over
    /// from a question the session already moved away from is dropped.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if self.phase != Phase::Active || pending.position != self.position {
            self.pending = None;
            return false;
        }
        if now < pending.due {
            return false;
        }
        self.advance()
    }

    /// Moves to the next question. On the last one this only marks the
    /// session ready to finish and returns `false`.
    pub fn advance(&mut self) -> bool {
        self.pending = None;
        if self.is_finished() {
            return false;
        }
        if self.position + 1 < self.working_set.len() {
            self.position += 1;
            self.locked = false;
            self.phase = Phase::Active;
            true
        } else {
            self.phase = Phase::ReadyToFinish;
            false
        }
    }

    /// Exams only go forward.
    pub fn retreat(&mut self) -> bool {
        self.pending = None;
        if self.is_finished() || self.mode == Mode::Exam || self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.locked = false;
        self.phase = Phase::Active;
        true
    }

    pub fn finish<S: KeyValueStore + ?Sized>(
        &mut self,
        errors: &ErrorStore<'_, S>,
    ) -> Result<Outcome, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        self.pending = None;
        let outcome = match self.mode {
            Mode::Exam => Outcome::Exam(scorer::score(
                &self.working_set,
                &self.answers,
                errors,
                &self.bank_key,
            )?),
            _ => Outcome::Practice {
                answered: self.answered.len(),
            },
        };
        self.phase = Phase::Finished;
        info!("[Session] Finished {} session on '{}'", self.mode, self.bank_key);
        Ok(outcome)
    }

    pub fn nav(&self) -> Nav {
        let last = self.is_last();
        Nav {
            position: self.position,
            total: self.working_set.len(),
            show_previous: self.mode != Mode::Exam && self.position > 0,
            show_next: !last,
            show_finish: last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libtiku::db::SqliteStore;
    use crate::libtiku::question::{sample_question, sample_questions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bank(count: i64) -> Bank {
        Bank::new("law", sample_questions(count))
    }

    fn ids(questions: &[Question]) -> Vec<QuestionId> {
        questions.iter().map(|q| q.id.clone()).collect()
    }

    fn set(ids: &[i64]) -> HashSet<QuestionId> {
        ids.iter().map(|&n| QuestionId::Number(n)).collect()
    }

    #[test]
    fn parses_modes() {
        assert_eq!("exam".parse::<Mode>().unwrap(), Mode::Exam);
        assert_eq!(" Sequence ".parse::<Mode>().unwrap(), Mode::Sequence);
        assert!(matches!(
            "marathon".parse::<Mode>(),
            Err(SessionError::UnknownMode(m)) if m == "marathon"
        ));
    }

    #[test]
    fn sequence_keeps_order_in_a_copy() {
        let b = bank(5);
        let session = build_session(&b, Mode::Sequence, &HashSet::new()).unwrap();
        assert_eq!(session.working_set(), b.questions.as_slice());
        assert_ne!(session.working_set().as_ptr(), b.questions.as_ptr());
        assert_eq!(session.position(), 0);
        assert!(!session.is_empty());
        assert!(session.answers().is_empty());
    }

    #[test]
    fn random_is_full_permutation() {
        let b = bank(30);
        let mut rng = StdRng::seed_from_u64(11);
        let session = build_session_with(&b, Mode::Random, &HashSet::new(), EXAM_SIZE, &mut rng).unwrap();
        let mut got = ids(session.working_set());
        got.sort_by_key(|id| id.to_string().parse::<i64>().unwrap());
        assert_eq!(got, ids(&b.questions));
    }

    #[test]
    fn exam_draws_forty_distinct() {
        let b = bank(50);
        let session = build_session(&b, Mode::Exam, &HashSet::new()).unwrap();
        assert_eq!(session.len(), 40);
        let distinct: HashSet<_> = ids(session.working_set()).into_iter().collect();
        assert_eq!(distinct.len(), 40);
        assert_eq!(session.answers(), vec![None::<usize>; 40].as_slice());

        let small = build_session(&bank(7), Mode::Exam, &HashSet::new()).unwrap();
        assert_eq!(small.len(), 7);
    }

    #[test]
    fn error_mode_without_errors_fails() {
        let result = build_session(&bank(5), Mode::Error, &HashSet::new());
        assert!(matches!(result, Err(SessionError::NoErrorsToReview)));

        let result = build_session(&bank(5), Mode::Error, &set(&[42]));
        assert!(matches!(result, Err(SessionError::NoErrorsToReview)));
    }

    #[test]
    fn navigation_and_affordances() {
        let mut session = build_session(&bank(3), Mode::Sequence, &HashSet::new()).unwrap();
        let nav = session.nav();
        assert!(!nav.show_previous && nav.show_next && !nav.show_finish);
        assert!(!session.retreat());

        assert!(session.advance());
        assert!(session.nav().show_previous);
        assert!(session.advance());
        let nav = session.nav();
        assert!(!nav.show_next && nav.show_finish);
        assert_eq!((nav.position, nav.total), (2, 3));

        assert!(!session.advance());
        assert_eq!(session.position(), 2);
        assert_eq!(session.phase(), Phase::ReadyToFinish);

        assert!(session.retreat());
        assert_eq!(session.position(), 1);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn exam_never_goes_back() {
        let mut session = build_session(&bank(5), Mode::Exam, &HashSet::new()).unwrap();
        session.advance();
        assert!(!session.nav().show_previous);
        assert!(!session.retreat());
        assert_eq!(session.position(), 1);
    }

    #[test]
    fn practice_locks_after_answer() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(2), Mode::Sequence, &HashSet::new()).unwrap();
        let now = Instant::now();

        let submission = session.submit_answer(&errors, 0, now).unwrap();
        let Submission::Evaluated(feedback) = submission else {
            panic!("practice answers are evaluated");
        };
        assert!(feedback.is_correct);
        assert_eq!(feedback.correct_index, 0);
        assert_eq!(feedback.explanation, "Because of 1.");
        assert!(matches!(
            session.submit_answer(&errors, 1, now),
            Err(SessionError::AlreadyAnswered)
        ));

        session.advance();
        assert!(!session.is_locked());
        assert!(matches!(
            session.submit_answer(&errors, 9, now),
            Err(SessionError::OptionOutOfRange { selected: 9, len: 4 })
        ));
    }

    #[test]
    fn correct_answer_outside_error_mode_keeps_record() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        errors.add("law", &QuestionId::Number(1)).unwrap();

        let mut session = build_session(&bank(2), Mode::Sequence, &HashSet::new()).unwrap();
        session.submit_answer(&errors, 0, Instant::now()).unwrap();
        assert_eq!(errors.ids("law"), vec![QuestionId::Number(1)]);
    }

    #[test]
    fn exam_overwrites_and_defers_errors() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(3), Mode::Exam, &HashSet::new()).unwrap();
        let now = Instant::now();

        let first = session.submit_answer(&errors, 2, now).unwrap();
        assert_eq!(
            first,
            Submission::Recorded {
                advance_at: Some(now + AUTO_ADVANCE_DELAY)
            }
        );
        let later = now + Duration::from_millis(200);
        let second = session.submit_answer(&errors, 0, later).unwrap();
        assert_eq!(
            second,
            Submission::Recorded {
                advance_at: Some(later + AUTO_ADVANCE_DELAY)
            }
        );
        assert_eq!(session.recorded_answer(), Some(0));
        assert_eq!(errors.count("law"), 0);

        // The first schedule no longer applies.
        assert!(!session.tick(now + AUTO_ADVANCE_DELAY));
        assert_eq!(session.position(), 0);
        assert!(session.tick(later + AUTO_ADVANCE_DELAY));
        assert_eq!(session.position(), 1);
    }

    #[test]
    fn malformed_exam_question_scores_as_missed() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut broken = sample_question(2, 0);
        broken.answer = -1;
        let b = Bank::new("law", vec![sample_question(1, 0), broken]);
        let mut session = build_session(&b, Mode::Exam, &HashSet::new()).unwrap();
        let now = Instant::now();

        for _ in 0..session.len() {
            let is_broken = session.current_question().unwrap().id == QuestionId::Number(2);
            let result = session.submit_answer(&errors, 0, now);
            if is_broken {
                assert!(matches!(result, Err(SessionError::MalformedQuestion { .. })));
            } else {
                assert!(result.is_ok());
            }
            session.advance();
        }

        let Outcome::Exam(score) = session.finish(&errors).unwrap() else {
            panic!("exam sessions are scored");
        };
        assert_eq!((score.correct, score.total, score.percentage), (1, 2, 50));
        assert_eq!(errors.ids("law"), vec![QuestionId::Number(2)]);
    }

    #[test]
    fn loaded_bank_with_bad_entry_reports_it_on_reach() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("law.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "question": "Q1", "options": ["a", "b"], "answer": 0},
                {"id": 2, "question": "Q2", "options": ["a", "b"], "answer": -1},
                {"id": 3, "question": "Q3", "answer": 0}
            ]"#,
        )
        .unwrap();
        let b = Bank::load(&path).unwrap();
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&b, Mode::Sequence, &HashSet::new()).unwrap();
        let now = Instant::now();

        assert!(session.submit_answer(&errors, 0, now).is_ok());
        assert!(session.advance());
        assert!(matches!(
            session.check_current(),
            Err(SessionError::MalformedQuestion { id: QuestionId::Number(2), .. })
        ));
        assert!(session.advance());
        assert!(matches!(
            session.submit_answer(&errors, 0, now),
            Err(SessionError::MalformedQuestion { id: QuestionId::Number(3), .. })
        ));
        assert_eq!(errors.count("law"), 0);
        assert_eq!(
            session.finish(&errors).unwrap(),
            Outcome::Practice { answered: 1 }
        );
    }

    #[test]
    fn revisited_answer_counts_once() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(2), Mode::Sequence, &HashSet::new()).unwrap();
        let now = Instant::now();

        session.submit_answer(&errors, 0, now).unwrap();
        assert!(session.advance());
        assert!(session.retreat());
        session.submit_answer(&errors, 1, now).unwrap();
        assert_eq!(
            session.finish(&errors).unwrap(),
            Outcome::Practice { answered: 1 }
        );
    }

    #[test]
    fn auto_advance_fires_once_when_due() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(3), Mode::Exam, &HashSet::new()).unwrap();
        let start = Instant::now();

        session.submit_answer(&errors, 1, start).unwrap();
        assert!(!session.tick(start + Duration::from_millis(100)));
        assert_eq!(session.position(), 0);
        assert!(session.tick(start + AUTO_ADVANCE_DELAY));
        assert_eq!(session.position(), 1);
        assert!(!session.tick(start + Duration::from_secs(5)));
        assert_eq!(session.position(), 1);
    }

    #[test]
    fn manual_advance_cancels_pending() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(4), Mode::Exam, &HashSet::new()).unwrap();
        let start = Instant::now();

        session.submit_answer(&errors, 1, start).unwrap();
        assert!(session.advance());
        assert!(!session.tick(start + Duration::from_secs(1)));
        assert_eq!(session.position(), 1);
    }

    #[test]
    fn no_advance_after_finish_or_on_last() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(2), Mode::Exam, &HashSet::new()).unwrap();
        let start = Instant::now();

        session.submit_answer(&errors, 0, start).unwrap();
        session.finish(&errors).unwrap();
        assert!(!session.tick(start + Duration::from_secs(1)));
        assert!(session.is_finished());

        let mut session = build_session(&bank(1), Mode::Exam, &HashSet::new()).unwrap();
        let submission = session.submit_answer(&errors, 0, start).unwrap();
        assert_eq!(submission, Submission::Recorded { advance_at: None });
        assert!(!session.tick(start + Duration::from_secs(1)));
    }

    #[test]
    fn malformed_question_is_reported_not_judged() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut broken = sample_question(2, 7);
        broken.options.truncate(1);
        let b = Bank::new("law", vec![sample_question(1, 0), broken, sample_question(3, 0)]);
        let mut session = build_session(&b, Mode::Sequence, &HashSet::new()).unwrap();
        let now = Instant::now();

        session.advance();
        assert!(matches!(
            session.check_current(),
            Err(SessionError::MalformedQuestion { .. })
        ));
        assert!(matches!(
            session.submit_answer(&errors, 0, now),
            Err(SessionError::MalformedQuestion { .. })
        ));
        assert_eq!(errors.count("law"), 0);

        assert!(session.advance());
        assert!(session.submit_answer(&errors, 0, now).is_ok());
    }

    #[test]
    fn finished_session_rejects_calls() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(2), Mode::Random, &HashSet::new()).unwrap();
        assert_eq!(
            session.finish(&errors).unwrap(),
            Outcome::Practice { answered: 0 }
        );
        assert!(matches!(session.current_question(), Err(SessionError::Finished)));
        assert!(matches!(
            session.submit_answer(&errors, 0, Instant::now()),
            Err(SessionError::Finished)
        ));
        assert!(!session.advance());
        assert!(matches!(session.finish(&errors), Err(SessionError::Finished)));
    }

    #[test]
    fn scenario_sequence_records_misses() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let b = Bank::new(
            "law",
            vec![sample_question(1, 0), sample_question(2, 1), sample_question(3, 2)],
        );
        let mut session = build_session(&b, Mode::Sequence, &errors.load("law")).unwrap();
        let now = Instant::now();

        for selected in [3, 1, 0] {
            session.submit_answer(&errors, selected, now).unwrap();
            session.advance();
        }
        assert_eq!(
            session.finish(&errors).unwrap(),
            Outcome::Practice { answered: 3 }
        );
        assert_eq!(errors.load("law"), set(&[1, 3]));
    }

    #[test]
    fn scenario_unanswered_exam() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        let mut session = build_session(&bank(50), Mode::Exam, &HashSet::new()).unwrap();
        assert_eq!(session.len(), 40);

        let Outcome::Exam(score) = session.finish(&errors).unwrap() else {
            panic!("exam sessions are scored");
        };
        assert_eq!(score.correct, 0);
        assert_eq!(score.total, 40);
        assert_eq!(score.percentage, 0);
        let expected: HashSet<_> = ids(session.working_set()).into_iter().collect();
        assert_eq!(errors.load("law"), expected);
    }

    #[test]
    fn scenario_error_review_graduates() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        errors.add("law", &QuestionId::Number(5)).unwrap();
        errors.add("law", &QuestionId::Number(2)).unwrap();

        let mut session = build_session(&bank(10), Mode::Error, &errors.load("law")).unwrap();
        assert_eq!(
            ids(session.working_set()),
            vec![QuestionId::Number(2), QuestionId::Number(5)]
        );
        let now = Instant::now();

        let Submission::Evaluated(first) = session.submit_answer(&errors, 0, now).unwrap() else {
            panic!("review answers are evaluated");
        };
        assert!(first.is_correct);
        session.advance();
        let Submission::Evaluated(second) = session.submit_answer(&errors, 3, now).unwrap() else {
            panic!("review answers are evaluated");
        };
        assert!(!second.is_correct);

        assert_eq!(errors.load("law"), set(&[5]));
    }

    #[test]
    fn single_question_bank_in_every_mode() {
        let db = SqliteStore::in_memory().unwrap();
        let errors = ErrorStore::new(&db);
        errors.add("law", &QuestionId::Number(1)).unwrap();
        let b = bank(1);

        for mode in Mode::ALL {
            let mut session = build_session(&b, mode, &errors.load("law")).unwrap();
            let nav = session.nav();
            assert!(nav.show_finish && !nav.show_next && !nav.show_previous);

            session.submit_answer(&errors, 1, Instant::now()).unwrap();
            assert!(!session.advance());
            assert_eq!(session.position(), 0);
            session.finish(&errors).unwrap();
            assert!(session.is_finished());
        }
    }
}
