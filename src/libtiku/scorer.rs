use crate::libtiku::cuoti::ErrorStore;
use crate::libtiku::db::{KeyValueStore, StoreError};
use crate::libtiku::question::{Question, QuestionId};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Counts correct answers and collects the ids of everything else.
/// An unanswered question is a wrong one.
pub fn tally<'q>(working_set: &'q [Question], answers: &[Option<usize>]) -> (Score, Vec<&'q QuestionId>) {
    let mut missed = Vec::new();
    let mut correct = 0;
    for (idx, question) in working_set.iter().enumerate() {
        match answers.get(idx).copied().flatten() {
            Some(selected) if Some(selected) == question.correct_index() => correct += 1,
            _ => missed.push(&question.id),
        }
    }

    let total = working_set.len();
    let percentage = if total == 0 {
        0
    } else {
        (correct as f64 / total as f64 * 100.0).round() as u32
    };
    (
        Score {
            correct,
            total,
            percentage,
        },
        missed,
    )
}

/// Scores an exam and records every missed question in one pass.
pub fn score<S: KeyValueStore + ?Sized>(
    working_set: &[Question],
    answers: &[Option<usize>],
    errors: &ErrorStore<'_, S>,
    bank_key: &str,
) -> Result<Score, StoreError> {
    let (score, missed) = tally(working_set, answers);
    let added = errors.add_all(bank_key, missed)?;
    info!(
        "[Exam] {}/{} correct ({}%), {} new missed question(s) for '{}'",
        score.correct, score.total, score.percentage, added, bank_key
    );
    Ok(score)
}
