use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Identifier of a question inside its bank. Banks in the wild use both
/// numbers and strings, so both are accepted and kept in their native form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(value: i64) -> Self {
        QuestionId::Number(value)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        QuestionId::Text(value.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Index into `options`. Kept signed so a broken entry still loads and
    /// is reported when it is reached.
    pub answer: i64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, alias = "Source", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Question {
    /// The correct option, if `answer` points at one.
    pub fn correct_index(&self) -> Option<usize> {
        usize::try_from(self.answer)
            .ok()
            .filter(|&idx| idx < self.options.len())
    }

    /// Why this question cannot be asked, if it is malformed.
    pub fn defect(&self) -> Option<String> {
        if self.options.len() < 2 {
            Some(format!("only {} option(s), need at least 2", self.options.len()))
        } else if self.correct_index().is_none() {
            Some(format!(
                "answer index {} out of range for {} options",
                self.answer,
                self.options.len()
            ))
        } else {
            None
        }
    }
}

/// Failure to load a bank. The caller keeps whatever bank and session it
/// already had.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("cannot read bank {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed bank {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("bank {path:?} contains no questions")]
    Empty { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Bank {
    pub key: String,
    pub questions: Vec<Question>,
}

impl Bank {
    pub fn new(key: impl Into<String>, questions: Vec<Question>) -> Self {
        Bank {
            key: key.into(),
            questions,
        }
    }

    /// Reads a JSON array of questions. The bank key is the file name with
    /// its extension stripped.
    pub fn load(path: &Path) -> Result<Bank, BankError> {
        let now = Instant::now();
        info!("[Bank] Loading {:?}", path);
        let json = std::fs::read_to_string(path).map_err(|source| {
            error!("[Bank] Cannot read {:?}: {}", path, source);
            BankError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let questions: Vec<Question> = serde_json::from_str(&json).map_err(|source| {
            error!("[Bank] Malformed JSON in {:?}: {}", path, source);
            BankError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if questions.is_empty() {
            return Err(BankError::Empty {
                path: path.to_path_buf(),
            });
        }

        let key = bank_key(path);
        debug!(
            "[Bank] Loaded {} questions as '{}' in {} ms.",
            questions.len(),
            key,
            now.elapsed().as_millis()
        );
        Ok(Bank::new(key, questions))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

pub fn bank_key(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn sample_question(id: i64, answer: usize) -> Question {
    Question {
        id: QuestionId::Number(id),
        question: format!("Question {id}?"),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        answer: answer as i64,
        explanation: format!("Because of {id}."),
        source: None,
    }
}

#[cfg(test)]
pub(crate) fn sample_questions(count: i64) -> Vec<Question> {
    (1..=count).map(|id| sample_question(id, 0)).collect()
}
