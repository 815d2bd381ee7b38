//! Assessment error types.
//!
//! Returned by engine operations. File and parse boundaries wrap these in
//! `anyhow` with context.

use thiserror::Error;

/// Errors that can occur while running an assessment session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    /// The question key does not belong to the loaded assessment.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// The question key string could not be parsed.
    #[error("invalid question key '{0}', expected <section>-<index>")]
    InvalidQuestionKey(String),

    /// The score lies outside the 0-4 scale.
    #[error("invalid score {score} for question {key}, expected 0-{max}")]
    InvalidScore { key: String, score: u8, max: u8 },

    /// The section index is out of range.
    #[error("unknown section index {index} (assessment has {count} sections)")]
    UnknownSection { index: usize, count: usize },

    /// The session is on the results screen; only a reset leaves it.
    #[error("assessment already complete, reset to start over")]
    AlreadyComplete,

    /// Results were requested before the last section was finished.
    #[error("assessment not complete yet")]
    NotComplete,

    /// The assessment definition cannot drive a session.
    #[error("invalid assessment: {0}")]
    InvalidAssessment(String),
}

impl AssessmentError {
    /// Returns `true` if the error was caused by caller input rather than
    /// the assessment definition.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AssessmentError::UnknownQuestion(_)
                | AssessmentError::InvalidQuestionKey(_)
                | AssessmentError::InvalidScore { .. }
        )
    }
}
