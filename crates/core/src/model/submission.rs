use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LessonId, StudentId, SubmissionId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("score must be a percentage between 0 and 100, got {0}")]
    ScoreOutOfRange(f64),

    #[error("unknown submission kind: {0}")]
    UnknownKind(String),
}

//
// ─── KIND ─────────────────────────────────────────────────────────────────────
//

/// Graded attempt type. Quizzes and tests live in separate collections but
/// share one record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Quiz,
    Test,
}

impl SubmissionKind {
    pub const ALL: [SubmissionKind; 2] = [SubmissionKind::Quiz, SubmissionKind::Test];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionKind::Quiz => "quiz",
            SubmissionKind::Test => "test",
        }
    }

    /// Name of the remote collection holding this kind of submission.
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            SubmissionKind::Quiz => "quiz_submissions",
            SubmissionKind::Test => "test_submissions",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionKind {
    type Err = SubmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(Self::Quiz),
            "test" => Ok(Self::Test),
            other => Err(SubmissionError::UnknownKind(other.to_string())),
        }
    }
}

//
// ─── SUBMISSION ───────────────────────────────────────────────────────────────
//

/// A graded quiz or test attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    id: SubmissionId,
    kind: SubmissionKind,
    lesson_id: LessonId,
    student_id: StudentId,
    score: f64,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Create a submission with a validated percentage score.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::ScoreOutOfRange` if the score is not finite
    /// or lies outside `0..=100`.
    pub fn new(
        id: SubmissionId,
        kind: SubmissionKind,
        lesson_id: LessonId,
        student_id: StudentId,
        score: f64,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, SubmissionError> {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(SubmissionError::ScoreOutOfRange(score));
        }
        Ok(Self {
            id,
            kind,
            lesson_id,
            student_id,
            score,
            submitted_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &SubmissionId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
