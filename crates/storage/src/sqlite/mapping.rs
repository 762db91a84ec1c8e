use chrono::{DateTime, Utc};
use classroom_core::model::{
    Group, GroupId, LessonId, ProfessorId, StudentId, Submission, SubmissionId, SubmissionKind,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// A stored row that no longer satisfies the model's validation rules.
pub(crate) fn invalid<E: Into<classroom_core::Error>>(e: E) -> StorageError {
    StorageError::InvalidRecord(e.into())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Anonymous placeholder list for an `IN (...)` clause with `n` values.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

pub(crate) fn map_group_row(row: &SqliteRow) -> Result<Group, StorageError> {
    Group::new(
        GroupId::new(row.try_get::<String, _>("id").map_err(ser)?),
        row.try_get::<String, _>("name").map_err(ser)?,
        ProfessorId::new(row.try_get::<String, _>("owner_id").map_err(ser)?),
    )
    .map_err(invalid)
}

pub(crate) fn map_submission_row(row: &SqliteRow) -> Result<Submission, StorageError> {
    let kind: SubmissionKind = row
        .try_get::<String, _>("kind")
        .map_err(ser)?
        .parse()
        .map_err(invalid)?;
    let submitted_at: DateTime<Utc> = row.try_get("submitted_at").map_err(ser)?;

    Submission::new(
        SubmissionId::new(row.try_get::<String, _>("id").map_err(ser)?),
        kind,
        LessonId::new(row.try_get::<String, _>("lesson_id").map_err(ser)?),
        StudentId::new(row.try_get::<String, _>("student_id").map_err(ser)?),
        row.try_get::<f64, _>("score").map_err(ser)?,
        submitted_at,
    )
    .map_err(invalid)
}
