use classroom_core::model::{LessonId, Submission, SubmissionKind};
use tracing::debug;

use super::SqliteRepository;
use super::mapping::{conn, map_submission_row, placeholders};
use crate::repository::{IN_QUERY_BATCH_LIMIT, StorageError, SubmissionRepository, check_batch};

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn list_submissions(
        &self,
        kind: SubmissionKind,
        lessons: &[LessonId],
    ) -> Result<Vec<Submission>, StorageError> {
        check_batch(IN_QUERY_BATCH_LIMIT, lessons.len())?;
        if lessons.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r"
            SELECT id, kind, lesson_id, student_id, score, submitted_at
            FROM submissions
            WHERE kind = ? AND lesson_id IN ({})
            ORDER BY rowid ASC
            ",
            placeholders(lessons.len())
        );
        let mut query = sqlx::query(&sql).bind(kind.as_str());
        for lesson in lessons {
            query = query.bind(lesson.as_str());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;
        debug!(
            collection = kind.collection(),
            lessons = lessons.len(),
            rows = rows.len(),
            "listed submissions"
        );

        rows.iter().map(map_submission_row).collect()
    }

    async fn append_submission(&self, submission: &Submission) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO submissions (id, kind, lesson_id, student_id, score, submitted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(submission.id().as_str())
        .bind(submission.kind().as_str())
        .bind(submission.lesson_id().as_str())
        .bind(submission.student_id().as_str())
        .bind(submission.score())
        .bind(submission.submitted_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }
}
