use chrono::{DateTime, Utc};
use classroom_core::model::{GroupId, Lesson, LessonId, ProfessorId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{LessonRepository, StorageError};

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn list_lessons(&self, owner: &ProfessorId) -> Result<Vec<Lesson>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT l.id, l.owner_id, l.title, l.created_at, lg.group_id
            FROM lessons l
            LEFT JOIN lesson_groups lg ON lg.lesson_id = l.id
            WHERE l.owner_id = ?1
            ORDER BY l.rowid ASC, lg.group_id ASC
            ",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        // Rows for one lesson are adjacent; fold their group ids together.
        let mut lessons: Vec<Lesson> = Vec::new();
        for row in rows {
            let id: String = row.try_get("id").map_err(ser)?;
            let group: Option<String> = row.try_get("group_id").map_err(ser)?;
            let continues = lessons.last().is_some_and(|l| l.id().as_str() == id);
            if continues {
                if let (Some(current), Some(group)) = (lessons.last_mut(), group) {
                    current.assign_to_group(GroupId::new(group));
                }
            } else {
                let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
                lessons.push(Lesson::new(
                    LessonId::new(id),
                    ProfessorId::new(row.try_get::<String, _>("owner_id").map_err(ser)?),
                    row.try_get::<String, _>("title").map_err(ser)?,
                    group.map(GroupId::new),
                    created_at,
                ));
            }
        }
        Ok(lessons)
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO lessons (id, owner_id, title, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                title = excluded.title
            ",
        )
        .bind(lesson.id().as_str())
        .bind(lesson.owner_id().as_str())
        .bind(lesson.title())
        .bind(lesson.created_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM lesson_groups WHERE lesson_id = ?1")
            .bind(lesson.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for group in lesson.assigned_to_groups() {
            sqlx::query("INSERT INTO lesson_groups (lesson_id, group_id) VALUES (?1, ?2)")
                .bind(lesson.id().as_str())
                .bind(group.as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
