use classroom_core::model::{GroupId, Student, StudentId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, placeholders, ser};
use crate::repository::{MEMBERSHIP_BATCH_LIMIT, StorageError, StudentRepository, check_batch};

#[async_trait::async_trait]
impl StudentRepository for SqliteRepository {
    async fn list_students_in_groups(
        &self,
        groups: &[GroupId],
    ) -> Result<Vec<Student>, StorageError> {
        check_batch(MEMBERSHIP_BATCH_LIMIT, groups.len())?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        // One row per (student, membership); rows for the same student are adjacent.
        let sql = format!(
            r"
            SELECT s.id, s.name, s.email, sg.group_id
            FROM students s
            LEFT JOIN student_groups sg ON sg.student_id = s.id
            WHERE s.id IN (
                SELECT student_id FROM student_groups WHERE group_id IN ({})
            )
            ORDER BY s.rowid ASC, sg.group_id ASC
            ",
            placeholders(groups.len())
        );
        let mut query = sqlx::query(&sql);
        for group in groups {
            query = query.bind(group.as_str());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut students: Vec<Student> = Vec::new();
        for row in rows {
            let id: String = row.try_get("id").map_err(ser)?;
            let group: Option<String> = row.try_get("group_id").map_err(ser)?;
            let continues = students.last().is_some_and(|s| s.id().as_str() == id);
            if continues {
                if let (Some(current), Some(group)) = (students.last_mut(), group) {
                    current.join_group(GroupId::new(group));
                }
            } else {
                students.push(Student::new(
                    StudentId::new(id),
                    row.try_get("name").map_err(ser)?,
                    row.try_get("email").map_err(ser)?,
                    group.map(GroupId::new),
                ));
            }
        }
        Ok(students)
    }

    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO students (id, name, email)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email
            ",
        )
        .bind(student.id().as_str())
        .bind(student.name())
        .bind(student.email())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM student_groups WHERE student_id = ?1")
            .bind(student.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for group in student.member_of_groups() {
            sqlx::query("INSERT INTO student_groups (student_id, group_id) VALUES (?1, ?2)")
                .bind(student.id().as_str())
                .bind(group.as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
