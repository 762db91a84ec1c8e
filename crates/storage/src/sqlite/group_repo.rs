use classroom_core::model::{Group, ProfessorId};

use super::SqliteRepository;
use super::mapping::{conn, map_group_row};
use crate::repository::{GroupRepository, StorageError};

#[async_trait::async_trait]
impl GroupRepository for SqliteRepository {
    async fn list_groups(&self, owner: &ProfessorId) -> Result<Vec<Group>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, owner_id
            FROM groups
            WHERE owner_id = ?1
            ORDER BY rowid ASC
            ",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_group_row).collect()
    }

    async fn upsert_group(&self, group: &Group) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO groups (id, name, owner_id)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                owner_id = excluded.owner_id
            ",
        )
        .bind(group.id().as_str())
        .bind(group.name())
        .bind(group.owner_id().as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
