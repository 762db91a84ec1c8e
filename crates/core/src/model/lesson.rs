use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{GroupId, LessonId, ProfessorId};

/// A lesson authored by a professor and assigned to zero or more groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    id: LessonId,
    owner_id: ProfessorId,
    title: String,
    assigned_to_groups: BTreeSet<GroupId>,
    created_at: DateTime<Utc>,
}

impl Lesson {
    #[must_use]
    pub fn new(
        id: LessonId,
        owner_id: ProfessorId,
        title: impl Into<String>,
        assigned_to_groups: impl IntoIterator<Item = GroupId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title: title.into(),
            assigned_to_groups: assigned_to_groups.into_iter().collect(),
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn owner_id(&self) -> &ProfessorId {
        &self.owner_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn assigned_to_groups(&self) -> &BTreeSet<GroupId> {
        &self.assigned_to_groups
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn assign_to_group(&mut self, group: GroupId) {
        self.assigned_to_groups.insert(group);
    }

    #[must_use]
    pub fn is_owned_by(&self, professor: &ProfessorId) -> bool {
        &self.owner_id == professor
    }
}
