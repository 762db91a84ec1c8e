use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{GroupId, ProfessorId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GroupError {
    #[error("group name cannot be empty")]
    EmptyName,
}

/// A class or cohort owned by exactly one professor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    owner_id: ProfessorId,
}

impl Group {
    /// Create a group with a trimmed, non-empty name.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::EmptyName` if the name is empty after trimming.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        owner_id: ProfessorId,
    ) -> Result<Self, GroupError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GroupError::EmptyName);
        }
        Ok(Self {
            id,
            name: trimmed.to_string(),
            owner_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn owner_id(&self) -> &ProfessorId {
        &self.owner_id
    }

    #[must_use]
    pub fn is_owned_by(&self, professor: &ProfessorId) -> bool {
        &self.owner_id == professor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_trims_name() {
        let group =
            Group::new(GroupId::new("g1"), "  Algebra 1A ", ProfessorId::new("p1")).unwrap();
        assert_eq!(group.name(), "Algebra 1A");
        assert!(group.is_owned_by(&ProfessorId::new("p1")));
        assert!(!group.is_owned_by(&ProfessorId::new("p2")));
    }

    #[test]
    fn group_rejects_blank_name() {
        let err = Group::new(GroupId::new("g1"), "   ", ProfessorId::new("p1")).unwrap_err();
        assert_eq!(err, GroupError::EmptyName);
    }
}
