use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ids::{GroupId, StudentId};

/// Fallback label when a student record carries neither a name nor an email.
pub const UNKNOWN_STUDENT_NAME: &str = "Unknown student";

/// An enrolled student and the groups they belong to.
///
/// Membership changes over the student's lifetime; the aggregator only ever
/// reads the current set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    name: Option<String>,
    email: Option<String>,
    member_of_groups: BTreeSet<GroupId>,
}

impl Student {
    #[must_use]
    pub fn new(
        id: StudentId,
        name: Option<String>,
        email: Option<String>,
        member_of_groups: impl IntoIterator<Item = GroupId>,
    ) -> Self {
        Self {
            id,
            name: name.filter(|n| !n.trim().is_empty()),
            email: email.filter(|e| !e.trim().is_empty()),
            member_of_groups: member_of_groups.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &StudentId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn member_of_groups(&self) -> &BTreeSet<GroupId> {
        &self.member_of_groups
    }

    /// Name shown in reports: name, then email, then a fixed placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(UNKNOWN_STUDENT_NAME)
    }

    /// True when the student belongs to at least one of `groups`.
    #[must_use]
    pub fn is_member_of_any(&self, groups: &[GroupId]) -> bool {
        groups.iter().any(|g| self.member_of_groups.contains(g))
    }

    pub fn join_group(&mut self, group: GroupId) {
        self.member_of_groups.insert(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_email_then_placeholder() {
        let named = Student::new(StudentId::new("s1"), Some("Eva".into()), None, []);
        assert_eq!(named.display_name(), "Eva");

        let mailed = Student::new(
            StudentId::new("s2"),
            Some("  ".into()),
            Some("jan@example.org".into()),
            [],
        );
        assert_eq!(mailed.display_name(), "jan@example.org");

        let anonymous = Student::new(StudentId::new("s3"), None, None, []);
        assert_eq!(anonymous.display_name(), UNKNOWN_STUDENT_NAME);
    }

    #[test]
    fn membership_checks_any_group() {
        let mut student = Student::new(
            StudentId::new("s1"),
            None,
            None,
            [GroupId::new("g1"), GroupId::new("g2")],
        );
        assert!(student.is_member_of_any(&[GroupId::new("g9"), GroupId::new("g2")]));
        assert!(!student.is_member_of_any(&[GroupId::new("g9")]));

        student.join_group(GroupId::new("g9"));
        assert!(student.is_member_of_any(&[GroupId::new("g9")]));
    }
}
