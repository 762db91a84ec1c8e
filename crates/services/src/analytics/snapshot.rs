use classroom_core::model::{Group, Lesson, Student, Submission};

/// Everything the aggregator reads for one professor, fetched in one pass.
///
/// `students` is deduplicated and keeps the order of the membership lookups;
/// `submissions` holds quiz results first, then test results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassroomSnapshot {
    pub groups: Vec<Group>,
    pub students: Vec<Student>,
    pub lessons: Vec<Lesson>,
    pub submissions: Vec<Submission>,
}

impl ClassroomSnapshot {
    #[must_use]
    pub fn new(
        groups: Vec<Group>,
        students: Vec<Student>,
        lessons: Vec<Lesson>,
        submissions: Vec<Submission>,
    ) -> Self {
        Self {
            groups,
            students,
            lessons,
            submissions,
        }
    }

    /// True when the professor owns no groups; such a snapshot reports as zero.
    #[must_use]
    pub fn has_no_groups(&self) -> bool {
        self.groups.is_empty()
    }
}
