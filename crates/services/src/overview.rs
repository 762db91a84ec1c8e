//! Basic per-class counters shown above the detailed report.

use std::collections::HashMap;

use classroom_core::model::{StudentId, Submission, SubmissionKind, UNKNOWN_STUDENT_NAME};
use serde::Serialize;

use crate::analytics::ClassroomSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopStudent {
    pub student_id: StudentId,
    pub name: String,
    pub submissions: u32,
}

/// Submission counts and average scores split by quiz and test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverview {
    pub student_count: u32,
    pub avg_quiz_score: u32,
    pub quiz_submission_count: u32,
    pub avg_test_score: u32,
    pub test_submission_count: u32,
    /// Most active students by submission count, ties in first-seen order.
    pub top_students: Vec<TopStudent>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_mean<'a>(subs: impl Iterator<Item = &'a Submission>) -> (u32, u32) {
    let (sum, count) = subs.fold((0.0_f64, 0_u32), |(sum, count), s| {
        (sum + s.score(), count.saturating_add(1))
    });
    if count == 0 {
        return (0, 0);
    }
    ((sum / f64::from(count)).round() as u32, count)
}

impl ClassOverview {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Summarize a fetched snapshot, listing at most `top_limit` students.
    #[must_use]
    pub fn from_snapshot(snapshot: &ClassroomSnapshot, top_limit: usize) -> Self {
        let of_kind = |kind: SubmissionKind| {
            snapshot
                .submissions
                .iter()
                .filter(move |s| s.kind() == kind)
        };
        let (avg_quiz_score, quiz_submission_count) = rounded_mean(of_kind(SubmissionKind::Quiz));
        let (avg_test_score, test_submission_count) = rounded_mean(of_kind(SubmissionKind::Test));

        let mut order: Vec<&StudentId> = Vec::new();
        let mut counts: HashMap<&StudentId, u32> = HashMap::new();
        for submission in &snapshot.submissions {
            let count = counts.entry(submission.student_id()).or_insert_with(|| {
                order.push(submission.student_id());
                0
            });
            *count += 1;
        }
        let mut ranked: Vec<(&StudentId, u32)> = order
            .into_iter()
            .map(|id| (id, counts.get(id).copied().unwrap_or_default()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let names: HashMap<&StudentId, &str> = snapshot
            .students
            .iter()
            .map(|s| (s.id(), s.display_name()))
            .collect();

        let top_students = ranked
            .into_iter()
            .take(top_limit)
            .map(|(id, submissions)| TopStudent {
                student_id: id.clone(),
                name: names
                    .get(id)
                    .copied()
                    .unwrap_or(UNKNOWN_STUDENT_NAME)
                    .to_string(),
                submissions,
            })
            .collect();

        Self {
            student_count: u32::try_from(snapshot.students.len()).unwrap_or(u32::MAX),
            avg_quiz_score,
            quiz_submission_count,
            avg_test_score,
            test_submission_count,
            top_students,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::model::{GroupId, LessonId, Student, SubmissionId};
    use classroom_core::time::fixed_now;

    fn submission(id: &str, kind: SubmissionKind, student: &str, score: f64) -> Submission {
        Submission::new(
            SubmissionId::new(id),
            kind,
            LessonId::new("l1"),
            StudentId::new(student),
            score,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn splits_averages_by_kind() {
        let snapshot = ClassroomSnapshot::new(
            vec![],
            vec![Student::new(
                StudentId::new("s1"),
                Some("Ada".into()),
                None,
                [GroupId::new("g1")],
            )],
            vec![],
            vec![
                submission("q1", SubmissionKind::Quiz, "s1", 80.0),
                submission("q2", SubmissionKind::Quiz, "s1", 91.0),
                submission("t1", SubmissionKind::Test, "s1", 60.0),
            ],
        );
        let overview = ClassOverview::from_snapshot(&snapshot, 5);

        assert_eq!(overview.student_count, 1);
        assert_eq!(overview.quiz_submission_count, 2);
        assert_eq!(overview.avg_quiz_score, 86);
        assert_eq!(overview.test_submission_count, 1);
        assert_eq!(overview.avg_test_score, 60);
    }

    #[test]
    fn ranks_students_by_submission_count() {
        let snapshot = ClassroomSnapshot::new(
            vec![],
            vec![
                Student::new(StudentId::new("a"), Some("Ann".into()), None, []),
                Student::new(StudentId::new("b"), Some("Ben".into()), None, []),
            ],
            vec![],
            vec![
                submission("1", SubmissionKind::Quiz, "a", 50.0),
                submission("2", SubmissionKind::Quiz, "ghost", 50.0),
                submission("3", SubmissionKind::Test, "b", 50.0),
                submission("4", SubmissionKind::Test, "b", 50.0),
            ],
        );
        let overview = ClassOverview::from_snapshot(&snapshot, 2);

        let names: Vec<_> = overview
            .top_students
            .iter()
            .map(|t| (t.name.as_str(), t.submissions))
            .collect();
        assert_eq!(names, vec![("Ben", 2), ("Ann", 1)]);

        let all = ClassOverview::from_snapshot(&snapshot, 5);
        assert_eq!(all.top_students[2].name, UNKNOWN_STUDENT_NAME);
    }

    #[test]
    fn empty_snapshot_has_zero_counters() {
        let overview = ClassOverview::from_snapshot(&ClassroomSnapshot::default(), 5);
        assert_eq!(overview, ClassOverview::empty());
    }
}
