use chrono::{DateTime, Duration, Utc};
use classroom_core::model::{
    Group, GroupId, Lesson, LessonId, Student, StudentId, Submission, SubmissionId,
    SubmissionKind,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use storage::repository::{Storage, StorageError};
use tracing::{debug, info};

use crate::cli::SeedArgs;

const GROUP_NAMES: [&str; 6] = [
    "Algebra",
    "Biology",
    "Chemistry",
    "World History",
    "Literature",
    "Physics",
];
const FIRST_NAMES: [&str; 8] = ["Ada", "Ben", "Chloe", "Dmitri", "Elif", "Farah", "Goran", "Hana"];
const LAST_NAMES: [&str; 5] = ["Novak", "Okafor", "Park", "Quinn", "Rossi"];

/// Spread of generated submission times, ending at `now`.
const HISTORY_DAYS: i64 = 21;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub groups: u32,
    pub students: u32,
    pub lessons: u32,
    pub submissions: u32,
    /// Submissions already present from an earlier run with the same ids.
    pub skipped: u32,
}

/// Write a random but reproducible classroom for `args.professor`.
///
/// Ids derive from the professor and a running index, so a rerun updates
/// groups, students and lessons in place and skips existing submissions.
///
/// # Errors
///
/// Returns the first storage failure other than a duplicate submission.
pub async fn seed_classroom(
    storage: &Storage,
    args: &SeedArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<SeedSummary> {
    let mut rng = StdRng::seed_from_u64(args.rng_seed);
    let prefix = args.professor.as_str();
    let mut summary = SeedSummary::default();

    let mut group_ids = Vec::new();
    for n in 0..args.groups {
        let id = GroupId::new(format!("{prefix}-group-{n}"));
        let base = GROUP_NAMES[n as usize % GROUP_NAMES.len()];
        let name = format!("{base} {}", n / GROUP_NAMES.len() as u32 + 1);
        let group = Group::new(id.clone(), name, args.professor.clone())?;
        storage.groups.upsert_group(&group).await?;
        group_ids.push(id);
        summary.groups += 1;
    }

    let mut student_ids = Vec::new();
    for n in 0..args.students {
        let id = StudentId::new(format!("{prefix}-student-{n}"));
        let first = FIRST_NAMES[n as usize % FIRST_NAMES.len()];
        let last = LAST_NAMES[(n as usize / FIRST_NAMES.len()) % LAST_NAMES.len()];
        let email = format!("{}.{}{n}@example.edu", first.to_lowercase(), last.to_lowercase());
        // Every seventh student has only an email on file.
        let name = (n % 7 != 6).then(|| format!("{first} {last}"));

        let mut groups = vec![group_ids[n as usize % group_ids.len()].clone()];
        if rng.random_bool(0.3) {
            if let Some(extra) = group_ids.choose(&mut rng) {
                groups.push(extra.clone());
            }
        }
        let student = Student::new(id.clone(), name, Some(email), groups);
        storage.students.upsert_student(&student).await?;
        student_ids.push(id);
        summary.students += 1;
    }

    let mut lesson_ids = Vec::new();
    for n in 0..args.lessons {
        let id = LessonId::new(format!("{prefix}-lesson-{n}"));
        let assigned = group_ids.choose(&mut rng).cloned();
        let created_at = now - Duration::days(HISTORY_DAYS + i64::from(n));
        let lesson = Lesson::new(
            id.clone(),
            args.professor.clone(),
            format!("Lesson {}", n + 1),
            assigned,
            created_at,
        );
        storage.lessons.upsert_lesson(&lesson).await?;
        lesson_ids.push(id);
        summary.lessons += 1;
    }

    for n in 0..args.submissions {
        let (Some(lesson), Some(student)) =
            (lesson_ids.choose(&mut rng), student_ids.choose(&mut rng))
        else {
            break;
        };
        let kind = if rng.random_bool(0.5) {
            SubmissionKind::Quiz
        } else {
            SubmissionKind::Test
        };
        let score = f64::from(rng.random_range(25_u32..=100));
        let age = Duration::seconds(rng.random_range(0..HISTORY_DAYS * 86_400));
        let submission = Submission::new(
            SubmissionId::new(format!("{prefix}-{kind}-{n}")),
            kind,
            lesson.clone(),
            student.clone(),
            score,
            now - age,
        )?;

        match storage.submissions.append_submission(&submission).await {
            Ok(()) => summary.submissions += 1,
            Err(StorageError::Conflict) => {
                debug!(id = %submission.id(), "submission already seeded");
                summary.skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        professor = %args.professor,
        groups = summary.groups,
        students = summary.students,
        lessons = summary.lessons,
        submissions = summary.submissions,
        skipped = summary.skipped,
        "seeded classroom"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::model::ProfessorId;
    use classroom_core::time::fixed_now;

    fn args(rng_seed: u64) -> SeedArgs {
        SeedArgs {
            professor: ProfessorId::new("prof-seed"),
            groups: 2,
            students: 9,
            lessons: 4,
            submissions: 25,
            rng_seed,
        }
    }

    async fn all_submissions(storage: &Storage) -> Vec<Submission> {
        let lessons = storage
            .lessons
            .list_lessons(&ProfessorId::new("prof-seed"))
            .await
            .unwrap();
        let ids: Vec<LessonId> = lessons.iter().map(|l| l.id().clone()).collect();
        let mut out = Vec::new();
        for kind in SubmissionKind::ALL {
            out.extend(storage.submissions.list_submissions(kind, &ids).await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn seeds_requested_counts() {
        let storage = Storage::in_memory();
        let summary = seed_classroom(&storage, &args(7), fixed_now()).await.unwrap();

        assert_eq!(summary.groups, 2);
        assert_eq!(summary.students, 9);
        assert_eq!(summary.lessons, 4);
        assert_eq!(summary.submissions, 25);

        let groups = storage
            .groups
            .list_groups(&ProfessorId::new("prof-seed"))
            .await
            .unwrap();
        let group_ids: Vec<GroupId> = groups.iter().map(|g| g.id().clone()).collect();
        let students = storage
            .students
            .list_students_in_groups(&group_ids)
            .await
            .unwrap();
        assert_eq!(students.len(), 9);

        let submissions = all_submissions(&storage).await;
        assert_eq!(submissions.len(), 25);
        let oldest = fixed_now() - Duration::days(HISTORY_DAYS);
        assert!(
            submissions
                .iter()
                .all(|s| s.submitted_at() > oldest && s.submitted_at() <= fixed_now())
        );
    }

    #[tokio::test]
    async fn rerun_skips_existing_submissions() {
        let storage = Storage::in_memory();
        seed_classroom(&storage, &args(7), fixed_now()).await.unwrap();
        let again = seed_classroom(&storage, &args(7), fixed_now()).await.unwrap();

        assert_eq!(again.submissions, 0);
        assert_eq!(again.skipped, 25);
        assert_eq!(all_submissions(&storage).await.len(), 25);
    }

    #[tokio::test]
    async fn equal_seeds_produce_equal_classrooms() {
        let first = Storage::in_memory();
        let second = Storage::in_memory();
        seed_classroom(&first, &args(11), fixed_now()).await.unwrap();
        seed_classroom(&second, &args(11), fixed_now()).await.unwrap();

        assert_eq!(all_submissions(&first).await, all_submissions(&second).await);
    }
}
