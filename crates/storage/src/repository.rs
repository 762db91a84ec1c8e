use async_trait::async_trait;
use classroom_core::model::{
    Group, GroupId, Lesson, LessonId, ProfessorId, Student, Submission, SubmissionKind,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Maximum number of group ids accepted by one membership (array-contains-any) lookup.
pub const MEMBERSHIP_BATCH_LIMIT: usize = 10;

/// Maximum number of values accepted by one `in`-list lookup.
pub const IN_QUERY_BATCH_LIMIT: usize = 30;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("batch of {requested} ids exceeds the query limit of {limit}")]
    BatchTooLarge { limit: usize, requested: usize },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid stored record: {0}")]
    InvalidRecord(#[from] classroom_core::Error),
}

/// Reject id lists the underlying query primitive cannot accept in one call.
///
/// # Errors
///
/// Returns `StorageError::BatchTooLarge` when `requested > limit`.
pub fn check_batch(limit: usize, requested: usize) -> Result<(), StorageError> {
    if requested > limit {
        return Err(StorageError::BatchTooLarge { limit, requested });
    }
    Ok(())
}

/// Groups (classes) owned by professors.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// List every group owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn list_groups(&self, owner: &ProfessorId) -> Result<Vec<Group>, StorageError>;

    /// Persist or update a group.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the group cannot be stored.
    async fn upsert_group(&self, group: &Group) -> Result<(), StorageError>;
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// List students belonging to any of `groups`. Each student appears at
    /// most once per call.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BatchTooLarge` if more than
    /// [`MEMBERSHIP_BATCH_LIMIT`] ids are passed, or other storage errors.
    async fn list_students_in_groups(
        &self,
        groups: &[GroupId],
    ) -> Result<Vec<Student>, StorageError>;

    /// Persist or update a student together with its group membership.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the student cannot be stored.
    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// List every lesson owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn list_lessons(&self, owner: &ProfessorId) -> Result<Vec<Lesson>, StorageError>;

    /// Persist or update a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// List submissions of `kind` whose lesson is in `lessons`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BatchTooLarge` if more than
    /// [`IN_QUERY_BATCH_LIMIT`] ids are passed, or other storage errors.
    async fn list_submissions(
        &self,
        kind: SubmissionKind,
        lessons: &[LessonId],
    ) -> Result<Vec<Submission>, StorageError>;

    /// Append a new submission. Submissions are immutable once stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists.
    async fn append_submission(&self, submission: &Submission) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Lookups return records in insertion order and enforce the same batch
/// limits as the remote store.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    groups: Arc<Mutex<Vec<Group>>>,
    students: Arc<Mutex<Vec<Student>>>,
    lessons: Arc<Mutex<Vec<Lesson>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl GroupRepository for InMemoryRepository {
    async fn list_groups(&self, owner: &ProfessorId) -> Result<Vec<Group>, StorageError> {
        let guard = self.groups.lock().map_err(poisoned)?;
        Ok(guard.iter().filter(|g| g.is_owned_by(owner)).cloned().collect())
    }

    async fn upsert_group(&self, group: &Group) -> Result<(), StorageError> {
        let mut guard = self.groups.lock().map_err(poisoned)?;
        match guard.iter_mut().find(|g| g.id() == group.id()) {
            Some(existing) => *existing = group.clone(),
            None => guard.push(group.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for InMemoryRepository {
    async fn list_students_in_groups(
        &self,
        groups: &[GroupId],
    ) -> Result<Vec<Student>, StorageError> {
        check_batch(MEMBERSHIP_BATCH_LIMIT, groups.len())?;
        let guard = self.students.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|s| s.is_member_of_any(groups))
            .cloned()
            .collect())
    }

    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        let mut guard = self.students.lock().map_err(poisoned)?;
        match guard.iter_mut().find(|s| s.id() == student.id()) {
            Some(existing) => *existing = student.clone(),
            None => guard.push(student.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn list_lessons(&self, owner: &ProfessorId) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(guard.iter().filter(|l| l.is_owned_by(owner)).cloned().collect())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(poisoned)?;
        match guard.iter_mut().find(|l| l.id() == lesson.id()) {
            Some(existing) => *existing = lesson.clone(),
            None => guard.push(lesson.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn list_submissions(
        &self,
        kind: SubmissionKind,
        lessons: &[LessonId],
    ) -> Result<Vec<Submission>, StorageError> {
        check_batch(IN_QUERY_BATCH_LIMIT, lessons.len())?;
        let guard = self.submissions.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|s| s.kind() == kind && lessons.contains(s.lesson_id()))
            .cloned()
            .collect())
    }

    async fn append_submission(&self, submission: &Submission) -> Result<(), StorageError> {
        let mut guard = self.submissions.lock().map_err(poisoned)?;
        if guard.iter().any(|s| s.id() == submission.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(submission.clone());
        Ok(())
    }
}

/// Aggregates the gateway repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub groups: Arc<dyn GroupRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one repository value across all four gateway handles.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: GroupRepository
            + StudentRepository
            + LessonRepository
            + SubmissionRepository
            + Clone
            + 'static,
    {
        let groups: Arc<dyn GroupRepository> = Arc::new(repo.clone());
        let students: Arc<dyn StudentRepository> = Arc::new(repo.clone());
        let lessons: Arc<dyn LessonRepository> = Arc::new(repo.clone());
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(repo);
        Self {
            groups,
            students,
            lessons,
            submissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::model::{StudentId, SubmissionId};
    use classroom_core::time::fixed_now;

    fn professor() -> ProfessorId {
        ProfessorId::new("prof-1")
    }

    fn build_student(id: &str, groups: &[&str]) -> Student {
        Student::new(
            StudentId::new(id),
            Some(format!("Student {id}")),
            None,
            groups.iter().map(|g| GroupId::new(*g)),
        )
    }

    fn build_submission(id: &str, kind: SubmissionKind, lesson: &str) -> Submission {
        Submission::new(
            SubmissionId::new(id),
            kind,
            LessonId::new(lesson),
            StudentId::new("s1"),
            75.0,
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_only_groups_owned_by_professor() {
        let repo = InMemoryRepository::new();
        let mine = Group::new(GroupId::new("g1"), "Mine", professor()).unwrap();
        let theirs = Group::new(GroupId::new("g2"), "Theirs", ProfessorId::new("other")).unwrap();
        repo.upsert_group(&mine).await.unwrap();
        repo.upsert_group(&theirs).await.unwrap();

        let listed = repo.list_groups(&professor()).await.unwrap();
        assert_eq!(listed, vec![mine]);
    }

    #[tokio::test]
    async fn student_lookup_returns_each_member_once() {
        let repo = InMemoryRepository::new();
        repo.upsert_student(&build_student("s1", &["g1", "g2"]))
            .await
            .unwrap();
        repo.upsert_student(&build_student("s2", &["g2"])).await.unwrap();
        repo.upsert_student(&build_student("s3", &["g3"])).await.unwrap();

        let found = repo
            .list_students_in_groups(&[GroupId::new("g1"), GroupId::new("g2")])
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn student_lookup_rejects_oversized_batch() {
        let repo = InMemoryRepository::new();
        let groups: Vec<_> = (0..=MEMBERSHIP_BATCH_LIMIT)
            .map(|i| GroupId::new(format!("g{i}")))
            .collect();

        let err = repo.list_students_in_groups(&groups).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::BatchTooLarge {
                limit: MEMBERSHIP_BATCH_LIMIT,
                requested: 11
            }
        ));
    }

    #[tokio::test]
    async fn submissions_filter_by_kind_and_lesson() {
        let repo = InMemoryRepository::new();
        repo.append_submission(&build_submission("q1", SubmissionKind::Quiz, "l1"))
            .await
            .unwrap();
        repo.append_submission(&build_submission("t1", SubmissionKind::Test, "l1"))
            .await
            .unwrap();
        repo.append_submission(&build_submission("q2", SubmissionKind::Quiz, "l2"))
            .await
            .unwrap();

        let quizzes = repo
            .list_submissions(SubmissionKind::Quiz, &[LessonId::new("l1")])
            .await
            .unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id().as_str(), "q1");
    }

    #[tokio::test]
    async fn submissions_are_append_only() {
        let repo = InMemoryRepository::new();
        let sub = build_submission("q1", SubmissionKind::Quiz, "l1");
        repo.append_submission(&sub).await.unwrap();

        let err = repo.append_submission(&sub).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn submission_lookup_rejects_oversized_batch() {
        let repo = InMemoryRepository::new();
        let lessons: Vec<_> = (0..=IN_QUERY_BATCH_LIMIT)
            .map(|i| LessonId::new(format!("l{i}")))
            .collect();

        let err = repo
            .list_submissions(SubmissionKind::Test, &lessons)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BatchTooLarge { limit: 30, .. }));
    }
}
