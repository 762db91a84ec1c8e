use std::sync::Arc;

use chrono::{DateTime, Utc};
use classroom_core::model::{
    Group, GroupId, Lesson, LessonId, ProfessorId, Student, Submission, SubmissionKind,
};
use storage::repository::{
    GroupRepository, LessonRepository, Storage, StudentRepository, SubmissionRepository,
};
use tracing::{debug, info, warn};

use super::aggregate::compute_report;
use super::batching::{dedup_by_key, fetch_in_batches};
use super::report::AnalyticsReport;
use super::settings::AnalyticsSettings;
use super::snapshot::ClassroomSnapshot;
use crate::Clock;
use crate::error::AnalyticsError;
use crate::overview::ClassOverview;

/// Builds classroom reports for a professor from the remote gateway.
///
/// Stateless between calls: every report re-reads the gateway and nothing
/// is cached.
#[derive(Clone)]
pub struct AnalyticsService {
    clock: Clock,
    settings: AnalyticsSettings,
    groups: Arc<dyn GroupRepository>,
    students: Arc<dyn StudentRepository>,
    lessons: Arc<dyn LessonRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: AnalyticsSettings,
        groups: Arc<dyn GroupRepository>,
        students: Arc<dyn StudentRepository>,
        lessons: Arc<dyn LessonRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            groups,
            students,
            lessons,
            submissions,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, settings: AnalyticsSettings, storage: &Storage) -> Self {
        Self::new(
            clock,
            settings,
            Arc::clone(&storage.groups),
            Arc::clone(&storage.students),
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.submissions),
        )
    }

    #[must_use]
    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Read everything the report and overview need for `professor`.
    ///
    /// Lessons and submissions are always read. Groups and students come
    /// back empty when the professor owns no groups.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Storage` if any lookup or batch fails.
    pub async fn fetch_snapshot(
        &self,
        professor: &ProfessorId,
    ) -> Result<ClassroomSnapshot, AnalyticsError> {
        let (groups, students) = self.fetch_roster(professor).await?;
        let (lessons, submissions) = self.fetch_coursework(professor).await?;

        debug!(
            %professor,
            groups = groups.len(),
            students = students.len(),
            lessons = lessons.len(),
            submissions = submissions.len(),
            "fetched classroom snapshot"
        );

        Ok(ClassroomSnapshot::new(groups, students, lessons, submissions))
    }

    /// Groups owned by `professor` and their deduplicated members.
    async fn fetch_roster(
        &self,
        professor: &ProfessorId,
    ) -> Result<(Vec<Group>, Vec<Student>), AnalyticsError> {
        let groups = self.groups.list_groups(professor).await?;
        if groups.is_empty() {
            debug!(%professor, "professor owns no groups");
            return Ok((groups, Vec::new()));
        }
        let group_ids: Vec<GroupId> = groups.iter().map(|g| g.id().clone()).collect();

        let students_repo = self.students.as_ref();
        let students = fetch_in_batches(
            &group_ids,
            self.settings.student_batch_size(),
            move |chunk| async move { students_repo.list_students_in_groups(&chunk).await },
        )
        .await?;
        Ok((groups, dedup_by_key(students, |s| s.id().clone())))
    }

    /// Lessons authored by `professor` and every quiz and test result on them.
    async fn fetch_coursework(
        &self,
        professor: &ProfessorId,
    ) -> Result<(Vec<Lesson>, Vec<Submission>), AnalyticsError> {
        let lessons = self.lessons.list_lessons(professor).await?;
        if lessons.is_empty() {
            return Ok((lessons, Vec::new()));
        }
        let lesson_ids: Vec<LessonId> = lessons.iter().map(|l| l.id().clone()).collect();

        let (quizzes, tests) = futures::try_join!(
            self.submissions_of(SubmissionKind::Quiz, &lesson_ids),
            self.submissions_of(SubmissionKind::Test, &lesson_ids),
        )?;
        Ok((lessons, quizzes.into_iter().chain(tests).collect()))
    }

    async fn submissions_of(
        &self,
        kind: SubmissionKind,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<Submission>, AnalyticsError> {
        let repo = self.submissions.as_ref();
        let found = fetch_in_batches(
            lesson_ids,
            self.settings.lesson_batch_size(),
            move |chunk| async move { repo.list_submissions(kind, &chunk).await },
        )
        .await?;
        Ok(found)
    }

    fn report_from(
        &self,
        professor: &ProfessorId,
        snapshot: &ClassroomSnapshot,
        now: DateTime<Utc>,
    ) -> AnalyticsReport {
        let report = compute_report(snapshot, now, &self.settings);
        info!(
            %professor,
            reach = report.metrics.total_reach.value,
            velocity = report.metrics.content_velocity.value,
            "classroom report generated"
        );
        report
    }

    /// Build the report, surfacing the failure instead of degrading.
    ///
    /// A professor without groups gets the zero report and no lesson or
    /// submission lookups are made.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::MissingProfessor` when no identity is given,
    /// or `AnalyticsError::Storage` if any gateway lookup fails.
    pub async fn try_classroom_report(
        &self,
        professor: Option<&ProfessorId>,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        let professor = professor.ok_or(AnalyticsError::MissingProfessor)?;
        let now = self.clock.now();
        let (groups, students) = self.fetch_roster(professor).await?;
        if groups.is_empty() {
            return Ok(AnalyticsReport::zero());
        }
        let (lessons, submissions) = self.fetch_coursework(professor).await?;
        let snapshot = ClassroomSnapshot::new(groups, students, lessons, submissions);
        Ok(self.report_from(professor, &snapshot, now))
    }

    /// Build the classroom report for `professor`.
    ///
    /// Never fails: a missing identity or any gateway error is logged and
    /// the zero report is returned, leaving the caller to decide whether to
    /// show an error.
    pub async fn classroom_report(&self, professor: Option<&ProfessorId>) -> AnalyticsReport {
        match self.try_classroom_report(professor).await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "classroom report unavailable; returning zero report");
                AnalyticsReport::zero()
            }
        }
    }

    /// Build the basic class overview, surfacing the failure.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsService::try_classroom_report`].
    pub async fn try_class_overview(
        &self,
        professor: Option<&ProfessorId>,
    ) -> Result<ClassOverview, AnalyticsError> {
        let professor = professor.ok_or(AnalyticsError::MissingProfessor)?;
        let snapshot = self.fetch_snapshot(professor).await?;
        Ok(ClassOverview::from_snapshot(&snapshot, self.settings.insight_limit()))
    }

    /// Build the basic class overview; degrades to an empty overview on failure.
    pub async fn class_overview(&self, professor: Option<&ProfessorId>) -> ClassOverview {
        match self.try_class_overview(professor).await {
            Ok(overview) => overview,
            Err(err) => {
                warn!(error = %err, "class overview unavailable; returning empty overview");
                ClassOverview::empty()
            }
        }
    }

    /// Build the report and the overview from a single snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsService::try_classroom_report`].
    pub async fn try_report_with_overview(
        &self,
        professor: Option<&ProfessorId>,
    ) -> Result<(AnalyticsReport, ClassOverview), AnalyticsError> {
        let professor = professor.ok_or(AnalyticsError::MissingProfessor)?;
        let now = self.clock.now();
        let snapshot = self.fetch_snapshot(professor).await?;
        let report = self.report_from(professor, &snapshot, now);
        let overview = ClassOverview::from_snapshot(&snapshot, self.settings.insight_limit());
        Ok((report, overview))
    }

    /// Report and overview together; degrades to the zero report and an
    /// empty overview on failure.
    pub async fn report_with_overview(
        &self,
        professor: Option<&ProfessorId>,
    ) -> (AnalyticsReport, ClassOverview) {
        match self.try_report_with_overview(professor).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "classroom data unavailable; returning zero report");
                (AnalyticsReport::zero(), ClassOverview::empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use classroom_core::model::{StudentId, SubmissionId};
    use classroom_core::time::{fixed_clock, fixed_now};
    use std::sync::Mutex;
    use storage::repository::{InMemoryRepository, StorageError};

    fn professor() -> ProfessorId {
        ProfessorId::new("prof-1")
    }

    fn service(storage: &Storage) -> AnalyticsService {
        AnalyticsService::from_storage(fixed_clock(), AnalyticsSettings::default(), storage)
    }

    /// Seeds `groups` groups, one student per group plus one student in
    /// every group, `lessons` lessons, and one submission per lesson.
    async fn seed(repo: &InMemoryRepository, groups: usize, lessons: usize) {
        let group_ids: Vec<GroupId> = (0..groups).map(|i| GroupId::new(format!("g{i}"))).collect();
        for id in &group_ids {
            let group = Group::new(id.clone(), format!("Group {id}"), professor()).unwrap();
            repo.upsert_group(&group).await.unwrap();
            let student = Student::new(
                StudentId::new(format!("only-{id}")),
                None,
                None,
                [id.clone()],
            );
            repo.upsert_student(&student).await.unwrap();
        }
        let everywhere = Student::new(
            StudentId::new("everywhere"),
            Some("Roaming".into()),
            None,
            group_ids.clone(),
        );
        repo.upsert_student(&everywhere).await.unwrap();

        for i in 0..lessons {
            let lesson_id = LessonId::new(format!("l{i}"));
            let lesson = Lesson::new(lesson_id.clone(), professor(), "L", [], fixed_now());
            repo.upsert_lesson(&lesson).await.unwrap();
            let kind = if i % 2 == 0 {
                SubmissionKind::Quiz
            } else {
                SubmissionKind::Test
            };
            let sub = Submission::new(
                SubmissionId::new(format!("sub{i}")),
                kind,
                lesson_id,
                StudentId::new("everywhere"),
                90.0,
                fixed_now() - Duration::days(1),
            )
            .unwrap();
            repo.append_submission(&sub).await.unwrap();
        }
    }

    #[tokio::test]
    async fn missing_identity_returns_zero_report() {
        let storage = Storage::in_memory();
        let svc = service(&storage);

        assert!(svc.classroom_report(None).await.is_zero());
        assert!(matches!(
            svc.try_classroom_report(None).await,
            Err(AnalyticsError::MissingProfessor)
        ));
    }

    #[tokio::test]
    async fn professor_without_groups_gets_zero_report() {
        let repo = InMemoryRepository::new();
        // Lessons and submissions alone do not produce a report.
        let lesson = Lesson::new(LessonId::new("l0"), professor(), "L", [], fixed_now());
        repo.upsert_lesson(&lesson).await.unwrap();
        let svc = service(&Storage::from_repository(repo));

        let report = svc.classroom_report(Some(&professor())).await;
        assert_eq!(report, AnalyticsReport::zero());
    }

    #[tokio::test]
    async fn batches_across_chunk_boundaries_without_duplicates() {
        let repo = InMemoryRepository::new();
        seed(&repo, 23, 65).await;
        let svc = service(&Storage::from_repository(repo));

        let report = svc.classroom_report(Some(&professor())).await;

        // 23 single-group students plus the one enrolled everywhere.
        assert_eq!(report.metrics.total_reach.value, 24);
        assert_eq!(report.metrics.content_velocity.value, 65);
        assert_eq!(report.metrics.knowledge_mastery.value, 90);
        assert_eq!(report.insights.top_performers.len(), 1);
        assert_eq!(report.insights.top_performers[0].submissions, 65);
    }

    #[tokio::test]
    async fn snapshot_keeps_membership_lookup_order() {
        let repo = InMemoryRepository::new();
        seed(&repo, 12, 0).await;
        let svc = service(&Storage::from_repository(repo));

        let snapshot = svc.fetch_snapshot(&professor()).await.unwrap();
        let roster: Vec<&str> = snapshot.students.iter().map(|s| s.id().as_str()).collect();
        assert_eq!(roster.len(), 13);
        assert_eq!(roster[0], "only-g0");
        assert_eq!(roster[10], "everywhere");
        assert_eq!(roster.iter().filter(|id| **id == "everywhere").count(), 1);
        assert!(snapshot.submissions.is_empty());
    }

    /// Gateway double that counts lookups and can fail submission reads.
    #[derive(Clone, Default)]
    struct RecordingGateway {
        inner: InMemoryRepository,
        student_batches: Arc<Mutex<Vec<usize>>>,
        submission_batches: Arc<Mutex<Vec<(SubmissionKind, usize)>>>,
        deny_tests: bool,
    }

    #[async_trait]
    impl GroupRepository for RecordingGateway {
        async fn list_groups(&self, owner: &ProfessorId) -> Result<Vec<Group>, StorageError> {
            self.inner.list_groups(owner).await
        }

        async fn upsert_group(&self, group: &Group) -> Result<(), StorageError> {
            self.inner.upsert_group(group).await
        }
    }

    #[async_trait]
    impl StudentRepository for RecordingGateway {
        async fn list_students_in_groups(
            &self,
            groups: &[GroupId],
        ) -> Result<Vec<Student>, StorageError> {
            self.student_batches.lock().unwrap().push(groups.len());
            self.inner.list_students_in_groups(groups).await
        }

        async fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
            self.inner.upsert_student(student).await
        }
    }

    #[async_trait]
    impl LessonRepository for RecordingGateway {
        async fn list_lessons(&self, owner: &ProfessorId) -> Result<Vec<Lesson>, StorageError> {
            self.inner.list_lessons(owner).await
        }

        async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
            self.inner.upsert_lesson(lesson).await
        }
    }

    #[async_trait]
    impl SubmissionRepository for RecordingGateway {
        async fn list_submissions(
            &self,
            kind: SubmissionKind,
            lessons: &[LessonId],
        ) -> Result<Vec<Submission>, StorageError> {
            self.submission_batches
                .lock()
                .unwrap()
                .push((kind, lessons.len()));
            if self.deny_tests && kind == SubmissionKind::Test {
                return Err(StorageError::PermissionDenied(kind.collection().into()));
            }
            self.inner.list_submissions(kind, lessons).await
        }

        async fn append_submission(&self, submission: &Submission) -> Result<(), StorageError> {
            self.inner.append_submission(submission).await
        }
    }

    #[tokio::test]
    async fn issues_one_lookup_per_capped_chunk() {
        let gateway = RecordingGateway::default();
        seed(&gateway.inner, 21, 61).await;
        let svc = service(&Storage::from_repository(gateway.clone()));

        let _ = svc.classroom_report(Some(&professor())).await;

        assert_eq!(*gateway.student_batches.lock().unwrap(), vec![10, 10, 1]);
        let submission_batches = gateway.submission_batches.lock().unwrap();
        let mut quiz: Vec<usize> = submission_batches
            .iter()
            .filter(|(k, _)| *k == SubmissionKind::Quiz)
            .map(|(_, n)| *n)
            .collect();
        quiz.sort_unstable();
        assert_eq!(quiz, vec![1, 30, 30]);
        assert_eq!(submission_batches.len(), 6);
    }

    #[tokio::test]
    async fn skips_submission_lookups_without_lessons() {
        let gateway = RecordingGateway::default();
        seed(&gateway.inner, 3, 0).await;
        let svc = service(&Storage::from_repository(gateway.clone()));

        let report = svc.classroom_report(Some(&professor())).await;

        assert_eq!(report.metrics.total_reach.value, 4);
        assert_eq!(report.metrics.knowledge_mastery.value, 0);
        assert!(gateway.submission_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn any_failed_batch_degrades_to_zero_report() {
        let gateway = RecordingGateway {
            deny_tests: true,
            ..RecordingGateway::default()
        };
        seed(&gateway.inner, 2, 4).await;
        let svc = service(&Storage::from_repository(gateway));

        assert!(matches!(
            svc.try_classroom_report(Some(&professor())).await,
            Err(AnalyticsError::Storage(StorageError::PermissionDenied(_)))
        ));
        assert!(svc.classroom_report(Some(&professor())).await.is_zero());
        assert_eq!(
            svc.class_overview(Some(&professor())).await,
            ClassOverview::empty()
        );
    }

    /// One lesson with a single quiz result of 80, and no groups at all.
    async fn seed_coursework_only(repo: &InMemoryRepository) {
        let lesson = Lesson::new(LessonId::new("l0"), professor(), "L", [], fixed_now());
        repo.upsert_lesson(&lesson).await.unwrap();
        let sub = Submission::new(
            SubmissionId::new("q0"),
            SubmissionKind::Quiz,
            LessonId::new("l0"),
            StudentId::new("former-student"),
            80.0,
            fixed_now() - Duration::days(2),
        )
        .unwrap();
        repo.append_submission(&sub).await.unwrap();
    }

    #[tokio::test]
    async fn overview_without_groups_still_counts_coursework() {
        let repo = InMemoryRepository::new();
        seed_coursework_only(&repo).await;
        let svc = service(&Storage::from_repository(repo));

        let overview = svc.class_overview(Some(&professor())).await;

        assert_eq!(overview.student_count, 0);
        assert_eq!(overview.quiz_submission_count, 1);
        assert_eq!(overview.avg_quiz_score, 80);
        assert_eq!(overview.test_submission_count, 0);
        assert_eq!(overview.top_students.len(), 1);
        assert_eq!(overview.top_students[0].name, "Unknown student");
    }

    #[tokio::test]
    async fn report_without_groups_skips_coursework_lookups() {
        let gateway = RecordingGateway::default();
        seed_coursework_only(&gateway.inner).await;
        let svc = service(&Storage::from_repository(gateway.clone()));

        assert!(svc.classroom_report(Some(&professor())).await.is_zero());
        assert!(gateway.student_batches.lock().unwrap().is_empty());
        assert!(gateway.submission_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_and_overview_share_one_gateway_read() {
        let gateway = RecordingGateway::default();
        seed(&gateway.inner, 3, 4).await;
        let svc = service(&Storage::from_repository(gateway.clone()));

        let (report, overview) = svc.report_with_overview(Some(&professor())).await;

        assert_eq!(report.metrics.total_reach.value, 4);
        assert_eq!(overview.student_count, 4);
        assert_eq!(overview.quiz_submission_count + overview.test_submission_count, 4);
        assert_eq!(*gateway.student_batches.lock().unwrap(), vec![3]);
        assert_eq!(gateway.submission_batches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn report_with_overview_degrades_together() {
        let gateway = RecordingGateway {
            deny_tests: true,
            ..RecordingGateway::default()
        };
        seed(&gateway.inner, 2, 4).await;
        let svc = service(&Storage::from_repository(gateway));

        let (report, overview) = svc.report_with_overview(Some(&professor())).await;

        assert!(report.is_zero());
        assert_eq!(overview, ClassOverview::empty());
    }
}
