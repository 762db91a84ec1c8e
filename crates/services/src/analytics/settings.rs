use chrono::{Duration, FixedOffset, Offset, Utc};

use storage::{IN_QUERY_BATCH_LIMIT, MEMBERSHIP_BATCH_LIMIT};

/// Tunables for the classroom report.
///
/// Defaults reproduce the dashboard's fixed rules: a 7-day activity window,
/// 14 histogram days, top-5 insight lists, 50/80 score thresholds and the
/// usual A–F cutoffs. Batch sizes default to the gateway's query limits.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSettings {
    active_window_days: i64,
    histogram_days: usize,
    insight_limit: usize,
    low_score_threshold: f64,
    top_performer_threshold: f64,
    grade_cutoffs: [f64; 4],
    student_batch_size: usize,
    lesson_batch_size: usize,
    utc_offset: FixedOffset,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            active_window_days: 7,
            histogram_days: 14,
            insight_limit: 5,
            low_score_threshold: 50.0,
            top_performer_threshold: 80.0,
            grade_cutoffs: [90.0, 80.0, 70.0, 60.0],
            student_batch_size: MEMBERSHIP_BATCH_LIMIT,
            lesson_batch_size: IN_QUERY_BATCH_LIMIT,
            utc_offset: Utc.fix(),
        }
    }
}

impl AnalyticsSettings {
    /// Use `offset` to place local-midnight day boundaries in the histogram.
    #[must_use]
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Override the batch sizes, clamped to `1..=limit` of the matching
    /// gateway query.
    #[must_use]
    pub fn with_batch_sizes(mut self, students: usize, lessons: usize) -> Self {
        self.student_batch_size = students.clamp(1, MEMBERSHIP_BATCH_LIMIT);
        self.lesson_batch_size = lessons.clamp(1, IN_QUERY_BATCH_LIMIT);
        self
    }

    #[must_use]
    pub fn active_window(&self) -> Duration {
        Duration::days(self.active_window_days)
    }

    #[must_use]
    pub fn active_window_days(&self) -> i64 {
        self.active_window_days
    }

    #[must_use]
    pub fn histogram_days(&self) -> usize {
        self.histogram_days
    }

    #[must_use]
    pub fn insight_limit(&self) -> usize {
        self.insight_limit
    }

    #[must_use]
    pub fn low_score_threshold(&self) -> f64 {
        self.low_score_threshold
    }

    #[must_use]
    pub fn top_performer_threshold(&self) -> f64 {
        self.top_performer_threshold
    }

    /// Minimum mean score for grades A, B, C and D; anything lower is F.
    #[must_use]
    pub fn grade_cutoffs(&self) -> [f64; 4] {
        self.grade_cutoffs
    }

    #[must_use]
    pub fn student_batch_size(&self) -> usize {
        self.student_batch_size
    }

    #[must_use]
    pub fn lesson_batch_size(&self) -> usize {
        self.lesson_batch_size
    }

    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }
}
