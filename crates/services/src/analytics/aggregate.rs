use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use classroom_core::model::{Student, StudentId, Submission};
use classroom_core::time::calendar_days_ago;

use super::report::{
    AnalyticsReport, AttentionItem, AttentionReason, Charts, HeadlineMetrics, Insights, Metric,
    PerformerItem, ReportMeta, Trend,
};
use super::settings::AnalyticsSettings;
use super::snapshot::ClassroomSnapshot;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_percent(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(100.0) as u32
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Running totals for one roster student.
struct StudentTally<'a> {
    student: &'a Student,
    score_sum: f64,
    submissions: u32,
    last_submission_at: Option<DateTime<Utc>>,
}

impl<'a> StudentTally<'a> {
    fn new(student: &'a Student) -> Self {
        Self {
            student,
            score_sum: 0.0,
            submissions: 0,
            last_submission_at: None,
        }
    }

    fn record(&mut self, submission: &Submission) {
        self.score_sum += submission.score();
        self.submissions = self.submissions.saturating_add(1);
        let at = submission.submitted_at();
        if self.last_submission_at.is_none_or(|last| at > last) {
            self.last_submission_at = Some(at);
        }
    }

    fn mean_score(&self) -> Option<f64> {
        (self.submissions > 0).then(|| self.score_sum / f64::from(self.submissions))
    }
}

/// Compute the classroom report from an already-fetched snapshot.
///
/// Pure: `now` is the single reference time for the active window and the
/// histogram. An empty group list yields [`AnalyticsReport::zero`].
#[must_use]
pub fn compute_report(
    snapshot: &ClassroomSnapshot,
    now: DateTime<Utc>,
    settings: &AnalyticsSettings,
) -> AnalyticsReport {
    if snapshot.has_no_groups() {
        return AnalyticsReport::zero();
    }

    let cutoff = now - settings.active_window();
    let is_active = |at: DateTime<Utc>| at >= cutoff;

    let mut tallies: Vec<StudentTally<'_>> = Vec::with_capacity(snapshot.students.len());
    let mut index: HashMap<&StudentId, usize> = HashMap::with_capacity(snapshot.students.len());
    for student in &snapshot.students {
        if !index.contains_key(student.id()) {
            index.insert(student.id(), tallies.len());
            tallies.push(StudentTally::new(student));
        }
    }

    let days = settings.histogram_days();
    let mut activity = vec![0_u32; days];
    let mut score_sum = 0.0_f64;
    let mut velocity = 0_usize;
    let mut active_students: HashSet<&StudentId> = HashSet::new();

    for submission in &snapshot.submissions {
        score_sum += submission.score();

        let at = submission.submitted_at();
        if is_active(at) {
            velocity += 1;
            if index.contains_key(submission.student_id()) {
                active_students.insert(submission.student_id());
            }
        }

        let ago = calendar_days_ago(now, at, settings.utc_offset());
        if let Ok(ago) = usize::try_from(ago) {
            if ago < days {
                activity[days - 1 - ago] += 1;
            }
        }

        if let Some(&slot) = index.get(submission.student_id()) {
            tallies[slot].record(submission);
        }
    }

    let reach = tallies.len();
    let engagement = if reach == 0 {
        0
    } else {
        round_percent(100.0 * active_students.len() as f64 / reach as f64)
    };
    let mastery = if snapshot.submissions.is_empty() {
        0
    } else {
        round_percent(score_sum / snapshot.submissions.len() as f64)
    };

    let metrics = headline_metrics(
        snapshot,
        settings,
        reach,
        active_students.len(),
        engagement,
        mastery,
        velocity,
    );

    AnalyticsReport {
        metrics,
        charts: Charts {
            activity,
            grades: grade_distribution(&tallies, settings),
        },
        insights: Insights {
            needs_attention: needs_attention(&tallies, cutoff, settings),
            top_performers: top_performers(&tallies, cutoff, settings),
        },
        meta: ReportMeta {
            generated_at: Some(now),
        },
    }
}

fn headline_metrics(
    snapshot: &ClassroomSnapshot,
    settings: &AnalyticsSettings,
    reach: usize,
    active: usize,
    engagement: u32,
    mastery: u32,
    velocity: usize,
) -> HeadlineMetrics {
    let window = settings.active_window_days();
    let total_submissions = snapshot.submissions.len();

    let total_reach = if reach == 0 {
        Metric::new(0, Trend::NoData, "No students are enrolled in your groups yet")
    } else {
        Metric::new(
            count_u32(reach),
            Trend::Active,
            format!("{reach} students across {} groups", snapshot.groups.len()),
        )
    };

    let engagement_score = if reach == 0 {
        Metric::new(0, Trend::NoData, "No students to measure engagement for")
    } else {
        Metric::new(
            engagement,
            Trend::for_percentage(engagement),
            format!("{active} of {reach} students submitted work in the last {window} days"),
        )
    };

    let knowledge_mastery = if total_submissions == 0 {
        Metric::new(0, Trend::NoData, "No graded quizzes or tests yet")
    } else {
        Metric::new(
            mastery,
            Trend::for_percentage(mastery),
            format!("Average score across {total_submissions} quiz and test submissions"),
        )
    };

    let content_velocity = if velocity == 0 {
        Metric::new(0, Trend::NoData, format!("No submissions in the last {window} days"))
    } else {
        // Per-student weekly rate: at least one submission each is high.
        let trend = if velocity >= reach.max(1) {
            Trend::High
        } else if velocity * 2 >= reach.max(1) {
            Trend::Moderate
        } else {
            Trend::Low
        };
        Metric::new(
            count_u32(velocity),
            trend,
            format!("{velocity} submissions in the last {window} days"),
        )
    };

    HeadlineMetrics {
        total_reach,
        engagement_score,
        knowledge_mastery,
        content_velocity,
    }
}

fn needs_attention(
    tallies: &[StudentTally<'_>],
    cutoff: DateTime<Utc>,
    settings: &AnalyticsSettings,
) -> Vec<AttentionItem> {
    tallies
        .iter()
        .filter_map(|tally| {
            let mean = tally.mean_score();
            let low_score = mean.is_some_and(|m| m < settings.low_score_threshold());
            let inactive = tally.last_submission_at.is_none_or(|at| at < cutoff);
            let reason = if low_score {
                AttentionReason::LowScore
            } else if inactive {
                AttentionReason::Inactive
            } else {
                return None;
            };
            Some(AttentionItem {
                student_id: tally.student.id().clone(),
                name: tally.student.display_name().to_string(),
                reason,
                average_score: mean.map(round_percent),
                last_submission_at: tally.last_submission_at,
            })
        })
        .take(settings.insight_limit())
        .collect()
}

fn top_performers(
    tallies: &[StudentTally<'_>],
    cutoff: DateTime<Utc>,
    settings: &AnalyticsSettings,
) -> Vec<PerformerItem> {
    let mut ranked: Vec<(f64, &StudentTally<'_>)> = tallies
        .iter()
        .filter_map(|tally| {
            let mean = tally.mean_score()?;
            let active = tally.last_submission_at.is_some_and(|at| at >= cutoff);
            (mean >= settings.top_performer_threshold() && active).then_some((mean, tally))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    ranked
        .into_iter()
        .take(settings.insight_limit())
        .map(|(mean, tally)| PerformerItem {
            student_id: tally.student.id().clone(),
            name: tally.student.display_name().to_string(),
            average_score: round_percent(mean),
            submissions: tally.submissions,
        })
        .collect()
}

fn grade_distribution(tallies: &[StudentTally<'_>], settings: &AnalyticsSettings) -> Vec<u32> {
    let cutoffs = settings.grade_cutoffs();
    let mut grades = vec![0_u32; cutoffs.len() + 1];
    for mean in tallies.iter().filter_map(StudentTally::mean_score) {
        let bucket = cutoffs
            .iter()
            .position(|&min| mean >= min)
            .unwrap_or(cutoffs.len());
        grades[bucket] += 1;
    }
    grades
}
