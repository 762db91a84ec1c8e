use chrono::{DateTime, Utc};
use classroom_core::model::StudentId;
use serde::Serialize;

/// Labels for the grade distribution buckets, in chart order.
pub const GRADE_LABELS: [&str; 5] = ["A", "B", "C", "D", "F"];

//
// ─── HEADLINE METRICS ─────────────────────────────────────────────────────────
//

/// Qualitative direction shown next to a headline value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    #[serde(rename = "No data")]
    NoData,
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "High")]
    High,
}

impl Trend {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Trend::NoData => "No data",
            Trend::Active => "Active",
            Trend::Low => "Low",
            Trend::Moderate => "Moderate",
            Trend::High => "High",
        }
    }

    /// Level for a 0–100 percentage: 75+ is high, 50+ moderate, anything else low.
    #[must_use]
    pub fn for_percentage(value: u32) -> Self {
        match value {
            75.. => Trend::High,
            50..=74 => Trend::Moderate,
            _ => Trend::Low,
        }
    }
}

/// One headline number with its trend label and a human explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub value: u32,
    pub trend: Trend,
    pub explanation: String,
}

impl Metric {
    #[must_use]
    pub fn new(value: u32, trend: Trend, explanation: impl Into<String>) -> Self {
        Self {
            value,
            trend,
            explanation: explanation.into(),
        }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::new(0, Trend::NoData, "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineMetrics {
    /// Distinct students across the professor's groups.
    pub total_reach: Metric,
    /// Percentage of those students with a submission in the active window.
    pub engagement_score: Metric,
    /// Rounded mean of every quiz and test score.
    pub knowledge_mastery: Metric,
    /// Submissions inside the active window.
    pub content_velocity: Metric,
}

impl HeadlineMetrics {
    #[must_use]
    pub fn zero() -> Self {
        Self {
            total_reach: Metric::zero(),
            engagement_score: Metric::zero(),
            knowledge_mastery: Metric::zero(),
            content_velocity: Metric::zero(),
        }
    }
}

//
// ─── CHARTS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Charts {
    /// Submissions per local calendar day, oldest first; the last entry is today.
    pub activity: Vec<u32>,
    /// Students per grade bucket in [`GRADE_LABELS`] order.
    pub grades: Vec<u32>,
}

//
// ─── INSIGHTS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttentionReason {
    #[serde(rename = "low score")]
    LowScore,
    #[serde(rename = "inactive")]
    Inactive,
}

impl AttentionReason {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AttentionReason::LowScore => "low score",
            AttentionReason::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionItem {
    pub student_id: StudentId,
    pub name: String,
    pub reason: AttentionReason,
    /// Rounded mean score, absent when the student never submitted.
    pub average_score: Option<u32>,
    pub last_submission_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerItem {
    pub student_id: StudentId,
    pub name: String,
    pub average_score: u32,
    pub submissions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub needs_attention: Vec<AttentionItem>,
    pub top_performers: Vec<PerformerItem>,
}

//
// ─── REPORT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// When the report was computed; absent on the zero report.
    pub generated_at: Option<DateTime<Utc>>,
}

/// Snapshot of classroom health for one professor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    pub metrics: HeadlineMetrics,
    pub charts: Charts,
    pub insights: Insights,
    pub meta: ReportMeta,
}

impl AnalyticsReport {
    /// The fallback report: every metric 0 with no trend or explanation,
    /// empty charts, empty insight lists and no generation timestamp.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            metrics: HeadlineMetrics::zero(),
            charts: Charts::default(),
            insights: Insights::default(),
            meta: ReportMeta::default(),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_report_is_empty() {
        let report = AnalyticsReport::zero();
        assert!(report.is_zero());
        assert_eq!(report.metrics.total_reach.value, 0);
        assert_eq!(report.metrics.engagement_score.trend, Trend::NoData);
        assert!(report.charts.activity.is_empty());
        assert!(report.charts.grades.is_empty());
        assert!(report.insights.needs_attention.is_empty());
        assert!(report.insights.top_performers.is_empty());
        assert!(report.meta.generated_at.is_none());
    }

    #[test]
    fn percentage_trend_levels() {
        assert_eq!(Trend::for_percentage(0), Trend::Low);
        assert_eq!(Trend::for_percentage(50), Trend::Moderate);
        assert_eq!(Trend::for_percentage(74), Trend::Moderate);
        assert_eq!(Trend::for_percentage(75), Trend::High);
        assert_eq!(Trend::for_percentage(100), Trend::High);
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(AnalyticsReport::zero()).unwrap();
        assert_eq!(json["metrics"]["totalReach"]["value"], 0);
        assert_eq!(json["metrics"]["engagementScore"]["trend"], "No data");
        assert_eq!(json["insights"]["needsAttention"], serde_json::json!([]));
        assert!(json["meta"]["generatedAt"].is_null());
    }
}
