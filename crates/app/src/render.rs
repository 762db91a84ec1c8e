//! Plain-text rendering of reports for terminals.

use std::fmt::Write as _;

use services::ClassOverview;
use services::analytics::{AnalyticsReport, GRADE_LABELS, Metric};

fn metric_line(out: &mut String, label: &str, metric: &Metric) {
    let _ = writeln!(
        out,
        "  {label:<18} {:>4}  [{}] {}",
        metric.value,
        metric.trend.label(),
        metric.explanation
    );
}

#[must_use]
pub fn report_text(report: &AnalyticsReport) -> String {
    let mut out = String::new();
    if report.is_zero() {
        out.push_str("No classroom data available.\n");
        return out;
    }

    let m = &report.metrics;
    out.push_str("Headline metrics\n");
    metric_line(&mut out, "Total reach", &m.total_reach);
    metric_line(&mut out, "Engagement score", &m.engagement_score);
    metric_line(&mut out, "Knowledge mastery", &m.knowledge_mastery);
    metric_line(&mut out, "Content velocity", &m.content_velocity);

    let activity: Vec<String> = report.charts.activity.iter().map(u32::to_string).collect();
    let _ = writeln!(out, "\nDaily activity (oldest first)\n  {}", activity.join(" "));

    out.push_str("\nGrade distribution\n");
    for (label, count) in GRADE_LABELS.iter().zip(&report.charts.grades) {
        let _ = writeln!(out, "  {label}: {count}");
    }

    out.push_str("\nNeeds attention\n");
    if report.insights.needs_attention.is_empty() {
        out.push_str("  none\n");
    }
    for item in &report.insights.needs_attention {
        let average = item
            .average_score
            .map_or_else(|| "-".to_string(), |avg| avg.to_string());
        let _ = writeln!(
            out,
            "  {} ({}), average {average}",
            item.name,
            item.reason.label()
        );
    }

    out.push_str("\nTop performers\n");
    if report.insights.top_performers.is_empty() {
        out.push_str("  none\n");
    }
    for item in &report.insights.top_performers {
        let _ = writeln!(
            out,
            "  {}: average {}, {} submissions",
            item.name, item.average_score, item.submissions
        );
    }
    out
}

#[must_use]
pub fn overview_text(overview: &ClassOverview) -> String {
    let mut out = String::from("Class overview\n");
    let _ = writeln!(out, "  Students: {}", overview.student_count);
    let _ = writeln!(
        out,
        "  Quizzes: {} submissions, average {}",
        overview.quiz_submission_count, overview.avg_quiz_score
    );
    let _ = writeln!(
        out,
        "  Tests: {} submissions, average {}",
        overview.test_submission_count, overview.avg_test_score
    );
    for student in &overview.top_students {
        let _ = writeln!(out, "  {}: {} submissions", student.name, student.submissions);
    }
    out
}
