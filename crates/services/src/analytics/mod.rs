mod aggregate;
pub mod batching;
mod report;
mod service;
mod settings;
mod snapshot;

pub use crate::error::AnalyticsError;
pub use aggregate::compute_report;
pub use report::{
    AnalyticsReport, AttentionItem, AttentionReason, Charts, GRADE_LABELS, HeadlineMetrics,
    Insights, Metric, PerformerItem, ReportMeta, Trend,
};
pub use service::AnalyticsService;
pub use settings::AnalyticsSettings;
pub use snapshot::ClassroomSnapshot;
