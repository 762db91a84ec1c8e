#![forbid(unsafe_code)]

pub mod analytics;
pub mod app_services;
pub mod error;
pub mod overview;

pub use classroom_core::Clock;

pub use analytics::{AnalyticsReport, AnalyticsService, AnalyticsSettings, ClassroomSnapshot};
pub use app_services::AppServices;
pub use error::{AnalyticsError, AppServicesError};
pub use overview::{ClassOverview, TopStudent};
