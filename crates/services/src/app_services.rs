use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::analytics::{AnalyticsService, AnalyticsSettings};
use crate::error::AppServicesError;

/// Assembles the analytics service over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    analytics: Arc<AnalyticsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: AnalyticsSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, settings))
    }

    /// Build services over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, settings: AnalyticsSettings) -> Self {
        Self::from_storage(Storage::in_memory(), clock, settings)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock, settings: AnalyticsSettings) -> Self {
        let analytics = Arc::new(AnalyticsService::from_storage(clock, settings, &storage));
        Self { storage, analytics }
    }

    /// Repositories, for callers that write classroom data.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics)
    }
}
