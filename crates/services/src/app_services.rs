use kioku_core::Clock;
use kioku_storage::repository::Storage;

use crate::error::AppServicesError;
use crate::gamification_service::GamificationService;
use crate::study_service::StudyService;

/// Assembles app-facing services over one storage backend and one clock.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    study: StudyService,
    gamification: GamificationService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock))
    }

    /// Build services over in-memory storage, for tests and prototyping.
    #[must_use]
    pub fn new_in_memory(clock: Clock) -> Self {
        Self::with_storage(Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn with_storage(storage: Storage, clock: Clock) -> Self {
        Self {
            storage,
            study: StudyService::new().with_clock(clock),
            gamification: GamificationService::new().with_clock(clock),
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn study(&self) -> &StudyService {
        &self.study
    }

    #[must_use]
    pub fn gamification(&self) -> &GamificationService {
        &self.gamification
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use kioku_core::time::fixed_clock;

    #[tokio::test]
    async fn in_memory_services_share_one_backend() {
        let services = AppServices::new_in_memory(fixed_clock());
        let user = kioku_core::model::UserId::random();

        services
            .gamification()
            .award_xp(services.storage(), user, 25)
            .await
            .unwrap();

        let stats = services
            .storage()
            .stats
            .get_stats(user)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.total_xp, 25);
    }
}
