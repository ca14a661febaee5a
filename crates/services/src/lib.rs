#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod gamification_service;
pub mod study_service;

pub use kioku_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, GamificationError, StudyServiceError};
pub use gamification_service::{
    GamificationService, SessionInput, SessionOutcome, StreakOutcome, XpAward,
};
pub use study_service::{
    AnswerOutcome, DEFAULT_NEW_ITEM_LIMIT, DashboardStats, QueuedReview, StudyQueue, StudyService,
};
