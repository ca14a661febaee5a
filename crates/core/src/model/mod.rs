mod ids;
mod item;
mod progress;
mod review;
mod stats;

pub use ids::{ItemId, ParseIdError, UserId};
pub use item::{ItemCategory, ItemError, LearningItem};
pub use progress::{Progress, ProgressError, ProgressStatus, SchedulingState};
pub use review::{AnswerQuality, ReviewError, ReviewLog};
pub use stats::{StudySession, UserStats};
