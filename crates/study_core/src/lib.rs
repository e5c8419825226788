pub mod analytics;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod rewards;
pub mod streak;
pub mod tracker;

pub use domain::{
    AdaptiveParams, Collectible, Difficulty, ProgressAnalytics, ProgressState, Rarity,
    RewardState, SessionResult,
};
pub use ports::{BlobStore, PortError, PortResult};
pub use progress::{ProgressCalculator, ProgressConfig};
pub use rewards::{RewardCalculator, RewardOutcome, RewardRules};
pub use tracker::{ProgressOverview, SessionUpdate, StudyTracker};
