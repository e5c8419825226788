//! crates/study_core/src/tracker.rs
//!
//! Per-user record handle. Loads a user's JSON document through the
//! `BlobStore` port (or starts from a zeroed record), runs the calculators and
//! writes the whole document back.
//!
//! There is no locking: two concurrent updates for the same user race and the
//! last write wins.

use crate::analytics::{generate_progress_analytics, new_achievements};
use crate::domain::{
    AdaptiveParams, Difficulty, ProgressAnalytics, ProgressState, RewardState, SessionResult,
};
use crate::ports::{BlobStore, PortError, PortResult};
use crate::progress::ProgressCalculator;
use crate::rewards::{RewardCalculator, RewardOutcome};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Sessions kept in a user's history document.
pub const SESSION_HISTORY_LIMIT: usize = 50;

const JSON_CONTENT_TYPE: &str = "application/json";

pub fn reward_key(user_id: &str) -> String {
    format!("guppies/{}-guppy-data.json", user_id)
}

pub fn progress_key(user_id: &str) -> String {
    format!("progress/{}/user-progress.json", user_id)
}

pub fn history_key(user_id: &str) -> String {
    format!("progress/{}/session-history.json", user_id)
}

/// Progress record plus the analytics derived from it.
#[derive(Debug, Clone)]
pub struct ProgressOverview {
    pub progress: ProgressState,
    pub analytics: ProgressAnalytics,
}

/// Result of folding one session into the stored progress.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub progress: ProgressState,
    pub new_achievements: Vec<String>,
}

#[derive(Clone)]
pub struct StudyTracker {
    store: Arc<dyn BlobStore>,
    rewards: RewardCalculator,
    progress: ProgressCalculator,
}

impl StudyTracker {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_calculators(store, RewardCalculator::default(), ProgressCalculator::default())
    }

    pub fn with_calculators(
        store: Arc<dyn BlobStore>,
        rewards: RewardCalculator,
        progress: ProgressCalculator,
    ) -> Self {
        Self {
            store,
            rewards,
            progress,
        }
    }

    //-------------------------------------------------------------------------------------
    // Rewards
    //-------------------------------------------------------------------------------------

    /// Returns the stored reward record, or a zeroed one if the user has none.
    pub async fn load_or_init_rewards(&self, user_id: &str) -> PortResult<RewardState> {
        let stored = self.load_json::<RewardState>(&reward_key(user_id)).await?;
        Ok(stored.unwrap_or_else(|| RewardState::new(user_id, Utc::now())))
    }

    /// Applies reported study minutes and persists the updated record.
    pub async fn apply_study_minutes(&self, user_id: &str, minutes: u32) -> PortResult<RewardOutcome> {
        let state = self.load_or_init_rewards(user_id).await?;

        let outcome = {
            let mut rng = rand::rng();
            self.rewards
                .apply_study_minutes(state, minutes, Utc::now(), &mut rng)?
        };

        self.save_json(&reward_key(user_id), &outcome.state).await?;
        info!(
            user_id,
            minutes,
            earned = outcome.new_collectibles.len(),
            total = outcome.state.total_collectibles,
            "Study minutes recorded"
        );
        Ok(outcome)
    }

    //-------------------------------------------------------------------------------------
    // Progress
    //-------------------------------------------------------------------------------------

    pub async fn load_or_init_progress(&self, user_id: &str) -> PortResult<ProgressState> {
        let stored = self.load_json::<ProgressState>(&progress_key(user_id)).await?;
        Ok(stored.unwrap_or_else(|| ProgressState::new(user_id, Utc::now())))
    }

    pub async fn session_history(&self, user_id: &str) -> PortResult<Vec<SessionResult>> {
        let stored = self.load_json::<Vec<SessionResult>>(&history_key(user_id)).await?;
        Ok(stored.unwrap_or_default())
    }

    /// Appends to the history document, keeping only the newest entries.
    pub async fn append_session(&self, user_id: &str, session: &SessionResult) -> PortResult<()> {
        let mut history = self.session_history(user_id).await?;
        history.push(session.clone());
        if history.len() > SESSION_HISTORY_LIMIT {
            let excess = history.len() - SESSION_HISTORY_LIMIT;
            history.drain(..excess);
        }
        self.save_json(&history_key(user_id), &history).await
    }

    /// Folds a completed session into the stored progress and history.
    pub async fn record_session(
        &self,
        user_id: &str,
        session: &SessionResult,
    ) -> PortResult<SessionUpdate> {
        let before = self.load_or_init_progress(user_id).await?;
        let after = self
            .progress
            .update_progress(before.clone(), session, Utc::now())?;

        self.save_json(&progress_key(user_id), &after).await?;
        self.append_session(user_id, session).await?;

        let unlocked = new_achievements(&before, &after);
        info!(
            user_id,
            session_id = %session.session_id,
            questions = session.total_questions,
            accuracy = after.overall_accuracy,
            weak = after.weak_areas.len(),
            "Session recorded"
        );

        Ok(SessionUpdate {
            progress: after,
            new_achievements: unlocked,
        })
    }

    pub async fn progress_overview(&self, user_id: &str) -> PortResult<ProgressOverview> {
        let progress = self.load_or_init_progress(user_id).await?;
        let history = self.session_history(user_id).await?;
        let analytics = generate_progress_analytics(&progress, &history);
        Ok(ProgressOverview {
            progress,
            analytics,
        })
    }

    pub async fn adaptive_params(
        &self,
        user_id: &str,
        difficulty: Difficulty,
        count: u32,
    ) -> PortResult<AdaptiveParams> {
        if count == 0 {
            return Err(PortError::Invalid("count must be at least 1".to_string()));
        }
        let progress = self.load_or_init_progress(user_id).await?;
        Ok(self
            .progress
            .generate_adaptive_params(&progress, difficulty, count))
    }

    //-------------------------------------------------------------------------------------
    // Storage helpers
    //-------------------------------------------------------------------------------------

    /// `Ok(None)` when the key does not exist yet.
    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> PortResult<Option<T>> {
        match self.store.get(key).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(PortError::NotFound(_)) => {
                debug!(key, "No stored record, starting from defaults");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn save_json<T: Serialize>(&self, key: &str, value: &T) -> PortResult<()> {
        let body = serde_json::to_vec_pretty(value)?;
        self.store.put(key, body, JSON_CONTENT_TYPE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuestionResult, Rarity, SessionType};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
        fail_reads: bool,
    }

    #[async_trait]
    impl BlobStore for FakeStore {
        async fn get(&self, key: &str) -> PortResult<Vec<u8>> {
            if self.fail_reads {
                return Err(PortError::Unexpected("store offline".to_string()));
            }
            self.blobs
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| PortError::NotFound(key.to_string()))
        }

        async fn put(&self, key: &str, body: Vec<u8>, _content_type: &str) -> PortResult<()> {
            self.blobs.lock().unwrap().insert(key.to_string(), body);
            Ok(())
        }
    }

    fn tracker() -> (Arc<FakeStore>, StudyTracker) {
        let store = Arc::new(FakeStore::default());
        (store.clone(), StudyTracker::new(store))
    }

    fn session(id: &str, chapter: &str, correct: u32, total: u32) -> SessionResult {
        let results = (0..total)
            .map(|i| QuestionResult {
                question_id: format!("{}-{}", id, i),
                question: "What is a monad?".to_string(),
                user_answer: 0,
                correct_answer: 0,
                is_correct: i < correct,
                chapter_id: Some(chapter.to_string()),
                chapter_title: Some("Chapter".to_string()),
                topic_name: None,
                difficulty: Difficulty::Easy,
                time_spent: 30,
                timestamp: Utc::now(),
            })
            .collect();
        SessionResult {
            session_id: id.to_string(),
            user_id: "u".to_string(),
            session_type: SessionType::Quiz,
            document_ids: vec!["doc".to_string()],
            question_results: results,
            total_questions: total,
            correct_answers: correct,
            accuracy: 0.0,
            time_spent: 60,
            completed_at: Utc::now(),
            difficulty: Difficulty::Easy,
        }
    }

    #[tokio::test]
    async fn missing_records_start_zeroed() {
        let (store, tracker) = tracker();
        let rewards = tracker.load_or_init_rewards("alice").await.unwrap();
        assert_eq!(rewards.user_id, "alice");
        assert_eq!(rewards.total_study_time, 0);
        assert!(rewards.collectibles.is_empty());

        let progress = tracker.load_or_init_progress("alice").await.unwrap();
        assert_eq!(progress.total_questions_answered, 0);
        assert!(tracker.session_history("alice").await.unwrap().is_empty());

        // Reading never writes.
        assert!(store.blobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn study_minutes_are_persisted() {
        let (store, tracker) = tracker();
        let outcome = tracker.apply_study_minutes("alice", 15).await.unwrap();
        assert_eq!(outcome.new_collectibles.len(), 1);
        assert_eq!(outcome.new_collectibles[0].rarity, Rarity::Common);

        assert!(store.blobs.lock().unwrap().contains_key("guppies/alice-guppy-data.json"));
        let reloaded = tracker.load_or_init_rewards("alice").await.unwrap();
        assert_eq!(reloaded, outcome.state);
        assert_eq!(reloaded.study_streak, 1);
    }

    #[tokio::test]
    async fn zero_minutes_leave_store_untouched() {
        let (store, tracker) = tracker();
        let err = tracker.apply_study_minutes("alice", 0).await.unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
        assert!(store.blobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let store = Arc::new(FakeStore {
            fail_reads: true,
            ..Default::default()
        });
        let tracker = StudyTracker::new(store);
        let err = tracker.load_or_init_rewards("alice").await.unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }

    #[tokio::test]
    async fn corrupt_records_are_reported() {
        let (store, tracker) = tracker();
        store
            .blobs
            .lock()
            .unwrap()
            .insert(progress_key("alice"), b"{not json".to_vec());
        let err = tracker.load_or_init_progress("alice").await.unwrap_err();
        assert!(matches!(err, PortError::Serialization(_)));
    }

    #[tokio::test]
    async fn sessions_update_progress_and_history() {
        let (_store, tracker) = tracker();
        let update = tracker
            .record_session("alice", &session("s1", "c1", 10, 10))
            .await
            .unwrap();
        assert_eq!(update.progress.strong_areas, vec!["c1".to_string()]);
        assert_eq!(
            update.new_achievements,
            vec!["Getting Started".to_string(), "High Achiever".to_string()]
        );

        let overview = tracker.progress_overview("alice").await.unwrap();
        assert_eq!(overview.progress.total_questions_answered, 10);
        assert_eq!(overview.analytics.recent_sessions.len(), 1);
        assert_eq!(overview.analytics.achievements.len(), 2);

        let again = tracker
            .record_session("alice", &session("s2", "c1", 10, 10))
            .await
            .unwrap();
        assert!(again.new_achievements.is_empty());
    }

    #[tokio::test]
    async fn history_is_capped() {
        let (_store, tracker) = tracker();
        for i in 0..(SESSION_HISTORY_LIMIT + 5) {
            tracker
                .append_session("alice", &session(&format!("s{}", i), "c1", 1, 1))
                .await
                .unwrap();
        }
        let history = tracker.session_history("alice").await.unwrap();
        assert_eq!(history.len(), SESSION_HISTORY_LIMIT);
        assert_eq!(history[0].session_id, "s5");
        assert_eq!(history.last().unwrap().session_id, format!("s{}", SESSION_HISTORY_LIMIT + 4));
    }

    #[tokio::test]
    async fn adaptive_params_use_stored_progress() {
        let (_store, tracker) = tracker();
        tracker
            .record_session("alice", &session("s1", "weak-ch", 1, 5))
            .await
            .unwrap();

        let params = tracker
            .adaptive_params("alice", Difficulty::Medium, 10)
            .await
            .unwrap();
        assert_eq!(params.focus_chapters, vec!["weak-ch".to_string()]);
        assert_eq!(params.difficulty_distribution.easy, 6);
        assert_eq!(params.difficulty_distribution.total(), 10);

        assert!(matches!(
            tracker.adaptive_params("alice", Difficulty::Medium, 0).await,
            Err(PortError::Invalid(_))
        ));
    }
}
