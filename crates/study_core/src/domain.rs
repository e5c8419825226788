//! crates/study_core/src/domain.rs
//!
//! Defines the core data records for the study tracker.
//! Every record here is persisted as a whole JSON document per user, so the
//! serde layout (camelCase field names) is part of the storage contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//=========================================================================================
// Rewards
//=========================================================================================

/// Rarity tier of a collectible, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    #[serde(alias = "shiny")]
    UltraRare,
}

impl Rarity {
    /// Display color used by the aquarium view.
    pub fn color(self) -> &'static str {
        match self {
            Rarity::Common => "#60A5FA",
            Rarity::Rare => "#A855F7",
            Rarity::Epic => "#EF4444",
            Rarity::Legendary => "#F59E0B",
            Rarity::UltraRare => "#10B981",
        }
    }

    /// Display scale; the top tiers render larger.
    pub fn scale(self) -> f64 {
        match self {
            Rarity::Legendary => 2.0,
            Rarity::UltraRare => 1.8,
            Rarity::Epic => 1.5,
            Rarity::Common | Rarity::Rare => 1.2,
        }
    }
}

/// A single earned reward. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    pub id: String,
    #[serde(rename = "type")]
    pub rarity: Rarity,
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub speed: f64,
    pub color: String,
    pub size: f64,
    pub earned_at: DateTime<Utc>,
    pub earned_from_minutes: u32,
}

/// Per-user reward record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardState {
    pub user_id: String,
    #[serde(rename = "fish")]
    pub collectibles: Vec<Collectible>,
    /// Cumulative minutes studied.
    pub total_study_time: u32,
    /// Always equal to `collectibles.len()`.
    #[serde(rename = "totalGuppies")]
    pub total_collectibles: usize,
    pub last_reward_time: Option<DateTime<Utc>>,
    pub study_streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RewardState {
    /// The zero-value record handed out when a user has nothing stored yet.
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            collectibles: Vec::new(),
            total_study_time: 0,
            total_collectibles: 0,
            last_reward_time: None,
            study_streak: 0,
            last_study_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends freshly minted collectibles and keeps the counter in sync.
    pub fn push_collectibles(&mut self, minted: &[Collectible]) {
        self.collectibles.extend_from_slice(minted);
        self.total_collectibles = self.collectibles.len();
    }
}

//=========================================================================================
// Quiz sessions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Quiz,
    Flashcards,
}

/// The user's answer to one question within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub question: String,
    pub user_answer: u32,
    pub correct_answer: u32,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
    pub difficulty: Difficulty,
    /// Seconds.
    pub time_spent: u32,
    pub timestamp: DateTime<Utc>,
}

/// A completed quiz or flashcard session, as reported by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub session_id: String,
    pub user_id: String,
    pub session_type: SessionType,
    pub document_ids: Vec<String>,
    pub question_results: Vec<QuestionResult>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    /// Total session time in seconds.
    pub time_spent: u32,
    pub completed_at: DateTime<Utc>,
    pub difficulty: Difficulty,
}

//=========================================================================================
// Progress
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub chapter_id: String,
    pub chapter_title: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    /// Percentage, 0-100.
    pub accuracy: f64,
    pub last_studied: DateTime<Utc>,
    pub difficulty_level: Difficulty,
    pub needs_review: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub topic_name: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub accuracy: f64,
    pub last_studied: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentProgress {
    pub document_id: String,
    pub document_name: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub chapters_studied: Vec<String>,
    pub last_studied: DateTime<Utc>,
    // Nothing sets this yet.
    pub is_completed: bool,
}

/// Per-user running aggregate of quiz results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub user_id: String,
    pub overall_accuracy: f64,
    pub total_questions_answered: u32,
    pub total_correct_answers: u32,
    pub study_streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
    /// Minutes.
    pub total_study_time: u32,
    pub document_progress: BTreeMap<String, DocumentProgress>,
    pub chapter_progress: BTreeMap<String, ChapterProgress>,
    pub topic_progress: BTreeMap<String, TopicProgress>,
    pub weak_areas: Vec<String>,
    pub strong_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressState {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            overall_accuracy: 0.0,
            total_questions_answered: 0,
            total_correct_answers: 0,
            study_streak: 0,
            last_study_date: None,
            total_study_time: 0,
            document_progress: BTreeMap::new(),
            chapter_progress: BTreeMap::new(),
            topic_progress: BTreeMap::new(),
            weak_areas: Vec::new(),
            strong_areas: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

//=========================================================================================
// Derived views
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyDistribution {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyDistribution {
    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }
}

/// Recommendation used to bias the next generated quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveParams {
    pub focus_chapters: Vec<String>,
    pub difficulty_distribution: DifficultyDistribution,
    pub total_questions: u32,
    pub requested_difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementArea {
    pub chapter_id: String,
    pub chapter_title: String,
    pub current_accuracy: f64,
    pub recommended_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAnalytics {
    pub overall_progress: f64,
    pub by_chapter: BTreeMap<String, f64>,
    pub by_topic: BTreeMap<String, f64>,
    pub recent_sessions: Vec<SessionResult>,
    pub improvement_areas: Vec<ImprovementArea>,
    pub achievements: Vec<Achievement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_shiny_tier_reads_as_ultra_rare() {
        let rarity: Rarity = serde_json::from_str("\"shiny\"").unwrap();
        assert_eq!(rarity, Rarity::UltraRare);
        assert_eq!(serde_json::to_string(&rarity).unwrap(), "\"ultra_rare\"");
    }

    #[test]
    fn rarity_tiers_are_ordered() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
        assert!(Rarity::Legendary < Rarity::UltraRare);
    }

    #[test]
    fn reward_state_uses_stored_field_names() {
        let state = RewardState::new("u1", Utc::now());
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("fish").is_some());
        assert_eq!(json["totalGuppies"], 0);
        assert_eq!(json["totalStudyTime"], 0);
    }
}
