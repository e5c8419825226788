//! crates/study_core/src/progress.rs
//!
//! Folds completed sessions into a user's `ProgressState` and derives the
//! adaptive quiz parameters from it.

use crate::domain::{
    AdaptiveParams, ChapterProgress, Difficulty, DifficultyDistribution, DocumentProgress,
    ProgressState, SessionResult, TopicProgress,
};
use crate::ports::{PortError, PortResult};
use crate::streak::advance_streak;
use chrono::{DateTime, Utc};

/// Most weak chapters recommended as focus for one quiz.
pub const MAX_FOCUS_CHAPTERS: usize = 5;

/// Thresholds used to classify chapters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressConfig {
    /// Chapters with fewer answered questions are neither weak nor strong.
    pub minimum_questions_for_accuracy: u32,
    /// Accuracy at or above which a chapter counts as mastered.
    pub mastery_threshold: f64,
    /// Accuracy below which a chapter needs review.
    pub review_threshold: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            minimum_questions_for_accuracy: 5,
            mastery_threshold: 85.0,
            review_threshold: 60.0,
        }
    }
}

/// `correct / total * 100`, or 0 when nothing was answered.
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(total) * 100.0
    }
}

/// Rejects session payloads that cannot be folded meaningfully.
pub fn validate_session(session: &SessionResult) -> PortResult<()> {
    if session.session_id.trim().is_empty() {
        return Err(PortError::Invalid("sessionId is required".to_string()));
    }
    if session.correct_answers > session.total_questions {
        return Err(PortError::Invalid(format!(
            "correctAnswers ({}) exceeds totalQuestions ({})",
            session.correct_answers, session.total_questions
        )));
    }
    if session
        .question_results
        .iter()
        .any(|r| r.question_id.trim().is_empty())
    {
        return Err(PortError::Invalid(
            "every question result needs a questionId".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ProgressCalculator {
    config: ProgressConfig,
}

impl ProgressCalculator {
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Folds one completed session into `state`.
    pub fn update_progress(
        &self,
        mut state: ProgressState,
        session: &SessionResult,
        now: DateTime<Utc>,
    ) -> PortResult<ProgressState> {
        validate_session(session)?;

        // Totals come from the client and saturate rather than wrap.
        state.total_questions_answered = state
            .total_questions_answered
            .saturating_add(session.total_questions);
        state.total_correct_answers = state
            .total_correct_answers
            .saturating_add(session.correct_answers);
        state.overall_accuracy = accuracy(state.total_correct_answers, state.total_questions_answered);
        state.total_study_time = state
            .total_study_time
            .saturating_add(seconds_to_minutes(session.time_spent));

        state.study_streak =
            advance_streak(state.study_streak, state.last_study_date, session.completed_at);
        state.last_study_date = Some(session.completed_at);
        state.updated_at = now;

        self.fold_chapters(&mut state, session);
        fold_topics(&mut state, session);
        fold_documents(&mut state, session);
        self.classify_areas(&mut state);

        Ok(state)
    }

    fn fold_chapters(&self, state: &mut ProgressState, session: &SessionResult) {
        for result in &session.question_results {
            let Some(chapter_id) = result.chapter_id.as_deref() else {
                continue;
            };

            let chapter = state
                .chapter_progress
                .entry(chapter_id.to_string())
                .or_insert_with(|| ChapterProgress {
                    chapter_id: chapter_id.to_string(),
                    chapter_title: result
                        .chapter_title
                        .clone()
                        .unwrap_or_else(|| "Unknown Chapter".to_string()),
                    total_questions: 0,
                    correct_answers: 0,
                    incorrect_answers: 0,
                    accuracy: 0.0,
                    last_studied: session.completed_at,
                    difficulty_level: result.difficulty,
                    needs_review: false,
                });

            chapter.total_questions = chapter.total_questions.saturating_add(1);
            if result.is_correct {
                chapter.correct_answers = chapter.correct_answers.saturating_add(1);
            } else {
                chapter.incorrect_answers = chapter.incorrect_answers.saturating_add(1);
            }
            chapter.accuracy = accuracy(chapter.correct_answers, chapter.total_questions);
            chapter.last_studied = session.completed_at;
            chapter.needs_review = chapter.accuracy < self.config.review_threshold;
        }
    }

    /// Rebuilds the weak/strong lists from the chapter map.
    fn classify_areas(&self, state: &mut ProgressState) {
        let mut weak = Vec::new();
        let mut strong = Vec::new();

        for chapter in state.chapter_progress.values() {
            if chapter.total_questions < self.config.minimum_questions_for_accuracy {
                continue;
            }
            if chapter.accuracy >= self.config.mastery_threshold {
                strong.push(chapter.chapter_id.clone());
            } else if chapter.accuracy < self.config.review_threshold {
                weak.push(chapter.chapter_id.clone());
            }
        }

        state.weak_areas = weak;
        state.strong_areas = strong;
    }

    /// Suggests focus chapters and an easy/medium/hard split of `count`.
    ///
    /// `requested` is echoed back; the split depends only on overall accuracy.
    pub fn generate_adaptive_params(
        &self,
        state: &ProgressState,
        requested: Difficulty,
        count: u32,
    ) -> AdaptiveParams {
        let (easy_pct, medium_pct) = if state.overall_accuracy < 50.0 {
            (60, 30)
        } else if state.overall_accuracy < 75.0 {
            (30, 50)
        } else {
            (20, 40)
        };

        let easy = percent_of(count, easy_pct);
        let medium = percent_of(count, medium_pct);

        AdaptiveParams {
            focus_chapters: state
                .weak_areas
                .iter()
                .take(MAX_FOCUS_CHAPTERS)
                .cloned()
                .collect(),
            difficulty_distribution: DifficultyDistribution {
                easy,
                medium,
                hard: count - easy - medium,
            },
            total_questions: count,
            requested_difficulty: requested,
        }
    }
}

/// Seconds to whole minutes, rounding half up.
pub fn seconds_to_minutes(seconds: u32) -> u32 {
    // (u32::MAX + 30) / 60 fits comfortably in u32.
    ((u64::from(seconds) + 30) / 60) as u32
}

fn percent_of(count: u32, pct: u64) -> u32 {
    // Both inputs are bounded so the product cannot overflow u64.
    (u64::from(count) * pct / 100) as u32
}

fn fold_topics(state: &mut ProgressState, session: &SessionResult) {
    for result in &session.question_results {
        let Some(topic) = result.topic_name.as_deref() else {
            continue;
        };

        let entry = state
            .topic_progress
            .entry(topic.to_string())
            .or_insert_with(|| TopicProgress {
                topic_name: topic.to_string(),
                total_questions: 0,
                correct_answers: 0,
                incorrect_answers: 0,
                accuracy: 0.0,
                last_studied: session.completed_at,
            });

        entry.total_questions = entry.total_questions.saturating_add(1);
        if result.is_correct {
            entry.correct_answers = entry.correct_answers.saturating_add(1);
        } else {
            entry.incorrect_answers = entry.incorrect_answers.saturating_add(1);
        }
        entry.accuracy = accuracy(entry.correct_answers, entry.total_questions);
        entry.last_studied = session.completed_at;
    }
}

/// Every question in the session is credited to every listed document.
/// Only single-document sessions give a true per-document figure.
fn fold_documents(state: &mut ProgressState, session: &SessionResult) {
    let answered = u32::try_from(session.question_results.len()).unwrap_or(u32::MAX);
    let correct = u32::try_from(
        session
            .question_results
            .iter()
            .filter(|r| r.is_correct)
            .count(),
    )
    .unwrap_or(u32::MAX);

    for document_id in &session.document_ids {
        let doc = state
            .document_progress
            .entry(document_id.clone())
            .or_insert_with(|| DocumentProgress {
                document_id: document_id.clone(),
                document_name: format!("Document {}", document_id),
                total_questions: 0,
                correct_answers: 0,
                accuracy: 0.0,
                chapters_studied: Vec::new(),
                last_studied: session.completed_at,
                is_completed: false,
            });

        doc.total_questions = doc.total_questions.saturating_add(answered);
        doc.correct_answers = doc.correct_answers.saturating_add(correct);
        doc.accuracy = accuracy(doc.correct_answers, doc.total_questions);
        doc.last_studied = session.completed_at;

        for chapter_id in session
            .question_results
            .iter()
            .filter_map(|r| r.chapter_id.as_ref())
        {
            if !doc.chapters_studied.contains(chapter_id) {
                doc.chapters_studied.push(chapter_id.clone());
            }
        }
    }
}
