//! crates/study_core/src/analytics.rs
//!
//! Read-only views over a `ProgressState`: per-area percentages, improvement
//! suggestions and achievements.

use crate::domain::{Achievement, ImprovementArea, ProgressAnalytics, ProgressState, SessionResult};

/// How many history entries the analytics view includes.
pub const RECENT_SESSIONS_SHOWN: usize = 10;

pub fn generate_progress_analytics(
    progress: &ProgressState,
    recent_sessions: &[SessionResult],
) -> ProgressAnalytics {
    let by_chapter = progress
        .chapter_progress
        .values()
        .map(|c| (c.chapter_id.clone(), c.accuracy.min(100.0)))
        .collect();

    let by_topic = progress
        .topic_progress
        .values()
        .map(|t| (t.topic_name.clone(), t.accuracy.min(100.0)))
        .collect();

    let improvement_areas = progress
        .weak_areas
        .iter()
        .map(|chapter_id| {
            let chapter = progress.chapter_progress.get(chapter_id);
            let current_accuracy = chapter.map(|c| c.accuracy).unwrap_or(0.0);
            ImprovementArea {
                chapter_id: chapter_id.clone(),
                chapter_title: chapter
                    .map(|c| c.chapter_title.clone())
                    .unwrap_or_else(|| "Unknown Chapter".to_string()),
                current_accuracy,
                recommended_action: recommended_action(current_accuracy).to_string(),
            }
        })
        .collect();

    let skip = recent_sessions.len().saturating_sub(RECENT_SESSIONS_SHOWN);

    ProgressAnalytics {
        overall_progress: progress.overall_accuracy.min(100.0),
        by_chapter,
        by_topic,
        recent_sessions: recent_sessions[skip..].to_vec(),
        improvement_areas,
        achievements: achievements(progress),
    }
}

pub fn recommended_action(accuracy: f64) -> &'static str {
    if accuracy < 30.0 {
        "Review fundamentals and retry easier questions"
    } else if accuracy < 50.0 {
        "Practice more questions and review explanations"
    } else if accuracy < 70.0 {
        "Focus on understanding key concepts"
    } else {
        "A few more practice questions should help"
    }
}

/// Achievements currently unlocked, stamped with the record's last update.
pub fn achievements(progress: &ProgressState) -> Vec<Achievement> {
    let rules: [(bool, &str, &str); 4] = [
        (
            progress.total_questions_answered >= 10,
            "Getting Started",
            "Answered your first 10 questions",
        ),
        (
            progress.total_questions_answered >= 100,
            "Century Club",
            "Answered 100 questions",
        ),
        (
            progress.overall_accuracy >= 80.0,
            "High Achiever",
            "Maintained 80%+ overall accuracy",
        ),
        (
            progress.strong_areas.len() >= 3,
            "Multi-Talented",
            "Mastered 3 or more chapters",
        ),
    ];

    rules
        .into_iter()
        .filter(|(unlocked, _, _)| *unlocked)
        .map(|(_, name, description)| Achievement {
            name: name.to_string(),
            description: description.to_string(),
            unlocked_at: progress.updated_at,
        })
        .collect()
}

/// Names of achievements unlocked in `after` but not in `before`.
pub fn new_achievements(before: &ProgressState, after: &ProgressState) -> Vec<String> {
    let previous: Vec<String> = achievements(before).into_iter().map(|a| a.name).collect();
    achievements(after)
        .into_iter()
        .map(|a| a.name)
        .filter(|name| !previous.contains(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChapterProgress, Difficulty, SessionType};
    use chrono::{TimeZone, Utc};

    fn state() -> ProgressState {
        ProgressState::new("u", Utc.with_ymd_and_hms(2025, 1, 5, 8, 0, 0).unwrap())
    }

    fn chapter(id: &str, accuracy: f64) -> ChapterProgress {
        ChapterProgress {
            chapter_id: id.to_string(),
            chapter_title: format!("Chapter {}", id),
            total_questions: 10,
            correct_answers: (accuracy / 10.0) as u32,
            incorrect_answers: 10 - (accuracy / 10.0) as u32,
            accuracy,
            last_studied: Utc::now(),
            difficulty_level: Difficulty::Easy,
            needs_review: accuracy < 60.0,
        }
    }

    fn history(n: usize) -> Vec<SessionResult> {
        (0..n)
            .map(|i| SessionResult {
                session_id: format!("s{}", i),
                user_id: "u".to_string(),
                session_type: SessionType::Flashcards,
                document_ids: vec![],
                question_results: vec![],
                total_questions: 0,
                correct_answers: 0,
                accuracy: 0.0,
                time_spent: 0,
                completed_at: Utc::now(),
                difficulty: Difficulty::Easy,
            })
            .collect()
    }

    #[test]
    fn fresh_state_has_no_achievements() {
        let analytics = generate_progress_analytics(&state(), &[]);
        assert!(analytics.achievements.is_empty());
        assert!(analytics.improvement_areas.is_empty());
        assert_eq!(analytics.overall_progress, 0.0);
    }

    #[test]
    fn weak_areas_become_improvement_suggestions() {
        let mut progress = state();
        progress.chapter_progress.insert("a".into(), chapter("a", 20.0));
        progress.chapter_progress.insert("b".into(), chapter("b", 40.0));
        progress.weak_areas = vec!["a".into(), "b".into(), "gone".into()];

        let analytics = generate_progress_analytics(&progress, &[]);
        let actions: Vec<&str> = analytics
            .improvement_areas
            .iter()
            .map(|a| a.recommended_action.as_str())
            .collect();
        assert_eq!(
            actions,
            vec![
                "Review fundamentals and retry easier questions",
                "Practice more questions and review explanations",
                "Review fundamentals and retry easier questions",
            ]
        );
        assert_eq!(analytics.improvement_areas[2].chapter_title, "Unknown Chapter");
        assert_eq!(analytics.by_chapter["b"], 40.0);
    }

    #[test]
    fn recommended_action_bands() {
        assert_eq!(recommended_action(55.0), "Focus on understanding key concepts");
        assert_eq!(recommended_action(70.0), "A few more practice questions should help");
    }

    #[test]
    fn only_last_ten_sessions_are_shown() {
        let analytics = generate_progress_analytics(&state(), &history(14));
        assert_eq!(analytics.recent_sessions.len(), RECENT_SESSIONS_SHOWN);
        assert_eq!(analytics.recent_sessions[0].session_id, "s4");
    }

    #[test]
    fn newly_unlocked_achievements_are_reported() {
        let before = state();
        let mut after = state();
        after.total_questions_answered = 12;
        after.total_correct_answers = 11;
        after.overall_accuracy = 91.0;
        assert_eq!(
            new_achievements(&before, &after),
            vec!["Getting Started".to_string(), "High Achiever".to_string()]
        );
        assert!(new_achievements(&after, &after).is_empty());
    }
}
