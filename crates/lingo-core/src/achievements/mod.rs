use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::UserState;

/// Metric an achievement tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    LessonsCompleted,
    StreakDays,
    XpEarned,
    TopicsMastered,
    PerfectLessons,
    SpeedrunLessons,
}

impl Condition {
    /// Current value of this metric for `state`.
    pub fn metric(&self, state: &UserState) -> u32 {
        match self {
            Condition::LessonsCompleted => state.completed_lessons.len() as u32,
            Condition::StreakDays => state.streak,
            Condition::XpEarned => state.xp,
            Condition::TopicsMastered => state.mastered_topics() as u32,
            Condition::PerfectLessons => state.perfect_lesson_count,
            Condition::SpeedrunLessons => state.fast_lesson_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub condition: Condition,
    pub threshold: u32,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    fn define(
        id: &str,
        title: &str,
        description: &str,
        icon: &str,
        condition: Condition,
        threshold: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            condition,
            threshold,
            unlocked: false,
            unlocked_at: None,
        }
    }

    pub fn is_met(&self, state: &UserState) -> bool {
        self.condition.metric(state) >= self.threshold
    }
}

/// Built-in achievement definitions, all locked, in display order.
pub fn catalog() -> Vec<Achievement> {
    use Condition::*;
    vec![
        Achievement::define("first_lesson", "First Steps", "Complete your first lesson", "🎯", LessonsCompleted, 1),
        Achievement::define("lesson_5", "Dedicated", "Complete 5 lessons", "📚", LessonsCompleted, 5),
        Achievement::define("scholar_1", "Scholar", "Earn 100 XP", "🎓", XpEarned, 100),
        Achievement::define("scholar_2", "Sage", "Earn 500 XP", "🧙", XpEarned, 500),
        Achievement::define("streak_3", "On Fire", "Reach a 3-day streak", "🔥", StreakDays, 3),
        Achievement::define("streak_7", "Unstoppable", "Reach a 7-day streak", "🚀", StreakDays, 7),
        Achievement::define("mastery_1", "Master Mind", "Reach level 5 in 1 topic", "👑", TopicsMastered, 1),
        Achievement::define("mastery_3", "Polyglot", "Reach level 5 in 3 topics", "🌍", TopicsMastered, 3),
        Achievement::define("perfect_1", "Sharpshooter", "Complete a lesson with no mistakes", "🏹", PerfectLessons, 1),
        Achievement::define("perfect_5", "Perfectionist", "Complete 5 perfect lessons", "💎", PerfectLessons, 5),
        Achievement::define("speed_1", "Speed Demon", "Complete a timed lesson in under 60 seconds", "⚡", SpeedrunLessons, 1),
    ]
}

/// Rebuild the catalog, carrying over unlock status from stored entries.
///
/// Definitions come from the catalog, so stored titles or thresholds never
/// override the built-in ones. Stored ids absent from the catalog are dropped.
pub fn initialize(existing: &[Achievement]) -> Vec<Achievement> {
    let stored: HashMap<&str, &Achievement> =
        existing.iter().map(|a| (a.id.as_str(), a)).collect();
    catalog()
        .into_iter()
        .map(|mut def| {
            if let Some(prev) = stored.get(def.id.as_str()) {
                def.unlocked = prev.unlocked;
                def.unlocked_at = prev.unlocked_at;
            }
            def
        })
        .collect()
}

/// Output of an evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub state: UserState,
    /// Newly unlocked achievements, in definition order.
    pub newly_unlocked: Vec<Achievement>,
}

/// Unlock every locked achievement whose threshold `state` now meets.
/// Unlocked entries pass through untouched, so a second pass finds nothing.
pub fn evaluate(state: &UserState, now: DateTime<Utc>) -> Evaluation {
    let mut next = state.clone();
    let mut newly_unlocked = Vec::new();
    for achievement in next.achievements.iter_mut() {
        if achievement.unlocked || !achievement.is_met(state) {
            continue;
        }
        achievement.unlocked = true;
        achievement.unlocked_at = Some(now);
        newly_unlocked.push(achievement.clone());
    }
    Evaluation {
        state: next,
        newly_unlocked,
    }
}
