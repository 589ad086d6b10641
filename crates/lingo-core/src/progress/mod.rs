use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::achievements::{self, Achievement};
use crate::exercise::Difficulty;
use crate::scoring::SessionResult;

/// Highest mastery level a topic can reach.
pub const MAX_TOPIC_LEVEL: u8 = 5;

/// Persisted learner progress. Every update produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub hearts: u32,
    pub xp: u32,
    pub streak: u32,
    #[serde(default)]
    pub daily_xp: u32,
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    pub last_active_date: NaiveDate,
    /// Day of the most recent lesson in the current streak. `None` once the
    /// streak (re)starts, since that day already counts as day 1.
    #[serde(default)]
    pub last_lesson_date: Option<NaiveDate>,
    #[serde(default)]
    pub topic_levels: BTreeMap<String, u8>,
    #[serde(default)]
    pub completed_lessons: BTreeSet<String>,
    #[serde(default)]
    pub perfect_lesson_count: u32,
    #[serde(default)]
    pub fast_lesson_count: u32,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub streak_freeze_active: bool,
    #[serde(default = "default_language")]
    pub current_language: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub timer_enabled: bool,
}

fn default_daily_goal() -> u32 {
    50
}

fn default_language() -> String {
    "es".to_string()
}

impl UserState {
    /// Fresh learner state for someone starting on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            hearts: 5,
            xp: 0,
            streak: 1,
            daily_xp: 0,
            daily_goal: default_daily_goal(),
            last_active_date: today,
            last_lesson_date: None,
            topic_levels: BTreeMap::new(),
            completed_lessons: BTreeSet::new(),
            perfect_lesson_count: 0,
            fast_lesson_count: 0,
            achievements: achievements::catalog(),
            streak_freeze_active: false,
            current_language: default_language(),
            difficulty: Difficulty::default(),
            timer_enabled: false,
        }
    }

    pub fn topic_level(&self, topic_id: &str) -> u8 {
        self.topic_levels.get(topic_id).copied().unwrap_or(0)
    }

    /// Topics at the level cap.
    pub fn mastered_topics(&self) -> usize {
        self.topic_levels
            .values()
            .filter(|level| **level >= MAX_TOPIC_LEVEL)
            .count()
    }
}

/// Facts about the completion that the result itself does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionContext {
    pub today: NaiveDate,
    /// Result was a timed speed run.
    pub is_fast: bool,
}

/// Fold a completed session into the learner's progress.
pub fn apply_result(
    prior: &UserState,
    topic_id: &str,
    result: &SessionResult,
    ctx: CompletionContext,
) -> UserState {
    let mut next = prior.clone();
    next.xp = prior.xp.saturating_add(result.xp);
    let carried = if prior.last_active_date < ctx.today {
        0
    } else {
        prior.daily_xp
    };
    next.daily_xp = carried.saturating_add(result.xp);

    let first_today = prior.last_lesson_date != Some(ctx.today);
    if first_today && prior.last_lesson_date.is_some() {
        next.streak = prior.streak.saturating_add(1);
    }
    next.last_lesson_date = Some(ctx.today);
    next.last_active_date = ctx.today;

    let level = prior.topic_level(topic_id);
    next.topic_levels
        .insert(topic_id.to_string(), (level + 1).min(MAX_TOPIC_LEVEL));
    next.completed_lessons.insert(topic_id.to_string());

    if result.is_perfect {
        next.perfect_lesson_count += 1;
    }
    if ctx.is_fast {
        next.fast_lesson_count += 1;
    }
    next
}

/// Write a session's remaining hearts back. An empty pool refills to `max_hearts`.
pub fn settle_hearts(state: &UserState, remaining: u32, max_hearts: u32) -> UserState {
    let mut next = state.clone();
    next.hearts = if remaining == 0 {
        max_hearts
    } else {
        remaining.min(max_hearts)
    };
    next
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    #[error("streak freeze already equipped")]
    FreezeAlreadyActive,
    #[error("not enough XP: need {needed}, have {available}")]
    InsufficientXp { needed: u32, available: u32 },
}

/// Spend XP on a streak freeze, consumed by the next missed-day rollover.
pub fn buy_streak_freeze(state: &UserState, cost: u32) -> Result<UserState, ShopError> {
    if state.streak_freeze_active {
        return Err(ShopError::FreezeAlreadyActive);
    }
    if state.xp < cost {
        return Err(ShopError::InsufficientXp {
            needed: cost,
            available: state.xp,
        });
    }
    let mut next = state.clone();
    next.xp -= cost;
    next.streak_freeze_active = true;
    Ok(next)
}

/// Progress towards today's XP goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyGoal {
    pub earned: u32,
    pub goal: u32,
    pub met: bool,
    /// 0..=100
    pub percent: u8,
}

pub fn daily_goal_progress(state: &UserState) -> DailyGoal {
    let (met, percent) = if state.daily_goal == 0 {
        (true, 100)
    } else {
        let pct = (u64::from(state.daily_xp) * 100 / u64::from(state.daily_goal)).min(100);
        (state.daily_xp >= state.daily_goal, pct as u8)
    };
    DailyGoal {
        earned: state.daily_xp,
        goal: state.daily_goal,
        met,
        percent,
    }
}
