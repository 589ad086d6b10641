use chrono::NaiveDate;

use crate::progress::UserState;

/// What a cold-start rollover did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// Already active today, or the stored date is ahead of `today`.
    SameDay,
    /// Last active yesterday; streak carries on.
    Continued,
    /// Missed days covered by the armed freeze, which is now spent.
    FreezeUsed,
    /// Missed days broke the streak.
    StreakReset { previous: u32 },
}

/// Start-of-day bookkeeping. Resets the daily XP counter on a new day and
/// breaks the streak if the learner skipped a day without a freeze.
pub fn rollover(state: &UserState, today: NaiveDate) -> (UserState, RolloverOutcome) {
    if state.last_active_date >= today {
        return (state.clone(), RolloverOutcome::SameDay);
    }

    let mut next = state.clone();
    next.daily_xp = 0;
    next.last_active_date = today;

    let outcome = if today.pred_opt() == Some(state.last_active_date) {
        RolloverOutcome::Continued
    } else if state.streak_freeze_active {
        next.streak_freeze_active = false;
        RolloverOutcome::FreezeUsed
    } else {
        next.streak = 1;
        next.last_lesson_date = None;
        RolloverOutcome::StreakReset {
            previous: state.streak,
        }
    };
    (next, outcome)
}
