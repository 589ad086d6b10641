use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exercise::{Exercise, ExerciseKind, Lesson, LessonError};
use crate::matcher;
use crate::scoring::{ScoringPolicy, SessionResult, TimerReading};
use crate::word_bank::WordSelection;

/// Phase of the lesson session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Awaiting an answer for the current exercise.
    Idle,
    Correct,
    Wrong,
    Complete,
    /// Completed and its result already folded into progress.
    Recorded,
    TimeUp,
    Exited,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionPhase::Complete
                | SessionPhase::Recorded
                | SessionPhase::TimeUp
                | SessionPhase::Exited
        )
    }

    pub fn is_feedback(&self) -> bool {
        matches!(self, SessionPhase::Correct | SessionPhase::Wrong)
    }
}

/// User actions and timer events, named in transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Edit,
    Submit,
    Skip,
    Advance,
    Tick,
    Expire,
    Exit,
    Finish,
    Record,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Edit => "edit",
            Action::Submit => "submit",
            Action::Skip => "skip",
            Action::Advance => "advance",
            Action::Tick => "tick",
            Action::Expire => "expire",
            Action::Exit => "exit",
            Action::Finish => "finish",
            Action::Record => "record",
        };
        f.write_str(name)
    }
}

/// Errors from session transitions. A failed transition leaves the state as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("lesson rejected: {0}")]
    InvalidLesson(#[from] LessonError),
    #[error("cannot {action} while {phase:?}")]
    InvalidTransition { action: Action, phase: SessionPhase },
    #[error("answer is empty")]
    EmptyAnswer,
    #[error("timer mode is not enabled")]
    TimerDisabled,
    #[error("state does not belong to this lesson")]
    LessonMismatch,
}

/// How a session is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub starting_hearts: u32,
    /// Countdown budget; `None` plays without a timer.
    pub timer_budget_secs: Option<u32>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            starting_hearts: 5,
            timer_budget_secs: None,
        }
    }
}

/// Per-exercise input, cleared on advance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub choice: Option<String>,
    pub words: WordSelection,
    pub text: String,
}

impl Draft {
    /// Build the submission string for an exercise of `kind`.
    pub fn answer(&self, kind: ExerciseKind) -> String {
        match kind {
            ExerciseKind::SelectMeaning | ExerciseKind::ChooseCorrectTranslation => {
                self.choice.clone().unwrap_or_default()
            }
            ExerciseKind::TranslateToTarget
            | ExerciseKind::TranslateToSource
            | ExerciseKind::ListenAndType => self.words.joined(),
            ExerciseKind::FillInTheBlank => self.text.clone(),
        }
    }

    /// Whether there is anything to check.
    pub fn is_ready(&self, kind: ExerciseKind) -> bool {
        !self.answer(kind).trim().is_empty()
    }
}

/// Shown after a submit or skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub hearts: u32,
    /// Hearts hit zero on this answer. Reported only; the session continues.
    pub hearts_exhausted: bool,
}

/// Where `advance` led.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advanced {
    Next { index: usize },
    Complete,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining_secs: u32 },
    Expired,
    /// Session is terminal or untimed; the countdown should stop.
    Stopped,
}

/// Mutable progress of one lesson attempt. Serializable so a session can be
/// snapshotted and resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub lesson_id: String,
    pub lesson_len: usize,
    pub current_index: usize,
    pub hearts: u32,
    pub correct_count: u32,
    pub mistake_count: u32,
    pub timer_budget_secs: Option<u32>,
    pub time_remaining: u32,
    pub phase: SessionPhase,
    pub draft: Draft,
}

impl SessionState {
    /// Validate the lesson and start at its first exercise.
    pub fn start(lesson: &Lesson, options: SessionOptions) -> Result<Self, SessionError> {
        lesson.validate()?;
        Ok(Self {
            lesson_id: lesson.id.clone(),
            lesson_len: lesson.len(),
            current_index: 0,
            hearts: options.starting_hearts,
            correct_count: 0,
            mistake_count: 0,
            timer_budget_secs: options.timer_budget_secs,
            time_remaining: options.timer_budget_secs.unwrap_or(0),
            phase: SessionPhase::Idle,
            draft: Draft::default(),
        })
    }

    pub fn is_timed(&self) -> bool {
        self.timer_budget_secs.is_some()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.lesson_len
    }

    /// Seconds used so far in timer mode, 0 otherwise.
    pub fn time_taken(&self) -> u32 {
        self.timer_budget_secs
            .map(|budget| budget.saturating_sub(self.time_remaining))
            .unwrap_or(0)
    }

    /// Fraction of exercises already passed, for a progress bar.
    pub fn progress(&self) -> f64 {
        if self.lesson_len == 0 {
            return 0.0;
        }
        let done = if self.phase == SessionPhase::Complete {
            self.lesson_len
        } else {
            self.current_index
        };
        done as f64 / self.lesson_len as f64
    }

    fn require(&self, action: Action, allowed: bool) -> Result<(), SessionError> {
        if allowed {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    fn current<'a>(&self, lesson: &'a Lesson) -> Result<&'a Exercise, SessionError> {
        if lesson.id != self.lesson_id || lesson.len() != self.lesson_len {
            return Err(SessionError::LessonMismatch);
        }
        lesson
            .exercise(self.current_index)
            .ok_or(SessionError::LessonMismatch)
    }

    fn record_mistake(&mut self) -> bool {
        self.mistake_count += 1;
        if self.is_timed() || self.hearts == 0 {
            return false;
        }
        self.hearts -= 1;
        self.hearts == 0
    }

    fn feedback(&self, exercise: &Exercise, correct: bool, exhausted: bool) -> Feedback {
        Feedback {
            correct,
            correct_answer: exercise.correct_answer.clone(),
            explanation: exercise.explanation.clone(),
            hearts: self.hearts,
            hearts_exhausted: exhausted,
        }
    }

    /// Check `answer` against the current exercise.
    pub fn submit(&mut self, lesson: &Lesson, answer: &str) -> Result<Feedback, SessionError> {
        self.require(Action::Submit, self.phase == SessionPhase::Idle)?;
        let exercise = self.current(lesson)?;
        if answer.trim().is_empty() {
            return Err(SessionError::EmptyAnswer);
        }

        if matcher::matches(exercise, answer) {
            self.correct_count += 1;
            self.phase = SessionPhase::Correct;
            Ok(self.feedback(exercise, true, false))
        } else {
            let exhausted = self.record_mistake();
            self.phase = SessionPhase::Wrong;
            Ok(self.feedback(exercise, false, exhausted))
        }
    }

    /// Submit whatever the draft holds for the current exercise.
    pub fn submit_draft(&mut self, lesson: &Lesson) -> Result<Feedback, SessionError> {
        self.require(Action::Submit, self.phase == SessionPhase::Idle)?;
        let answer = self.draft.answer(self.current(lesson)?.kind);
        self.submit(lesson, &answer)
    }

    /// Give up on the current exercise. Always a mistake; reveals the answer.
    pub fn skip(&mut self, lesson: &Lesson) -> Result<Feedback, SessionError> {
        self.require(Action::Skip, self.phase == SessionPhase::Idle)?;
        let exercise = self.current(lesson)?;
        let exhausted = self.record_mistake();
        self.phase = SessionPhase::Wrong;
        Ok(self.feedback(exercise, false, exhausted))
    }

    /// Leave the feedback screen.
    pub fn advance(&mut self) -> Result<Advanced, SessionError> {
        self.require(Action::Advance, self.phase.is_feedback())?;
        if self.is_last() {
            self.phase = SessionPhase::Complete;
            return Ok(Advanced::Complete);
        }
        self.current_index += 1;
        self.draft = Draft::default();
        self.phase = SessionPhase::Idle;
        Ok(Advanced::Next {
            index: self.current_index,
        })
    }

    /// One second of countdown. Expires the session when time runs out.
    pub fn tick(&mut self) -> Tick {
        if !self.is_timed() || self.phase.is_terminal() {
            return Tick::Stopped;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.phase = SessionPhase::TimeUp;
            return Tick::Expired;
        }
        Tick::Running {
            remaining_secs: self.time_remaining,
        }
    }

    /// Countdown reached zero.
    pub fn time_expire(&mut self) -> Result<(), SessionError> {
        if !self.is_timed() {
            return Err(SessionError::TimerDisabled);
        }
        self.require(Action::Expire, !self.phase.is_terminal())?;
        self.phase = SessionPhase::TimeUp;
        Ok(())
    }

    /// Abandon the attempt. No XP is awarded.
    pub fn exit(&mut self) -> Result<(), SessionError> {
        self.require(
            Action::Exit,
            !matches!(
                self.phase,
                SessionPhase::Complete | SessionPhase::Recorded | SessionPhase::Exited
            ),
        )?;
        self.phase = SessionPhase::Exited;
        Ok(())
    }

    /// Score a completed session.
    pub fn finish(&self, policy: &ScoringPolicy) -> Result<SessionResult, SessionError> {
        self.require(Action::Finish, self.phase == SessionPhase::Complete)?;
        let timer = self.timer_budget_secs.map(|budget| TimerReading {
            budget_secs: budget,
            remaining_secs: self.time_remaining,
        });
        Ok(policy.compute(self.correct_count, self.mistake_count, timer))
    }

    /// Score a completed session and mark it recorded. Succeeds once.
    pub fn record(&mut self, policy: &ScoringPolicy) -> Result<SessionResult, SessionError> {
        self.require(Action::Record, self.phase == SessionPhase::Complete)?;
        let result = self.finish(policy)?;
        self.phase = SessionPhase::Recorded;
        Ok(result)
    }

    pub fn select_option(&mut self, option: impl Into<String>) -> Result<(), SessionError> {
        self.require(Action::Edit, self.phase == SessionPhase::Idle)?;
        self.draft.choice = Some(option.into());
        Ok(())
    }

    /// Move bank slot `slot` into the selection. Returns false for a used slot.
    pub fn pick_word(&mut self, lesson: &Lesson, slot: usize) -> Result<bool, SessionError> {
        self.require(Action::Edit, self.phase == SessionPhase::Idle)?;
        let exercise = self.current(lesson)?;
        Ok(self.draft.words.pick(&exercise.options, slot))
    }

    pub fn remove_word(&mut self, position: usize) -> Result<Option<String>, SessionError> {
        self.require(Action::Edit, self.phase == SessionPhase::Idle)?;
        Ok(self.draft.words.remove(position))
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.require(Action::Edit, self.phase == SessionPhase::Idle)?;
        self.draft.text = text.into();
        Ok(())
    }

    /// The check action is available only with a non-empty draft.
    pub fn can_check(&self, lesson: &Lesson) -> bool {
        self.phase == SessionPhase::Idle
            && self
                .current(lesson)
                .map(|ex| self.draft.is_ready(ex.kind))
                .unwrap_or(false)
    }
}

/// A lesson together with the state of one attempt at it.
#[derive(Debug, Clone)]
pub struct LessonSession {
    lesson: Lesson,
    state: SessionState,
    policy: ScoringPolicy,
}

impl LessonSession {
    pub fn start(lesson: Lesson, options: SessionOptions) -> Result<Self, SessionError> {
        let state = SessionState::start(&lesson, options)?;
        Ok(Self {
            lesson,
            state,
            policy: ScoringPolicy::default(),
        })
    }

    /// Continue from a snapshot taken with [`LessonSession::state`].
    pub fn resume(lesson: Lesson, state: SessionState) -> Result<Self, SessionError> {
        lesson.validate()?;
        if lesson.id != state.lesson_id || lesson.len() != state.lesson_len {
            return Err(SessionError::LessonMismatch);
        }
        Ok(Self {
            lesson,
            state,
            policy: ScoringPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.lesson.exercise(self.state.current_index)
    }

    pub fn submit(&mut self, answer: &str) -> Result<Feedback, SessionError> {
        self.state.submit(&self.lesson, answer)
    }

    pub fn submit_draft(&mut self) -> Result<Feedback, SessionError> {
        self.state.submit_draft(&self.lesson)
    }

    pub fn skip(&mut self) -> Result<Feedback, SessionError> {
        self.state.skip(&self.lesson)
    }

    pub fn advance(&mut self) -> Result<Advanced, SessionError> {
        self.state.advance()
    }

    pub fn tick(&mut self) -> Tick {
        self.state.tick()
    }

    pub fn time_expire(&mut self) -> Result<(), SessionError> {
        self.state.time_expire()
    }

    pub fn exit(&mut self) -> Result<(), SessionError> {
        self.state.exit()
    }

    pub fn select_option(&mut self, option: impl Into<String>) -> Result<(), SessionError> {
        self.state.select_option(option)
    }

    pub fn pick_word(&mut self, slot: usize) -> Result<bool, SessionError> {
        self.state.pick_word(&self.lesson, slot)
    }

    pub fn remove_word(&mut self, position: usize) -> Result<Option<String>, SessionError> {
        self.state.remove_word(position)
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.state.set_text(text)
    }

    pub fn can_check(&self) -> bool {
        self.state.can_check(&self.lesson)
    }

    /// Score the session once it reached `Complete`.
    pub fn result(&self) -> Result<SessionResult, SessionError> {
        self.state.finish(&self.policy)
    }

    /// Score the session and mark it recorded so it cannot be applied twice.
    pub fn record(&mut self) -> Result<SessionResult, SessionError> {
        self.state.record(&self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{Difficulty, LessonSource};

    fn five_exercise_lesson() -> Lesson {
        let exercises = vec![
            Exercise::new(1, ExerciseKind::TranslateToTarget, "I eat bread", "Yo como pan")
                .with_options(["pan", "Yo", "agua", "como"]),
            Exercise::new(2, ExerciseKind::SelectMeaning, "gato", "cat")
                .with_options(["dog", "cat"]),
            Exercise::new(3, ExerciseKind::FillInTheBlank, "Ella ___ agua", "bebe"),
            Exercise::new(4, ExerciseKind::TranslateToSource, "La casa", "The house")
                .with_options(["house", "The", "car"]),
            Exercise::new(5, ExerciseKind::ChooseCorrectTranslation, "Thank you", "Gracias")
                .with_options(["Gracias", "Hola"])
                .with_explanation("Standard way to say thanks."),
        ];
        Lesson::new("basics", "Basics", Difficulty::Beginner, exercises, LessonSource::Provider)
    }

    const ANSWERS: [&str; 5] = ["yo como pan", "cat", "bebe", "the house", "Gracias"];

    fn untimed() -> SessionOptions {
        SessionOptions::default()
    }

    fn timed(budget: u32) -> SessionOptions {
        SessionOptions {
            starting_hearts: 5,
            timer_budget_secs: Some(budget),
        }
    }

    #[test]
    fn test_start_rejects_malformed_lesson() {
        let mut lesson = five_exercise_lesson();
        lesson.exercises[1].options.clear();
        let err = LessonSession::start(lesson, untimed()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidLesson(LessonError::MissingOptions { exercise: 2 })));
    }

    #[test]
    fn test_perfect_untimed_run() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        for (i, answer) in ANSWERS.iter().enumerate() {
            let fb = session.submit(answer).unwrap();
            assert!(fb.correct, "exercise {i} should be correct");
            let next = session.advance().unwrap();
            if i < 4 {
                assert_eq!(next, Advanced::Next { index: i + 1 });
            } else {
                assert_eq!(next, Advanced::Complete);
            }
        }
        let state = session.state();
        assert_eq!(state.hearts, 5);
        assert_eq!(state.correct_count, 5);
        assert_eq!(state.mistake_count, 0);

        let result = session.result().unwrap();
        assert_eq!(result.xp, 15);
        assert!(result.is_perfect);
        assert_eq!(result.time_seconds, 0);
    }

    #[test]
    fn test_two_wrong_answers_cost_two_hearts() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        let answers = ["yo como agua", "cat", "come", "the house", "Gracias"];
        for answer in answers {
            session.submit(answer).unwrap();
            session.advance().unwrap();
        }
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.state().hearts, 3);
        assert_eq!(session.state().mistake_count, 2);
        let result = session.result().unwrap();
        assert!(!result.is_perfect);
        assert_eq!(result.xp, 5 + 2 * 3);
    }

    #[test]
    fn test_skip_is_always_a_mistake() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        let fb = session.skip().unwrap();
        assert!(!fb.correct);
        assert_eq!(fb.correct_answer, "Yo como pan");
        assert_eq!(session.phase(), SessionPhase::Wrong);
        assert_eq!(session.state().mistake_count, 1);
        assert_eq!(session.state().correct_count, 0);
        assert_eq!(session.state().hearts, 4);
    }

    #[test]
    fn test_timer_mode_spends_no_hearts() {
        let mut session = LessonSession::start(five_exercise_lesson(), timed(120)).unwrap();
        session.submit("agua").unwrap();
        session.advance().unwrap();
        session.skip().unwrap();
        assert_eq!(session.state().hearts, 5);
        assert_eq!(session.state().mistake_count, 2);
    }

    #[test]
    fn test_hearts_floor_at_zero_and_flow_continues() {
        let opts = SessionOptions {
            starting_hearts: 1,
            timer_budget_secs: None,
        };
        let mut session = LessonSession::start(five_exercise_lesson(), opts).unwrap();
        let fb = session.submit("wrong").unwrap();
        assert!(fb.hearts_exhausted);
        assert_eq!(fb.hearts, 0);
        session.advance().unwrap();

        let fb = session.skip().unwrap();
        assert_eq!(fb.hearts, 0);
        assert!(!fb.hearts_exhausted);
        // Zero hearts never blocks progress.
        assert_eq!(session.advance().unwrap(), Advanced::Next { index: 2 });
        assert_eq!(session.state().hearts, 0);
    }

    #[test]
    fn test_submit_only_when_idle() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        session.submit("yo como pan").unwrap();
        let err = session.submit("yo como pan").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                action: Action::Submit,
                phase: SessionPhase::Correct
            }
        );
        assert!(session.skip().is_err());
        assert_eq!(session.state().correct_count, 1);
    }

    #[test]
    fn test_empty_answer_rejected_without_side_effects() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        assert_eq!(session.submit("  ").unwrap_err(), SessionError::EmptyAnswer);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.state().mistake_count, 0);
        assert!(!session.can_check());
    }

    #[test]
    fn test_advance_requires_feedback() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        assert!(session.advance().is_err());
    }

    #[test]
    fn test_complete_reached_once() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        for answer in ANSWERS {
            session.submit(answer).unwrap();
            session.advance().unwrap();
        }
        assert_eq!(session.phase(), SessionPhase::Complete);
        let err = session.advance().unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { action: Action::Advance, .. }));
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert!(session.exit().is_err());
    }

    #[test]
    fn test_tallies_never_exceed_answered_exercises() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        for (i, answer) in ["x", "cat", "y", "the house", "z"].iter().enumerate() {
            session.submit(answer).unwrap();
            let s = session.state();
            assert!((s.correct_count + s.mistake_count) as usize <= s.current_index + 1);
            assert_eq!((s.correct_count + s.mistake_count) as usize, i + 1);
            session.advance().unwrap();
        }
    }

    #[test]
    fn test_timer_expires_to_time_up() {
        let mut session = LessonSession::start(five_exercise_lesson(), timed(120)).unwrap();
        session.submit("yo como pan").unwrap();
        session.advance().unwrap();

        let mut last = Tick::Stopped;
        for _ in 0..120 {
            last = session.tick();
        }
        assert_eq!(last, Tick::Expired);
        assert_eq!(session.phase(), SessionPhase::TimeUp);
        assert_eq!(session.state().time_remaining, 0);

        // Frozen: further ticks do nothing, and there is no XP path.
        assert_eq!(session.tick(), Tick::Stopped);
        assert!(session.advance().is_err());
        assert!(session.result().is_err());
        // "Try again" leaves via exit.
        assert!(session.exit().is_ok());
    }

    #[test]
    fn test_countdown_runs_during_feedback() {
        let mut session = LessonSession::start(five_exercise_lesson(), timed(60)).unwrap();
        session.submit("yo como pan").unwrap();
        assert_eq!(session.tick(), Tick::Running { remaining_secs: 59 });
        assert_eq!(session.state().time_taken(), 1);
    }

    #[test]
    fn test_untimed_session_ignores_ticks() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        assert_eq!(session.tick(), Tick::Stopped);
        assert_eq!(session.time_expire().unwrap_err(), SessionError::TimerDisabled);
        assert_eq!(session.state().time_taken(), 0);
    }

    #[test]
    fn test_timed_completion_scores_speed_bonus() {
        let mut session = LessonSession::start(five_exercise_lesson(), timed(120)).unwrap();
        for answer in ANSWERS {
            for _ in 0..9 {
                session.tick();
            }
            session.submit(answer).unwrap();
            session.advance().unwrap();
        }
        assert_eq!(session.tick(), Tick::Stopped);
        let result = session.result().unwrap();
        // 45s used, 75 remaining → 15 bonus.
        assert_eq!(result.time_seconds, 45);
        assert_eq!(result.xp, 5 + 10 + 15);
        assert!(result.timed);
    }

    #[test]
    fn test_exit_abandons_without_result() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        session.submit("yo como pan").unwrap();
        session.exit().unwrap();
        assert_eq!(session.phase(), SessionPhase::Exited);
        assert!(session.result().is_err());
        assert!(session.submit("cat").is_err());
    }

    #[test]
    fn test_record_succeeds_once() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        for answer in ANSWERS {
            session.submit(answer).unwrap();
            session.advance().unwrap();
        }
        assert_eq!(session.record().unwrap().xp, 15);
        assert_eq!(session.phase(), SessionPhase::Recorded);
        assert!(session.phase().is_terminal());

        let err = session.record().unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                action: Action::Record,
                phase: SessionPhase::Recorded,
            }
        );
        assert!(session.exit().is_err());
        assert_eq!(session.tick(), Tick::Stopped);
    }

    #[test]
    fn test_draft_word_bank_flow() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        assert!(!session.can_check());
        // Bank: ["pan", "Yo", "agua", "como"]
        assert!(session.pick_word(1).unwrap());
        assert!(session.pick_word(3).unwrap());
        assert!(!session.pick_word(3).unwrap());
        assert!(session.pick_word(0).unwrap());
        assert!(session.can_check());
        let fb = session.submit_draft().unwrap();
        assert!(fb.correct);

        session.advance().unwrap();
        assert!(session.state().draft.words.is_empty());
        session.select_option("cat").unwrap();
        assert!(session.submit_draft().unwrap().correct);
    }

    #[test]
    fn test_draft_locked_outside_idle() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        session.skip().unwrap();
        assert!(session.pick_word(0).is_err());
        assert!(session.set_text("x").is_err());
    }

    #[test]
    fn test_free_text_draft() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        session.skip().unwrap();
        session.advance().unwrap();
        session.skip().unwrap();
        session.advance().unwrap();
        session.set_text(" Bebe ").unwrap();
        assert!(session.submit_draft().unwrap().correct);
    }

    #[test]
    fn test_snapshot_and_resume() {
        let lesson = five_exercise_lesson();
        let mut session = LessonSession::start(lesson.clone(), untimed()).unwrap();
        session.submit("wrong").unwrap();
        session.advance().unwrap();

        let json = serde_json::to_string(session.state()).unwrap();
        let state: SessionState = serde_json::from_str(&json).unwrap();
        let mut resumed = LessonSession::resume(lesson, state).unwrap();
        assert_eq!(resumed.state().current_index, 1);
        assert_eq!(resumed.state().hearts, 4);
        assert!(resumed.submit("cat").unwrap().correct);
    }

    #[test]
    fn test_resume_rejects_other_lesson() {
        let lesson = five_exercise_lesson();
        let session = LessonSession::start(lesson.clone(), untimed()).unwrap();
        let mut other = lesson;
        other.id = "travel-beginner".to_string();
        assert_eq!(
            LessonSession::resume(other, session.state().clone()).unwrap_err(),
            SessionError::LessonMismatch
        );
    }

    #[test]
    fn test_progress_fraction() {
        let mut session = LessonSession::start(five_exercise_lesson(), untimed()).unwrap();
        assert_eq!(session.state().progress(), 0.0);
        session.skip().unwrap();
        session.advance().unwrap();
        assert!((session.state().progress() - 0.2).abs() < 1e-9);
    }
}
