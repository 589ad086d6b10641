//! lingo-core: lesson sessions and progress scoring for a language-learning client.
//!
//! Everything here is synchronous and side-effect free apart from the
//! [`storage::Store`] trait. A lesson is played through a
//! [`session::LessonSession`]; its [`scoring::SessionResult`] is folded into
//! [`progress::UserState`] and then scanned for [`achievements`].

pub mod achievements;
pub mod audio;
pub mod config;
pub mod daily;
pub mod exercise;
pub mod languages;
pub mod matcher;
pub mod progress;
pub mod providers;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod word_bank;

pub use achievements::{Achievement, Evaluation};
pub use config::Config;
pub use exercise::{Difficulty, Exercise, ExerciseKind, Lesson, LessonError, LessonSource};
pub use progress::{CompletionContext, UserState};
pub use providers::{ContentRequest, ProviderError, RetryPolicy};
pub use scoring::{ScoringPolicy, SessionResult};
pub use session::{LessonSession, SessionError, SessionOptions, SessionPhase};
pub use storage::{Store, StoreError};
