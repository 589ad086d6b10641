use thiserror::Error;

use lingo_core::config::ConfigError;
use lingo_core::progress::ShopError;
use lingo_core::{LessonError, ProviderError, SessionError, StoreError};

/// Errors surfaced by the client shell.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Generation failed after every retry. The caller may retry later or
    /// opt into the fallback lesson set.
    #[error("content unavailable for {topic}: {source}")]
    ContentUnavailable {
        topic: String,
        #[source]
        source: ProviderError,
    },

    #[error("offline and lesson {key} is not downloaded")]
    Offline { key: String },

    #[error("no completed topics to practice")]
    NothingToPractice,

    #[error("unsupported language code: {code}")]
    UnknownLanguage { code: String },

    #[error("lesson error: {0}")]
    Lesson(#[from] LessonError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("shop error: {0}")]
    Shop(#[from] ShopError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Progress could not be written. The in-memory state is still current and
/// the next successful save will carry it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("progress not saved: {0}")]
pub struct PersistWarning(pub String);

impl From<&StoreError> for PersistWarning {
    fn from(e: &StoreError) -> Self {
        PersistWarning(e.to_string())
    }
}
