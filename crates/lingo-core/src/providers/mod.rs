use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::exercise::{Difficulty, Exercise, ExerciseKind, Lesson, LessonSource};

/// Topic id carried by review lessons. Review sessions never advance mastery.
pub const PRACTICE_TOPIC: &str = "practice";

/// What to ask the content provider for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentRequest {
    Lesson {
        language: String,
        topic: String,
        difficulty: Difficulty,
        count: u32,
    },
    /// Review across several topics the learner has already seen.
    Practice {
        language: String,
        topics: Vec<String>,
        difficulty: Difficulty,
        count: u32,
    },
}

impl ContentRequest {
    pub fn lesson(language: impl Into<String>, topic: impl Into<String>, difficulty: Difficulty) -> Self {
        ContentRequest::Lesson {
            language: language.into(),
            topic: topic.into(),
            difficulty,
            count: 5,
        }
    }

    pub fn practice(language: impl Into<String>, topics: Vec<String>, difficulty: Difficulty) -> Self {
        ContentRequest::Practice {
            language: language.into(),
            topics,
            difficulty,
            count: 5,
        }
    }

    pub fn with_count(mut self, n: u32) -> Self {
        match &mut self {
            ContentRequest::Lesson { count, .. } | ContentRequest::Practice { count, .. } => {
                *count = n
            }
        }
        self
    }

    pub fn language(&self) -> &str {
        match self {
            ContentRequest::Lesson { language, .. } | ContentRequest::Practice { language, .. } => {
                language
            }
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            ContentRequest::Lesson { difficulty, .. }
            | ContentRequest::Practice { difficulty, .. } => *difficulty,
        }
    }

    /// Instruction text for a generative backend.
    pub fn prompt(&self) -> String {
        let (language, subject, difficulty, count) = match self {
            ContentRequest::Lesson {
                language,
                topic,
                difficulty,
                count,
            } => (language, format!("The topic is \"{topic}\"."), difficulty, count),
            ContentRequest::Practice {
                language,
                topics,
                difficulty,
                count,
            } => (
                language,
                format!("Review these topics: {}.", topics.join(", ")),
                difficulty,
                count,
            ),
        };
        format!(
            "Create a list of {count} language learning exercises for a {difficulty} level \
             student learning {language}. {subject}\n\
             Vary the exercise types: TRANSLATE_TO_TARGET and TRANSLATE_TO_SOURCE with a word \
             bank including distractors, SELECT_MEANING as multiple choice. Every exercise needs \
             id, type, prompt, correctAnswer, options, translation and explanation."
        )
    }
}

/// Errors from content and speech providers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    RequestFailed(String),
    #[error("provider returned invalid response: {0}")]
    InvalidResponse(String),
    #[error("provider rate limited")]
    RateLimited,
    #[error("provider authentication failed")]
    AuthenticationFailed,
    #[error("provider timeout")]
    Timeout,
}

impl ProviderError {
    /// Worth another attempt. Bad credentials and bad payloads are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RequestFailed(_) | ProviderError::RateLimited | ProviderError::Timeout
        )
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

/// Exponential backoff for content generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Minimum wait after a rate-limit response.
    #[serde(default = "default_rate_limit_floor_ms")]
    pub rate_limit_floor_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_backoff_ms() -> u64 {
    1000
}
fn default_rate_limit_floor_ms() -> u64 {
    5000
}
fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            rate_limit_floor_ms: default_rate_limit_floor_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (0-based) after `err`.
    pub fn delay_for(&self, retry: u32, err: &ProviderError) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let mut ms = self
            .base_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        if err.is_rate_limit() {
            ms = ms.max(self.rate_limit_floor_ms);
        }
        Duration::from_millis(ms)
    }

    /// Should attempt number `attempt` (1-based) be followed by another?
    pub fn should_retry(&self, attempt: u32, err: &ProviderError) -> bool {
        err.is_retryable() && attempt < self.max_attempts
    }
}

/// Static exercises served when generation is unavailable.
pub fn fallback_exercises() -> Vec<Exercise> {
    vec![Exercise::new(1, ExerciseKind::TranslateToTarget, "Hello", "Hola")
        .with_options(["Hola", "Adios", "Gato", "Perro"])
        .with_translation("Hello")
        .with_explanation("'Hola' is the standard greeting for 'Hello' in Spanish.")]
}

/// Degraded lesson for `topic_id`, tagged so callers can tell it apart from generated content.
pub fn fallback_lesson(topic_id: &str, title: &str, difficulty: Difficulty) -> Lesson {
    Lesson::new(
        topic_id,
        title,
        difficulty,
        fallback_exercises(),
        LessonSource::Fallback,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let err = ProviderError::Timeout;
        assert_eq!(policy.delay_for(0, &err), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1, &err), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2, &err), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(10, &err), Duration::from_millis(30_000));
        assert_eq!(policy.delay_for(200, &err), Duration::from_millis(30_000));
    }

    #[test]
    fn test_rate_limit_floor() {
        let policy = RetryPolicy::default();
        let err = ProviderError::RateLimited;
        assert_eq!(policy.delay_for(0, &err), Duration::from_millis(5000));
        assert_eq!(policy.delay_for(3, &err), Duration::from_millis(8000));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(1, &ProviderError::Timeout));
        assert!(policy.should_retry(2, &ProviderError::RateLimited));
        assert!(!policy.should_retry(3, &ProviderError::Timeout));
        assert!(!policy.should_retry(1, &ProviderError::AuthenticationFailed));
        assert!(!policy.should_retry(1, &ProviderError::InvalidResponse("x".into())));
    }

    #[test]
    fn test_fallback_lesson_is_tagged_and_playable() {
        let lesson = fallback_lesson("greetings", "Greetings", Difficulty::Beginner);
        assert_eq!(lesson.source, LessonSource::Fallback);
        assert_eq!(lesson.id, "greetings-beginner");
        assert_eq!(lesson.len(), 1);
        assert!(lesson.validate().is_ok());
    }

    #[test]
    fn test_request_prompt() {
        let req = ContentRequest::lesson("Spanish", "Food", Difficulty::Intermediate).with_count(7);
        let prompt = req.prompt();
        assert!(prompt.contains("7 language learning exercises"));
        assert!(prompt.contains("intermediate level"));
        assert!(prompt.contains("\"Food\""));

        let practice = ContentRequest::practice(
            "French",
            vec!["food".into(), "travel".into()],
            Difficulty::Beginner,
        );
        assert_eq!(practice.language(), "French");
        assert!(practice.prompt().contains("food, travel"));
    }
}
