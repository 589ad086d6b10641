use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of an exercise. Determines how answers are collected and matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseKind {
    TranslateToTarget,
    TranslateToSource,
    SelectMeaning,
    ListenAndType,
    FillInTheBlank,
    #[serde(rename = "CHOOSE_THE_CORRECT_TRANSLATION")]
    ChooseCorrectTranslation,
}

impl ExerciseKind {
    /// Answer is one of the offered options, matched exactly.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            ExerciseKind::SelectMeaning | ExerciseKind::ChooseCorrectTranslation
        )
    }

    /// Answer is assembled from word-bank tokens.
    pub fn is_word_bank(&self) -> bool {
        matches!(
            self,
            ExerciseKind::TranslateToTarget
                | ExerciseKind::TranslateToSource
                | ExerciseKind::ListenAndType
        )
    }

    /// Answer is typed free text.
    pub fn is_free_text(&self) -> bool {
        matches!(self, ExerciseKind::FillInTheBlank)
    }
}

/// A single question with its expected answer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    pub prompt: String,
    pub correct_answer: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

impl Exercise {
    pub fn new(
        id: u32,
        kind: ExerciseKind,
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            prompt: prompt.into(),
            correct_answer: correct_answer.into(),
            options: Vec::new(),
            translation: None,
            explanation: None,
            pronunciation: None,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_pronunciation(mut self, pronunciation: impl Into<String>) -> Self {
        self.pronunciation = Some(pronunciation.into());
        self
    }

    /// Check the shape contract a session relies on.
    pub fn validate(&self) -> Result<(), LessonError> {
        if self.correct_answer.trim().is_empty() {
            return Err(LessonError::MissingAnswer { exercise: self.id });
        }
        if (self.kind.is_choice() || self.kind.is_word_bank()) && self.options.is_empty() {
            return Err(LessonError::MissingOptions { exercise: self.id });
        }
        if self.kind.is_choice() && !self.options.iter().any(|o| o == &self.correct_answer) {
            return Err(LessonError::AnswerNotOffered { exercise: self.id });
        }
        Ok(())
    }
}

/// Lesson difficulty tier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(LessonError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Where a lesson's exercises came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonSource {
    Provider,
    Cache,
    /// Static degraded content served when the provider is unavailable.
    Fallback,
}

/// Cache and lesson key for a topic at a difficulty: `topic-difficulty`.
pub fn composite_key(topic_id: &str, difficulty: Difficulty) -> String {
    format!("{topic_id}-{difficulty}")
}

/// An ordered, fixed set of exercises for one topic and difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    /// Bare topic id, used for mastery tracking.
    pub topic_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    pub exercises: Vec<Exercise>,
    #[serde(default = "default_source")]
    pub source: LessonSource,
}

fn default_source() -> LessonSource {
    LessonSource::Cache
}

impl Lesson {
    pub fn new(
        topic_id: impl Into<String>,
        title: impl Into<String>,
        difficulty: Difficulty,
        exercises: Vec<Exercise>,
        source: LessonSource,
    ) -> Self {
        let topic_id = topic_id.into();
        Self {
            id: composite_key(&topic_id, difficulty),
            topic_id,
            title: title.into(),
            description: String::new(),
            difficulty,
            exercises,
            source,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn exercise(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    /// Refuse lessons that cannot be played to the end.
    pub fn validate(&self) -> Result<(), LessonError> {
        if self.exercises.is_empty() {
            return Err(LessonError::NoExercises(self.id.clone()));
        }
        self.exercises.iter().try_for_each(Exercise::validate)
    }
}

/// Shape violations in lesson content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LessonError {
    #[error("lesson {0} has no exercises")]
    NoExercises(String),
    #[error("exercise {exercise} has no correct answer")]
    MissingAnswer { exercise: u32 },
    #[error("exercise {exercise} requires options but has none")]
    MissingOptions { exercise: u32 },
    #[error("exercise {exercise} does not offer its correct answer")]
    AnswerNotOffered { exercise: u32 },
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("malformed exercise payload: {0}")]
    Malformed(String),
}

/// Parse a provider's JSON exercise array.
pub fn parse_exercises(json: &str) -> Result<Vec<Exercise>, LessonError> {
    serde_json::from_str(json).map_err(|e| LessonError::Malformed(e.to_string()))
}
