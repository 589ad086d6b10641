use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::exercise::Lesson;
use crate::progress::UserState;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for learner progress and downloaded lessons.
///
/// Lessons are keyed by language code, then by composite key
/// (`topic-difficulty`).
pub trait Store {
    fn load_user_state(&self) -> Result<Option<UserState>, StoreError>;

    /// Replace the stored snapshot. Never leaves a partial write behind.
    fn save_user_state(&mut self, state: &UserState) -> Result<(), StoreError>;

    fn get_cached_lesson(&self, language: &str, key: &str) -> Result<Option<Lesson>, StoreError>;

    fn save_cached_lesson(&mut self, language: &str, lesson: &Lesson) -> Result<(), StoreError>;

    /// Returns whether anything was removed.
    fn delete_cached_lesson(&mut self, language: &str, key: &str) -> Result<bool, StoreError>;

    fn export_cached_lessons(&self) -> Result<LessonBundle, StoreError>;

    fn merge_cached_lessons(&mut self, bundle: LessonBundle) -> Result<MergeReport, StoreError>;
}

/// Downloaded lessons: language → composite key → lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonBundle {
    languages: BTreeMap<String, BTreeMap<String, Lesson>>,
}

/// Counts from folding one bundle into another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub replaced: usize,
    /// Lessons that failed validation and were skipped.
    pub rejected: usize,
}

impl LessonBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, language: &str, key: &str) -> Option<&Lesson> {
        self.languages.get(language)?.get(key)
    }

    /// Insert under the lesson's own id. Returns the lesson it replaced.
    pub fn insert(&mut self, language: &str, lesson: Lesson) -> Option<Lesson> {
        self.languages
            .entry(language.to_string())
            .or_default()
            .insert(lesson.id.clone(), lesson)
    }

    pub fn remove(&mut self, language: &str, key: &str) -> Option<Lesson> {
        let lessons = self.languages.get_mut(language)?;
        let removed = lessons.remove(key);
        if lessons.is_empty() {
            self.languages.remove(language);
        }
        removed
    }

    /// Composite keys downloaded for `language`.
    pub fn keys(&self, language: &str) -> Vec<&str> {
        self.languages
            .get(language)
            .map(|lessons| lessons.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.languages.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fold `other` in. Incoming lessons win on key collisions; malformed ones are skipped.
    pub fn merge(&mut self, other: LessonBundle) -> MergeReport {
        let mut report = MergeReport::default();
        for (language, lessons) in other.languages {
            for (key, lesson) in lessons {
                if lesson.validate().is_err() {
                    report.rejected += 1;
                    continue;
                }
                let slot = self.languages.entry(language.clone()).or_default();
                if slot.insert(key, lesson).is_some() {
                    report.replaced += 1;
                } else {
                    report.added += 1;
                }
            }
        }
        report
    }
}

/// Volatile store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    user: Option<UserState>,
    lessons: LessonBundle,
    fail_writes: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_state(mut self, state: UserState) -> Self {
        self.user = Some(state);
        self
    }

    /// Make every write fail, to exercise persistence-failure paths.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl Store for InMemoryStore {
    fn load_user_state(&self) -> Result<Option<UserState>, StoreError> {
        Ok(self.user.clone())
    }

    fn save_user_state(&mut self, state: &UserState) -> Result<(), StoreError> {
        self.check_writable()?;
        self.user = Some(state.clone());
        Ok(())
    }

    fn get_cached_lesson(&self, language: &str, key: &str) -> Result<Option<Lesson>, StoreError> {
        Ok(self.lessons.get(language, key).cloned())
    }

    fn save_cached_lesson(&mut self, language: &str, lesson: &Lesson) -> Result<(), StoreError> {
        self.check_writable()?;
        self.lessons.insert(language, lesson.clone());
        Ok(())
    }

    fn delete_cached_lesson(&mut self, language: &str, key: &str) -> Result<bool, StoreError> {
        self.check_writable()?;
        Ok(self.lessons.remove(language, key).is_some())
    }

    fn export_cached_lessons(&self) -> Result<LessonBundle, StoreError> {
        Ok(self.lessons.clone())
    }

    fn merge_cached_lessons(&mut self, bundle: LessonBundle) -> Result<MergeReport, StoreError> {
        self.check_writable()?;
        Ok(self.lessons.merge(bundle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{Difficulty, LessonSource};
    use crate::providers::fallback_exercises;

    fn lesson(topic: &str) -> Lesson {
        Lesson::new(topic, topic, Difficulty::Beginner, fallback_exercises(), LessonSource::Cache)
    }

    #[test]
    fn test_lesson_cache_round_trip() {
        let mut store = InMemoryStore::new();
        store.save_cached_lesson("es", &lesson("food")).unwrap();

        let hit = store.get_cached_lesson("es", "food-beginner").unwrap();
        assert_eq!(hit.map(|l| l.topic_id), Some("food".to_string()));
        assert!(store.get_cached_lesson("fr", "food-beginner").unwrap().is_none());

        assert!(store.delete_cached_lesson("es", "food-beginner").unwrap());
        assert!(!store.delete_cached_lesson("es", "food-beginner").unwrap());
        assert!(store.export_cached_lessons().unwrap().is_empty());
    }

    #[test]
    fn test_merge_bundle() {
        let mut store = InMemoryStore::new();
        store.save_cached_lesson("es", &lesson("food")).unwrap();

        let mut incoming = LessonBundle::new();
        incoming.insert("es", lesson("food"));
        incoming.insert("es", lesson("travel"));
        incoming.insert("fr", lesson("food"));
        let mut broken = lesson("numbers");
        broken.exercises.clear();
        incoming.insert("fr", broken);

        let report = store.merge_cached_lessons(incoming).unwrap();
        assert_eq!(
            report,
            MergeReport {
                added: 2,
                replaced: 1,
                rejected: 1
            }
        );
        let all = store.export_cached_lessons().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.keys("es"), vec!["food-beginner", "travel-beginner"]);
    }

    #[test]
    fn test_bundle_json_is_nested_by_language() {
        let mut bundle = LessonBundle::new();
        bundle.insert("es", lesson("food"));
        let json = bundle.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["es"]["food-beginner"]["exercises"].is_array());
        assert_eq!(LessonBundle::from_json(&json).unwrap(), bundle);
    }

    #[test]
    fn test_failing_writes() {
        let mut store = InMemoryStore::new().failing_writes();
        let state = UserState::new(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(matches!(
            store.save_user_state(&state),
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.load_user_state().unwrap().is_none());
    }
}
