//! JSON-file persistence.
//!
//! Files live under `~/.lingo/` by default:
//! - `user_state.json`: the learner snapshot
//! - `lessons.json`: downloaded lessons, language → `topic-difficulty` → lesson
//!
//! Every write goes to a sibling temp file first and is renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use lingo_core::storage::{LessonBundle, MergeReport, Store, StoreError};
use lingo_core::{Lesson, UserState};

const USER_STATE_FILE: &str = "user_state.json";
const LESSONS_FILE: &str = "lessons.json";

pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// `~/.lingo`
    pub fn default_location() -> Result<Self, StoreError> {
        let home = dirs::home_dir()
            .ok_or_else(|| StoreError::Unavailable("cannot determine home directory".into()))?;
        Ok(Self::new(home.join(".lingo")))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.base_dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(value)?;
        let path = self.base_dir.join(name);
        let tmp = self.base_dir.join(format!(".{name}.tmp"));
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(path = %path.display(), "wrote store file");
        Ok(())
    }

    fn lessons(&self) -> Result<LessonBundle, StoreError> {
        Ok(self.read_json(LESSONS_FILE)?.unwrap_or_default())
    }
}

impl Store for FileStore {
    fn load_user_state(&self) -> Result<Option<UserState>, StoreError> {
        self.read_json(USER_STATE_FILE)
    }

    fn save_user_state(&mut self, state: &UserState) -> Result<(), StoreError> {
        self.write_json(USER_STATE_FILE, state)
    }

    fn get_cached_lesson(&self, language: &str, key: &str) -> Result<Option<Lesson>, StoreError> {
        Ok(self.lessons()?.get(language, key).cloned())
    }

    fn save_cached_lesson(&mut self, language: &str, lesson: &Lesson) -> Result<(), StoreError> {
        let mut bundle = self.lessons()?;
        bundle.insert(language, lesson.clone());
        self.write_json(LESSONS_FILE, &bundle)
    }

    fn delete_cached_lesson(&mut self, language: &str, key: &str) -> Result<bool, StoreError> {
        let mut bundle = self.lessons()?;
        if bundle.remove(language, key).is_none() {
            return Ok(false);
        }
        self.write_json(LESSONS_FILE, &bundle)?;
        Ok(true)
    }

    fn export_cached_lessons(&self) -> Result<LessonBundle, StoreError> {
        self.lessons()
    }

    fn merge_cached_lessons(&mut self, incoming: LessonBundle) -> Result<MergeReport, StoreError> {
        let mut bundle = self.lessons()?;
        let report = bundle.merge(incoming);
        self.write_json(LESSONS_FILE, &bundle)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lingo_core::exercise::{Difficulty, LessonSource};
    use lingo_core::providers::fallback_exercises;

    fn lesson(topic: &str) -> Lesson {
        Lesson::new(topic, topic, Difficulty::Beginner, fallback_exercises(), LessonSource::Provider)
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert!(store.load_user_state().unwrap().is_none());
        assert!(store.export_cached_lessons().unwrap().is_empty());
    }

    #[test]
    fn test_user_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        let mut state = UserState::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        state.xp = 42;
        store.save_user_state(&state).unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.load_user_state().unwrap(), Some(state));
        // No temp file left behind.
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![USER_STATE_FILE.to_string()]);
    }

    #[test]
    fn test_corrupt_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(USER_STATE_FILE), "{ not json").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.load_user_state(),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_lesson_cache_and_merge() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.save_cached_lesson("es", &lesson("food")).unwrap();
        store.save_cached_lesson("fr", &lesson("travel")).unwrap();

        let hit = store.get_cached_lesson("es", "food-beginner").unwrap().unwrap();
        assert_eq!(hit.topic_id, "food");

        let mut incoming = LessonBundle::new();
        incoming.insert("es", lesson("numbers"));
        let report = store.merge_cached_lessons(incoming).unwrap();
        assert_eq!(report.added, 1);

        assert!(store.delete_cached_lesson("fr", "travel-beginner").unwrap());
        assert!(!store.delete_cached_lesson("fr", "travel-beginner").unwrap());

        let all = FileStore::new(dir.path()).export_cached_lessons().unwrap();
        assert_eq!(all.keys("es"), vec!["food-beginner", "numbers-beginner"]);
        assert!(all.keys("fr").is_empty());
    }
}
