use chrono::{DateTime, NaiveDate, Utc};

use lingo_core::achievements::{self, Achievement};
use lingo_core::daily::{self, RolloverOutcome};
use lingo_core::exercise::composite_key;
use lingo_core::languages::{self, language_name};
use lingo_core::progress::{self, CompletionContext, DailyGoal};
use lingo_core::providers::{fallback_lesson, PRACTICE_TOPIC};
use lingo_core::scoring::SessionResult;
use lingo_core::session::{LessonSession, SessionPhase};
use lingo_core::storage::{LessonBundle, MergeReport, Store};
use lingo_core::{ContentRequest, Difficulty, Exercise, Lesson, LessonSource, UserState};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, PersistWarning};
use crate::provider::{ContentProvider, ReliableContentProvider};

/// Everything a finished lesson produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub result: SessionResult,
    pub fast: bool,
    pub newly_unlocked: Vec<Achievement>,
    pub daily_goal: DailyGoal,
    pub warning: Option<PersistWarning>,
}

/// Learner-facing client: owns progress, fetches lessons and records results.
pub struct LingoClient<P, S> {
    provider: ReliableContentProvider<P>,
    store: S,
    config: ClientConfig,
    user: UserState,
    rollover: RolloverOutcome,
}

impl<P: ContentProvider, S: Store> LingoClient<P, S> {
    /// Load stored progress (or start fresh), refresh the achievement
    /// catalog and apply the daily rollover for `today`.
    pub fn boot(provider: P, store: S, config: ClientConfig, today: NaiveDate) -> ClientResult<Self> {
        let stored = store.load_user_state()?;
        let is_new = stored.is_none();
        let mut user = stored.unwrap_or_else(|| {
            let mut fresh = UserState::new(today);
            fresh.daily_goal = config.core.progress.daily_goal;
            fresh
        });
        user.achievements = achievements::initialize(&user.achievements);

        let (user, rollover) = daily::rollover(&user, today);
        match rollover {
            RolloverOutcome::StreakReset { previous } => {
                tracing::info!(previous, "streak broken by missed day")
            }
            RolloverOutcome::FreezeUsed => {
                tracing::info!(streak = user.streak, "streak freeze consumed")
            }
            _ => {}
        }
        tracing::info!(
            new_user = is_new,
            streak = user.streak,
            xp = user.xp,
            language = %user.current_language,
            "client booted"
        );

        let provider = ReliableContentProvider::new(provider).with_policy(config.core.retry.clone());
        let mut client = Self {
            provider,
            store,
            config,
            user,
            rollover,
        };
        if let Some(warning) = client.persist() {
            tracing::warn!(%warning, "boot state not saved");
        }
        Ok(client)
    }

    pub fn user(&self) -> &UserState {
        &self.user
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &P {
        self.provider.inner()
    }

    /// What the rollover at boot did.
    pub fn rollover(&self) -> RolloverOutcome {
        self.rollover
    }

    pub fn daily_goal(&self) -> DailyGoal {
        progress::daily_goal_progress(&self.user)
    }

    fn persist(&mut self) -> Option<PersistWarning> {
        match self.store.save_user_state(&self.user) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist user state");
                Some(PersistWarning::from(&e))
            }
        }
    }

    fn start(&self, lesson: Lesson) -> ClientResult<LessonSession> {
        let mut options = self.config.core.session.options(self.user.timer_enabled);
        if self.user.hearts > 0 {
            options.starting_hearts = self.user.hearts.min(self.config.core.session.max_hearts);
        }
        let session =
            LessonSession::start(lesson, options)?.with_policy(self.config.core.scoring.clone());
        tracing::info!(
            lesson = %session.lesson().id,
            source = ?session.lesson().source,
            exercises = session.lesson().len(),
            timed = session.state().is_timed(),
            "lesson started"
        );
        Ok(session)
    }

    async fn generate(&self, request: ContentRequest, topic: &str) -> ClientResult<Vec<Exercise>> {
        let request = request.with_count(self.config.core.session.exercises_per_lesson);
        self.provider
            .generate(&request)
            .await
            .map_err(|source| ClientError::ContentUnavailable {
                topic: topic.to_string(),
                source,
            })
    }

    fn build_lesson(&self, topic_id: &str, title: &str, exercises: Vec<Exercise>) -> Lesson {
        let difficulty = self.user.difficulty;
        let language = language_name(&self.user.current_language);
        Lesson::new(topic_id, title, difficulty, exercises, LessonSource::Provider)
            .with_description(format!("Learn {title} in {language} ({difficulty})"))
    }

    /// Start a lesson: downloaded copy first, then the provider.
    pub async fn start_lesson(&mut self, topic_id: &str, title: &str) -> ClientResult<LessonSession> {
        let language = self.user.current_language.clone();
        let key = composite_key(topic_id, self.user.difficulty);

        match self.store.get_cached_lesson(&language, &key) {
            Ok(Some(mut lesson)) => {
                tracing::debug!(%key, %language, "lesson loaded from cache");
                lesson.source = LessonSource::Cache;
                return self.start(lesson);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(%key, error = %e, "lesson cache unreadable"),
        }

        if self.config.client.offline {
            return Err(ClientError::Offline { key });
        }

        let request = ContentRequest::lesson(language_name(&language), title, self.user.difficulty);
        match self.generate(request, topic_id).await {
            Ok(exercises) => {
                let lesson = self.build_lesson(topic_id, title, exercises);
                self.start(lesson)
            }
            Err(err) if self.config.client.allow_fallback => {
                tracing::warn!(topic = topic_id, error = %err, "serving fallback lesson");
                self.start(fallback_lesson(topic_id, title, self.user.difficulty))
            }
            Err(err) => Err(err),
        }
    }

    /// Review lesson across every completed topic. Earns XP and streak only.
    pub async fn start_practice(&mut self) -> ClientResult<LessonSession> {
        if self.user.completed_lessons.is_empty() {
            return Err(ClientError::NothingToPractice);
        }
        if self.config.client.offline {
            return Err(ClientError::Offline {
                key: composite_key(PRACTICE_TOPIC, self.user.difficulty),
            });
        }
        let topics: Vec<String> = self.user.completed_lessons.iter().cloned().collect();
        let request = ContentRequest::practice(
            language_name(&self.user.current_language),
            topics,
            self.user.difficulty,
        );
        let exercises = self.generate(request, PRACTICE_TOPIC).await?;
        let lesson = self.build_lesson(PRACTICE_TOPIC, "Practice", exercises);
        self.start(lesson)
    }

    /// Generate and store a lesson for offline use.
    pub async fn download_lesson(&mut self, topic_id: &str, title: &str) -> ClientResult<Lesson> {
        let key = composite_key(topic_id, self.user.difficulty);
        if self.config.client.offline {
            return Err(ClientError::Offline { key });
        }
        let language = self.user.current_language.clone();
        let request = ContentRequest::lesson(language_name(&language), title, self.user.difficulty);
        let exercises = self.generate(request, topic_id).await?;
        let mut lesson = self.build_lesson(topic_id, title, exercises);
        lesson.source = LessonSource::Cache;
        self.store.save_cached_lesson(&language, &lesson)?;
        tracing::info!(%key, %language, "lesson downloaded");
        Ok(lesson)
    }

    /// Remove the downloaded copy at the current difficulty.
    pub fn delete_download(&mut self, topic_id: &str) -> ClientResult<bool> {
        let key = composite_key(topic_id, self.user.difficulty);
        Ok(self
            .store
            .delete_cached_lesson(&self.user.current_language, &key)?)
    }

    pub fn export_downloads(&self) -> ClientResult<LessonBundle> {
        Ok(self.store.export_cached_lessons()?)
    }

    pub fn import_downloads(&mut self, bundle: LessonBundle) -> ClientResult<MergeReport> {
        let report = self.store.merge_cached_lessons(bundle)?;
        tracing::info!(
            added = report.added,
            replaced = report.replaced,
            rejected = report.rejected,
            "lesson bundle imported"
        );
        Ok(report)
    }

    /// Record a completed session: XP, streak, mastery, hearts, achievements.
    /// The session moves to `Recorded`; a second call is rejected.
    pub fn complete_lesson(
        &mut self,
        session: &mut LessonSession,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> ClientResult<Completion> {
        let result = session.record()?;
        let fast = self.config.core.scoring.is_fast(&result);
        let lesson = session.lesson();
        let ctx = CompletionContext { today, is_fast: fast };

        let mut next = progress::apply_result(&self.user, &lesson.topic_id, &result, ctx);
        if lesson.topic_id == PRACTICE_TOPIC {
            next.topic_levels = self.user.topic_levels.clone();
            next.completed_lessons = self.user.completed_lessons.clone();
        }
        let next = progress::settle_hearts(
            &next,
            session.state().hearts,
            self.config.core.session.max_hearts,
        );
        let evaluation = achievements::evaluate(&next, now);
        self.user = evaluation.state;

        tracing::info!(
            lesson = %lesson.id,
            xp = result.xp,
            mistakes = result.mistakes,
            perfect = result.is_perfect,
            fast,
            streak = self.user.streak,
            unlocked = evaluation.newly_unlocked.len(),
            "lesson completed"
        );
        for achievement in &evaluation.newly_unlocked {
            tracing::info!(id = %achievement.id, title = %achievement.title, "achievement unlocked");
        }

        let warning = self.persist();
        Ok(Completion {
            result,
            fast,
            newly_unlocked: evaluation.newly_unlocked,
            daily_goal: self.daily_goal(),
            warning,
        })
    }

    /// Leave a session that will not complete (user exit or time up).
    /// Hearts lost along the way are kept; no XP is awarded.
    pub fn abandon_lesson(&mut self, session: &mut LessonSession) -> ClientResult<Option<PersistWarning>> {
        if session.phase() != SessionPhase::Exited {
            session.exit()?;
        }
        if !session.state().is_timed() {
            self.user = progress::settle_hearts(
                &self.user,
                session.state().hearts,
                self.config.core.session.max_hearts,
            );
        }
        tracing::info!(
            lesson = %session.lesson().id,
            hearts = self.user.hearts,
            "lesson abandoned"
        );
        Ok(self.persist())
    }

    pub fn buy_streak_freeze(&mut self) -> ClientResult<Option<PersistWarning>> {
        self.user = progress::buy_streak_freeze(&self.user, self.config.core.progress.streak_freeze_cost)?;
        tracing::info!(xp = self.user.xp, "streak freeze equipped");
        Ok(self.persist())
    }

    /// Switch the target language. Only codes from the language catalog are accepted.
    pub fn set_language(&mut self, code: &str) -> ClientResult<Option<PersistWarning>> {
        let language = languages::find(code).ok_or_else(|| ClientError::UnknownLanguage {
            code: code.to_string(),
        })?;
        self.user.current_language = language.code.to_string();
        tracing::info!(language = %language.code, "language changed");
        Ok(self.persist())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Option<PersistWarning> {
        self.user.difficulty = difficulty;
        self.persist()
    }

    pub fn set_timer_enabled(&mut self, enabled: bool) -> Option<PersistWarning> {
        self.user.timer_enabled = enabled;
        self.persist()
    }
}
