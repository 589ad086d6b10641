//! # Scenario 1: Timed Lesson
//!
//! **Actor**: Learner practising Spanish food vocabulary against the clock
//! **Duration**: One lesson (countdown compressed to 20ms per "second")
//!
//! Demonstrates:
//! - Countdown task driving a shared session
//! - Drafts built per exercise kind (choice, word bank, free text)
//! - Pronunciation through the speech wrapper
//! - XP with speed bonus, achievements, persisted progress

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use lingo_client::{
    speak_or_none, ClientConfig, Countdown, FileStore, LingoClient, MockContentProvider,
    MockSpeechSynthesizer, TimerEvent,
};
use lingo_core::exercise::{Exercise, ExerciseKind};
use lingo_core::session::LessonSession;

fn sep(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

fn food_lesson() -> Vec<Exercise> {
    vec![
        Exercise::new(1, ExerciseKind::TranslateToTarget, "I eat bread", "Yo como pan")
            .with_options(["pan", "agua", "Yo", "bebo", "como"])
            .with_pronunciation("yo KOH-moh pahn"),
        Exercise::new(2, ExerciseKind::SelectMeaning, "la manzana", "the apple")
            .with_options(["the orange", "the apple", "the pear"]),
        Exercise::new(3, ExerciseKind::FillInTheBlank, "Ella ___ agua (drinks)", "bebe")
            .with_explanation("Third person singular of beber."),
        Exercise::new(4, ExerciseKind::TranslateToSource, "El queso es bueno", "The cheese is good")
            .with_options(["good", "The", "is", "bad", "cheese"]),
        Exercise::new(5, ExerciseKind::ChooseCorrectTranslation, "Thank you", "Gracias")
            .with_options(["Perdón", "Gracias", "Hola"]),
    ]
}

/// A short 24 kHz mono blip standing in for synthesized speech.
fn blip() -> Vec<u8> {
    (0..2400i32)
        .map(|i| ((i % 48 - 24) * 800) as i16)
        .flat_map(|s| s.to_le_bytes())
        .collect()
}

/// Fill the draft with the right answer, the way a learner would.
fn fill_draft(session: &mut LessonSession, exercise: &Exercise) -> Result<()> {
    let kind = exercise.kind;
    if kind.is_choice() {
        session.select_option(exercise.correct_answer.clone())?;
    } else if kind.is_word_bank() {
        for word in exercise.correct_answer.split_whitespace() {
            let open = session.state().draft.words.slot_states(&exercise.options);
            let slot = exercise
                .options
                .iter()
                .enumerate()
                .position(|(i, option)| option == word && open[i])
                .ok_or_else(|| anyhow::anyhow!("word {word:?} missing from bank"))?;
            session.pick_word(slot)?;
        }
    } else {
        session.set_text(exercise.correct_answer.clone())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("==========================================================");
    println!("  SCENARIO 1: Timed Lesson");
    println!("  Spanish food vocabulary against a 120 second budget");
    println!("==========================================================\n");

    let dir = std::env::temp_dir().join(format!("lingo-timed-{}", std::process::id()));
    let mut config = ClientConfig::default();
    config.client.tick_interval_ms = 20;

    let provider = MockContentProvider::new("scripted").with_response(Ok(food_lesson()));
    let today = Utc::now().date_naive();
    let mut client = LingoClient::boot(provider, FileStore::new(&dir), config, today)?;
    client.set_timer_enabled(true);

    sep("START");
    let session = client.start_lesson("food", "Food").await?;
    println!(
        "[Lesson] {} ({} exercises, {}s on the clock)",
        session.lesson().title,
        session.lesson().len(),
        session.state().time_remaining
    );

    let shared = Arc::new(Mutex::new(session));
    let tick = client.config().client.tick_interval();
    let mut countdown = Countdown::spawn(shared.clone(), tick);
    let synth = MockSpeechSynthesizer::new(blip());

    sep("EXERCISES");
    let total = shared.lock().await.lesson().len();
    for index in 0..total {
        let exercise = {
            let session = shared.lock().await;
            session
                .current_exercise()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no exercise at {index}"))?
        };
        println!("[{}/{}] {:?}: {}", index + 1, total, exercise.kind, exercise.prompt);

        if let Some(hint) = &exercise.pronunciation {
            let spoken = speak_or_none(&synth, &exercise.correct_answer, "es", client.config().client.speech_timeout()).await;
            if let Some(clip) = spoken {
                println!("      audio: {:.2}s ({hint})", clip.duration_secs());
            }
        }

        // Think for a few "seconds".
        tokio::time::sleep(tick * 7).await;

        let mut session = shared.lock().await;
        fill_draft(&mut session, &exercise)?;
        let feedback = session.submit_draft()?;
        println!(
            "      {} -> {} ({}s left)",
            session.state().draft.answer(exercise.kind),
            if feedback.correct { "correct" } else { "wrong" },
            session.state().time_remaining
        );
        if let Some(why) = feedback.explanation {
            println!("      note: {why}");
        }
        session.advance()?;
    }

    let mut ticks = 0;
    while let Some(event) = countdown.next_event().await {
        if let TimerEvent::Tick { .. } = event {
            ticks += 1;
        }
    }
    println!("\n[Timer] countdown stopped ({ticks} ticks still queued)");

    sep("RESULTS");
    let mut session = shared.lock().await.clone();
    let done = client.complete_lesson(&mut session, today, Utc::now())?;
    println!("[XP] +{} (time {}s, fast: {})", done.result.xp, done.result.time_seconds, done.fast);
    println!(
        "[Daily goal] {}/{} ({}%)",
        done.daily_goal.earned, done.daily_goal.goal, done.daily_goal.percent
    );
    for achievement in &done.newly_unlocked {
        println!("[Unlocked] {} {}: {}", achievement.icon, achievement.title, achievement.description);
    }
    if let Some(warning) = done.warning {
        println!("[Warning] {warning}");
    }
    println!("[Saved] {}", dir.display());

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
