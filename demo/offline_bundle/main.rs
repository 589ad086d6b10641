//! # Scenario 3: Offline Bundle
//!
//! **Actor**: Learner preparing for a flight
//! **Duration**: Download at home, play offline on a second device
//!
//! Demonstrates:
//! - Downloading generated lessons into the file store
//! - Exporting the lesson bundle as JSON and merging it elsewhere
//! - Offline mode refusing lessons that were never downloaded
//! - Retry with backoff, then the static fallback lesson

use anyhow::Result;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use lingo_client::{ClientConfig, ClientError, FileStore, LingoClient, MockContentProvider};
use lingo_core::exercise::{Exercise, ExerciseKind};
use lingo_core::storage::LessonBundle;
use lingo_core::ProviderError;

fn sep(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

fn travel() -> Vec<Exercise> {
    vec![
        Exercise::new(1, ExerciseKind::TranslateToTarget, "Where is the station?", "¿Dónde está la estación?")
            .with_options(["¿Dónde", "está", "la", "estación?", "playa"]),
        Exercise::new(2, ExerciseKind::SelectMeaning, "el billete", "the ticket")
            .with_options(["the ticket", "the train", "the map"]),
    ]
}

fn numbers() -> Vec<Exercise> {
    vec![Exercise::new(1, ExerciseKind::FillInTheBlank, "uno, dos, ___", "tres")]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("==========================================================");
    println!("  SCENARIO 3: Offline Bundle");
    println!("  Download, export, import, play without a network");
    println!("==========================================================");

    let root = std::env::temp_dir().join(format!("lingo-offline-{}", std::process::id()));
    let today = Utc::now().date_naive();

    sep("HOME: download");
    let provider = MockContentProvider::new("scripted").with_responses(vec![Ok(travel()), Ok(numbers())]);
    let mut home = LingoClient::boot(provider, FileStore::new(root.join("home")), ClientConfig::default(), today)?;
    for (topic, title) in [("travel", "Travel"), ("numbers", "Numbers")] {
        let lesson = home.download_lesson(topic, title).await?;
        println!("[Download] {} ({} exercises)", lesson.id, lesson.len());
    }
    let bundle_json = home.export_downloads()?.to_json()?;
    println!("[Export] {} bytes of lesson JSON", bundle_json.len());

    sep("PLANE: import and play offline");
    let mut config = ClientConfig::default();
    config.client.offline = true;
    let mut plane = LingoClient::boot(
        MockContentProvider::new("unreachable"),
        FileStore::new(root.join("plane")),
        config,
        today,
    )?;
    let report = plane.import_downloads(LessonBundle::from_json(&bundle_json)?)?;
    println!("[Import] added {}, replaced {}, rejected {}", report.added, report.replaced, report.rejected);

    let mut session = plane.start_lesson("travel", "Travel").await?;
    println!("[Lesson] {} from {:?}", session.lesson().id, session.lesson().source);
    while let Some(exercise) = session.current_exercise().cloned() {
        session.submit(&exercise.correct_answer)?;
        if session.advance()? == lingo_core::session::Advanced::Complete {
            break;
        }
    }
    let done = plane.complete_lesson(&mut session, today, Utc::now())?;
    println!("[XP] +{}", done.result.xp);

    match plane.start_lesson("food", "Food").await {
        Err(ClientError::Offline { key }) => println!("[Offline] {key} was never downloaded"),
        other => println!("[Offline] unexpected: {:?}", other.map(|s| s.lesson().id.clone())),
    }

    sep("FLAKY NETWORK: retry, then fallback");
    let mut config = ClientConfig::default();
    config.client.allow_fallback = true;
    config.core.retry.base_backoff_ms = 50;
    config.core.retry.rate_limit_floor_ms = 100;
    let provider = MockContentProvider::new("flaky").with_responses(vec![
        Err(ProviderError::RateLimited),
        Err(ProviderError::Timeout),
        Err(ProviderError::Timeout),
    ]);
    let mut flaky = LingoClient::boot(provider, FileStore::new(root.join("flaky")), config, today)?;
    let session = flaky.start_lesson("greetings", "Greetings").await?;
    println!(
        "[Fallback] {} attempts, serving {:?} lesson: {}",
        flaky.provider().calls(),
        session.lesson().source,
        session.lesson().exercises[0].prompt
    );

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}
