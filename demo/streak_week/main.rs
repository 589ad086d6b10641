//! # Scenario 2: A Week of Streaks
//!
//! **Actor**: Learner who practises most days and skips one
//! **Duration**: Eight simulated days, one cold start per day
//!
//! Demonstrates:
//! - Daily rollover on boot (daily XP reset, streak continue or break)
//! - Streak freeze bought in the shop and consumed by a missed day
//! - Once-per-day streak increments
//! - Topic mastery levels and achievement unlocks over time

use anyhow::Result;
use chrono::{Days, NaiveDate, NaiveTime};
use tracing_subscriber::EnvFilter;

use lingo_client::{ClientConfig, FileStore, LingoClient, MockContentProvider};
use lingo_core::exercise::{Exercise, ExerciseKind};
use lingo_core::session::LessonSession;

fn sep(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

fn vocab(words: &[(&str, &str)]) -> Vec<Exercise> {
    words
        .iter()
        .enumerate()
        .map(|(i, (es, en))| {
            Exercise::new(i as u32 + 1, ExerciseKind::SelectMeaning, *es, *en)
                .with_options([*en, "the dog", "the house"])
        })
        .collect()
}

fn greetings() -> Vec<Exercise> {
    vocab(&[
        ("hola", "hello"),
        ("adiós", "goodbye"),
        ("gracias", "thanks"),
        ("por favor", "please"),
        ("buenos días", "good morning"),
    ])
}

/// Answer everything, optionally missing the first `misses`.
fn play(session: &mut LessonSession, misses: usize) -> Result<()> {
    for i in 0..session.lesson().len() {
        let answer = match session.current_exercise() {
            Some(_) if i < misses => "the dog".to_string(),
            Some(ex) => ex.correct_answer.clone(),
            None => break,
        };
        session.submit(&answer)?;
        session.advance()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("==========================================================");
    println!("  SCENARIO 2: A Week of Streaks");
    println!("  Cold start every day, one skipped day covered by a freeze");
    println!("==========================================================");

    let dir = std::env::temp_dir().join(format!("lingo-streak-{}", std::process::id()));
    let start = NaiveDate::from_ymd_opt(2024, 9, 2).ok_or_else(|| anyhow::anyhow!("bad date"))?;

    // (day offset, lessons that day, misses per lesson)
    let plan: &[(u64, usize, usize)] = &[(0, 2, 0), (1, 1, 1), (2, 1, 0), (3, 1, 0), (5, 1, 0), (6, 1, 0), (9, 1, 0)];

    for &(offset, lessons, misses) in plan {
        let today = start
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| anyhow::anyhow!("date overflow"))?;
        sep(&format!("{today}"));

        let provider = MockContentProvider::new("scripted")
            .with_responses((0..lessons).map(|_| Ok(greetings())).collect());
        let mut client = LingoClient::boot(provider, FileStore::new(&dir), ClientConfig::default(), today)?;
        println!("[Boot] rollover: {:?}, streak {}", client.rollover(), client.user().streak);

        for _ in 0..lessons {
            let mut session = client.start_lesson("greetings", "Greetings").await?;
            play(&mut session, misses)?;
            let now = today.and_time(NaiveTime::MIN).and_utc();
            let done = client.complete_lesson(&mut session, today, now)?;
            println!(
                "[Lesson] +{} XP, streak {}, greetings level {}",
                done.result.xp,
                client.user().streak,
                client.user().topic_level("greetings")
            );
            for achievement in &done.newly_unlocked {
                println!("[Unlocked] {} {}", achievement.icon, achievement.title);
            }
        }

        if offset == 3 {
            match client.buy_streak_freeze() {
                Ok(_) => println!("[Shop] streak freeze equipped, {} XP left", client.user().xp),
                Err(e) => println!("[Shop] {e}"),
            }
        }
        println!("[Day] daily XP {} / {}", client.user().daily_xp, client.user().daily_goal);
    }

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
