//! lingo-client: async shell around `lingo-core`.
//!
//! Fetches lessons from a [`provider::ContentProvider`] with retry and backoff,
//! drives the lesson countdown on a tokio task, persists progress as JSON
//! files, and ties it together in [`LingoClient`].
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::Utc;
//! use lingo_client::{ClientConfig, FileStore, LingoClient, MockContentProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = MockContentProvider::new("mock");
//! let store = FileStore::default_location()?;
//! let today = Utc::now().date_naive();
//! let mut client = LingoClient::boot(provider, store, ClientConfig::default(), today)?;
//!
//! let mut session = client.start_lesson("food", "Food").await?;
//! session.submit("Hola")?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod file_store;
pub mod mock;
pub mod provider;
pub mod speech;
pub mod timer;

// Re-export primary public types.
pub use client::{Completion, LingoClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, PersistWarning};
pub use file_store::FileStore;
pub use mock::{MockContentProvider, MockSpeechSynthesizer};
pub use provider::{ContentProvider, ReliableContentProvider};
pub use speech::{speak_or_none, SpeechSynthesizer};
pub use timer::{Countdown, SharedSession, TimerEvent};
