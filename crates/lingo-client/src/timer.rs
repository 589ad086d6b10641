//! Countdown driver for timed lessons.
//!
//! A background task ticks the shared session once per period. It stops on
//! its own when the session becomes terminal, and is aborted on cancel or drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time;

use lingo_core::session::{LessonSession, Tick};

pub type SharedSession = Arc<Mutex<LessonSession>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { remaining_secs: u32 },
    Expired,
}

/// Handle to a running countdown.
pub struct Countdown {
    handle: JoinHandle<()>,
    events: mpsc::Receiver<TimerEvent>,
}

impl Countdown {
    /// Start ticking `session` every `period`. Untimed sessions end the task
    /// on the first tick.
    pub fn spawn(session: SharedSession, period: Duration) -> Self {
        let (tx, events) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.tick().await; // skip first immediate tick

            loop {
                ticker.tick().await;
                let tick = session.lock().await.tick();
                let event = match tick {
                    Tick::Running { remaining_secs } => TimerEvent::Tick { remaining_secs },
                    Tick::Expired => {
                        tracing::info!("lesson timer expired");
                        let _ = tx.send(TimerEvent::Expired).await;
                        break;
                    }
                    Tick::Stopped => break,
                };
                // A lagging listener must not stall the countdown.
                if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(event) {
                    break;
                }
            }
            tracing::debug!("countdown loop ended");
        });
        Self { handle, events }
    }

    /// Next event, or `None` once the countdown has ended.
    pub async fn next_event(&mut self) -> Option<TimerEvent> {
        self.events.recv().await
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
