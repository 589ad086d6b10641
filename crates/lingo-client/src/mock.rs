use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use lingo_core::exercise::Exercise;
use lingo_core::{ContentRequest, ProviderError};

use crate::provider::ContentProvider;
use crate::speech::SpeechSynthesizer;

type Reply = Result<Vec<Exercise>, ProviderError>;

/// A mock content provider. Returns queued replies in order.
pub struct MockContentProvider {
    name: String,
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ContentRequest>>,
    calls: AtomicUsize,
}

impl MockContentProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_response(self, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    pub fn with_responses(self, replies: Vec<Reply>) -> Self {
        *self.replies.lock().unwrap_or_else(PoisonError::into_inner) = replies.into();
        self
    }

    pub fn remaining_responses(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ContentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ContentProvider for MockContentProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &ContentRequest) -> Result<Vec<Exercise>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::RequestFailed(
                    "no mock responses remaining".to_string(),
                ))
            })
    }
}

/// A mock speech backend returning fixed PCM after an optional delay.
pub struct MockSpeechSynthesizer {
    pcm: Result<Vec<u8>, ProviderError>,
    delay: Duration,
}

impl MockSpeechSynthesizer {
    pub fn new(pcm: Vec<u8>) -> Self {
        Self {
            pcm: Ok(pcm),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            pcm: Err(err),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SpeechSynthesizer for MockSpeechSynthesizer {
    async fn synthesize(&self, _text: &str, _language_code: &str) -> Result<Vec<u8>, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.pcm.clone()
    }
}
