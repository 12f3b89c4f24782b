/// Scripted model provider for tests and offline demos.
///
/// Replies are served in FIFO order. An optional gate holds every call
/// pending until the test releases it, which makes in-flight behaviour
/// observable without a network.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{ModelError, ModelProvider, ModelRequest};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Empty,
    Transport(String),
}

/// A provider that replays scripted replies and records every request.
#[derive(Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ModelRequest>>,
    gate: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    missing_key: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose calls block until [`MockProvider::release`] is called.
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Queue a reply body.
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.push(MockReply::Text(text.into()))
    }

    pub fn push(&self, reply: MockReply) -> &Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Let `n` pending (or future) calls complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Simulate an absent API key.
    pub fn set_missing_key(&self, missing: bool) {
        self.missing_key.store(missing, Ordering::SeqCst);
    }

    /// Number of calls that reached `generate`.
    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Snapshot of every request seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently pending calls observed.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn check_credentials(&self) -> Result<(), ModelError> {
        if self.missing_key.load(Ordering::SeqCst) {
            return Err(ModelError::MissingCredential("MOCK_API_KEY".into()));
        }
        Ok(())
    }

    async fn generate(&self, request: &ModelRequest) -> Result<Option<String>, ModelError> {
        self.check_credentials()?;
        lock(&self.requests).push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = lock(&self.replies).pop_front().unwrap_or(MockReply::Empty);
        match reply {
            MockReply::Text(text) => Ok(Some(text)),
            MockReply::Empty => Ok(None),
            MockReply::Transport(msg) => Err(ModelError::Transport(msg)),
        }
    }
}
