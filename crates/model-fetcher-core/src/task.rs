//! Background fetch task
//!
//! Runs [`ModelClient::fetch`] on the tokio runtime so the caller stays
//! responsive, and enforces a single outstanding fetch. Each invocation
//! moves `Idle → InFlight → {Succeeded | Failed}`; a cancelled invocation
//! goes back to `Idle` and its result is dropped.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::client::ModelClient;
use crate::error::{ErrorKind, FetchBusy, FetchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InFlight,
    /// Number of models received
    Succeeded(usize),
    Failed(ErrorKind),
}

impl FetchState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, FetchState::InFlight)
    }
}

#[derive(Debug)]
struct Shared {
    /// Bumped on every start and cancel; a finishing task only records its
    /// outcome if the generation is still its own.
    generation: u64,
    state: FetchState,
}

/// Completion side of one fetch invocation.
#[derive(Debug)]
pub struct FetchHandle {
    rx: oneshot::Receiver<FetchResult>,
}

impl FetchHandle {
    /// Wait for the result. `None` means the fetch was cancelled.
    pub async fn wait(self) -> Option<FetchResult> {
        self.rx.await.ok()
    }
}

pub struct ModelFetcher {
    client: ModelClient,
    shared: Arc<Mutex<Shared>>,
    inflight: Option<AbortHandle>,
}

impl ModelFetcher {
    pub fn new(client: ModelClient) -> Self {
        Self {
            client,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                state: FetchState::Idle,
            })),
            inflight: None,
        }
    }

    pub fn state(&self) -> FetchState {
        lock(&self.shared).state
    }

    /// Start a fetch. Refused while another fetch is in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, base_url: &str, api_key: &str) -> Result<FetchHandle, FetchBusy> {
        if self.state().is_in_flight() {
            return Err(FetchBusy);
        }
        Ok(self.launch(base_url, api_key))
    }

    /// Cancel whatever is in flight and start a new fetch.
    pub fn restart(&mut self, base_url: &str, api_key: &str) -> FetchHandle {
        self.cancel();
        self.launch(base_url, api_key)
    }

    /// Abort the in-flight fetch, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
        let mut shared = lock(&self.shared);
        if shared.state.is_in_flight() {
            shared.generation += 1;
            shared.state = FetchState::Idle;
            debug!("Cancelled in-flight model fetch");
        }
    }

    fn launch(&mut self, base_url: &str, api_key: &str) -> FetchHandle {
        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.state = FetchState::InFlight;
            shared.generation
        };

        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        let shared = Arc::clone(&self.shared);
        let base_url = base_url.to_string();
        let api_key = api_key.to_string();

        let task = tokio::spawn(async move {
            let result = client.fetch(&base_url, &api_key).await;
            {
                let mut shared = lock(&shared);
                if shared.generation == generation {
                    shared.state = match &result {
                        Ok(models) => FetchState::Succeeded(models.len()),
                        Err(err) => FetchState::Failed(err.kind),
                    };
                }
            }
            // The receiver may already be gone; the result is then discarded.
            let _ = tx.send(result);
        });

        self.inflight = Some(task.abort_handle());
        FetchHandle { rx }
    }
}

impl Drop for ModelFetcher {
    fn drop(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Fetch state lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[tokio::test]
    async fn test_invalid_url_fails_without_network() {
        let mut fetcher = ModelFetcher::new(ModelClient::new().unwrap());
        assert_eq!(fetcher.state(), FetchState::Idle);

        let handle = fetcher.start("not a url", "").unwrap();
        let result = handle.wait().await.unwrap();
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidUrl);
        assert_eq!(fetcher.state(), FetchState::Failed(ErrorKind::InvalidUrl));

        // A finished fetch does not block the next one.
        assert!(fetcher.start("also not a url", "").is_ok());
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let mut fetcher = ModelFetcher::new(ModelClient::new().unwrap());
        fetcher.cancel();
        fetcher.cancel();
        assert_eq!(fetcher.state(), FetchState::Idle);
    }

    #[test]
    fn test_failed_state_carries_kind() {
        let err = FetchError::from_status(503, "http://h/models");
        let state = FetchState::Failed(err.kind);
        assert_eq!(state, FetchState::Failed(ErrorKind::ServerError(503)));
        assert!(!state.is_in_flight());
    }
}
