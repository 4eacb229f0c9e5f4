//! Encryption Service Manager
//!
//! Owns the one encryption service of the process and its initialization.
//!
//! ```text
//!            get_instance()
//!                 │
//!   ┌─────────────▼─────────────┐
//!   │ Empty ──▶ Initializing ──▶ Ready
//!   │   ▲            │ (shared future, all callers await it)
//!   │   └── failure ─┘
//!   └───────────────────────────┘
//! ```
//!
//! Callers arriving while initialization is in flight await the same future
//! and get the same handle or the same failure. A failure empties the slot so
//! the next call starts a new attempt.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, error, info, warn};

use super::sdk::{ServiceBootstrap, ServiceHandle};
use crate::error::{Result, TradingError};
use crate::state::{ClientConfig, NetworkConfig};

type InitFlight = Shared<BoxFuture<'static, std::result::Result<ServiceHandle, String>>>;

enum Slot {
    Empty,
    Initializing { attempt: u64, flight: InitFlight },
    Ready(ServiceHandle),
}

struct ManagerState {
    slot: Slot,
    attempts: u64,
}

pub struct EncryptionServiceManager {
    network: NetworkConfig,
    bootstrap_timeout: Duration,
    bootstrap: Arc<dyn ServiceBootstrap>,
    state: Mutex<ManagerState>,
}

impl EncryptionServiceManager {
    pub fn new(config: &ClientConfig, bootstrap: Arc<dyn ServiceBootstrap>) -> Self {
        Self {
            network: config.network.clone(),
            bootstrap_timeout: config.bootstrap_timeout(),
            bootstrap,
            state: Mutex::new(ManagerState {
                slot: Slot::Empty,
                attempts: 0,
            }),
        }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.lock().slot, Slot::Ready(_))
    }

    /// The service handle, initializing it on first use
    pub async fn get_instance(&self) -> Result<ServiceHandle> {
        let (attempt, flight) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            match &state.slot {
                Slot::Ready(handle) => return Ok(handle.clone()),
                Slot::Initializing { attempt, flight } => {
                    debug!(attempt, "⏳ Waiting for in-flight encryption service initialization");
                    (*attempt, flight.clone())
                }
                Slot::Empty => {
                    state.attempts += 1;
                    let attempt = state.attempts;
                    info!(attempt, "🚀 Starting FHE initialization process");
                    let flight = initialize(
                        self.network.clone(),
                        self.bootstrap_timeout,
                        self.bootstrap.clone(),
                    )
                    .boxed()
                    .shared();
                    state.slot = Slot::Initializing {
                        attempt,
                        flight: flight.clone(),
                    };
                    (attempt, flight)
                }
            }
        };

        let outcome = flight.await;

        let mut state = self.lock();
        let current = matches!(
            &state.slot,
            Slot::Initializing { attempt: a, .. } if *a == attempt
        );
        if current {
            state.slot = match &outcome {
                Ok(handle) => Slot::Ready(handle.clone()),
                Err(_) => Slot::Empty,
            };
        }

        outcome.map_err(|reason| TradingError::ServiceUnavailable { reason })
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn initialize(
    network: NetworkConfig,
    timeout: Duration,
    bootstrap: Arc<dyn ServiceBootstrap>,
) -> std::result::Result<ServiceHandle, String> {
    debug!(relayer = %network.relayer_url, "🔄 Step 1: Waiting for FHE SDK resources");
    if tokio::time::timeout(timeout, bootstrap.wait_until_available())
        .await
        .is_err()
    {
        let reason = format!(
            "FHE SDK not available after {}ms. Please check network connection.",
            timeout.as_millis()
        );
        error!("❌ {reason}");
        return Err(reason);
    }

    debug!("🔄 Step 2: Initializing FHE SDK");
    if let Err(e) = bootstrap.init_sdk().await {
        warn!(error = %e, "⚠️ FHE SDK initialization failed, creating instance directly");
    }

    debug!(chain_id = network.chain_id, "🔄 Step 3: Creating FHE instance");
    match bootstrap.create_instance(&network).await {
        Ok(handle) => {
            info!("🎉 FHE initialization completed successfully");
            Ok(handle)
        }
        Err(e) => {
            error!(error = %e, "❌ FHE initialization failed");
            Err(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBootstrap, MockService};
    use futures::future::join_all;

    fn manager(bootstrap: &Arc<MockBootstrap>, timeout_ms: u64) -> EncryptionServiceManager {
        let config = ClientConfig {
            bootstrap_timeout_ms: timeout_ms,
            ..ClientConfig::default()
        };
        EncryptionServiceManager::new(&config, bootstrap.clone())
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_initialization() {
        let bootstrap = Arc::new(MockBootstrap::new(MockService::new()).with_delay_ms(30));
        let manager = manager(&bootstrap, 1_000);

        let results = join_all((0..8).map(|_| manager.get_instance())).await;

        assert_eq!(bootstrap.create_calls(), 1);
        assert_eq!(bootstrap.init_calls(), 1);
        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
        }
        assert!(manager.is_ready());

        let later = manager.get_instance().await.unwrap();
        assert!(Arc::ptr_eq(first, &later));
        assert_eq!(bootstrap.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter_and_allows_retry() {
        let bootstrap = Arc::new(
            MockBootstrap::new(MockService::new())
                .with_delay_ms(20)
                .failing_creates(1),
        );
        let manager = manager(&bootstrap, 1_000);

        let results = join_all((0..4).map(|_| manager.get_instance())).await;
        assert_eq!(bootstrap.create_calls(), 1);
        let reasons: Vec<String> = results
            .into_iter()
            .map(|r| match r {
                Err(TradingError::ServiceUnavailable { reason }) => reason,
                other => panic!("expected ServiceUnavailable, got {:?}", other.map(|_| ())),
            })
            .collect();
        assert!(reasons.iter().all(|r| r == &reasons[0]));
        assert!(reasons[0].contains("instance creation refused"));
        assert!(!manager.is_ready());

        manager.get_instance().await.unwrap();
        assert_eq!(bootstrap.create_calls(), 2);
        assert!(manager.is_ready());
    }

    #[tokio::test]
    async fn test_unreachable_relayer_times_out() {
        let bootstrap = Arc::new(MockBootstrap::new(MockService::new()).never_available());
        let manager = manager(&bootstrap, 25);

        let err = manager.get_instance().await.err().unwrap();
        assert!(matches!(err, TradingError::ServiceUnavailable { ref reason } if reason.contains("25ms")));
        assert_eq!(bootstrap.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_sdk_init_failure_is_tolerated() {
        let bootstrap = Arc::new(MockBootstrap::new(MockService::new()).failing_init());
        let manager = manager(&bootstrap, 1_000);

        assert!(manager.get_instance().await.is_ok());
        assert_eq!(bootstrap.init_calls(), 1);
        assert_eq!(bootstrap.create_calls(), 1);
    }
}
