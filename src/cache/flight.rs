//! Single-Flight Module
//!
//! Collapses concurrent loads for the same key into one execution.
//!
//! The first caller for a cold key registers a flight and spawns the load on
//! its own task; everyone arriving while it runs awaits the same shared
//! outcome. The flight is released on the load task as soon as the loader
//! settles, before any caller sees the result, so the next call after a
//! failure starts a fresh attempt. A load task dropped before it settles
//! (runtime shutdown, for one) releases its flight too.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};

type Pending<T> = Shared<BoxFuture<'static, Result<T>>>;
type FlightTable<T> = Arc<Mutex<HashMap<String, Pending<T>>>>;

// == Flight Guard ==
/// Releases a key's flight when the load task owning it goes away.
struct FlightGuard<T> {
    flights: FlightTable<T>,
    key: String,
}

impl<T> Drop for FlightGuard<T> {
    fn drop(&mut self) {
        self.flights.lock().remove(&self.key);
    }
}

// == Single Flight ==
/// Per-key coordinator guaranteeing at most one running load per key.
pub struct SingleFlight<T> {
    /// key → outcome of the load currently running for it
    flights: FlightTable<T>,
    /// Callers that attached to someone else's load
    joined: AtomicU64,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            flights: Arc::new(Mutex::new(HashMap::new())),
            joined: AtomicU64::new(0),
        }
    }

    // == Coalesce ==
    /// Runs `loader` for `key` unless a load is already running, in which case
    /// the caller waits for that load's outcome instead.
    ///
    /// `loader` is only called on the spawned load task, never under the table
    /// lock. The load is not tied to the caller: dropping the returned future
    /// does not stop it.
    ///
    /// # Panics
    ///
    /// Panics when a new load has to be started outside a tokio runtime.
    pub async fn coalesce<L, F>(&self, key: &str, loader: L) -> Result<T>
    where
        L: FnOnce() -> F + Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (pending, sender) = {
            let mut flights = self.flights.lock();
            if let Some(pending) = flights.get(key) {
                self.joined.fetch_add(1, Ordering::Relaxed);
                debug!(key, "Joining in-flight load");
                (pending.clone(), None)
            } else {
                debug!(key, "Starting load");
                let (sender, pending) = Self::pending(key.to_string());
                flights.insert(key.to_string(), pending.clone());
                (pending, Some(sender))
            }
        };

        // The guard takes the table lock on drop, so spawn only once it is free.
        if let Some(sender) = sender {
            self.launch(key.to_string(), sender, loader);
        }

        pending.await
    }

    // == Pending ==
    /// Creates the shared outcome callers await and the sender that fills it.
    ///
    /// A sender dropped without sending means the load task was cancelled.
    fn pending(key: String) -> (oneshot::Sender<Result<T>>, Pending<T>) {
        let (sender, receiver) = oneshot::channel();
        let pending = async move {
            receiver.await.unwrap_or_else(|_| {
                Err(CacheError::Internal(format!(
                    "load task for '{key}' was cancelled"
                )))
            })
        }
        .boxed()
        .shared();

        (sender, pending)
    }

    // == Launch ==
    /// Spawns the load for a flight already registered under `key`.
    fn launch<L, F>(&self, key: String, sender: oneshot::Sender<Result<T>>, loader: L)
    where
        L: FnOnce() -> F + Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        // Moved into the task before its first poll, so even a task that never
        // runs releases the flight when dropped.
        let guard = FlightGuard {
            flights: Arc::clone(&self.flights),
            key,
        };

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(async move { loader().await })
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(key = %guard.key, "Loader panicked");
                    Err(CacheError::LoaderPanicked {
                        key: guard.key.clone(),
                    })
                }
            };

            drop(guard);
            // Every waiter may have gone away already.
            let _ = sender.send(outcome);
        });
    }

    // == Introspection ==
    /// Number of loads currently running.
    pub fn in_flight(&self) -> usize {
        self.flights.lock().len()
    }

    /// Whether a load is running for `key`.
    pub fn is_loading(&self, key: &str) -> bool {
        self.flights.lock().contains_key(key)
    }

    /// Total callers that joined an existing load.
    pub fn joined(&self) -> u64 {
        self.joined.load(Ordering::Relaxed)
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
