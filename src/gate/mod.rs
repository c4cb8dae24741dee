//! Connection gate
//!
//! Bounds concurrent round-trips against one analytical data source.
//!
//! # Rules
//!
//! - One gate per registered source, never shared across sources
//! - No round-trip starts before a permit is held
//! - A permit covers exactly one round-trip
//! - Release happens on drop, so errors, panics and cancelled futures
//!   all give the permit back
//!
//! Waiters are served in FIFO order.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Gate errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The gate was closed while a task was waiting on it
    #[error("Connection gate for source '{0}' is closed")]
    Closed(String),
}

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;

/// Counting admission control for physical connections to one source
#[derive(Debug)]
pub struct ConnectionGate {
    source_name: String,
    capacity: NonZeroUsize,
    semaphore: Arc<Semaphore>,
}

impl ConnectionGate {
    /// Create a gate with all permits available
    pub fn new(source_name: impl Into<String>, capacity: NonZeroUsize) -> Self {
        Self {
            source_name: source_name.into(),
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity.get())),
        }
    }

    /// Wait for a permit.
    ///
    /// The returned permit releases itself when dropped.
    pub async fn acquire(&self) -> GateResult<GatePermit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| GateError::Closed(self.source_name.clone()))?;

        Ok(GatePermit { _permit: permit })
    }

    /// Run one round-trip while holding a permit.
    ///
    /// `round_trip` is not polled until the permit is held, and the permit is
    /// dropped as soon as it resolves (or as soon as this future is dropped).
    pub async fn guarded<F, T>(&self, round_trip: F) -> GateResult<T>
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire().await?;
        Ok(round_trip.await)
    }

    /// Stop admitting new round-trips. Current waiters fail with `Closed`.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Name of the source this gate protects
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Maximum number of concurrent permits
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Permits currently held
    pub fn in_use(&self) -> usize {
        self.capacity() - self.available()
    }
}

/// A held gate permit. Dropping it returns the permit to the gate.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate(capacity: usize) -> ConnectionGate {
        ConnectionGate::new("sales", NonZeroUsize::new(capacity).unwrap())
    }

    #[tokio::test]
    async fn test_acquire_and_drop_restores_capacity() {
        let gate = gate(2);
        assert_eq!(gate.available(), 2);

        let first = gate.acquire().await.unwrap();
        assert_eq!(gate.available(), 1);
        let second = gate.acquire().await.unwrap();
        assert_eq!(gate.available(), 0);
        assert_eq!(gate.in_use(), 2);

        drop(first);
        assert_eq!(gate.available(), 1);
        drop(second);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn test_guarded_releases_on_error() {
        let gate = gate(1);

        for _ in 0..5 {
            let result: GateResult<Result<(), String>> = gate
                .guarded(async { Err("connection refused".to_string()) })
                .await;
            assert!(result.unwrap().is_err());
            assert_eq!(gate.available(), 1);
        }
    }

    #[tokio::test]
    async fn test_guarded_releases_on_panic() {
        let gate = Arc::new(gate(1));
        let inner = Arc::clone(&gate);

        let handle = tokio::spawn(async move {
            inner
                .guarded(async {
                    panic!("query blew up");
                })
                .await
        });

        assert!(handle.await.is_err());
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_round_trip_releases_permit() {
        let gate = gate(1);

        let slow = gate.guarded(tokio::time::sleep(Duration::from_secs(60)));
        let timed_out = tokio::time::timeout(Duration::from_millis(10), slow).await;

        assert!(timed_out.is_err());
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn test_waiter_proceeds_after_release() {
        let gate = Arc::new(gate(1));
        let held = gate.acquire().await.unwrap();

        let waiter_gate = Arc::clone(&gate);
        let waiter = tokio::spawn(async move { waiter_gate.guarded(async { 7 }).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        assert_eq!(waiter.await.unwrap().unwrap(), 7);
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn test_closed_gate_rejects_waiters() {
        let gate = gate(1);
        gate.close();

        let err = gate.acquire().await.unwrap_err();
        assert_eq!(err, GateError::Closed("sales".to_string()));
    }
}
