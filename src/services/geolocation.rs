//! Device positioning seam.
//!
//! The server never talks to positioning hardware itself: web clients report
//! positions over the API, and embedded shells inject a platform-backed
//! [`LocationProvider`]. Platform failures degrade to `false`/`None` —
//! absence of a fix is a normal state, never an error.

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy in meters, if known
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Platform positioning capability. Single-shot, no watch semantics.
pub trait LocationProvider: Send + Sync {
    /// Resolve `true` if location permission is (or was previously) granted.
    /// Denial and missing capability are both a normal `false`.
    fn request_permission(&self) -> BoxFuture<'_, bool>;

    /// One-shot position request; `None` on timeout or platform error.
    fn current_position(&self, timeout: Duration) -> BoxFuture<'_, Option<Position>>;
}

/// Provider for environments without positioning hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLocationProvider;

impl LocationProvider for NullLocationProvider {
    fn request_permission(&self) -> BoxFuture<'_, bool> {
        Box::pin(async { false })
    }

    fn current_position(&self, _timeout: Duration) -> BoxFuture<'_, Option<Position>> {
        Box::pin(async { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_provider_degrades_quietly() {
        let provider = NullLocationProvider;
        assert!(!provider.request_permission().await);
        assert!(provider
            .current_position(Duration::from_secs(10))
            .await
            .is_none());
    }
}
