// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tier policy: layered Basic/Premium resolution and capability gating.
//!
//! Resolution sources, in order: local cache, remote premium registry,
//! static allow-list. First hit wins. Remote lookups run against a hard
//! one-second deadline; failure or timeout silently falls through to the
//! next source. Hits from the registry or allow-list are written back to
//! the cache so later resolutions short-circuit there. Cached tiers are
//! stale-until-refreshed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::models::{Identity, Tier, TierState};
use crate::services::cache::KeyValueCache;
use crate::services::registry::PremiumRegistry;

/// Hard deadline for one remote registry lookup.
pub const REGISTRY_DEADLINE: Duration = Duration::from_secs(1);

/// Outcome of consulting a single resolution source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceLookup {
    Found(Tier),
    NotFound,
    Unavailable,
}

/// A tier change notification sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierChange {
    pub email: String,
    pub tier: Tier,
}

/// Resolves and caches user tiers; notifies dependents of overrides.
#[derive(Clone)]
pub struct TierService {
    cache: Arc<dyn KeyValueCache>,
    registry: Option<Arc<dyn PremiumRegistry>>,
    allowlist: Vec<String>,
    changes: watch::Sender<Option<TierChange>>,
}

impl TierService {
    /// The registry handle is injected once at startup; `None` means the
    /// remote source is permanently unavailable (offline/test shells).
    pub fn new(
        cache: Arc<dyn KeyValueCache>,
        registry: Option<Arc<dyn PremiumRegistry>>,
        allowlist: Vec<String>,
    ) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            cache,
            registry,
            allowlist: allowlist.into_iter().map(|e| e.to_lowercase()).collect(),
            changes,
        }
    }

    /// Subscribe to tier overrides (payment confirmations, admin actions).
    pub fn subscribe(&self) -> watch::Receiver<Option<TierChange>> {
        self.changes.subscribe()
    }

    /// Resolve the tier for an identity.
    ///
    /// An unauthenticated caller is `Basic` immediately; no source is
    /// consulted.
    pub async fn resolve_tier(&self, identity: Option<&Identity>) -> Tier {
        let Some(identity) = identity else {
            return Tier::Basic;
        };
        let email = identity.email.to_lowercase();

        if let SourceLookup::Found(tier) = self.cache_lookup(&email) {
            return tier;
        }

        match self.registry_lookup(&email).await {
            SourceLookup::Found(tier) => {
                self.write_back(&email, tier);
                return tier;
            }
            SourceLookup::Unavailable => {
                tracing::debug!(email = %email, "Premium registry unavailable, trying allow-list");
            }
            SourceLookup::NotFound => {}
        }

        if self.allowlist.contains(&email) {
            self.write_back(&email, Tier::Premium);
            return Tier::Premium;
        }

        Tier::Basic
    }

    /// Resolve to the full capability view.
    pub async fn resolve_state(&self, identity: Option<&Identity>) -> TierState {
        TierState::from(self.resolve_tier(identity).await)
    }

    /// Explicit tier override (payment confirmation or admin action).
    ///
    /// The cache write and the subscriber notification both complete before
    /// this returns.
    pub fn set_tier(&self, email: &str, tier: Tier) {
        let email = email.to_lowercase();
        self.cache.set(
            &cache_key(&email),
            if tier.is_premium() { "true" } else { "false" },
        );
        let _ = self.changes.send(Some(TierChange {
            email: email.clone(),
            tier,
        }));
        tracing::info!(email = %email, tier = ?tier, "Tier override applied");
    }

    fn cache_lookup(&self, email: &str) -> SourceLookup {
        match self.cache.get(&cache_key(email)).as_deref() {
            Some("true") => SourceLookup::Found(Tier::Premium),
            Some("false") => SourceLookup::Found(Tier::Basic),
            Some(other) => {
                tracing::warn!(email = %email, value = %other, "Malformed tier cache entry");
                SourceLookup::NotFound
            }
            None => SourceLookup::NotFound,
        }
    }

    async fn registry_lookup(&self, email: &str) -> SourceLookup {
        let Some(registry) = &self.registry else {
            return SourceLookup::Unavailable;
        };

        match tokio::time::timeout(REGISTRY_DEADLINE, registry.is_premium(email)).await {
            Ok(Ok(true)) => SourceLookup::Found(Tier::Premium),
            Ok(Ok(false)) => SourceLookup::NotFound,
            Ok(Err(err)) => {
                tracing::debug!(email = %email, error = %err, "Registry lookup failed");
                SourceLookup::Unavailable
            }
            Err(_) => {
                tracing::debug!(email = %email, "Registry lookup timed out");
                SourceLookup::Unavailable
            }
        }
    }

    fn write_back(&self, email: &str, tier: Tier) {
        self.cache.set(
            &cache_key(email),
            if tier.is_premium() { "true" } else { "false" },
        );
    }
}

fn cache_key(email: &str) -> String {
    format!("premium_{}", email)
}
