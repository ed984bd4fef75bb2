// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! TagYou Tracker: carnival squad location sharing.
//!
//! This crate provides the backend API for squad rosters, tier-gated
//! features, and carnival-area classification of shared locations.

pub mod config;
pub mod contact;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;

use config::Config;
use models::Identity;
use services::{
    AuthClient, CheckoutClient, Gazetteer, InviteService, KeyValueCache, PremiumRegistry,
    SelfProfile, TierService, TrackerController,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gazetteer: Arc<Gazetteer>,
    pub cache: Arc<dyn KeyValueCache>,
    pub tier_service: TierService,
    /// Premium registry handle; `None` when running without the hosted table
    pub registry: Option<Arc<dyn PremiumRegistry>>,
    pub auth_client: AuthClient,
    pub checkout: CheckoutClient,
    pub invites: InviteService,
    /// One tracker per authenticated user, keyed by provider user ID
    pub sessions: DashMap<String, TrackerController>,
}

impl AppState {
    /// Fetch or create the tracker session for an identity.
    ///
    /// The returned guard is the single writer for that roster; hold it
    /// only across synchronous controller calls.
    pub fn tracker_session(
        &self,
        identity: &Identity,
    ) -> RefMut<'_, String, TrackerController> {
        self.sessions
            .entry(identity.user_id.clone())
            .or_insert_with(|| {
                TrackerController::new(
                    SelfProfile::from_identity(identity),
                    self.gazetteer.clone(),
                    self.config.free_member_limit,
                )
            })
    }

    /// Drop a user's tracker session (sign-out teardown). Any in-flight
    /// async work finds its session gone and has nowhere to resolve into.
    pub fn end_tracker_session(&self, user_id: &str) {
        if self.sessions.remove(user_id).is_some() {
            tracing::debug!(user_id = %user_id, "Tracker session dropped");
        }
    }
}
