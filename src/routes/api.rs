// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::member::{MemberDraft, Relationship};
use crate::models::view::SquadView;
use crate::models::{Identity, TierState};
use crate::services::checkout::{CheckoutSession, DEFAULT_OFFER};
use crate::services::geolocation::Position;
use crate::services::tracker::{AddMemberOutcome, SelfLocationOutcome};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/squad", get(get_squad))
        .route("/api/squad/visibility", put(set_visibility))
        .route("/api/squad/members", post(add_member))
        .route(
            "/api/squad/members/{id}/request-location",
            post(request_location),
        )
        .route("/api/location", put(report_location).delete(remove_location))
        .route("/api/checkout", post(start_checkout))
        .route("/api/invites", post(create_invite))
        .route("/api/tier/refresh", post(refresh_tier))
}

fn identity_of(user: &AuthUser) -> Identity {
    Identity {
        user_id: user.user_id.clone(),
        email: user.email.clone(),
        name: None,
        phone: None,
    }
}

/// Cache key for the remembered sharing preference.
fn sharing_pref_key(email: &str) -> String {
    format!("location_sharing_{}", email.to_lowercase())
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub tier: TierState,
    /// Remembered sharing preference from the last session
    pub remembered_sharing: bool,
}

/// Get current user profile with resolved tier.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let identity = identity_of(&user);
    let tier = state.tier_service.resolve_state(Some(&identity)).await;

    let remembered_sharing = state
        .cache
        .get(&sharing_pref_key(&user.email))
        .as_deref()
        == Some("true");

    Ok(Json(UserResponse {
        user_id: user.user_id,
        email: user.email,
        tier,
        remembered_sharing,
    }))
}

/// Re-resolve the tier through the layered sources. The frontend calls
/// this after a checkout redirect.
async fn refresh_tier(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TierState>> {
    let identity = identity_of(&user);
    let tier = state.tier_service.resolve_state(Some(&identity)).await;
    Ok(Json(tier))
}

// ─── Squad View ──────────────────────────────────────────────

#[derive(Deserialize)]
struct SquadQuery {
    /// Filter term matched against name, phone, and area
    #[serde(default)]
    search: String,
}

/// Get the squad view model, optionally filtered.
async fn get_squad(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SquadQuery>,
) -> Result<Json<SquadView>> {
    let identity = identity_of(&user);
    let tier = state.tier_service.resolve_tier(Some(&identity)).await;

    let mut tracker = state.tracker_session(&identity);
    tracker.set_search(query.search);
    Ok(Json(tracker.view(tier, Utc::now())))
}

#[derive(Deserialize)]
struct VisibilityRequest {
    visible: bool,
}

/// Show or hide the tracker panel. Hiding cancels in-flight work.
async fn set_visibility(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<VisibilityRequest>,
) -> Result<Json<SquadView>> {
    let identity = identity_of(&user);
    let tier = state.tier_service.resolve_tier(Some(&identity)).await;

    let mut tracker = state.tracker_session(&identity);
    if body.visible {
        tracker.show();
    } else {
        tracker.hide();
    }
    Ok(Json(tracker.view(tier, Utc::now())))
}

// ─── Roster Mutation ─────────────────────────────────────────

/// Add-member request body.
#[derive(Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(max = 32))]
    pub phone: String,
    pub relationship: Option<Relationship>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: String,
}

/// Add-member response; denial outcomes are data, not errors.
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum AddMemberResponse {
    Added {
        #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
        member_id: u64,
    },
    Invalid {
        missing: Vec<String>,
    },
    /// Upgrade-prompt signal for the frontend
    UpgradeRequired {
        free_limit: usize,
        message: String,
    },
}

/// Add a member to the squad, subject to the tier limit.
async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AddMemberRequest>,
) -> Result<Json<AddMemberResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let identity = identity_of(&user);
    let tier = state.tier_service.resolve_tier(Some(&identity)).await;

    let draft = MemberDraft {
        name: body.name,
        phone: body.phone,
        relationship: body.relationship,
        notes: body.notes,
    };

    let mut tracker = state.tracker_session(&identity);
    let response = match tracker.add_member(&draft, tier) {
        AddMemberOutcome::Added { member_id } => AddMemberResponse::Added { member_id },
        AddMemberOutcome::Invalid { missing } => AddMemberResponse::Invalid {
            missing: missing.into_iter().map(String::from).collect(),
        },
        AddMemberOutcome::LimitReached { free_limit } => AddMemberResponse::UpgradeRequired {
            free_limit,
            message: format!(
                "You've reached the limit of {} squad member{} for Basic users. \
                 Upgrade to Premium for unlimited squad members!",
                free_limit,
                if free_limit == 1 { "" } else { "s" }
            ),
        },
    };

    Ok(Json(response))
}

/// Request location sharing from a squad member (simulated grant).
async fn request_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(member_id): Path<u64>,
) -> Result<Json<SquadView>> {
    let identity = identity_of(&user);
    let tier = state.tier_service.resolve_tier(Some(&identity)).await;

    let mut tracker = state.tracker_session(&identity);
    if !tracker.request_location_sharing(member_id) {
        return Err(AppError::NotFound(format!("Member {} not found", member_id)));
    }
    Ok(Json(tracker.view(tier, Utc::now())))
}

// ─── Self Location ───────────────────────────────────────────

/// Device position report from the web shell.
#[derive(Deserialize, Validate)]
pub struct LocationReport {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub accuracy: Option<f64>,
    /// Fix timestamp; defaults to receipt time
    pub timestamp: Option<chrono::DateTime<Utc>>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LocationResponse {
    pub area: String,
    pub sharing: bool,
}

/// Apply the current user's device position to their roster entry.
async fn report_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<LocationReport>,
) -> Result<Json<LocationResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let identity = identity_of(&user);
    let position = Position {
        latitude: body.latitude,
        longitude: body.longitude,
        accuracy: body.accuracy,
        timestamp: body.timestamp.unwrap_or_else(Utc::now),
    };

    let mut tracker = state.tracker_session(&identity);
    let epoch = tracker.epoch();
    let outcome = tracker.update_self_location(epoch, position);
    drop(tracker);

    match outcome {
        SelfLocationOutcome::Applied { area, .. } => {
            state.cache.set(&sharing_pref_key(&user.email), "true");
            Ok(Json(LocationResponse {
                area,
                sharing: true,
            }))
        }
        SelfLocationOutcome::Stale => Err(AppError::BadRequest(
            "Location report arrived for a closed tracker".to_string(),
        )),
    }
}

/// Stop sharing the current user's location.
async fn remove_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LocationResponse>> {
    let identity = identity_of(&user);

    let mut tracker = state.tracker_session(&identity);
    tracker.remove_self_location();
    drop(tracker);

    state.cache.set(&sharing_pref_key(&user.email), "false");
    Ok(Json(LocationResponse {
        area: String::new(),
        sharing: false,
    }))
}

// ─── Checkout & Invites ──────────────────────────────────────

#[derive(Deserialize)]
struct CheckoutRequest {
    offer_id: Option<String>,
}

/// Create a hosted checkout session and return its redirect URL.
async fn start_checkout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Option<Json<CheckoutRequest>>,
) -> Result<Json<CheckoutSession>> {
    let identity = identity_of(&user);
    let offer = body
        .and_then(|Json(b)| b.offer_id)
        .unwrap_or_else(|| DEFAULT_OFFER.to_string());

    let session = state.checkout.create_session(&identity, &offer).await?;
    Ok(Json(session))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InviteResponse {
    pub code: String,
    pub url: String,
    pub message: String,
    pub whatsapp_url: String,
}

/// Mint a signed invite link for the current user.
async fn create_invite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<InviteResponse>> {
    let identity = identity_of(&user);
    let invite = state
        .invites
        .create_invite(&identity)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invite signing failed: {}", e)))?;

    Ok(Json(InviteResponse {
        code: invite.code,
        url: invite.url,
        message: invite.message,
        whatsapp_url: invite.whatsapp_url,
    }))
}
