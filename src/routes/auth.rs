// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication routes.
//!
//! The frontend authenticates against the hosted identity provider and
//! exchanges the provider access token here for our own session JWT. The
//! token is returned in the body and set as a cookie; the API middleware
//! accepts either.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, Claims, SESSION_COOKIE};
use crate::models::TierState;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(create_session))
        .route("/auth/logout", get(logout))
}

/// Session-creation request: the provider access token held by the frontend.
#[derive(Deserialize)]
struct SessionRequest {
    access_token: String,
}

/// Session-creation response.
#[derive(Serialize)]
struct SessionResponse {
    token: String,
    user_id: String,
    email: String,
    name: Option<String>,
    tier: TierState,
}

/// Exchange a provider access token for a session JWT.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SessionRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if body.access_token.trim().is_empty() {
        return Err(AppError::BadRequest("access_token is required".to_string()));
    }

    let identity = state.auth_client.get_user(&body.access_token).await?;

    let jwt = create_jwt(&identity.user_id, &identity.email, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    // Create the tracker session eagerly with the full provider profile,
    // so the self entry gets a real display name and phone.
    drop(state.tracker_session(&identity));

    let tier = state.tier_service.resolve_state(Some(&identity)).await;

    tracing::info!(
        user_id = %identity.user_id,
        tier = ?tier.tier,
        "Session created"
    );

    let mut cookie = Cookie::new(SESSION_COOKIE, jwt.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::days(30));
    let jar = jar.add(cookie);

    Ok((
        jar,
        Json(SessionResponse {
            token: jwt,
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            tier,
        }),
    ))
}

/// End the session: drop the tracker roster and clear the cookie.
///
/// The provider session (if any) is left to expire on its own; only our
/// own state is torn down here.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    // Best-effort: identify the session from the cookie so we can drop
    // the roster. An unreadable token still clears the cookie.
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
        let validation = Validation::new(Algorithm::HS256);
        if let Ok(token_data) = decode::<Claims>(cookie.value(), &key, &validation) {
            state.end_tracker_session(&token_data.claims.sub);
            tracing::info!(user_id = %token_data.claims.sub, "Session ended");
        }
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    let jar = jar.remove(removal);

    (jar, Json(serde_json::json!({ "success": true })))
}
