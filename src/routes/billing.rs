// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Billing webhook routes for payment-processor events.
//!
//! The processor signs the raw request body with HMAC-SHA256; events with
//! a missing or mismatched signature are rejected before parsing. Tier
//! flips happen here: a completed checkout records the premium user in the
//! registry and overrides the cached tier so the frontend sees the upgrade
//! on its next refresh.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;

use crate::models::Tier;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Signature header set by the payment processor.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Billing webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/billing/webhook", post(handle_event))
}

/// Payment event payload (subset we consume).
#[derive(Debug, Deserialize)]
struct BillingEvent {
    #[serde(rename = "type")]
    event_type: String,
    /// Customer email the event applies to
    email: String,
    /// Opaque payment metadata forwarded to the registry
    #[serde(default)]
    payment: serde_json::Value,
}

/// Verify the HMAC-SHA256 signature over the raw body.
fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Handle incoming billing events (POST).
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok()) else {
        tracing::warn!("Billing webhook missing signature header");
        return StatusCode::BAD_REQUEST;
    };

    if !verify_signature(&state.config.payment_webhook_secret, &body, signature) {
        tracing::warn!("Billing webhook signature mismatch");
        return StatusCode::UNAUTHORIZED;
    }

    let event: BillingEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "Billing webhook body failed to parse");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(
        event_type = %event.event_type,
        email = %event.email,
        "Billing event received"
    );

    match event.event_type.as_str() {
        "checkout.completed" => {
            // Registry write is best-effort: the cached tier override below
            // keeps the user premium locally until the registry catches up.
            if let Some(registry) = &state.registry {
                if let Err(err) = registry.add_premium_user(&event.email, event.payment).await {
                    tracing::error!(error = %err, email = %event.email, "Registry premium add failed");
                }
            }
            state.tier_service.set_tier(&event.email, Tier::Premium);
            StatusCode::OK
        }
        "subscription.canceled" => {
            if let Some(registry) = &state.registry {
                if let Err(err) = registry.remove_premium_user(&event.email).await {
                    tracing::error!(error = %err, email = %event.email, "Registry premium remove failed");
                }
            }
            state.tier_service.set_tier(&event.email, Tier::Basic);
            StatusCode::OK
        }
        other => {
            tracing::debug!(event_type = %other, "Ignoring unhandled billing event");
            StatusCode::OK
        }
    }
}
