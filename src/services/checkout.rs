//! Payment checkout initiation.
//!
//! The checkout itself is hosted by the payment processor: we request a
//! session and hand the redirect URL to the frontend. Success and cancel
//! both come back through redirects and the billing webhook; this client
//! treats them as opaque.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Identity;

/// The 3-month introductory premium offer.
pub const DEFAULT_OFFER: &str = "premium-3mo";

/// Hosted checkout session, ready for redirect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub url: String,
}

/// Client for the hosted checkout-session endpoint.
#[derive(Clone)]
pub struct CheckoutClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct CheckoutRequest<'a> {
    user_id: &'a str,
    email: &'a str,
    offer_id: &'a str,
}

impl CheckoutClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Create a checkout session and return its redirect URL.
    pub async fn create_session(
        &self,
        identity: &Identity,
        offer_id: &str,
    ) -> Result<CheckoutSession, AppError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&CheckoutRequest {
                user_id: &identity.user_id,
                email: &identity.email,
                offer_id,
            })
            .send()
            .await
            .map_err(|e| AppError::Checkout(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Checkout(format!("HTTP {}: {}", status, body)));
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| AppError::Checkout(format!("JSON parse error: {}", e)))?;

        if session.url.is_empty() {
            return Err(AppError::Checkout("No checkout URL received".to_string()));
        }

        tracing::info!(email = %identity.email, offer = %offer_id, "Checkout session created");
        Ok(session)
    }
}
