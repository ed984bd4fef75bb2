// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client (hosted Supabase auth).
//!
//! Verifies frontend-held access tokens and maps provider users to our
//! [`Identity`]. Sessions themselves are our own JWTs; the provider is only
//! consulted at sign-in and sign-out.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::Identity;

/// Supabase auth REST client.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Provider user payload (subset we consume).
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    user_metadata: ProviderMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

impl AuthClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key,
        }
    }

    /// Verify an access token and return the identity it belongs to.
    pub async fn get_user(&self, access_token: &str) -> Result<Identity, AppError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        if response.status().as_u16() == 401 {
            return Err(AppError::InvalidToken);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::IdentityProvider(format!("HTTP {}: {}", status, body)));
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("JSON parse error: {}", e)))?;

        Ok(Identity {
            user_id: user.id,
            email: user.email,
            name: user.user_metadata.full_name,
            phone: user.phone.filter(|p| !p.is_empty()),
        })
    }

    /// Invalidate the provider session for an access token.
    ///
    /// Failures are logged and swallowed: our own session cookie is cleared
    /// regardless, and a dangling provider session expires on its own.
    pub async fn sign_out(&self, access_token: &str) {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let result = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                tracing::debug!(status = %response.status(), "Provider sign-out returned non-success");
            }
            Err(err) => {
                tracing::debug!(error = %err, "Provider sign-out request failed");
            }
            _ => {}
        }
    }
}
