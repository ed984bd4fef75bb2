// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Premium-user registry client (hosted Supabase table).
//!
//! Handles:
//! - Premium membership lookups during tier resolution
//! - Registry writes when a payment completes or a subscription ends
//!
//! The registry is an external collaborator: every operation can fail, and
//! tier resolution treats failure as "source unavailable", not an error.

use chrono::Utc;
use futures_util::future::BoxFuture;
use serde::Deserialize;

use crate::time_utils::format_utc_rfc3339;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry request failed: {0}")]
    Request(String),

    #[error("Registry returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Failed to parse registry response: {0}")]
    Parse(String),
}

/// Premium registry capability.
///
/// Dyn-compatible so tier resolution can run against test doubles.
pub trait PremiumRegistry: Send + Sync {
    /// Whether `email` currently holds an active premium record.
    fn is_premium<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<bool, RegistryError>>;

    /// Record a premium purchase with its opaque payment metadata.
    fn add_premium_user<'a>(
        &'a self,
        email: &'a str,
        payment: serde_json::Value,
    ) -> BoxFuture<'a, Result<(), RegistryError>>;

    /// Drop a user's premium record (cancellation or admin action).
    fn remove_premium_user<'a>(&'a self, email: &'a str)
        -> BoxFuture<'a, Result<(), RegistryError>>;
}

/// Supabase REST implementation of the premium registry.
#[derive(Clone)]
pub struct SupabaseRegistry {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

/// One row of the `premium_users` table.
#[derive(Debug, Deserialize)]
struct PremiumRecord {
    #[allow(dead_code)]
    email: String,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

impl SupabaseRegistry {
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            service_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/premium_users", self.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Check response status and surface the body on failure.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(RegistryError::Status(status, body))
    }
}

impl PremiumRegistry for SupabaseRegistry {
    fn is_premium<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<bool, RegistryError>> {
        Box::pin(async move {
            let url = format!(
                "{}?select=email,is_active&email=eq.{}",
                self.table_url(),
                urlencoding::encode(&email.to_lowercase())
            );

            let response = self
                .authed(self.http.get(&url))
                .send()
                .await
                .map_err(|e| RegistryError::Request(e.to_string()))?;

            let records: Vec<PremiumRecord> = Self::check_response(response)
                .await?
                .json()
                .await
                .map_err(|e| RegistryError::Parse(e.to_string()))?;

            Ok(records.iter().any(|r| r.is_active))
        })
    }

    fn add_premium_user<'a>(
        &'a self,
        email: &'a str,
        payment: serde_json::Value,
    ) -> BoxFuture<'a, Result<(), RegistryError>> {
        Box::pin(async move {
            let body = serde_json::json!({
                "email": email.to_lowercase(),
                "is_active": true,
                "payment_data": payment,
                "upgraded_at": format_utc_rfc3339(Utc::now()),
            });

            let response = self
                .authed(self.http.post(self.table_url()))
                .header("Prefer", "resolution=merge-duplicates")
                .json(&body)
                .send()
                .await
                .map_err(|e| RegistryError::Request(e.to_string()))?;

            Self::check_response(response).await?;
            tracing::info!(email = %email, "Premium user recorded in registry");
            Ok(())
        })
    }

    fn remove_premium_user<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<(), RegistryError>> {
        Box::pin(async move {
            let url = format!(
                "{}?email=eq.{}",
                self.table_url(),
                urlencoding::encode(&email.to_lowercase())
            );

            let response = self
                .authed(self.http.delete(&url))
                .send()
                .await
                .map_err(|e| RegistryError::Request(e.to_string()))?;

            Self::check_response(response).await?;
            tracing::info!(email = %email, "Premium user removed from registry");
            Ok(())
        })
    }
}
