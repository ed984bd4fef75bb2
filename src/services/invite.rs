// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed squad invite links.
//!
//! An invite code is `email|timestamp_hex|signature_hex`, HMAC-SHA256
//! signed and base64url-encoded, so the frontend can hand out shareable
//! links without a database round trip and the redeeming side can trust
//! the inviter field.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::models::Identity;

type HmacSha256 = Hmac<Sha256>;

/// Invites older than this are rejected at redemption.
const INVITE_MAX_AGE_MS: u128 = 7 * 24 * 60 * 60 * 1000;

/// Errors from invite creation/redemption.
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("Malformed invite code")]
    Malformed,

    #[error("Invite signature mismatch")]
    BadSignature,

    #[error("Invite has expired")]
    Expired,

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// A freshly minted invite.
#[derive(Debug, Clone)]
pub struct Invite {
    /// Opaque signed code
    pub code: String,
    /// Redemption URL on the frontend
    pub url: String,
    /// Prefilled share message
    pub message: String,
    /// WhatsApp share deep link
    pub whatsapp_url: String,
}

/// Verified contents of a redeemed invite code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteClaims {
    pub inviter_email: String,
    pub issued_at_ms: u128,
}

/// Mints and verifies signed invite links.
#[derive(Clone)]
pub struct InviteService {
    signing_key: Vec<u8>,
    frontend_url: String,
}

impl InviteService {
    pub fn new(signing_key: Vec<u8>, frontend_url: String) -> Self {
        Self {
            signing_key,
            frontend_url,
        }
    }

    /// Create a signed invite for the current user.
    pub fn create_invite(&self, identity: &Identity) -> Result<Invite, InviteError> {
        let timestamp = Utc::now().timestamp_millis().max(0) as u128;
        let payload = format!("{}|{:x}", identity.email.to_lowercase(), timestamp);

        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| InviteError::Signing(e.to_string()))?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        let signed = format!("{}|{}", payload, hex::encode(signature));
        let code = URL_SAFE_NO_PAD.encode(signed.as_bytes());

        let url = format!("{}/invite?code={}", self.frontend_url, code);
        let message = format!(
            "Join me at the carnival! \u{1F3AD} Download TagYou to track events together: {}",
            url
        );
        let whatsapp_url = format!("https://wa.me/?text={}", urlencoding::encode(&message));

        Ok(Invite {
            code,
            url,
            message,
            whatsapp_url,
        })
    }

    /// Verify an invite code and return its claims.
    pub fn verify_code(&self, code: &str) -> Result<InviteClaims, InviteError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(code.as_bytes())
            .map_err(|_| InviteError::Malformed)?;
        let signed = String::from_utf8(decoded).map_err(|_| InviteError::Malformed)?;

        let parts: Vec<&str> = signed.split('|').collect();
        let &[email, timestamp_hex, signature_hex] = parts.as_slice() else {
            return Err(InviteError::Malformed);
        };

        let payload = format!("{}|{}", email, timestamp_hex);
        let signature = hex::decode(signature_hex).map_err(|_| InviteError::Malformed)?;

        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| InviteError::Signing(e.to_string()))?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| InviteError::BadSignature)?;

        let issued_at_ms =
            u128::from_str_radix(timestamp_hex, 16).map_err(|_| InviteError::Malformed)?;

        let now = Utc::now().timestamp_millis().max(0) as u128;
        if now.saturating_sub(issued_at_ms) > INVITE_MAX_AGE_MS {
            return Err(InviteError::Expired);
        }

        Ok(InviteClaims {
            inviter_email: email.to_string(),
            issued_at_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> InviteService {
        InviteService::new(
            b"test_invite_key".to_vec(),
            "http://localhost:8888".to_string(),
        )
    }

    fn identity() -> Identity {
        Identity {
            user_id: "u1".to_string(),
            email: "Alex@Example.com".to_string(),
            name: None,
            phone: None,
        }
    }

    #[test]
    fn test_invite_roundtrip() {
        let service = service();
        let invite = service.create_invite(&identity()).expect("invite");

        let claims = service.verify_code(&invite.code).expect("verify");
        assert_eq!(claims.inviter_email, "alex@example.com");
        assert!(invite.url.contains("/invite?code="));
        assert!(invite.whatsapp_url.starts_with("https://wa.me/?text="));
    }

    #[test]
    fn test_tampered_code_rejected() {
        let service = service();
        let invite = service.create_invite(&identity()).expect("invite");

        // Re-sign with a different key to simulate forgery
        let forger = InviteService::new(b"other_key".to_vec(), "http://evil".to_string());
        let forged = forger.create_invite(&identity()).expect("invite");

        assert!(matches!(
            service.verify_code(&forged.code),
            Err(InviteError::BadSignature)
        ));
        assert!(service.verify_code(&invite.code).is_ok());
    }

    #[test]
    fn test_garbage_code_is_malformed() {
        let service = service();
        assert!(matches!(
            service.verify_code("not-base64!!!"),
            Err(InviteError::Malformed)
        ));
        assert!(matches!(
            service.verify_code(&URL_SAFE_NO_PAD.encode(b"no-pipes-here")),
            Err(InviteError::Malformed)
        ));
    }
}
