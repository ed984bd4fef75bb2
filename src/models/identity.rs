//! Authenticated identity as provided by the hosted auth service.

use serde::{Deserialize, Serialize};

/// The current user's identity, as verified by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user ID (also the session key)
    pub user_id: String,
    pub email: String,
    /// Full name from provider metadata, if shared
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl Identity {
    /// Display name: provider full name, else the email local part.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            if !name.trim().is_empty() {
                return name.clone();
            }
        }
        self.email
            .split('@')
            .next()
            .unwrap_or(&self.email)
            .to_string()
    }
}
