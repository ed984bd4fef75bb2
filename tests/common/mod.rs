// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use tagyou_tracker::config::Config;
use tagyou_tracker::routes::create_router;
use tagyou_tracker::services::registry::{PremiumRegistry, RegistryError};
use tagyou_tracker::services::{
    AuthClient, CheckoutClient, Gazetteer, InviteService, MemoryCache, TierService,
};
use tagyou_tracker::AppState;

/// In-memory premium registry with call counting.
#[derive(Default)]
pub struct MockRegistry {
    premium: Mutex<HashSet<String>>,
    lookup_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockRegistry {
    pub fn with_premium(emails: &[&str]) -> Arc<Self> {
        let registry = Self::default();
        {
            let mut premium = registry.premium.lock().unwrap();
            for email in emails {
                premium.insert(email.to_lowercase());
            }
        }
        Arc::new(registry)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, email: &str) -> bool {
        self.premium.lock().unwrap().contains(&email.to_lowercase())
    }
}

impl PremiumRegistry for MockRegistry {
    fn is_premium<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<bool, RegistryError>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        let premium = self.premium.lock().unwrap().contains(&email.to_lowercase());
        Box::pin(async move { Ok(premium) })
    }

    fn add_premium_user<'a>(
        &'a self,
        email: &'a str,
        _payment: serde_json::Value,
    ) -> BoxFuture<'a, Result<(), RegistryError>> {
        self.premium.lock().unwrap().insert(email.to_lowercase());
        Box::pin(async { Ok(()) })
    }

    fn remove_premium_user<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<(), RegistryError>> {
        self.premium.lock().unwrap().remove(&email.to_lowercase());
        Box::pin(async { Ok(()) })
    }
}

/// Small in-test gazetteer with two carnival landmarks.
#[allow(dead_code)]
pub fn test_gazetteer() -> Gazetteer {
    let json = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Ladbroke Grove Station", "radius_deg": 0.01 },
                "geometry": { "type": "Point", "coordinates": [-0.2107, 51.5172] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Portobello Road", "radius_deg": 0.01 },
                "geometry": { "type": "Point", "coordinates": [-0.2047, 51.5189] }
            }
        ]
    }"#;
    Gazetteer::load_from_json(json).expect("test gazetteer should parse")
}

/// Create a test app with an in-memory registry and no outbound calls.
/// Returns the router, the shared state, and the registry for assertions.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MockRegistry>) {
    let config = Config::test_default();
    let registry = MockRegistry::with_premium(&[]);
    let cache = MemoryCache::shared();

    let tier_service = TierService::new(
        cache.clone(),
        Some(registry.clone() as Arc<dyn PremiumRegistry>),
        config.premium_allowlist.clone(),
    );

    let auth_client = AuthClient::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    );
    let checkout = CheckoutClient::new(config.checkout_url.clone());
    let invites = InviteService::new(
        config.invite_signing_key.clone(),
        config.frontend_url.clone(),
    );

    let state = Arc::new(AppState {
        config,
        gazetteer: Arc::new(test_gazetteer()),
        cache,
        tier_service,
        registry: Some(registry.clone() as Arc<dyn PremiumRegistry>),
        auth_client,
        checkout,
        invites,
        sessions: dashmap::DashMap::new(),
    });

    (create_router(state.clone()), state, registry)
}

/// Create a test session JWT for a user.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, email: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        email: String,
        exp: usize,
        iat: usize,
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}
