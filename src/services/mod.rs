// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cache;
pub mod checkout;
pub mod gazetteer;
pub mod geolocation;
pub mod identity;
pub mod invite;
pub mod registry;
pub mod tier;
pub mod tracker;

pub use cache::{KeyValueCache, MemoryCache};
pub use checkout::CheckoutClient;
pub use gazetteer::Gazetteer;
pub use geolocation::{LocationProvider, Position};
pub use identity::AuthClient;
pub use invite::InviteService;
pub use registry::{PremiumRegistry, SupabaseRegistry};
pub use tier::TierService;
pub use tracker::{AddMemberOutcome, SelfLocationOutcome, SelfProfile, TrackerController};
