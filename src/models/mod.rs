// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod identity;
pub mod member;
pub mod tier;
pub mod view;

pub use identity::Identity;
pub use member::{Freshness, Member, MemberDraft, MemberLocation, Relationship};
pub use tier::{Tier, TierState};
pub use view::{MemberView, SquadView};
