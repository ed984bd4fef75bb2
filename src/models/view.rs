// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Render-ready view models consumed by the web frontend.
//!
//! These are plain serializable snapshots: the presentation layer owns all
//! markup, the tracker owns all state.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::member::{Avatar, Freshness, Relationship};
use crate::models::tier::TierState;

/// One roster row, ready to render.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberView {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub relationship: Relationship,
    pub avatar: Avatar,
    pub is_sharing: bool,
    /// Named area when sharing, `None` otherwise
    pub area: Option<String>,
    pub freshness: Freshness,
    /// Compact label like "now", "5m", "2h"
    pub time_since: String,
    /// WhatsApp deep link, present only when the viewer can message
    pub whatsapp_url: Option<String>,
    /// `tel:` link, present only when the viewer can call
    pub tel_url: Option<String>,
}

/// Full squad snapshot for one render pass.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SquadView {
    /// Bumped on every mutation; equal revisions render identically
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub revision: u64,
    pub visible: bool,
    pub tier: TierState,
    pub member_count: usize,
    pub sharing_count: usize,
    pub free_limit: usize,
    pub can_add_more: bool,
    pub search: String,
    pub members: Vec<MemberView>,
}
