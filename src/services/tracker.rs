// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Squad tracker controller: roster ownership and view-model production.
//!
//! One controller exists per authenticated session and is the single
//! writer for its roster. All operations are synchronous; async work
//! (positioning, tier lookups) happens outside and re-enters through an
//! epoch check so completions that raced a hide/sign-out are dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::contact;
use crate::models::member::{Member, MemberDraft, MemberLocation, Relationship};
use crate::models::view::{MemberView, SquadView};
use crate::models::{Identity, Tier, TierState};
use crate::services::gazetteer::Gazetteer;
use crate::services::geolocation::Position;
use crate::time_utils::time_since_label;

/// The current user, as the roster sees them.
#[derive(Debug, Clone)]
pub struct SelfProfile {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
}

impl SelfProfile {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            name: identity.display_name(),
            phone: identity.phone.clone().unwrap_or_default(),
        }
    }
}

/// Outcome of an add-member attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddMemberOutcome {
    Added { member_id: u64 },
    /// Required fields missing; nothing was mutated and the caller's
    /// draft is untouched.
    Invalid { missing: Vec<&'static str> },
    /// Free-tier limit reached; the upgrade-prompt signal.
    LimitReached { free_limit: usize },
}

/// Outcome of applying a device position to the self entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfLocationOutcome {
    Applied { area: String, created: bool },
    /// The controller epoch moved while the fix was in flight.
    Stale,
}

/// Per-session squad tracker.
pub struct TrackerController {
    self_profile: SelfProfile,
    gazetteer: Arc<Gazetteer>,
    free_limit: usize,
    members: Vec<Member>,
    visible: bool,
    search: String,
    /// Bumped on every mutation
    revision: u64,
    /// Bumped on hide/sign-out; stale async completions check against it
    epoch: u64,
    next_id: u64,
    sim_cursor: usize,
}

impl TrackerController {
    pub fn new(self_profile: SelfProfile, gazetteer: Arc<Gazetteer>, free_limit: usize) -> Self {
        Self {
            self_profile,
            gazetteer,
            free_limit,
            members: Vec::new(),
            visible: false,
            search: String::new(),
            revision: 0,
            epoch: 0,
            next_id: 0,
            sim_cursor: 0,
        }
    }

    // ─── View State ──────────────────────────────────────────────

    pub fn show(&mut self) {
        self.visible = true;
        self.revision += 1;
    }

    /// Hide the tracker. The roster is kept; in-flight async work for
    /// this session is cancelled via the epoch.
    pub fn hide(&mut self) {
        self.visible = false;
        self.epoch += 1;
        self.revision += 1;
    }

    pub fn toggle_visible(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current cancellation epoch. Async callers capture this before
    /// suspending and pass it back when applying their result.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Sign-out teardown: drop the roster and cancel in-flight work.
    pub fn reset(&mut self) {
        self.members.clear();
        self.search.clear();
        self.epoch += 1;
        self.revision += 1;
    }

    // ─── Roster Mutation ─────────────────────────────────────────

    /// Admit a new member, subject to validation and the tier limit.
    pub fn add_member(&mut self, draft: &MemberDraft, tier: Tier) -> AddMemberOutcome {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return AddMemberOutcome::Invalid { missing };
        }
        let Some(relationship) = draft.relationship else {
            return AddMemberOutcome::Invalid {
                missing: vec!["relationship"],
            };
        };

        if !tier.can_add_member(self.members.len(), self.free_limit) {
            tracing::debug!(
                count = self.members.len(),
                free_limit = self.free_limit,
                "Member limit reached for Basic tier"
            );
            return AddMemberOutcome::LimitReached {
                free_limit: self.free_limit,
            };
        }

        let member_id = self.allocate_id();
        self.members.push(Member {
            id: member_id,
            name: draft.name.trim().to_string(),
            email: None,
            phone: draft.phone.trim().to_string(),
            relationship,
            notes: draft.notes.clone(),
            is_sharing: false,
            location: None,
            last_update: Utc::now(),
        });
        self.revision += 1;

        AddMemberOutcome::Added { member_id }
    }

    /// Simulated share grant for a non-self member: marks them sharing
    /// with the next gazetteer area in rotation.
    ///
    /// TODO: replace the simulated grant with a real consent round trip
    /// once member devices can receive share requests.
    pub fn request_location_sharing(&mut self, member_id: u64) -> bool {
        let Some(idx) = self
            .members
            .iter()
            .position(|m| m.id == member_id && m.relationship != Relationship::You)
        else {
            return false;
        };

        let landmarks = self.gazetteer.landmarks();
        let area = if landmarks.is_empty() {
            crate::services::gazetteer::FALLBACK_AREA.to_string()
        } else {
            let area = landmarks[self.sim_cursor % landmarks.len()].name.clone();
            self.sim_cursor += 1;
            area
        };

        self.members[idx].start_sharing(MemberLocation::area_only(area), Utc::now());
        self.revision += 1;
        true
    }

    /// Apply a device position to the current user's own entry, creating
    /// it if absent. Idempotent apart from `last_update`.
    pub fn update_self_location(&mut self, epoch: u64, position: Position) -> SelfLocationOutcome {
        if epoch != self.epoch {
            tracing::debug!("Dropping stale self-location update");
            return SelfLocationOutcome::Stale;
        }

        let area = self
            .gazetteer
            .resolve_area(position.latitude, position.longitude)
            .to_string();
        let location = MemberLocation {
            area: area.clone(),
            latitude: Some(position.latitude),
            longitude: Some(position.longitude),
            accuracy: position.accuracy,
        };
        let now = Utc::now();

        if let Some(me) = self.self_entry_mut() {
            me.start_sharing(location, now);
            self.revision += 1;
            return SelfLocationOutcome::Applied {
                area,
                created: false,
            };
        }

        let member_id = self.allocate_id();
        let mut me = Member {
            id: member_id,
            name: self.self_profile.name.clone(),
            email: Some(self.self_profile.email.clone()),
            phone: self.self_profile.phone.clone(),
            relationship: Relationship::You,
            notes: String::new(),
            is_sharing: false,
            location: None,
            last_update: now,
        };
        me.start_sharing(location, now);
        self.members.push(me);
        self.revision += 1;

        SelfLocationOutcome::Applied {
            area,
            created: true,
        }
    }

    /// Stop publishing the current user's location. The row remains.
    pub fn remove_self_location(&mut self) {
        if let Some(me) = self.self_entry_mut() {
            me.stop_sharing(Utc::now());
            self.revision += 1;
        }
    }

    fn self_entry_mut(&mut self) -> Option<&mut Member> {
        self.members
            .iter_mut()
            .find(|m| m.relationship == Relationship::You)
    }

    /// Creation-time ID, kept strictly monotonic even for same-millisecond
    /// adds.
    fn allocate_id(&mut self) -> u64 {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        let id = now_ms.max(self.next_id);
        self.next_id = id + 1;
        id
    }

    // ─── Queries ─────────────────────────────────────────────────

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.revision += 1;
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Roster view filtered by the current search term; order preserved,
    /// roster unmutated.
    pub fn filtered_members(&self) -> Vec<&Member> {
        let term = self.search.to_lowercase();
        self.members
            .iter()
            .filter(|m| m.matches_search(&term))
            .collect()
    }

    pub fn sharing_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_sharing).count()
    }

    /// Render-ready snapshot. Pure: equal state and `now` produce equal
    /// views.
    pub fn view(&self, tier: Tier, now: DateTime<Utc>) -> SquadView {
        let members = self
            .filtered_members()
            .into_iter()
            .map(|m| self.member_view(m, tier, now))
            .collect();

        SquadView {
            revision: self.revision,
            visible: self.visible,
            tier: TierState::from(tier),
            member_count: self.members.len(),
            sharing_count: self.sharing_count(),
            free_limit: self.free_limit,
            can_add_more: tier.can_add_member(self.members.len(), self.free_limit),
            search: self.search.clone(),
            members,
        }
    }

    fn member_view(&self, member: &Member, tier: Tier, now: DateTime<Utc>) -> MemberView {
        let area = member.location.as_ref().map(|loc| loc.area.clone());

        let whatsapp_url = tier
            .can_message()
            .then(|| contact::whatsapp_link(&member.phone, &member.name, area.as_deref()));
        let tel_url = tier.can_call().then(|| contact::tel_link(&member.phone));

        MemberView {
            id: member.id,
            name: member.name.clone(),
            phone: member.phone.clone(),
            relationship: member.relationship,
            avatar: member.avatar(),
            is_sharing: member.is_sharing,
            area,
            freshness: member.freshness(now),
            time_since: time_since_label(member.last_update, now),
            whatsapp_url,
            tel_url,
        }
    }
}
