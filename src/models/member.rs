// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Squad member model and location-freshness classification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Relationship of a squad member to the current user.
///
/// `You` is reserved for the user's own roster entry and is rejected
/// when supplied in an add-member draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Relationship {
    Family,
    Friend,
    Partner,
    Child,
    Colleague,
    You,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Family => "Family",
            Relationship::Friend => "Friend",
            Relationship::Partner => "Partner",
            Relationship::Child => "Child",
            Relationship::Colleague => "Colleague",
            Relationship::You => "You",
        }
    }
}

/// Last-known location of a sharing member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberLocation {
    /// Named carnival area from the gazetteer
    pub area: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
}

impl MemberLocation {
    /// Location with an area name only (simulated shares have no fix).
    pub fn area_only(area: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            latitude: None,
            longitude: None,
            accuracy: None,
        }
    }
}

/// A tracked person in the squad roster.
///
/// Invariant: `location` is `None` whenever `is_sharing` is false, and
/// `last_update` moves only on sharing/location changes. All mutation goes
/// through [`Member::start_sharing`] and [`Member::stop_sharing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Creation-time milliseconds, strictly monotonic within a roster
    pub id: u64,
    pub name: String,
    /// Present for the current user's own entry
    pub email: Option<String>,
    pub phone: String,
    pub relationship: Relationship,
    pub notes: String,
    pub is_sharing: bool,
    pub location: Option<MemberLocation>,
    pub last_update: DateTime<Utc>,
}

impl Member {
    /// Mark the member as sharing with a new location.
    pub fn start_sharing(&mut self, location: MemberLocation, now: DateTime<Utc>) {
        self.is_sharing = true;
        self.location = Some(location);
        self.last_update = now;
    }

    /// Mark the member as not sharing. The roster row remains.
    pub fn stop_sharing(&mut self, now: DateTime<Utc>) {
        self.is_sharing = false;
        self.location = None;
        self.last_update = now;
    }

    /// Presentation avatar, derived from the name on demand.
    pub fn avatar(&self) -> Avatar {
        Avatar::derive(&self.name)
    }

    /// Case-insensitive substring match over name, phone, and area.
    ///
    /// `term` must already be lowercased by the caller.
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        if self.name.to_lowercase().contains(term) || self.phone.to_lowercase().contains(term) {
            return true;
        }
        self.location
            .as_ref()
            .is_some_and(|loc| loc.area.to_lowercase().contains(term))
    }

    /// Bucket the member's location age at `now`.
    pub fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        if !self.is_sharing {
            return Freshness::Offline;
        }
        let elapsed = now - self.last_update;
        if elapsed < Duration::minutes(LIVE_WINDOW_MINUTES) {
            Freshness::Live
        } else if elapsed < Duration::minutes(RECENT_WINDOW_MINUTES) {
            Freshness::Recent
        } else {
            Freshness::Outdated
        }
    }
}

/// Location updates younger than this are "live".
pub const LIVE_WINDOW_MINUTES: i64 = 3;
/// Location updates younger than this (but not live) are "recent".
pub const RECENT_WINDOW_MINUTES: i64 = 10;

/// Age bucket of a member's last location update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Freshness {
    Live,
    Recent,
    Outdated,
    Offline,
}

/// Input draft for adding a squad member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberDraft {
    pub name: String,
    pub phone: String,
    pub relationship: Option<Relationship>,
    #[serde(default)]
    pub notes: String,
}

impl MemberDraft {
    /// Names of required fields that are missing or unusable.
    ///
    /// A draft carrying the reserved `You` tag is treated as missing its
    /// relationship: only the tracker itself creates the self entry.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        match self.relationship {
            None | Some(Relationship::You) => missing.push("relationship"),
            Some(_) => {}
        }
        missing
    }
}

/// Derived presentation avatar: initials plus a deterministic color class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Avatar {
    pub initials: String,
    pub color_class: String,
}

const AVATAR_COLORS: [&str; 6] = [
    "bg-red-500",
    "bg-blue-500",
    "bg-green-500",
    "bg-yellow-500",
    "bg-purple-500",
    "bg-pink-500",
];

impl Avatar {
    /// Initials of the first two name words; color picked by name length.
    pub fn derive(name: &str) -> Self {
        let initials: String = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase();

        let color_index = name.chars().count() % AVATAR_COLORS.len();

        Self {
            initials,
            color_class: AVATAR_COLORS[color_index].to_string(),
        }
    }
}
