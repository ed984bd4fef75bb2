//! Access tiers and capability predicates.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User access tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Tier {
    Basic,
    Premium,
}

impl Tier {
    pub fn is_premium(self) -> bool {
        self == Tier::Premium
    }

    /// Whether a roster with `current_count` members may take one more.
    pub fn can_add_member(self, current_count: usize, free_limit: usize) -> bool {
        self.is_premium() || current_count < free_limit
    }

    pub fn can_message(self) -> bool {
        self.is_premium()
    }

    pub fn can_call(self) -> bool {
        self.is_premium()
    }
}

/// Resolved tier with its derived capability flags, as exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TierState {
    pub tier: Tier,
    pub can_add_unlimited_members: bool,
    pub can_message: bool,
    pub can_call: bool,
}

impl From<Tier> for TierState {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            can_add_unlimited_members: tier.is_premium(),
            can_message: tier.can_message(),
            can_call: tier.can_call(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_member_limit() {
        assert!(Tier::Basic.can_add_member(0, 1));
        assert!(!Tier::Basic.can_add_member(1, 1));
        assert!(Tier::Premium.can_add_member(1000, 1));
    }

    #[test]
    fn test_capabilities_follow_tier() {
        let basic = TierState::from(Tier::Basic);
        assert!(!basic.can_message && !basic.can_call && !basic.can_add_unlimited_members);

        let premium = TierState::from(Tier::Premium);
        assert!(premium.can_message && premium.can_call && premium.can_add_unlimited_members);
    }
}
