//! VIP finance disambiguation.
//!
//! A `vip_finance` domain entry covers both the institution's automated
//! senders and its individual employees. Automated senders keep the plain
//! contact-list decision; a sender that looks like a person is promoted only
//! when listed in `vip_personal`, and otherwise escalated to the AI
//! classifier instead of being auto-decided.

use crate::decision::{ClassificationSource, ContactMatch, Decision, MatchDetails, Verdict};
use crate::features::FeatureMap;
use crate::normalization::local_part;
use crate::tables::ContactEntry;

pub const VIP_FINANCE: &str = "vip_finance";
pub const VIP_PERSONAL: &str = "vip_personal";

/// Local-part prefixes of automated senders.
pub const GENERIC_PREFIXES: [&str; 10] = [
    "noreply",
    "no-reply",
    "alerts",
    "newsletter",
    "info",
    "support",
    "notifications",
    "news",
    "updates",
    "marketing",
];

pub const PROMOTED_CATEGORY: &str = "business_critical";
pub const PROMOTED_ACTION: &str = "review";
pub const PROMOTED_CONFIDENCE: u8 = 95;
pub const PROMOTED_PRIORITY_SCORE: u8 = 90;

pub const REASON_VIP_PERSONAL: &str = "VIP personal contact from finance domain";
pub const REASON_VIP_SUPPRESSED: &str =
    "VIP finance domain but personal sender (not in vip_personal list)";

#[derive(Debug, Clone, PartialEq)]
pub enum VipOutcome {
    /// Sender is a listed VIP person.
    Promote(Decision),
    /// Personal-looking sender that nobody vouched for; route to AI.
    Suppress(Decision),
    /// Automated sender; the ordinary contact-list decision applies.
    FallThrough,
}

#[derive(Debug, Clone, Copy)]
pub struct VipPolicy {
    generic_prefixes: &'static [&'static str],
}

impl Default for VipPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl VipPolicy {
    pub fn new() -> Self {
        Self {
            generic_prefixes: &GENERIC_PREFIXES,
        }
    }

    pub fn applies_to(&self, contact: &ContactMatch) -> bool {
        contact.list_type == VIP_FINANCE
    }

    pub fn is_generic(&self, local: &str) -> bool {
        self.generic_prefixes.iter().any(|p| local.starts_with(p))
    }

    /// Name-like local parts (`john.smith`) are treated as people.
    pub fn looks_personal(&self, local: &str) -> bool {
        !self.is_generic(local) && local.contains('.')
    }

    pub fn evaluate(
        &self,
        message_id: &str,
        features: &FeatureMap,
        contacts: &[ContactEntry],
    ) -> VipOutcome {
        let from = features.from_address.as_deref();
        let local = local_part(from);

        if !self.looks_personal(local) {
            log::debug!(
                "VIP finance sender '{local}' does not look personal, keeping contact decision"
            );
            return VipOutcome::FallThrough;
        }

        let personal = contacts
            .iter()
            .find(|c| c.list_type == VIP_PERSONAL && Some(c.identifier_value.as_str()) == from);

        match personal {
            Some(entry) => {
                log::debug!("VIP finance sender promoted via vip_personal entry");
                let mut details = ContactMatch::from(entry);
                details.reason = Some(REASON_VIP_PERSONAL.to_string());

                VipOutcome::Promote(Decision::matched(
                    message_id,
                    features.clone(),
                    Verdict::new(
                        PROMOTED_CATEGORY,
                        PROMOTED_ACTION,
                        PROMOTED_CONFIDENCE,
                        PROMOTED_PRIORITY_SCORE,
                    ),
                    MatchDetails::ContactLists(details),
                    ClassificationSource::ContactLists(VIP_PERSONAL.to_string()),
                ))
            }
            None => {
                log::debug!("VIP finance sender is not a listed person, deferring to AI");
                VipOutcome::Suppress(Decision::needs_ai(
                    message_id,
                    features.clone(),
                    REASON_VIP_SUPPRESSED,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::IdentifierType;

    fn features(addr: &str) -> FeatureMap {
        FeatureMap {
            from_address: Some(addr.to_string()),
            from_domain: Some("example.com".to_string()),
            ..Default::default()
        }
    }

    fn vip_personal(addr: &str) -> ContactEntry {
        ContactEntry {
            identifier_type: IdentifierType::FromAddress,
            identifier_value: addr.to_string(),
            list_type: VIP_PERSONAL.to_string(),
            target_category: "personal_communication".to_string(),
            recommended_action: "reply".to_string(),
            priority: 10,
            notes: None,
        }
    }

    #[test]
    fn test_generic_prefixes() {
        let policy = VipPolicy::new();
        for local in ["noreply", "no-reply.fi", "alerts.team", "newsletter", "info.desk"] {
            assert!(policy.is_generic(local), "{local} should be generic");
            assert!(!policy.looks_personal(local));
        }
        assert!(policy.looks_personal("jane.doe"));
        assert!(!policy.looks_personal("janedoe"));
        assert!(!policy.looks_personal(""));
    }

    #[test]
    fn test_generic_sender_falls_through() {
        let policy = VipPolicy::new();
        let outcome = policy.evaluate("m", &features("alerts@example.com"), &[]);
        assert_eq!(outcome, VipOutcome::FallThrough);
    }

    #[test]
    fn test_undotted_sender_falls_through() {
        let policy = VipPolicy::new();
        let outcome = policy.evaluate("m", &features("treasury@example.com"), &[]);
        assert_eq!(outcome, VipOutcome::FallThrough);
    }

    #[test]
    fn test_unlisted_person_is_suppressed() {
        let policy = VipPolicy::new();
        let contacts = vec![vip_personal("someone.else@example.com")];
        match policy.evaluate("m", &features("jane.doe@example.com"), &contacts) {
            VipOutcome::Suppress(d) => {
                assert!(!d.matched);
                assert_eq!(d.classification_source, ClassificationSource::NeedsAi);
                assert!(d.reason.unwrap().contains("personal sender"));
            }
            other => panic!("expected suppression, got {other:?}"),
        }
    }

    #[test]
    fn test_listed_person_is_promoted() {
        let policy = VipPolicy::new();
        let contacts = vec![vip_personal("jane.doe@example.com")];
        match policy.evaluate("m", &features("jane.doe@example.com"), &contacts) {
            VipOutcome::Promote(d) => {
                let verdict = d.decision.unwrap();
                assert_eq!(verdict.primary_category, "business_critical");
                assert_eq!(verdict.recommended_action, "review");
                assert_eq!(verdict.confidence, 95);
                assert_eq!(verdict.priority_score, 90);
                assert_eq!(
                    d.classification_source.to_string(),
                    "contact_lists_vip_personal"
                );
            }
            other => panic!("expected promotion, got {other:?}"),
        }
    }
}
