//! Contact-list tier: dynamic registry of known senders and domains.

use super::select_best;
use crate::decision::ContactMatch;
use crate::features::FeatureMap;
use crate::tables::{ContactEntry, IdentifierType};

/// Whether a single contact entry applies to the email. Absent features
/// never match.
pub fn entry_matches(features: &FeatureMap, entry: &ContactEntry) -> bool {
    let value = entry.identifier_value.as_str();
    let equals = |feature: &Option<String>| feature.as_deref() == Some(value);

    match entry.identifier_type {
        IdentifierType::FromAddress => equals(&features.from_address),
        IdentifierType::FromAddressContains => features
            .from_address
            .as_deref()
            .is_some_and(|addr| addr.contains(value)),
        IdentifierType::FromDomain => equals(&features.from_domain),
        IdentifierType::MessageIdDomain => equals(&features.message_id_domain),
        IdentifierType::ListDomain => equals(&features.list_domain),
        IdentifierType::UnsubDomain => equals(&features.unsub_domain),
        IdentifierType::Unknown => false,
    }
}

/// Highest-precedence contact entry matching the email.
pub fn match_contacts(features: &FeatureMap, contacts: &[ContactEntry]) -> Option<ContactMatch> {
    let best = select_best(contacts.iter().filter(|c| entry_matches(features, c)))?;
    log::debug!(
        "Contact list match: {}={} ({}, priority {})",
        best.identifier_type,
        best.identifier_value,
        best.list_type,
        best.priority
    );
    Some(ContactMatch::from(best))
}
