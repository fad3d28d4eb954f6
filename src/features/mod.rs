//! Fixed-shape feature map shared by both matching tiers.

use crate::email::EmailRecord;
use crate::normalization::{
    domain_of, list_domain, message_id_domain, normalize_address, unsub_domain,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of features a classification rule may reference.
///
/// Unrecognised names from rule tables deserialize to `Unknown`, which never
/// matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    FromAddress,
    SenderAddress,
    ReplyToAddress,
    FromDomain,
    MessageIdDomain,
    ListDomain,
    UnsubDomain,
    Precedence,
    AutoSubmitted,
    #[serde(other)]
    Unknown,
}

impl FeatureName {
    pub const ALL: [FeatureName; 9] = [
        FeatureName::FromAddress,
        FeatureName::SenderAddress,
        FeatureName::ReplyToAddress,
        FeatureName::FromDomain,
        FeatureName::MessageIdDomain,
        FeatureName::ListDomain,
        FeatureName::UnsubDomain,
        FeatureName::Precedence,
        FeatureName::AutoSubmitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::FromAddress => "from_address",
            FeatureName::SenderAddress => "sender_address",
            FeatureName::ReplyToAddress => "reply_to_address",
            FeatureName::FromDomain => "from_domain",
            FeatureName::MessageIdDomain => "message_id_domain",
            FeatureName::ListDomain => "list_domain",
            FeatureName::UnsubDomain => "unsub_domain",
            FeatureName::Precedence => "precedence",
            FeatureName::AutoSubmitted => "auto_submitted",
            FeatureName::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized attributes of one email. Every value is lowercase and trimmed,
/// or `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMap {
    pub from_address: Option<String>,
    pub sender_address: Option<String>,
    pub reply_to_address: Option<String>,
    pub from_domain: Option<String>,
    pub message_id_domain: Option<String>,
    pub list_domain: Option<String>,
    pub unsub_domain: Option<String>,
    pub precedence: Option<String>,
    pub auto_submitted: Option<String>,
}

impl FeatureMap {
    pub fn get(&self, name: FeatureName) -> Option<&str> {
        let value = match name {
            FeatureName::FromAddress => &self.from_address,
            FeatureName::SenderAddress => &self.sender_address,
            FeatureName::ReplyToAddress => &self.reply_to_address,
            FeatureName::FromDomain => &self.from_domain,
            FeatureName::MessageIdDomain => &self.message_id_domain,
            FeatureName::ListDomain => &self.list_domain,
            FeatureName::UnsubDomain => &self.unsub_domain,
            FeatureName::Precedence => &self.precedence,
            FeatureName::AutoSubmitted => &self.auto_submitted,
            FeatureName::Unknown => return None,
        };
        value.as_deref()
    }

    /// Present features as `(name, value)` pairs, in declaration order.
    pub fn present(&self) -> Vec<(FeatureName, &str)> {
        FeatureName::ALL
            .iter()
            .filter_map(|&name| self.get(name).map(|v| (name, v)))
            .collect()
    }
}

fn lowercase_field(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Derive the feature map for one email. A declared sender domain wins over
/// the one parsed out of the From address.
pub fn extract_features(email: &EmailRecord) -> FeatureMap {
    let from = email.from_address.as_deref();

    FeatureMap {
        from_address: normalize_address(from),
        sender_address: normalize_address(email.sender_address.as_deref()),
        reply_to_address: normalize_address(email.reply_to_address.as_deref()),
        from_domain: lowercase_field(email.from_domain.as_deref()).or_else(|| domain_of(from)),
        message_id_domain: message_id_domain(email.message_id_header.as_deref()),
        list_domain: list_domain(email.list_id.as_deref()),
        unsub_domain: unsub_domain(email.unsubscribe_link.as_deref()),
        precedence: lowercase_field(email.precedence.as_deref()),
        auto_submitted: lowercase_field(email.auto_submitted.as_deref()),
    }
}
