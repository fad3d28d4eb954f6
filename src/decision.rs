//! Output shape of one gateway evaluation.
//!
//! Serialized decisions keep the key names the downstream workflow reads:
//! `matched`, `message_id`, `features_extracted`, `decision`,
//! `match_details`, `classification_source` and `reason`.

use crate::features::{FeatureMap, FeatureName};
use crate::tables::{ClassificationRule, ContactEntry, IdentifierType};
use serde::{Serialize, Serializer};
use std::fmt;

pub const REASON_NO_MATCH: &str = "no_matching_rules_or_contacts";

/// Which tier produced the decision. `NeedsAi` tells the caller to route the
/// email to the external classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationSource {
    /// Rendered as `contact_lists_<list_type>`.
    ContactLists(String),
    ClassificationRules,
    NeedsAi,
}

impl ClassificationSource {
    pub fn is_final(&self) -> bool {
        !matches!(self, ClassificationSource::NeedsAi)
    }
}

impl fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationSource::ContactLists(list_type) => {
                write!(f, "contact_lists_{list_type}")
            }
            ClassificationSource::ClassificationRules => f.write_str("classification_rules"),
            ClassificationSource::NeedsAi => f.write_str("needs_ai"),
        }
    }
}

impl Serialize for ClassificationSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Winning contact-list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMatch {
    pub list_type: String,
    pub identifier_type: IdentifierType,
    pub identifier_value: String,
    pub target_category: String,
    pub recommended_action: String,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Set when a policy rewrote the outcome of the plain contact match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&ContactEntry> for ContactMatch {
    fn from(entry: &ContactEntry) -> Self {
        Self {
            list_type: entry.list_type.clone(),
            identifier_type: entry.identifier_type,
            identifier_value: entry.identifier_value.clone(),
            target_category: entry.target_category.clone(),
            recommended_action: entry.recommended_action.clone(),
            priority: entry.priority,
            notes: entry.notes.clone(),
            reason: None,
        }
    }
}

/// Winning classification rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    pub rule_id: String,
    pub feature: FeatureName,
    pub key_value: String,
    pub target_category: String,
    pub recommended_action: String,
    pub priority: i32,
    pub precision: Option<f64>,
    pub support: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

impl From<&ClassificationRule> for RuleMatch {
    fn from(rule: &ClassificationRule) -> Self {
        Self {
            rule_id: rule.rule_id.clone(),
            feature: rule.feature,
            key_value: rule.key_value.clone(),
            target_category: rule.target_category.clone(),
            recommended_action: rule.action().to_string(),
            priority: rule.priority,
            precision: rule.precision_cat_pct,
            support: rule.support,
            relevance: rule.relevance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MatchDetails {
    ContactLists(ContactMatch),
    ClassificationRules(RuleMatch),
}

/// The routing verdict carried by a matched decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub primary_category: String,
    pub recommended_action: String,
    /// 0-100
    pub confidence: u8,
    /// 0-100
    pub priority_score: u8,
    pub requires_deep_analysis: bool,
}

impl Verdict {
    pub fn new(
        primary_category: impl Into<String>,
        recommended_action: impl Into<String>,
        confidence: u8,
        priority_score: u8,
    ) -> Self {
        Self {
            primary_category: primary_category.into(),
            recommended_action: recommended_action.into(),
            confidence: confidence.min(100),
            priority_score: priority_score.min(100),
            requires_deep_analysis: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub matched: bool,
    pub message_id: String,
    pub features_extracted: FeatureMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_details: Option<MatchDetails>,
    pub classification_source: ClassificationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Decision {
    pub fn matched(
        message_id: impl Into<String>,
        features: FeatureMap,
        verdict: Verdict,
        details: MatchDetails,
        source: ClassificationSource,
    ) -> Self {
        Self {
            matched: true,
            message_id: message_id.into(),
            features_extracted: features,
            decision: Some(verdict),
            match_details: Some(details),
            classification_source: source,
            reason: None,
        }
    }

    pub fn needs_ai(
        message_id: impl Into<String>,
        features: FeatureMap,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            matched: false,
            message_id: message_id.into(),
            features_extracted: features,
            decision: None,
            match_details: None,
            classification_source: ClassificationSource::NeedsAi,
            reason: Some(reason.into()),
        }
    }
}
