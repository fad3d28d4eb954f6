//! Decision Engine Component
//!
//! Sequences the tiers: contact lists first (with the VIP finance carve-out),
//! then classification rules, then hand-off to the AI classifier. The first
//! conclusive tier wins.

use super::contact_matcher::match_contacts;
use super::rule_matcher::match_rules;
use super::vip_policy::{VipOutcome, VipPolicy};
use crate::config::GatewayConfig;
use crate::decision::{
    ClassificationSource, ContactMatch, Decision, MatchDetails, RuleMatch, Verdict,
    REASON_NO_MATCH,
};
use crate::email::EmailRecord;
use crate::features::{extract_features, FeatureMap};
use crate::scoring::{confidence_from_precision, score};
use crate::tables::{ClassificationRule, ContactEntry};

/// Contact-list hits are trusted as high confidence.
pub const CONTACT_CONFIDENCE: u8 = 95;
/// Precision and relevance assumed for contact-list hits when scoring.
const CONTACT_PRECISION: f64 = 95.0;
const CONTACT_RELEVANCE: f64 = 90.0;
/// Confidence of a rule hit without a usable precision (absent or zero).
pub const DEFAULT_RULE_CONFIDENCE: u8 = 90;

/// Evaluate one email against the contact lists and classification rules.
pub fn evaluate(
    email: &EmailRecord,
    contacts: &[ContactEntry],
    rules: &[ClassificationRule],
) -> Decision {
    evaluate_with_policy(&VipPolicy::new(), email, contacts, rules)
}

/// Evaluate a batch, preserving input order.
pub fn evaluate_batch(
    emails: &[EmailRecord],
    contacts: &[ContactEntry],
    rules: &[ClassificationRule],
) -> Vec<Decision> {
    let policy = VipPolicy::new();
    emails
        .iter()
        .map(|email| evaluate_with_policy(&policy, email, contacts, rules))
        .collect()
}

fn evaluate_with_policy(
    policy: &VipPolicy,
    email: &EmailRecord,
    contacts: &[ContactEntry],
    rules: &[ClassificationRule],
) -> Decision {
    let features = extract_features(email);
    let message_id = email.message_id.as_str();
    if log::log_enabled!(log::Level::Debug) {
        let present: Vec<String> = features
            .present()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        log::debug!("Features for {message_id}: {}", present.join(", "));
    }

    if let Some(contact) = match_contacts(&features, contacts) {
        if policy.applies_to(&contact) {
            match policy.evaluate(message_id, &features, contacts) {
                VipOutcome::Promote(decision) | VipOutcome::Suppress(decision) => return decision,
                VipOutcome::FallThrough => {}
            }
        }
        return contact_decision(message_id, features, contact);
    }

    if let Some(rule) = match_rules(&features, rules) {
        return rule_decision(message_id, features, rule);
    }

    log::debug!("No deterministic match for {message_id}, routing to AI");
    Decision::needs_ai(message_id, features, REASON_NO_MATCH)
}

fn contact_decision(message_id: &str, features: FeatureMap, contact: ContactMatch) -> Decision {
    let verdict = Verdict::new(
        contact.target_category.clone(),
        contact.recommended_action.clone(),
        CONTACT_CONFIDENCE,
        score(
            contact.priority,
            Some(CONTACT_PRECISION),
            Some(CONTACT_RELEVANCE),
        ),
    );
    let source = ClassificationSource::ContactLists(contact.list_type.clone());
    Decision::matched(
        message_id,
        features,
        verdict,
        MatchDetails::ContactLists(contact),
        source,
    )
}

fn rule_decision(message_id: &str, features: FeatureMap, rule: RuleMatch) -> Decision {
    let confidence = match rule.precision {
        Some(p) if p > 0.0 => confidence_from_precision(p),
        _ => DEFAULT_RULE_CONFIDENCE,
    };
    let verdict = Verdict::new(
        rule.target_category.clone(),
        rule.recommended_action.clone(),
        confidence,
        score(rule.priority, rule.precision, rule.relevance),
    );
    Decision::matched(
        message_id,
        features,
        verdict,
        MatchDetails::ClassificationRules(rule),
        ClassificationSource::ClassificationRules,
    )
}

/// Owns a snapshot of both tables, for callers that evaluate many emails
/// against the same configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayEngine {
    contacts: Vec<ContactEntry>,
    rules: Vec<ClassificationRule>,
    policy: VipPolicy,
}

impl GatewayEngine {
    pub fn new(contacts: Vec<ContactEntry>, rules: Vec<ClassificationRule>) -> Self {
        Self {
            contacts,
            rules,
            policy: VipPolicy::new(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.contact_lists()?, config.classification_rules()?))
    }

    pub fn contacts(&self) -> &[ContactEntry] {
        &self.contacts
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn evaluate(&self, email: &EmailRecord) -> Decision {
        evaluate_with_policy(&self.policy, email, &self.contacts, &self.rules)
    }

    pub fn evaluate_batch(&self, emails: &[EmailRecord]) -> Vec<Decision> {
        emails.iter().map(|email| self.evaluate(email)).collect()
    }
}
