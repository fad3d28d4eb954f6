//! Minimal records handed to the AI classifier for emails the gateway could
//! not decide.

use crate::decision::{ClassificationSource, Decision};
use crate::email::EmailRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiBatchItem {
    pub message_id: String,
    pub subject: String,
    pub from: String,
    pub text: String,
}

impl From<&EmailRecord> for AiBatchItem {
    fn from(email: &EmailRecord) -> Self {
        Self {
            message_id: email.message_id.clone(),
            subject: sanitize_text(email.subject.as_deref()),
            from: email
                .from_address
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(email.from_domain.as_deref())
                .unwrap_or_default()
                .to_string(),
            text: sanitize_text(email.body_text.as_deref()),
        }
    }
}

/// Strip byte-order marks and C0 controls (tab, LF and CR survive), then trim.
pub fn sanitize_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    text.chars()
        .filter(|&c| c != '\u{feff}' && (c >= ' ' || matches!(c, '\t' | '\n' | '\r')))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Items for the emails whose decision was routed to the AI classifier.
/// `decisions` must be in the same order as `emails`, as returned by
/// `evaluate_batch`.
pub fn needs_ai_items(emails: &[EmailRecord], decisions: &[Decision]) -> Vec<AiBatchItem> {
    emails
        .iter()
        .zip(decisions)
        .filter(|(_, d)| d.classification_source == ClassificationSource::NeedsAi)
        .map(|(email, _)| AiBatchItem::from(email))
        .collect()
}

pub fn to_batch_prompt(items: &[AiBatchItem]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::evaluate_batch;
    use crate::features::FeatureName;
    use crate::tables::ClassificationRule;
    use serde_json::json;

    fn email(id: &str, from: &str) -> EmailRecord {
        EmailRecord {
            message_id: id.to_string(),
            from_address: Some(from.to_string()),
            subject: Some(format!("Subject {id}")),
            body_text: Some("Body".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text(None), "");
        assert_eq!(sanitize_text(Some("\u{feff}  Hei\u{0}\u{7} maailma \u{1b}")), "Hei maailma");
        assert_eq!(sanitize_text(Some("rivi 1\r\n\trivi 2")), "rivi 1\r\n\trivi 2");
        assert_eq!(sanitize_text(Some("  \n ")), "");
    }

    #[test]
    fn test_from_falls_back_to_domain() {
        let record = EmailRecord {
            message_id: "m".to_string(),
            from_domain: Some("example.org".to_string()),
            ..Default::default()
        };
        let item = AiBatchItem::from(&record);
        assert_eq!(item.from, "example.org");
        assert_eq!(item.subject, "");
        assert_eq!(item.text, "");

        let bare = AiBatchItem::from(&EmailRecord::default());
        assert_eq!(bare.from, "");
    }

    #[test]
    fn test_only_undecided_emails_are_handed_off() {
        let rules = vec![ClassificationRule {
            rule_id: "gh".to_string(),
            feature: FeatureName::FromDomain,
            key_value: "github.com".to_string(),
            target_category: "notifications".to_string(),
            recommended_action: Some("archive".to_string()),
            priority: 30,
            precision_cat_pct: Some(98.0),
            support: 40,
            relevance: None,
        }];
        let emails = vec![
            email("a", "noreply@github.com"),
            email("b", "Someone <someone@unknown.tld>"),
        ];
        let decisions = evaluate_batch(&emails, &[], &rules);
        let items = needs_ai_items(&emails, &decisions);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message_id, "b");
        assert_eq!(items[0].from, "Someone <someone@unknown.tld>");

        let prompt = to_batch_prompt(&items).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(
            parsed,
            json!([{
                "message_id": "b",
                "subject": "Subject b",
                "from": "Someone <someone@unknown.tld>",
                "text": "Body"
            }])
        );
        assert!(prompt.contains("\n  "));
    }
}
