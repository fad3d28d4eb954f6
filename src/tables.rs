//! Contact-list and classification-rule tables.
//!
//! Both tables are read-only snapshots during evaluation. They can be loaded
//! from YAML, JSON or TOML files; TOML files hold `[[contacts]]` or
//! `[[rules]]` arrays since TOML has no top-level sequences.

use crate::features::FeatureName;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_RULE_ACTION: &str = "review";

/// How a contact entry's identifier is compared against the feature map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    FromAddress,
    #[serde(alias = "address_contains")]
    FromAddressContains,
    FromDomain,
    MessageIdDomain,
    ListDomain,
    UnsubDomain,
    /// Identifier types this version does not know; such entries never match.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentifierType::FromAddress => "from_address",
            IdentifierType::FromAddressContains => "from_address_contains",
            IdentifierType::FromDomain => "from_domain",
            IdentifierType::MessageIdDomain => "message_id_domain",
            IdentifierType::ListDomain => "list_domain",
            IdentifierType::UnsubDomain => "unsub_domain",
            IdentifierType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub identifier_type: IdentifierType,
    pub identifier_value: String,
    /// List category, e.g. `vip_finance`, `vip_personal`, `internal`.
    pub list_type: String,
    pub target_category: String,
    pub recommended_action: String,
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub rule_id: String,
    pub feature: FeatureName,
    pub key_value: String,
    pub target_category: String,
    #[serde(default)]
    pub recommended_action: Option<String>,
    pub priority: i32,
    /// Share of historical hits that landed in `target_category`, 0-100.
    #[serde(default)]
    pub precision_cat_pct: Option<f64>,
    #[serde(default)]
    pub support: u64,
    #[serde(default)]
    pub relevance: Option<f64>,
}

impl ClassificationRule {
    pub fn action(&self) -> &str {
        self.recommended_action
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_RULE_ACTION)
    }
}

#[derive(Deserialize)]
struct ContactTable {
    #[serde(default)]
    contacts: Vec<ContactEntry>,
}

#[derive(Deserialize)]
struct RuleTable {
    #[serde(default)]
    rules: Vec<ClassificationRule>,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn parse_sequence<T: DeserializeOwned>(content: &str, ext: &str) -> Result<Vec<T>> {
    match ext {
        "json" => Ok(serde_json::from_str(content)?),
        "yaml" | "yml" | "" => Ok(serde_yaml::from_str(content)?),
        other => Err(anyhow!("unsupported table format: .{other}")),
    }
}

pub fn load_contact_lists<P: AsRef<Path>>(path: P) -> Result<Vec<ContactEntry>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading contact lists from {}", path.display()))?;
    let ext = extension_of(path);

    let contacts = if ext == "toml" {
        toml::from_str::<ContactTable>(&content)?.contacts
    } else {
        parse_sequence(&content, &ext)?
    };
    log::info!(
        "Loaded {} contact list entries from {}",
        contacts.len(),
        path.display()
    );
    Ok(contacts)
}

pub fn load_classification_rules<P: AsRef<Path>>(path: P) -> Result<Vec<ClassificationRule>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading classification rules from {}", path.display()))?;
    let ext = extension_of(path);

    let rules = if ext == "toml" {
        toml::from_str::<RuleTable>(&content)?.rules
    } else {
        parse_sequence(&content, &ext)?
    };
    log::info!(
        "Loaded {} classification rules from {}",
        rules.len(),
        path.display()
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_rule_action_defaults_to_review() {
        let rule: ClassificationRule = serde_json::from_str(
            r#"{"rule_id": "r1", "feature": "from_domain", "key_value": "github.com",
                "target_category": "notifications", "priority": 30}"#,
        )
        .unwrap();
        assert_eq!(rule.action(), "review");
        assert_eq!(rule.support, 0);
        assert!(rule.precision_cat_pct.is_none());
    }

    #[test]
    fn test_load_contacts_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "- identifier_type: from_address_contains\n  identifier_value: pasi.penkkala\n  list_type: vip_personal\n  target_category: business_critical\n  recommended_action: review\n  priority: 15"
        )
        .unwrap();

        let contacts = load_contact_lists(file.path()).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(
            contacts[0].identifier_type,
            IdentifierType::FromAddressContains
        );
        assert!(contacts[0].notes.is_none());
    }

    #[test]
    fn test_unknown_identifier_type_keeps_table() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "- identifier_type: from_domain\n  identifier_value: nordea.fi\n  list_type: vip_finance\n  target_category: financial_news\n  recommended_action: read_later\n  priority: 20\n\
             - identifier_type: subject_contains\n  identifier_value: invoice\n  list_type: internal\n  target_category: finance\n  recommended_action: review\n  priority: 10"
        )
        .unwrap();

        let contacts = load_contact_lists(file.path()).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].identifier_type, IdentifierType::FromDomain);
        assert_eq!(contacts[1].identifier_type, IdentifierType::Unknown);
    }

    #[test]
    fn test_load_rules_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[[rules]]\nrule_id = \"r7\"\nfeature = \"list_domain\"\nkey_value = \"news.kauppalehti.fi\"\ntarget_category = \"financial_news\"\nrecommended_action = \"read_later\"\npriority = 20\nprecision_cat_pct = 97.5\nsupport = 140"
        )
        .unwrap();

        let rules = load_classification_rules(file.path()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].feature, FeatureName::ListDomain);
        assert_eq!(rules[0].action(), "read_later");
    }

    #[test]
    fn test_unsupported_extension_is_error() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        assert!(load_classification_rules(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_contact_lists("/nonexistent/contacts.yaml").is_err());
    }
}
