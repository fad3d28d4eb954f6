use crate::features::FeatureName;
use crate::tables::{
    load_classification_rules, load_contact_lists, ClassificationRule, ContactEntry,
    IdentifierType,
};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SNAPSHOT_TTL_HOURS: u64 = 24;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Inline contact-list entries, evaluated before those from `contact_lists_file`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_lists: Vec<ContactEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_lists_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification_rules: Vec<ClassificationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<String>,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
    /// Directory of the file this config was read from; relative table paths
    /// resolve against it.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

fn default_ttl_hours() -> u64 {
    DEFAULT_SNAPSHOT_TTL_HOURS
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_SNAPSHOT_TTL_HOURS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl GatewayConfig {
    pub fn default_path() -> &'static str {
        "/etc/mailgate.yaml"
    }

    /// Load a config file; the format follows the extension (`.yaml`/`.yml`,
    /// `.toml` or `.json`). Files without an extension are read as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut config: GatewayConfig = match ext.as_str() {
            "toml" => toml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" | "" => serde_yaml::from_str(&content)?,
            other => return Err(anyhow!("unsupported configuration format: .{other}")),
        };

        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let p = PathBuf::from(file);
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p,
        }
    }

    /// Inline entries followed by those loaded from `contact_lists_file`.
    pub fn contact_lists(&self) -> anyhow::Result<Vec<ContactEntry>> {
        let mut contacts = self.contact_lists.clone();
        if let Some(file) = &self.contact_lists_file {
            contacts.extend(load_contact_lists(self.resolve(file))?);
        }
        Ok(contacts)
    }

    /// Inline rules followed by those loaded from `rules_file`.
    pub fn classification_rules(&self) -> anyhow::Result<Vec<ClassificationRule>> {
        let mut rules = self.classification_rules.clone();
        if let Some(file) = &self.rules_file {
            rules.extend(load_classification_rules(self.resolve(file))?);
        }
        Ok(rules)
    }

    pub fn rules_path(&self) -> Option<PathBuf> {
        self.rules_file.as_deref().map(|f| self.resolve(f))
    }

    /// Example configuration written by `--generate-config`.
    pub fn sample() -> Self {
        Self {
            contact_lists: vec![
                ContactEntry {
                    identifier_type: IdentifierType::FromDomain,
                    identifier_value: "nordea.fi".to_string(),
                    list_type: "vip_finance".to_string(),
                    target_category: "financial_news".to_string(),
                    recommended_action: "read_later".to_string(),
                    priority: 20,
                    notes: Some("Bank domain; employees need vip_personal entries".to_string()),
                },
                ContactEntry {
                    identifier_type: IdentifierType::FromAddressContains,
                    identifier_value: "pasi.penkkala".to_string(),
                    list_type: "vip_personal".to_string(),
                    target_category: "business_critical".to_string(),
                    recommended_action: "review".to_string(),
                    priority: 15,
                    notes: None,
                },
            ],
            contact_lists_file: None,
            classification_rules: vec![ClassificationRule {
                rule_id: "github-notifications".to_string(),
                feature: FeatureName::FromDomain,
                key_value: "github.com".to_string(),
                target_category: "notifications".to_string(),
                recommended_action: Some("archive".to_string()),
                priority: 30,
                precision_cat_pct: Some(98.0),
                support: 412,
                relevance: None,
            }],
            rules_file: None,
            snapshot: SnapshotConfig::default(),
            logging: Some(LoggingConfig {
                level: "info".to_string(),
            }),
            base_dir: None,
        }
    }
}
