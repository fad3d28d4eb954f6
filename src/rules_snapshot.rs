//! Cached snapshot of the classification-rule table.
//!
//! A snapshot is rebuilt from its [`RuleSource`] when missing or expired.
//! Besides the sorted rules it carries a human-readable digest, grouped by
//! target category, for inclusion in the AI classifier's context. The
//! gateway itself only ever reads `rules`.

use crate::config::GatewayConfig;
use crate::tables::{load_classification_rules, ClassificationRule};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

pub const EMPTY_SNAPSHOT_VERSION: &str = "default_v1";

pub trait RuleSource {
    fn load_rules(&self) -> anyhow::Result<Vec<ClassificationRule>>;
}

impl RuleSource for Vec<ClassificationRule> {
    fn load_rules(&self) -> anyhow::Result<Vec<ClassificationRule>> {
        Ok(self.clone())
    }
}

/// Rule table backed by a YAML/JSON/TOML file.
#[derive(Debug, Clone)]
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleSource for FileRuleSource {
    fn load_rules(&self) -> anyhow::Result<Vec<ClassificationRule>> {
        load_classification_rules(&self.path)
    }
}

/// Inline rules followed by the configured `rules_file`, re-read on every
/// rebuild.
impl RuleSource for GatewayConfig {
    fn load_rules(&self) -> anyhow::Result<Vec<ClassificationRule>> {
        self.classification_rules()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulesSnapshot {
    pub version: String,
    pub rules: Vec<ClassificationRule>,
    pub digest: String,
    /// `None` for the empty fallback snapshot, which is never cached.
    pub expires_at: Option<DateTime<Utc>>,
    pub from_cache: bool,
    pub rules_count: usize,
    pub total_support: u64,
    pub avg_precision: f64,
}

impl RulesSnapshot {
    pub fn empty() -> Self {
        Self {
            version: EMPTY_SNAPSHOT_VERSION.to_string(),
            rules: Vec::new(),
            digest: String::new(),
            expires_at: None,
            from_cache: false,
            rules_count: 0,
            total_support: 0,
            avg_precision: 0.0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now >= at)
    }
}

/// Precision label used in the digest.
pub fn confidence_label(precision: Option<f64>) -> &'static str {
    match precision {
        Some(p) if p >= 95.0 => "KORKEA",
        Some(p) if p >= 80.0 => "HYVÄ",
        _ => "KOHTALAINEN",
    }
}

/// Render rules grouped by target category, categories in first-seen order.
pub fn render_digest(rules: &[ClassificationRule]) -> String {
    let mut groups: Vec<(&str, Vec<&ClassificationRule>)> = Vec::new();
    for rule in rules {
        match groups
            .iter_mut()
            .find(|(category, _)| *category == rule.target_category)
        {
            Some((_, members)) => members.push(rule),
            None => groups.push((rule.target_category.as_str(), vec![rule])),
        }
    }

    let mut lines = Vec::new();
    for (category, members) in groups {
        lines.push(format!("\n=== {} ===", category.to_uppercase()));
        for r in members {
            lines.push(format!(
                "- JOS {}=\"{}\" → {} ({} tarkkuus, {} osumaa, toimenpide: {})",
                r.feature,
                r.key_value,
                category,
                confidence_label(r.precision_cat_pct),
                r.support,
                r.action()
            ));
        }
    }
    lines.join("\n")
}

/// Sort rules (priority ascending, then support descending) and assemble a
/// snapshot valid for `ttl` from `now`.
pub fn build_snapshot(
    mut rules: Vec<ClassificationRule>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> RulesSnapshot {
    if rules.is_empty() {
        return RulesSnapshot::empty();
    }

    rules.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.support.cmp(&a.support))
    });

    let rules_count = rules.len();
    let total_support = rules.iter().map(|r| r.support).sum();
    let avg_precision = rules
        .iter()
        .map(|r| r.precision_cat_pct.unwrap_or(0.0))
        .sum::<f64>()
        / rules_count as f64;

    RulesSnapshot {
        version: format!("hybrid_{}_r{}", now.format("%Y-%m-%d"), rules_count),
        digest: render_digest(&rules),
        rules,
        // Saturate rather than overflow for very long TTLs
        expires_at: Some(now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)),
        from_cache: false,
        rules_count,
        total_support,
        avg_precision,
    }
}

/// Single-slot snapshot cache with a fixed time-to-live.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    slot: Mutex<Option<RulesSnapshot>>,
}

impl SnapshotCache {
    pub fn new(ttl_hours: u64) -> Self {
        let ttl = i64::try_from(ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or_else(|| {
                log::warn!("Snapshot TTL of {ttl_hours}h is out of range, capping");
                Duration::MAX
            });
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cached snapshot if still valid, otherwise a fresh one from `source`.
    /// A failing source yields the empty snapshot and leaves the slot
    /// untouched so the next call retries.
    pub fn get(&self, source: &dyn RuleSource, now: DateTime<Utc>) -> RulesSnapshot {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = slot.as_ref().filter(|s| !s.is_expired(now)) {
            let mut snapshot = cached.clone();
            snapshot.from_cache = true;
            log_loaded(&snapshot);
            return snapshot;
        }

        let snapshot = match source.load_rules() {
            Ok(rules) => build_snapshot(rules, now, self.ttl),
            Err(e) => {
                log::warn!("Failed to load classification rules, using empty rule set: {e:#}");
                RulesSnapshot::empty()
            }
        };

        if snapshot.expires_at.is_some() {
            log::info!(
                "Built rules snapshot {} (expires {})",
                snapshot.version,
                snapshot
                    .expires_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default()
            );
            *slot = Some(snapshot.clone());
        }
        log_loaded(&snapshot);
        snapshot
    }

    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn log_loaded(snapshot: &RulesSnapshot) {
    log::info!(
        "Rules loaded: version={}, from_cache={}, count={}",
        snapshot.version,
        snapshot.from_cache,
        snapshot.rules_count
    );
}
