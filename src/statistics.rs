use crate::decision::{ClassificationSource, Decision};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-run counters of gateway outcomes. In-memory only.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStats {
    pub total_emails: u64,
    pub matched: u64,
    pub needs_ai: u64,
    /// Keyed by the rendered classification source, e.g. `contact_lists_vip_personal`.
    pub by_source: BTreeMap<String, u64>,
    pub start_time: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Default for GatewayStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayStats {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            total_emails: 0,
            matched: 0,
            needs_ai: 0,
            by_source: BTreeMap::new(),
            start_time: now,
            last_updated: now,
        }
    }

    pub fn record(&mut self, decision: &Decision) {
        self.total_emails += 1;
        self.last_updated = Utc::now();

        if decision.classification_source == ClassificationSource::NeedsAi {
            self.needs_ai += 1;
        } else if decision.matched {
            self.matched += 1;
        }
        *self
            .by_source
            .entry(decision.classification_source.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_all<'a>(&mut self, decisions: impl IntoIterator<Item = &'a Decision>) {
        for decision in decisions {
            self.record(decision);
        }
    }

    /// Share of `count` in all recorded emails, as a percentage.
    fn pct(&self, count: u64) -> f64 {
        if self.total_emails == 0 {
            0.0
        } else {
            count as f64 / self.total_emails as f64 * 100.0
        }
    }

    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!("Total Emails Processed: {}", self.total_emails)];
        if self.total_emails == 0 {
            return lines;
        }

        lines.push(format!(
            "├─ Decided by gateway: {} ({:.1}%)",
            self.matched,
            self.pct(self.matched)
        ));
        lines.push(format!(
            "└─ Routed to AI: {} ({:.1}%)",
            self.needs_ai,
            self.pct(self.needs_ai)
        ));
        lines.push("By source:".to_string());
        for (source, count) in &self.by_source {
            lines.push(format!("  {source:<36} {count:>6} ({:.1}%)", self.pct(*count)));
        }
        lines
    }
}
