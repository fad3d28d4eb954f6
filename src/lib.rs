pub mod components;
pub mod config;
pub mod decision;
pub mod email;
pub mod features;
pub mod handoff;
pub mod normalization;
pub mod rules_snapshot;
pub mod scoring;
pub mod statistics;
pub mod tables;

pub use components::{evaluate, evaluate_batch, GatewayEngine};
pub use config::GatewayConfig;
pub use decision::{ClassificationSource, Decision};
pub use email::EmailRecord;
pub use features::{FeatureMap, FeatureName};
pub use handoff::AiBatchItem;
pub use rules_snapshot::{RulesSnapshot, SnapshotCache};
pub use statistics::GatewayStats;
pub use tables::{ClassificationRule, ContactEntry};
