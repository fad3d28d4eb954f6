//! Classification-rule tier: static `feature = value` rules mined from
//! labelled history. Exact matches only.

use super::select_best;
use crate::decision::RuleMatch;
use crate::features::FeatureMap;
use crate::tables::ClassificationRule;

pub fn rule_matches(features: &FeatureMap, rule: &ClassificationRule) -> bool {
    features.get(rule.feature) == Some(rule.key_value.as_str())
}

pub fn match_rules(features: &FeatureMap, rules: &[ClassificationRule]) -> Option<RuleMatch> {
    let best = select_best(rules.iter().filter(|r| rule_matches(features, r)))?;
    log::debug!(
        "Classification rule {} matched {}={} (priority {})",
        best.rule_id,
        best.feature,
        best.key_value,
        best.priority
    );
    Some(RuleMatch::from(best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureName;

    fn rule(id: &str, feature: FeatureName, value: &str, priority: i32) -> ClassificationRule {
        ClassificationRule {
            rule_id: id.to_string(),
            feature,
            key_value: value.to_string(),
            target_category: "marketing".to_string(),
            recommended_action: None,
            priority,
            precision_cat_pct: Some(92.0),
            support: 25,
            relevance: None,
        }
    }

    fn features() -> FeatureMap {
        FeatureMap {
            from_address: Some("offers@shop.example".into()),
            from_domain: Some("shop.example".into()),
            list_domain: Some("promo.shop.example".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_match_only() {
        let rules = vec![rule("r1", FeatureName::FromDomain, "example", 30)];
        assert!(match_rules(&features(), &rules).is_none());

        let rules = vec![rule("r2", FeatureName::FromDomain, "shop.example", 30)];
        let m = match_rules(&features(), &rules).unwrap();
        assert_eq!(m.rule_id, "r2");
        assert_eq!(m.recommended_action, "review");
    }

    #[test]
    fn test_priority_then_order() {
        let rules = vec![
            rule("domain", FeatureName::FromDomain, "shop.example", 30),
            rule("list-a", FeatureName::ListDomain, "promo.shop.example", 20),
            rule("list-b", FeatureName::ListDomain, "promo.shop.example", 20),
            rule("addr", FeatureName::FromAddress, "offers@shop.example", 10),
        ];
        assert_eq!(match_rules(&features(), &rules).unwrap().rule_id, "addr");
        assert_eq!(match_rules(&features(), &rules[..3]).unwrap().rule_id, "list-a");
    }

    #[test]
    fn test_absent_or_unknown_feature_is_no_match() {
        let rules = vec![
            rule("reply", FeatureName::ReplyToAddress, "", 10),
            rule("unknown", FeatureName::Unknown, "shop.example", 10),
        ];
        assert!(match_rules(&features(), &rules).is_none());
    }
}
