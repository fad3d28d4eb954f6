//! Gateway components, leaf-first: the two matchers, the VIP policy, and the
//! decision engine that sequences them.

pub mod contact_matcher;
pub mod decision_engine;
pub mod rule_matcher;
pub mod vip_policy;

pub use contact_matcher::match_contacts;
pub use decision_engine::{evaluate, evaluate_batch, GatewayEngine};
pub use rule_matcher::match_rules;
pub use vip_policy::{VipOutcome, VipPolicy};

/// Entries ranked by an integer priority. Lower number = higher precedence.
pub trait Prioritized {
    fn priority(&self) -> i32;
}

impl Prioritized for crate::tables::ContactEntry {
    fn priority(&self) -> i32 {
        self.priority
    }
}

impl Prioritized for crate::tables::ClassificationRule {
    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Single pass over the candidates keeping the first entry with the lowest
/// priority number, so equal priorities resolve to encounter order.
pub fn select_best<'a, T, I>(candidates: I) -> Option<&'a T>
where
    T: Prioritized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<&'a T> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.priority() >= current.priority() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ranked(i32, &'static str);

    impl Prioritized for Ranked {
        fn priority(&self) -> i32 {
            self.0
        }
    }

    #[test]
    fn test_select_best_lowest_priority() {
        let items = [Ranked(30, "a"), Ranked(10, "b"), Ranked(20, "c")];
        assert_eq!(select_best(&items).map(|r| r.1), Some("b"));
    }

    #[test]
    fn test_select_best_ties_keep_first() {
        let items = [Ranked(20, "first"), Ranked(20, "second"), Ranked(30, "x")];
        assert_eq!(select_best(&items).map(|r| r.1), Some("first"));
    }

    #[test]
    fn test_select_best_empty() {
        let items: [Ranked; 0] = [];
        assert!(select_best(&items).is_none());
    }
}
