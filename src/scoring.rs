//! Priority score for deterministic matches.
//!
//! Base score comes from the match tier (10 → 80, 20 → 60, anything else →
//! 40), then precision and relevance add small bonuses. The result always
//! lands in `[40, 100]`.

pub const MAX_SCORE: u8 = 100;

pub fn score(priority: i32, precision: Option<f64>, relevance: Option<f64>) -> u8 {
    let mut score: u8 = match priority {
        10 => 80,
        20 => 60,
        _ => 40,
    };

    match precision {
        Some(p) if p >= 95.0 => score += 10,
        Some(p) if p >= 90.0 => score += 5,
        _ => {}
    }

    if relevance.is_some_and(|r| r >= 80.0) {
        score += 5;
    }

    score.min(MAX_SCORE)
}

/// Map a precision percentage onto the 0-100 confidence scale.
pub fn confidence_from_precision(precision: f64) -> u8 {
    if precision.is_nan() {
        return 0;
    }
    precision.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_scores() {
        assert_eq!(score(10, None, None), 80);
        assert_eq!(score(20, None, None), 60);
        assert_eq!(score(30, None, None), 40);
        assert_eq!(score(15, None, None), 40);
    }

    #[test]
    fn test_precision_and_relevance_bonuses() {
        assert_eq!(score(20, Some(95.0), None), 70);
        assert_eq!(score(20, Some(92.0), None), 65);
        assert_eq!(score(20, Some(89.9), None), 60);
        assert_eq!(score(20, None, Some(80.0)), 65);
        assert_eq!(score(10, Some(95.0), Some(90.0)), 95);
    }

    #[test]
    fn test_score_bounds() {
        for priority in [10, 20, 30] {
            for precision in (0..=100).step_by(5) {
                for relevance in (0..=100).step_by(5) {
                    let s = score(priority, Some(precision as f64), Some(relevance as f64));
                    assert!((40..=100).contains(&s), "score {s} out of bounds");
                }
            }
            let s = score(priority, None, None);
            assert!((40..=100).contains(&s));
        }
    }

    #[test]
    fn test_confidence_from_precision() {
        assert_eq!(confidence_from_precision(97.6), 98);
        assert_eq!(confidence_from_precision(140.0), 100);
        assert_eq!(confidence_from_precision(-3.0), 0);
    }
}
