//! Tier engine: maps a lifetime Voyage Points balance to the guest's
//! current tier, progress toward the next tier, and earned Voyage Bucks.

use tracing::{debug, info};
use voyage_core::tiers::{TierAssessment, TierTable};

/// Stateless tier computation over an injected, validated [`TierTable`].
///
/// Referentially transparent and safe to share across request handlers;
/// the only state is the read-only ladder.
pub struct TierEngine {
    table: TierTable,
}

impl TierEngine {
    pub fn new(table: TierTable) -> Self {
        info!(
            tiers = table.tiers().len(),
            top = %table.tiers().last().expect("table is non-empty").name,
            "Tier engine initialized"
        );
        Self { table }
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// Assess a points balance against the ladder.
    ///
    /// `lifetime_points` decides tier placement; `annual_spend` feeds only
    /// the Voyage Bucks figure. Both are expected pre-clamped to finite
    /// non-negative values ([`voyage_core::tiers::clamp_points`]); the
    /// engine never derives one from the other. Callers choose what annual
    /// spend means and pass it explicitly.
    pub fn assess(&self, lifetime_points: f64, annual_spend: f64) -> TierAssessment {
        metrics::counter!("tier.assessments").increment(1);

        let tiers = self.table.tiers();

        // Highest tier whose threshold is met, not the first.
        let current_index = tiers
            .iter()
            .rposition(|t| lifetime_points >= t.threshold as f64);

        let Some(index) = current_index else {
            // Below the lowest threshold. Dead with the production ladder
            // (threshold 0) but the ladder is arbitrary input.
            let first = self.table.lowest();
            return TierAssessment {
                current_tier: None,
                next_tier: Some(first.clone()),
                progress_percentage: 0.0,
                points_to_next_tier: shortfall(first.threshold, lifetime_points),
                voyage_points: lifetime_points,
                is_circle: false,
                bucks_earned: 0,
            };
        };

        let current = &tiers[index];
        let next = tiers.get(index + 1);

        let (progress_percentage, points_to_next_tier) = match next {
            Some(next) => {
                // Strictly-increasing thresholds guarantee a positive range.
                let range = (next.threshold - current.threshold) as f64;
                let progressed = lifetime_points - current.threshold as f64;
                (
                    (progressed / range * 100.0).clamp(0.0, 100.0),
                    shortfall(next.threshold, lifetime_points),
                )
            }
            None => (100.0, 0),
        };

        let bucks_earned = (annual_spend * f64::from(current.earn_back_percent) / 100.0) as u64;

        debug!(
            points = lifetime_points,
            tier = %current.name,
            progress = progress_percentage,
            bucks = bucks_earned,
            "Tier assessed"
        );

        TierAssessment {
            current_tier: Some(current.clone()),
            next_tier: next.cloned(),
            progress_percentage,
            points_to_next_tier,
            voyage_points: lifetime_points,
            is_circle: next.is_none() && current.is_legacy,
            bucks_earned,
        }
    }
}

/// Whole points still needed to reach `threshold`, never negative.
fn shortfall(threshold: u64, points: f64) -> u64 {
    let remaining = threshold as f64 - points;
    if remaining > 0.0 {
        remaining.ceil() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::tiers::{TierDefinition, TierTable};

    fn bare_tier(name: &str, threshold: u64, earn_back_percent: u8) -> TierDefinition {
        TierDefinition {
            name: name.to_string(),
            threshold,
            points_label: String::new(),
            tier_number: 0,
            color: String::new(),
            signature_benefit: String::new(),
            earn_back_percent,
            max_credit_per_stay: 0,
            reward: String::new(),
            message: String::new(),
            short_reveal: String::new(),
            circle_access: Vec::new(),
            is_legacy: false,
            invite_only: false,
        }
    }

    fn engine() -> TierEngine {
        TierEngine::new(TierTable::default())
    }

    #[test]
    fn test_mid_tier_assessment() {
        // 65k points: Explorer (40k), 41.67% of the way to Voyager (100k).
        let assessment = engine().assess(65_000.0, 0.0);
        let current = assessment.current_tier.unwrap();
        let next = assessment.next_tier.unwrap();
        assert_eq!(current.threshold, 40_000);
        assert_eq!(next.threshold, 100_000);
        assert!((assessment.progress_percentage - 41.666_666).abs() < 0.001);
        assert_eq!(assessment.points_to_next_tier, 35_000);
        assert!(!assessment.is_circle);
    }

    #[test]
    fn test_zero_points_lands_in_threshold_zero_tier() {
        // Threshold 0 <= 0 points, so this is the lowest tier, not the
        // pre-first-tier branch.
        let assessment = engine().assess(0.0, 0.0);
        let current = assessment.current_tier.expect("Weekender qualifies at 0");
        assert_eq!(current.name, "Weekender");
        assert_eq!(assessment.progress_percentage, 0.0);
        assert_eq!(assessment.points_to_next_tier, 40_000);
    }

    #[test]
    fn test_exact_threshold_resets_progress() {
        let assessment = engine().assess(100_000.0, 0.0);
        assert_eq!(assessment.current_tier.unwrap().name, "Voyager");
        assert_eq!(assessment.progress_percentage, 0.0);
        assert_eq!(assessment.points_to_next_tier, 150_000);
    }

    #[test]
    fn test_terminal_tier() {
        let assessment = engine().assess(612_000.0, 0.0);
        let current = assessment.current_tier.unwrap();
        assert_eq!(current.name, "Circle");
        assert!(assessment.next_tier.is_none());
        assert_eq!(assessment.progress_percentage, 100.0);
        assert_eq!(assessment.points_to_next_tier, 0);
        assert!(assessment.is_circle);
    }

    #[test]
    fn test_pre_first_tier_branch() {
        let table = TierTable::new(vec![
            bare_tier("Bronze", 1_000, 1),
            bare_tier("Silver", 5_000, 2),
        ])
        .unwrap();
        let assessment = TierEngine::new(table).assess(400.0, 250_000.0);

        assert!(assessment.current_tier.is_none());
        assert_eq!(assessment.next_tier.unwrap().name, "Bronze");
        assert_eq!(assessment.progress_percentage, 0.0);
        assert_eq!(assessment.points_to_next_tier, 600);
        assert!(!assessment.is_circle);
        // No tier means no earn-back rate, so no bucks regardless of spend.
        assert_eq!(assessment.bucks_earned, 0);
    }

    #[test]
    fn test_progress_monotonic_within_tier() {
        let engine = engine();
        let mut last = -1.0;
        for points in (40_000..=100_000).step_by(5_000) {
            let p = engine.assess(points as f64, 0.0).progress_percentage;
            assert!(p >= last, "progress regressed at {points}");
            assert!((0.0..=100.0).contains(&p));
            last = p;
        }
    }

    #[test]
    fn test_current_tier_is_highest_qualifying() {
        let engine = engine();
        for (points, expected) in [
            (0.0, "Weekender"),
            (39_999.0, "Weekender"),
            (40_000.0, "Explorer"),
            (250_000.0, "Jetsetter"),
            (499_999.9, "Jetsetter"),
            (500_000.0, "Circle"),
        ] {
            let assessment = engine.assess(points, 0.0);
            assert_eq!(assessment.current_tier.unwrap().name, expected);
        }
    }

    #[test]
    fn test_bucks_earned_floors_at_tier_rate() {
        // Explorer earns 2% back: $50,150 annual spend -> $1,003 floored.
        let assessment = engine().assess(65_000.0, 50_150.0);
        assert_eq!(assessment.bucks_earned, 1_003);

        let assessment = engine().assess(65_000.0, 50_199.0);
        assert_eq!(assessment.bucks_earned, 1_003);
    }

    #[test]
    fn test_assessment_is_idempotent() {
        let engine = engine();
        let a = engine.assess(123_456.78, 123_456.78);
        let b = engine.assess(123_456.78, 123_456.78);
        assert_eq!(a, b);
    }

    #[test]
    fn test_points_to_next_tier_never_negative() {
        let engine = engine();
        for points in [0.0, 100.0, 39_999.5, 40_000.0, 620_000.0] {
            let assessment = engine.assess(points, 0.0);
            if assessment.next_tier.is_none() {
                assert_eq!(assessment.points_to_next_tier, 0);
            }
        }
    }
}
