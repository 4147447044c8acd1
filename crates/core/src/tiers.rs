//! Voyage Passport tier ladder — the loyalty program's reward levels.
//!
//! Five-tier structure: Weekender → Explorer → Voyager → Jetsetter → Circle.
//! Lifetime Voyage Points (cumulative spend) determine tier eligibility;
//! each tier earns back a percentage of annual spend in Voyage Bucks,
//! capped per stay. The Circle is terminal and invite-only.
//!
//! The ladder is defined here once; call sites inject a [`TierTable`]
//! instead of carrying their own copy.

use serde::{Deserialize, Serialize};

use crate::error::{PassportError, PassportResult};

/// A named reward level with a minimum lifetime-points threshold.
///
/// Display strings (`reward`, `signature_benefit`, `message`, …) are opaque
/// to the engine and pass through to the client untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub name: String,
    /// Minimum lifetime Voyage Points to enter this tier.
    pub threshold: u64,
    pub points_label: String,
    /// Marketing rank, 1 = highest.
    pub tier_number: u8,
    pub color: String,
    pub signature_benefit: String,
    /// Percent of annual spend returned as Voyage Bucks (1–5).
    pub earn_back_percent: u8,
    /// Cap on redeemable Voyage Bucks per stay, in currency units.
    pub max_credit_per_stay: u64,
    pub reward: String,
    pub message: String,
    pub short_reveal: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub circle_access: Vec<String>,
    /// Marks the terminal, invite-only Circle tier.
    #[serde(default)]
    pub is_legacy: bool,
    #[serde(default)]
    pub invite_only: bool,
}

/// Validated, ascending tier ladder.
///
/// Invariant: non-empty, thresholds strictly increasing. Enforced once at
/// construction; [`crate::error::PassportError::InvalidConfiguration`] is a
/// startup-time failure, never a per-request one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierTable {
    tiers: Vec<TierDefinition>,
}

impl TierTable {
    pub fn new(tiers: Vec<TierDefinition>) -> PassportResult<Self> {
        if tiers.is_empty() {
            return Err(PassportError::InvalidConfiguration(
                "tier table must not be empty".to_string(),
            ));
        }
        for pair in tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(PassportError::InvalidConfiguration(format!(
                    "tier thresholds must be strictly increasing: '{}' ({}) then '{}' ({})",
                    pair[0].name, pair[0].threshold, pair[1].name, pair[1].threshold
                )));
            }
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[TierDefinition] {
        &self.tiers
    }

    /// Lowest tier in the ladder. Non-empty by construction.
    pub fn lowest(&self) -> &TierDefinition {
        &self.tiers[0]
    }
}

impl Default for TierTable {
    /// The production Voyage Passport ladder.
    fn default() -> Self {
        Self::new(production_tiers()).expect("production tier table is valid")
    }
}

fn tier(
    name: &str,
    threshold: u64,
    points_label: &str,
    tier_number: u8,
    color: &str,
    signature_benefit: &str,
    earn_back_percent: u8,
    max_credit_per_stay: u64,
    message: &str,
    short_reveal: &str,
) -> TierDefinition {
    TierDefinition {
        name: name.to_string(),
        threshold,
        points_label: points_label.to_string(),
        tier_number,
        color: color.to_string(),
        signature_benefit: signature_benefit.to_string(),
        earn_back_percent,
        max_credit_per_stay,
        reward: format!(
            "Earn {}% back in Voyage Bucks (up to ${} redeemable on your next stay)",
            earn_back_percent,
            format_thousands(max_credit_per_stay)
        ),
        message: message.to_string(),
        short_reveal: short_reveal.to_string(),
        circle_access: Vec::new(),
        is_legacy: false,
        invite_only: false,
    }
}

fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn production_tiers() -> Vec<TierDefinition> {
    let mut circle = tier(
        "Circle",
        500_000,
        "500,000+ Voyage Points",
        1,
        "#bda048",
        "One Complimentary Night Per Year + First Access to New Villas + Peak Week Soft Holds",
        5,
        15_000,
        "You've arrived. This is the tier reserved for our most devoted travelers.",
        "Welcome to The Circle.",
    );
    circle.circle_access = vec![
        "One Complimentary Night Per Year".to_string(),
        "First Access to New Villas".to_string(),
        "Peak Week Soft Holds".to_string(),
        "Private Invitations to exclusive events".to_string(),
    ];
    circle.is_legacy = true;
    circle.invite_only = true;

    vec![
        tier(
            "Weekender",
            0,
            "First Stay",
            5,
            "#e5e5e5",
            "Personalized Welcome Ritual (curated to guest)",
            1,
            2_500,
            "Your journey begins with a personalized welcome experience and earning Voyage Bucks toward your next stay.",
            "Your journey begins.",
        ),
        tier(
            "Explorer",
            40_000,
            "40,000+ Voyage Points",
            4,
            "#8d93af",
            "Travel Style Setup — guest preferences are remembered & auto-applied pre-arrival",
            2,
            5_000,
            "Your preferences are remembered and every stay becomes more seamless, earning you more Voyage Bucks.",
            "The world is opening.",
        ),
        tier(
            "Voyager",
            100_000,
            "100,000+ Voyage Points",
            3,
            "#2c2f3f",
            "One Signature Experience Per Year",
            3,
            7_500,
            "Your travels are becoming a tradition, and traditions should grow with greater rewards.",
            "Tradition takes shape.",
        ),
        tier(
            "Jetsetter",
            250_000,
            "250,000+ Voyage Points",
            2,
            "#77664c",
            "Signature Experience Every Stay",
            4,
            10_000,
            "Every stay includes a curated signature moment crafted just for you and exceptional rewards.",
            "More time awaits.",
        ),
        circle,
    ]
}

/// Result of assessing a points balance against a [`TierTable`].
///
/// Ephemeral: computed fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAssessment {
    /// None only when lifetime points sit below the lowest threshold
    /// (possible only with a ladder whose lowest threshold is nonzero).
    pub current_tier: Option<TierDefinition>,
    /// None iff the current tier is the terminal Circle tier.
    pub next_tier: Option<TierDefinition>,
    /// In [0, 100].
    pub progress_percentage: f64,
    /// 0 when there is no next tier.
    pub points_to_next_tier: u64,
    pub voyage_points: f64,
    pub is_circle: bool,
    /// Voyage Bucks earned from annual spend at the current earn-back rate.
    pub bucks_earned: u64,
}

/// Normalize a raw CRM spend figure to the engine's domain.
///
/// CRM numeric fields may be missing, non-numeric, or negative from data
/// entry; all of those collapse to 0 rather than erroring (spend data is
/// best-effort and user-facing).
pub fn clamp_points(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid_and_ascending() {
        let table = TierTable::default();
        assert_eq!(table.tiers().len(), 5);
        assert_eq!(table.lowest().name, "Weekender");
        assert_eq!(table.lowest().threshold, 0);
        let thresholds: Vec<u64> = table.tiers().iter().map(|t| t.threshold).collect();
        assert_eq!(thresholds, vec![0, 40_000, 100_000, 250_000, 500_000]);
        assert!(table.tiers().last().unwrap().is_legacy);
    }

    #[test]
    fn empty_table_rejected() {
        let err = TierTable::new(vec![]).unwrap_err();
        assert!(matches!(err, PassportError::InvalidConfiguration(_)));
    }

    #[test]
    fn duplicate_threshold_rejected() {
        let mut tiers = production_tiers();
        tiers[1].threshold = tiers[0].threshold;
        let err = TierTable::new(tiers).unwrap_err();
        assert!(matches!(err, PassportError::InvalidConfiguration(_)));
    }

    #[test]
    fn unsorted_table_rejected() {
        let mut tiers = production_tiers();
        tiers.swap(1, 2);
        assert!(TierTable::new(tiers).is_err());
    }

    #[test]
    fn clamp_points_handles_bad_crm_values() {
        assert_eq!(clamp_points(65_000.0), 65_000.0);
        assert_eq!(clamp_points(-5.0), 0.0);
        assert_eq!(clamp_points(f64::NAN), 0.0);
        assert_eq!(clamp_points(f64::INFINITY), 0.0);
    }

    #[test]
    fn reward_copy_formats_credit_cap() {
        let table = TierTable::default();
        assert_eq!(
            table.lowest().reward,
            "Earn 1% back in Voyage Bucks (up to $2,500 redeemable on your next stay)"
        );
    }
}
