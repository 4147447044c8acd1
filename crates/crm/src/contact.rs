//! CRM contact record and spend-figure extraction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use voyage_core::tiers::clamp_points;

/// A CRM contact: identifier plus the property bag the search API returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmContact {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl CrmContact {
    fn property_str(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn property_f64(&self, key: &str) -> Option<f64> {
        match self.properties.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Lifetime Voyage Points: `hs_lifetime_revenue` with the legacy
    /// `lifetime_revenue` fallback, clamped to finite non-negative.
    pub fn voyage_points(&self) -> f64 {
        let raw = self
            .property_f64("hs_lifetime_revenue")
            .or_else(|| self.property_f64("lifetime_revenue"))
            .unwrap_or(0.0);
        clamp_points(raw)
    }

    /// Completed-stay count from the associated-deal counter, 0 if unset.
    pub fn stay_count(&self) -> u64 {
        self.property_f64("num_associated_deals")
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(|n| n as u64)
            .unwrap_or(0)
    }

    pub fn first_name(&self) -> &str {
        self.property_str("firstname").unwrap_or_default()
    }

    pub fn last_name(&self) -> &str {
        self.property_str("lastname").unwrap_or_default()
    }

    /// Tier status as recorded in the CRM, if the portal tracks one.
    /// Informational only; the tier engine is the source of truth.
    pub fn crm_tier_status(&self) -> Option<&str> {
        self.property_str("sub_type__c")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact(props: &[(&str, serde_json::Value)]) -> CrmContact {
        CrmContact {
            id: "c-1".to_string(),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_voyage_points_prefers_hs_field() {
        let c = contact(&[
            ("hs_lifetime_revenue", json!("65000")),
            ("lifetime_revenue", json!("1")),
        ]);
        assert_eq!(c.voyage_points(), 65_000.0);
    }

    #[test]
    fn test_voyage_points_falls_back_to_legacy_field() {
        let c = contact(&[("lifetime_revenue", json!(42_000))]);
        assert_eq!(c.voyage_points(), 42_000.0);
    }

    #[test]
    fn test_voyage_points_clamps_bad_data() {
        assert_eq!(contact(&[]).voyage_points(), 0.0);
        assert_eq!(
            contact(&[("hs_lifetime_revenue", json!("-500"))]).voyage_points(),
            0.0
        );
        assert_eq!(
            contact(&[("hs_lifetime_revenue", json!("n/a"))]).voyage_points(),
            0.0
        );
    }

    #[test]
    fn test_name_and_stay_count() {
        let c = contact(&[
            ("firstname", json!("Ava")),
            ("lastname", json!("Smith")),
            ("num_associated_deals", json!("7")),
        ]);
        assert_eq!(c.first_name(), "Ava");
        assert_eq!(c.last_name(), "Smith");
        assert_eq!(c.stay_count(), 7);
    }
}
