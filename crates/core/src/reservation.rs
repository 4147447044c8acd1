//! Reservation domain types — canonical shape derived from raw CRM deals.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One booking/deal record as the CRM returns it: an identifier plus an
/// arbitrary property bag. Field names vary by portal configuration, so the
/// properties stay untyped until normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDealRecord {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl RawDealRecord {
    /// Non-empty string value of a property, if present.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Where a reservation sits relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Current,
    Upcoming,
    Past,
}

impl ReservationStatus {
    /// Sort key: current stays first, then upcoming, then past.
    pub fn sort_priority(&self) -> u8 {
        match self {
            ReservationStatus::Current => 0,
            ReservationStatus::Upcoming => 1,
            ReservationStatus::Past => 2,
        }
    }
}

/// Canonical reservation derived from a [`RawDealRecord`].
///
/// Ephemeral: computed fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// CRM-assigned deal identifier, unique within a contact's result set.
    pub id: String,
    pub property_name: String,
    /// Possibly empty; only ever taken from the composite deal name.
    pub location: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub status: ReservationStatus,
    pub amount: f64,
    /// Falls back to the deal id when the CRM carries no explicit number.
    pub confirmation_number: String,
    pub deal_stage: String,
    /// Pass-through of source fields, for display/debugging only.
    pub raw_fields: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_priority_ordering() {
        assert!(ReservationStatus::Current.sort_priority() < ReservationStatus::Upcoming.sort_priority());
        assert!(ReservationStatus::Upcoming.sort_priority() < ReservationStatus::Past.sort_priority());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ReservationStatus::Upcoming).unwrap();
        assert_eq!(json, "\"upcoming\"");
    }

    #[test]
    fn property_str_trims_and_drops_empty() {
        let mut deal = RawDealRecord {
            id: "d-1".to_string(),
            properties: HashMap::new(),
        };
        deal.properties
            .insert("check_in".to_string(), serde_json::json!("  2024-07-01 "));
        deal.properties.insert("checkout".to_string(), serde_json::json!("   "));
        assert_eq!(deal.property_str("check_in"), Some("2024-07-01"));
        assert_eq!(deal.property_str("checkout"), None);
        assert_eq!(deal.property_str("missing"), None);
    }
}
