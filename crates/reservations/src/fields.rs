//! Ordered field-alias resolution for loosely-typed CRM properties.
//!
//! Deal records reach us from differently-configured portals, so one
//! logical attribute hides behind several spellings. Each attribute gets an
//! explicit priority list; the first non-empty match wins. Adding a new
//! portal spelling means extending a table, not another conditional chain.

use voyage_core::reservation::RawDealRecord;

/// Check-in date spellings, highest priority first.
pub const CHECK_IN_ALIASES: [&str; 4] = ["check_in", "checkin", "check_in_date", "arrival_date"];

/// Check-out date spellings, highest priority first.
pub const CHECK_OUT_ALIASES: [&str; 4] =
    ["check_out", "checkout", "check_out_date", "departure_date"];

/// First non-empty property among `aliases`, in priority order.
pub fn resolve_alias<'a>(deal: &'a RawDealRecord, aliases: &[&str]) -> Option<&'a str> {
    aliases.iter().find_map(|key| deal.property_str(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn deal(props: &[(&str, &str)]) -> RawDealRecord {
        RawDealRecord {
            id: "deal-1".to_string(),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_priority_order_wins() {
        let deal = deal(&[("arrival_date", "2024-08-01"), ("check_in", "2024-07-01")]);
        assert_eq!(resolve_alias(&deal, &CHECK_IN_ALIASES), Some("2024-07-01"));
    }

    #[test]
    fn test_empty_values_fall_through() {
        let deal = deal(&[("check_in", "  "), ("checkin", "2024-07-01")]);
        assert_eq!(resolve_alias(&deal, &CHECK_IN_ALIASES), Some("2024-07-01"));
    }

    #[test]
    fn test_no_alias_present() {
        let deal = deal(&[("dealname", "Smith, Casa Bella")]);
        assert_eq!(resolve_alias(&deal, &CHECK_IN_ALIASES), None);
        assert_eq!(resolve_alias(&deal, &CHECK_OUT_ALIASES), None);
    }
}
