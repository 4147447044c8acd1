//! Deal-to-reservation normalization.
//!
//! Maps heterogeneous CRM deal records into canonical [`Reservation`]s:
//! resolves the property name and location out of the composite deal name,
//! picks dates from whichever field spelling the portal used, infers stay
//! status against a caller-supplied clock, and sorts current stays first.
//!
//! Per-deal work is independent; one malformed record is skipped with a
//! warning, never a batch failure.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;
use voyage_core::reservation::{RawDealRecord, Reservation, ReservationStatus};

use crate::dates::{contains_date_fragment, extract_date_range, parse_date};
use crate::fields::{resolve_alias, CHECK_IN_ALIASES, CHECK_OUT_ALIASES};

const FALLBACK_PROPERTY_NAME: &str = "Unnamed Property";

/// Fields consumed by normalization; everything else passes through in
/// `raw_fields`.
const RECOGNIZED_FIELDS: [&str; 13] = [
    "dealname",
    "property_name",
    "check_in",
    "checkin",
    "check_in_date",
    "arrival_date",
    "check_out",
    "checkout",
    "check_out_date",
    "departure_date",
    "amount",
    "confirmation_number",
    "dealstage",
];

/// Output of a normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizedReservations {
    /// Sorted: current, then upcoming, then past; ties keep input order.
    pub reservations: Vec<Reservation>,
    /// Malformed records dropped from the batch.
    pub skipped: usize,
}

/// Normalize a batch of raw CRM deals against the given clock.
pub fn normalize(deals: &[RawDealRecord], now: DateTime<Utc>) -> NormalizedReservations {
    let mut reservations: Vec<Reservation> = Vec::with_capacity(deals.len());
    let mut skipped = 0usize;

    for deal in deals {
        match normalize_deal(deal, now) {
            Some(reservation) => reservations.push(reservation),
            None => {
                warn!(deal = ?deal.id, "Skipping malformed deal record");
                metrics::counter!("reservations.skipped_records").increment(1);
                skipped += 1;
            }
        }
    }

    // Stable: ties within a status group preserve input order.
    reservations.sort_by_key(|r| r.status.sort_priority());

    metrics::counter!("reservations.normalized").increment(reservations.len() as u64);

    NormalizedReservations {
        reservations,
        skipped,
    }
}

fn normalize_deal(deal: &RawDealRecord, now: DateTime<Utc>) -> Option<Reservation> {
    if deal.id.trim().is_empty() {
        return None;
    }

    let name_parts: Vec<&str> = deal
        .property_str("dealname")
        .map(|name| name.split(',').map(str::trim).collect())
        .unwrap_or_default();

    let property_name = resolve_property_name(deal, &name_parts);
    let location = resolve_location(&name_parts);
    let (check_in, check_out) = resolve_dates(deal);
    let status = infer_status(check_in, check_out, now);

    let amount = deal
        .properties
        .get("amount")
        .map(coerce_amount)
        .unwrap_or(0.0);

    let confirmation_number = deal
        .property_str("confirmation_number")
        .unwrap_or(&deal.id)
        .to_string();

    let deal_stage = deal.property_str("dealstage").unwrap_or_default().to_string();

    let raw_fields = deal
        .properties
        .iter()
        .filter(|(key, _)| !RECOGNIZED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(Reservation {
        id: deal.id.clone(),
        property_name,
        location,
        check_in,
        check_out,
        status,
        amount,
        confirmation_number,
        deal_stage,
        raw_fields,
    })
}

/// Property name priority: explicit field, then the composite deal name.
///
/// Deal names follow the booking-desk convention
/// "LastName, PropertyName, DateRange", so with two or more parts the
/// second one is the property.
fn resolve_property_name(deal: &RawDealRecord, name_parts: &[&str]) -> String {
    if let Some(explicit) = deal.property_str("property_name") {
        return explicit.to_string();
    }

    if name_parts.len() >= 2 && !name_parts[1].is_empty() {
        return name_parts[1].to_string();
    }
    if let Some(first) = name_parts.first().filter(|p| !p.is_empty()) {
        return first.to_string();
    }

    FALLBACK_PROPERTY_NAME.to_string()
}

/// The third comma part is a location only when it doesn't read as a stay
/// range. Location is never inferred from any other field.
fn resolve_location(name_parts: &[&str]) -> String {
    match name_parts.get(2) {
        Some(part) if !part.is_empty() && !contains_date_fragment(part) => part.to_string(),
        _ => String::new(),
    }
}

fn resolve_dates(deal: &RawDealRecord) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let check_in_raw = resolve_alias(deal, &CHECK_IN_ALIASES).map(str::to_string);
    let check_out_raw = resolve_alias(deal, &CHECK_OUT_ALIASES).map(str::to_string);

    let (check_in_raw, check_out_raw) = match (check_in_raw, check_out_raw) {
        // Neither field resolved: the composite name is the last resort.
        (None, None) => match deal.property_str("dealname").and_then(extract_date_range) {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        },
        resolved => resolved,
    };

    (
        check_in_raw.as_deref().and_then(parse_date),
        check_out_raw.as_deref().and_then(parse_date),
    )
}

/// Status against the clock. An unscheduled deal is treated as upcoming
/// rather than unknown; tests pin that default.
fn infer_status(
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> ReservationStatus {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return ReservationStatus::Upcoming;
    };

    let today = now.date_naive();
    if today >= check_in && today <= check_out {
        ReservationStatus::Current
    } else if today < check_in {
        ReservationStatus::Upcoming
    } else {
        ReservationStatus::Past
    }
}

/// Numeric coercion: the CRM serves amounts as numbers or numeric strings.
/// Anything else is 0; reservations never carry negative amounts.
fn coerce_amount(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() && parsed > 0.0 {
        parsed
    } else {
        0.0
    }
}
