//! REST API handlers for the Voyage Passport endpoints.

use std::sync::{Arc, LazyLock};
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use voyage_cms::{destination_slug, Experience, ExperienceSource, FeaturedOffer, WordPressCms};
use voyage_core::reservation::Reservation;
use voyage_core::tiers::TierAssessment;
use voyage_core::PassportError;
use voyage_crm::CrmClient;
use voyage_reservations::normalize;
use voyage_tier::TierEngine;

use crate::session::{SessionStore, SessionToken, UserIdentity};

/// Maximum accepted length for query string fields.
const MAX_FIELD_LEN: usize = 256;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub crm: Arc<dyn CrmClient>,
    pub engine: Arc<TierEngine>,
    pub experiences: Arc<dyn ExperienceSource>,
    /// None in offline mode; featured offers degrade to an empty list.
    pub cms: Option<Arc<WordPressCms>>,
    pub sessions: Arc<SessionStore>,
    pub node_id: String,
    pub start_time: Instant,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: message.into(),
        }),
    )
}

/// Translate a core error into a response. The core itself never sees HTTP.
fn map_error(err: PassportError) -> ApiError {
    match err {
        PassportError::Validation(msg) => api_error(StatusCode::BAD_REQUEST, "invalid_request", msg),
        PassportError::Crm(msg) => {
            error!(error = %msg, "CRM upstream failure");
            metrics::counter!("api.crm_errors").increment(1);
            api_error(StatusCode::BAD_GATEWAY, "crm_unavailable", "CRM request failed")
        }
        PassportError::Cms(msg) => {
            error!(error = %msg, "CMS upstream failure");
            metrics::counter!("api.cms_errors").increment(1);
            api_error(StatusCode::BAD_GATEWAY, "cms_unavailable", "CMS request failed")
        }
        other => {
            error!(error = %other, "Unhandled internal error");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            )
        }
    }
}

/// Validate an email at the API boundary.
fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_email",
            "Email parameter is required",
        ));
    }
    if email.len() > MAX_FIELD_LEN {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_email",
            "Email exceeds maximum length",
        ));
    }
    if !EMAIL_RE.is_match(email) {
        metrics::counter!("api.validation_errors").increment(1);
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_email",
            "Invalid email format",
        ));
    }
    Ok(())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The caller's email: explicit `email` query parameter, else a session
/// token resolving to a profile identity.
fn resolve_email(
    state: &AppState,
    headers: &HeaderMap,
    email: Option<String>,
) -> Result<String, ApiError> {
    if let Some(email) = email {
        validate_email(&email)?;
        return Ok(email);
    }

    let Some(token) = bearer_token(headers) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Email parameter or session token is required",
        ));
    };

    match state.sessions.resolve(token) {
        Some(UserIdentity::Profile { email }) => {
            validate_email(&email)?;
            Ok(email)
        }
        Some(UserIdentity::Guest { .. }) => Err(api_error(
            StatusCode::FORBIDDEN,
            "guest_session",
            "Guest sessions have no profile passport",
        )),
        None => Err(api_error(
            StatusCode::UNAUTHORIZED,
            "invalid_session",
            "Session token is unknown or expired",
        )),
    }
}

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

/// GET /api/passport — Voyage Passport tier data for a contact.
pub async fn handle_passport(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EmailQuery>,
) -> Result<Json<PassportResponse>, ApiError> {
    let email = resolve_email(&state, &headers, query.email)?;

    let contact = state
        .crm
        .find_contact_by_email(&email)
        .await
        .map_err(map_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "contact_not_found",
                format!("No contact for {email}"),
            )
        })?;

    let voyage_points = contact.voyage_points();
    // The CRM tracks no separate annual-spend figure; lifetime points stand
    // in for it, so the bucks figure reads as "earned over the lifetime at
    // the current rate".
    let tier_info = state.engine.assess(voyage_points, voyage_points);

    metrics::counter!("api.passport_requests").increment(1);

    Ok(Json(PassportResponse {
        success: true,
        contact_id: contact.id.clone(),
        name: NameParts {
            first: contact.first_name().to_string(),
            last: contact.last_name().to_string(),
        },
        voyage_points,
        stay_count: contact.stay_count(),
        tier_status_crm: contact.crm_tier_status().map(String::from),
        tier_info,
        email,
    }))
}

/// GET /api/reservations — normalized reservations for a contact.
pub async fn handle_reservations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ReservationsResponse>, ApiError> {
    let email = resolve_email(&state, &headers, query.email)?;

    let contact = state
        .crm
        .find_contact_by_email(&email)
        .await
        .map_err(map_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "contact_not_found",
                format!("No contact for {email}"),
            )
        })?;

    let deals = state
        .crm
        .deals_for_contact(&contact.id)
        .await
        .map_err(map_error)?;

    let normalized = normalize(&deals, Utc::now());
    if normalized.skipped > 0 {
        warn!(
            skipped = normalized.skipped,
            contact_id = %contact.id,
            "Some deal records were skipped during normalization"
        );
    }

    metrics::counter!("api.reservation_requests").increment(1);

    Ok(Json(ReservationsResponse {
        success: true,
        contact_id: contact.id,
        reservations: normalized.reservations,
        email,
    }))
}

/// GET /api/experiences — destination experiences for a location.
/// Best-effort: an unmapped location or a source failure is an empty list.
pub async fn handle_experiences(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ExperiencesResponse>, ApiError> {
    let location = query.location.unwrap_or_default();
    if location.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Location parameter is required",
        ));
    }

    let Some(slug) = destination_slug(&location) else {
        return Ok(Json(ExperiencesResponse {
            success: true,
            experiences: Vec::new(),
            destination: None,
        }));
    };

    let experiences = match state.experiences.experiences_for(slug).await {
        Ok(experiences) => experiences,
        Err(e) => {
            warn!(slug, error = %e, "Experience source failed");
            metrics::counter!("api.experience_failures").increment(1);
            Vec::new()
        }
    };

    Ok(Json(ExperiencesResponse {
        success: true,
        experiences,
        destination: Some(slug.to_string()),
    }))
}

/// GET /api/featured-offers — current offers from the marketing site.
pub async fn handle_featured_offers(
    State(state): State<AppState>,
) -> Result<Json<OffersResponse>, ApiError> {
    let offers = match &state.cms {
        Some(cms) => cms.featured_offers().await.map_err(map_error)?,
        None => Vec::new(),
    };

    Ok(Json(OffersResponse {
        success: true,
        offers,
    }))
}

#[derive(Deserialize)]
pub struct SessionRequest {
    #[serde(flatten)]
    pub identity: UserIdentity,
}

/// POST /api/session — issue a session token for an identity.
pub async fn handle_session_create(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    match &request.identity {
        UserIdentity::Profile { email } => validate_email(email)?,
        UserIdentity::Guest {
            booking_number,
            last_name,
        } => {
            if booking_number.is_empty() || last_name.is_empty() {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    "Guest sessions need a booking number and last name",
                ));
            }
        }
    }

    let session = state.sessions.issue(request.identity);
    Ok(Json(SessionResponse {
        success: true,
        session,
    }))
}

/// DELETE /api/session — revoke the presented session token.
pub async fn handle_session_revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let Some(token) = bearer_token(&headers) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Session token is required",
        ));
    };
    state.sessions.revoke(token);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health — health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — readiness probe.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct NameParts {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Serialize)]
pub struct PassportResponse {
    pub success: bool,
    pub email: String,
    pub contact_id: String,
    pub name: NameParts,
    pub voyage_points: f64,
    pub stay_count: u64,
    pub tier_status_crm: Option<String>,
    pub tier_info: TierAssessment,
}

#[derive(Debug, Serialize)]
pub struct ReservationsResponse {
    pub success: bool,
    pub email: String,
    pub contact_id: String,
    pub reservations: Vec<Reservation>,
}

#[derive(Debug, Serialize)]
pub struct ExperiencesResponse {
    pub success: bool,
    pub experiences: Vec<Experience>,
    pub destination: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OffersResponse {
    pub success: bool,
    pub offers: Vec<FeaturedOffer>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub session: SessionToken,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("guest@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc-123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc-123"));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_error_mapping_statuses() {
        let (status, _) = map_error(PassportError::Crm("down".to_string()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = map_error(PassportError::Validation("bad".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = map_error(PassportError::InvalidConfiguration("x".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
