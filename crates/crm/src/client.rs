//! CRM capability: contact lookup and deal retrieval.
//!
//! The HubSpot-shaped implementation is a thin, traced JSON client; retry
//! and rate-limit policy against the upstream API stays with the caller's
//! deployment, not here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use voyage_core::config::CrmConfig;
use voyage_core::reservation::RawDealRecord;
use voyage_core::{PassportError, PassportResult};

use crate::contact::CrmContact;

/// Contact properties requested on every lookup.
const CONTACT_PROPERTIES: [&str; 7] = [
    "email",
    "firstname",
    "lastname",
    "hs_lifetime_revenue",
    "lifetime_revenue",
    "num_associated_deals",
    "sub_type__c",
];

/// Deal properties requested per reservation record, covering every portal
/// spelling the normalizer resolves.
const DEAL_PROPERTIES: [&str; 15] = [
    "dealname",
    "amount",
    "dealstage",
    "closedate",
    "property_name",
    "check_in",
    "check_out",
    "checkin",
    "checkout",
    "check_in_date",
    "check_out_date",
    "arrival_date",
    "departure_date",
    "confirmation_number",
    "createdate",
];

/// Capability: fetch contact/deal records by email/id.
#[async_trait]
pub trait CrmClient: Send + Sync {
    /// Contact matching the email, or None when the CRM has no record.
    async fn find_contact_by_email(&self, email: &str) -> PassportResult<Option<CrmContact>>;

    /// All deal records associated with a contact, unordered and raw.
    async fn deals_for_contact(&self, contact_id: &str) -> PassportResult<Vec<RawDealRecord>>;
}

/// HubSpot CRM v3 client.
pub struct HubSpotClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CrmContact>,
}

#[derive(Deserialize)]
struct AssociationsResponse {
    #[serde(default)]
    results: Vec<AssociationEntry>,
}

#[derive(Deserialize)]
struct AssociationEntry {
    id: String,
}

impl HubSpotClient {
    pub fn new(config: &CrmConfig) -> PassportResult<Self> {
        if config.api_token.is_empty() {
            return Err(PassportError::InvalidConfiguration(
                "CRM api_token must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PassportError::Crm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> PassportResult<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .header("accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| PassportError::Crm(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PassportError::Crm(format!(
                "{url} returned status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PassportError::Crm(format!("invalid JSON from {url}: {e}")))
    }
}

#[async_trait]
impl CrmClient for HubSpotClient {
    #[instrument(skip(self))]
    async fn find_contact_by_email(&self, email: &str) -> PassportResult<Option<CrmContact>> {
        let url = format!("{}/crm/v3/objects/contacts/search", self.base_url);
        let body = json!({
            "filterGroups": [{
                "filters": [{
                    "propertyName": "email",
                    "operator": "EQ",
                    "value": email,
                }]
            }],
            "properties": CONTACT_PROPERTIES,
            "limit": 1,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PassportError::Crm(format!("contact search failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PassportError::Crm(format!(
                "contact search returned status {status}"
            )));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| PassportError::Crm(format!("invalid contact search response: {e}")))?;

        debug!(found = !search.results.is_empty(), "Contact search completed");
        Ok(search.results.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn deals_for_contact(&self, contact_id: &str) -> PassportResult<Vec<RawDealRecord>> {
        let associations_url = format!(
            "{}/crm/v3/objects/contacts/{}/associations/deals",
            self.base_url, contact_id
        );
        let associations: AssociationsResponse = self.get_json(&associations_url, &[]).await?;

        if associations.results.is_empty() {
            return Ok(Vec::new());
        }

        let properties = DEAL_PROPERTIES.join(",");
        let mut deals = Vec::with_capacity(associations.results.len());
        for entry in &associations.results {
            let deal_url = format!("{}/crm/v3/objects/deals/{}", self.base_url, entry.id);
            let deal: RawDealRecord = self
                .get_json(&deal_url, &[("properties", properties.clone())])
                .await?;
            deals.push(deal);
        }

        debug!(count = deals.len(), "Fetched deals for contact");
        Ok(deals)
    }
}
