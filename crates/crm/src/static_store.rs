//! In-memory CRM double for tests and offline development.

use std::collections::HashMap;

use async_trait::async_trait;
use voyage_core::reservation::RawDealRecord;
use voyage_core::PassportResult;

use crate::client::CrmClient;
use crate::contact::CrmContact;

/// Fixed contact/deal data served through the [`CrmClient`] interface.
#[derive(Debug, Default)]
pub struct StaticCrm {
    contacts: HashMap<String, CrmContact>,
    deals: HashMap<String, Vec<RawDealRecord>>,
}

impl StaticCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contact under an email together with its deals.
    pub fn with_contact(
        mut self,
        email: &str,
        contact: CrmContact,
        deals: Vec<RawDealRecord>,
    ) -> Self {
        self.deals.insert(contact.id.clone(), deals);
        self.contacts.insert(email.to_lowercase(), contact);
        self
    }
}

#[async_trait]
impl CrmClient for StaticCrm {
    async fn find_contact_by_email(&self, email: &str) -> PassportResult<Option<CrmContact>> {
        Ok(self.contacts.get(&email.to_lowercase()).cloned())
    }

    async fn deals_for_contact(&self, contact_id: &str) -> PassportResult<Vec<RawDealRecord>> {
        Ok(self.deals.get(contact_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_lookup_roundtrip() {
        let contact = CrmContact {
            id: "c-100".to_string(),
            properties: [("hs_lifetime_revenue".to_string(), json!("65000"))]
                .into_iter()
                .collect(),
        };
        let deal = RawDealRecord {
            id: "d-1".to_string(),
            properties: [("dealname".to_string(), json!("Smith, Casa Bella"))]
                .into_iter()
                .collect(),
        };
        let crm = StaticCrm::new().with_contact("guest@example.com", contact, vec![deal]);

        let found = crm
            .find_contact_by_email("Guest@Example.com")
            .await
            .unwrap()
            .expect("contact registered");
        assert_eq!(found.id, "c-100");
        assert_eq!(found.voyage_points(), 65_000.0);

        let deals = crm.deals_for_contact("c-100").await.unwrap();
        assert_eq!(deals.len(), 1);

        assert!(crm
            .find_contact_by_email("other@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
