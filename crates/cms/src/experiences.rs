//! Destination experiences capability.
//!
//! Experience content lives on marketing pages whose markup the brand team
//! changes without notice, so extraction is a best-effort external
//! capability behind this interface. Consumers must treat a failure as
//! "no experiences", never as a request failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One curated destination experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Error, Debug)]
pub enum ScrapeFailure {
    #[error("destination page fetch failed: {0}")]
    Fetch(String),
    #[error("destination page markup not understood: {0}")]
    Markup(String),
}

/// Source of experiences for a destination slug.
#[async_trait]
pub trait ExperienceSource: Send + Sync {
    async fn experiences_for(&self, slug: &str) -> Result<Vec<Experience>, ScrapeFailure>;
}

/// Null source: always no experiences. Used offline and whenever no
/// extraction backend is configured.
pub struct NoExperiences;

#[async_trait]
impl ExperienceSource for NoExperiences {
    async fn experiences_for(&self, _slug: &str) -> Result<Vec<Experience>, ScrapeFailure> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_source_is_empty_not_err() {
        let source = NoExperiences;
        let experiences = source.experiences_for("aspen-colorado").await.unwrap();
        assert!(experiences.is_empty());
    }
}
