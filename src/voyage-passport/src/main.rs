//! Voyage Passport — loyalty tier and reservation service for the guest
//! portal.
//!
//! Main entry point: loads configuration, validates the tier ladder, wires
//! the CRM/CMS capabilities and starts the HTTP server.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use voyage_api::session::SessionStore;
use voyage_api::{ApiServer, AppState};
use voyage_cms::{NoExperiences, WordPressCms};
use voyage_core::config::AppConfig;
use voyage_core::tiers::TierTable;
use voyage_crm::{CrmClient, CrmContact, HubSpotClient, StaticCrm};
use voyage_tier::TierEngine;

#[derive(Parser, Debug)]
#[command(name = "voyage-passport")]
#[command(about = "Loyalty tier and reservation service for the guest portal")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "VOYAGE_PASSPORT__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "VOYAGE_PASSPORT__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// CRM private app token (overrides config)
    #[arg(long, env = "VOYAGE_PASSPORT__CRM__API_TOKEN", hide_env_values = true)]
    crm_token: Option<String>,

    /// Serve canned demo data instead of calling the CRM/CMS
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyage_passport=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Voyage Passport starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(token) = cli.crm_token {
        config.crm.api_token = token;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        offline = cli.offline,
        "Configuration loaded"
    );

    // Validate the tier ladder before serving anything. A malformed ladder
    // is a deployment defect; refuse to start rather than assess against it.
    let table = match TierTable::new(config.tiers.clone()) {
        Ok(table) => table,
        Err(e) => {
            error!(error = %e, "Tier table rejected, refusing to serve");
            return Err(e.into());
        }
    };

    let engine = Arc::new(TierEngine::new(table));

    let crm: Arc<dyn CrmClient> = if cli.offline {
        info!("Running in offline mode with canned CRM data");
        Arc::new(demo_crm())
    } else {
        Arc::new(HubSpotClient::new(&config.crm)?)
    };

    let cms = if cli.offline {
        None
    } else {
        Some(Arc::new(WordPressCms::new(&config.cms)?))
    };

    let state = AppState {
        crm,
        engine,
        // Experience extraction runs as a separate pipeline; this service
        // only consumes its interface and ships the null source by default.
        experiences: Arc::new(NoExperiences),
        cms,
        sessions: Arc::new(SessionStore::default()),
        node_id: config.node_id.clone(),
        start_time: Instant::now(),
    };

    let api_server = ApiServer::new(config, state);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Voyage Passport is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}

/// Canned contact and deals for `--offline` development.
fn demo_crm() -> StaticCrm {
    use serde_json::json;

    let contact = CrmContact {
        id: "demo-contact-1".to_string(),
        properties: [
            ("email", json!("demo.guest@example.com")),
            ("firstname", json!("Demo")),
            ("lastname", json!("Guest")),
            ("hs_lifetime_revenue", json!("65000")),
            ("num_associated_deals", json!("2")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
    };

    let deals = vec![
        voyage_core::reservation::RawDealRecord {
            id: "demo-deal-1".to_string(),
            properties: [
                ("dealname", json!("Guest, Casa Bella, 7/1/24 - 7/8/24")),
                ("amount", json!("42000")),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        },
        voyage_core::reservation::RawDealRecord {
            id: "demo-deal-2".to_string(),
            properties: [
                ("dealname", json!("Guest, Villa Sol, Los Cabos")),
                ("check_in", json!("2026-12-20")),
                ("check_out", json!("2027-01-03")),
                ("amount", json!("23000")),
                ("confirmation_number", json!("CNF-2026-104")),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        },
    ];

    StaticCrm::new().with_contact("demo.guest@example.com", contact, deals)
}
