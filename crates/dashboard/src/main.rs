//! `sca-dashboard` -- terminal overview of the Spy Cat Agency.
//!
//! Reads agency statistics and the mission list from the backend through
//! the cached hooks and prints them.
//!
//! # Environment variables
//!
//! | Variable   | Required | Default                 | Description              |
//! |------------|----------|-------------------------|--------------------------|
//! | `API_URL`  | no       | `http://localhost:8000` | Backend base URL         |
//! | `RUST_LOG` | no       | `sca_dashboard=info,...`| Tracing filter directive |

use std::sync::Arc;

use sca_client::{ClientConfig, HttpAgencyApi};
use sca_dashboard::report;
use sca_query::{Agency, AgencyConfig};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sca_dashboard=info,sca_query=info,sca_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(api_url = %config.api_url, "Starting sca-dashboard");

    let api = Arc::new(HttpAgencyApi::new(&config));
    let agency = Agency::new(api, AgencyConfig::default());

    match report::load(&agency).await {
        Ok(overview) => println!("{overview}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load dashboard");
            std::process::exit(1);
        }
    }
}
