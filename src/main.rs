//! Quote service: binary entrypoint.
//! Boots the Axum HTTP server under Shuttle, wiring config, the lazy store handle and routes.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Local tracing. Opt in with QUOTES_DEV_LOG=1 (compact) or QUOTES_DEV_LOG=json; skipped
/// silently when the hosting runtime already installed a subscriber.
fn enable_dev_tracing() {
    let mode = std::env::var("QUOTES_DEV_LOG").unwrap_or_default();
    if mode != "1" && mode != "json" {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("setback_quotes=info,search=info,store=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if mode == "json" {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let router = setback_quotes::app()?;
    Ok(router.into())
}
