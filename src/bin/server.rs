//! persona-radar HTTP server binary.
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT` — listen address (default: `0.0.0.0:5001`)
//! - `PERSONA_DATA_DIR` — profile storage directory (default: `data`)
//! - `PERSONA_INTEREST_MAX` — top of the interest scale (default: 3)
//! - `PERSONA_SURVEY_SIZE` — animals per new survey (default: 5)
//! - `PERSONA_CHART_SIZE` — chart edge length in pixels (default: 800)
//! - `RUST_LOG` — Tracing filter (default: "info,persona_radar=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use persona_radar::server::{app_router, AppState};
use persona_radar::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,persona_radar=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        interest_max = config.interest_max,
        survey_size = config.survey_size,
        chart_size = config.chart.size,
        "configuration loaded"
    );

    let state = AppState::new(config).context("failed to compile page template")?;
    let app = app_router(state);

    tracing::info!("persona-radar server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /               — survey page");
    tracing::info!("  POST /start_survey   — begin or resume a survey");
    tracing::info!("  POST /submit_survey  — save a profile and chart it");
    tracing::info!("  POST /generate_chart — live preview");
    tracing::info!("  POST /load_profile   — stored profile and chart");
    tracing::info!("  GET  /profiles       — stored profile summaries");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
