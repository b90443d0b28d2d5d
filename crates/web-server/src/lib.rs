// In crates/web-server/src/lib.rs

use app_config::types::{DashboardSettings, ServerSettings};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use core_types::{Timeframe, TrendLabel, TrendReport};
use engine::AnalysisEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::{
    AssetStatus, AssetSummary, ChartResponse, HeatmapResponse, HeatmapRow, SummaryResponse,
    TimeframeQuery, TimeframesResponse,
};

pub mod dashboard;
pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// How many of the most recent crossovers the chart marks.
pub const CHART_CROSSOVER_MARKERS: usize = 5;

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
    pub dashboard: Arc<DashboardSettings>,
}

impl AppState {
    pub fn new(engine: AnalysisEngine, dashboard: DashboardSettings) -> Self {
        Self {
            engine: Arc::new(engine),
            dashboard: Arc::new(dashboard),
        }
    }

    fn timeframe(&self, query: &TimeframeQuery) -> Result<Timeframe> {
        match &query.timeframe {
            None => Ok(self.dashboard.default_timeframe),
            Some(label) => label.parse().map_err(|e: core_types::Error| Error::BadRequest(e.to_string())),
        }
    }
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // The dashboard is served from the same origin, but the JSON API may be
    // consumed from elsewhere.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/timeframes", get(get_timeframes_handler))
        .route("/trends", get(get_trends_handler))
        .route("/trends/{asset}", get(get_asset_trend_handler))
        .route("/heatmap", get(get_heatmap_handler))
        .route("/refresh", post(refresh_handler));

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(dashboard::render(&state.dashboard))
}

/// Handler for `GET /api/timeframes`
async fn get_timeframes_handler(State(state): State<AppState>) -> Json<TimeframesResponse> {
    Json(TimeframesResponse {
        timeframes: Timeframe::ALL.to_vec(),
        default: state.dashboard.default_timeframe,
    })
}

/// Handler for `GET /api/trends`.
/// One entry per configured asset; a failing asset is reported inline.
async fn get_trends_handler(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> Result<Json<SummaryResponse>> {
    let timeframe = state.timeframe(&query)?;
    let outcomes = state.engine.run_cycle(&state.dashboard.assets, timeframe).await;

    let assets = outcomes
        .into_iter()
        .map(|outcome| {
            let status = match outcome.result {
                Ok(report) => summary_status(&report),
                Err(e) => AssetStatus::Error { message: e.to_string() },
            };
            AssetSummary {
                name: outcome.asset.name,
                id: outcome.asset.id,
                status,
            }
        })
        .collect();

    Ok(Json(SummaryResponse {
        timeframe,
        strategy: state.engine.strategy_name(),
        assets,
    }))
}

fn summary_status(report: &TrendReport) -> AssetStatus {
    let price = report.bars.last().map(|b| b.bar.close).unwrap_or_default();
    AssetStatus::Ok {
        price,
        change_pct: report.price_change().map(|(_, pct)| pct),
        analysis: report.analysis.clone(),
    }
}

/// Handler for `GET /api/trends/{asset}`
async fn get_asset_trend_handler(
    State(state): State<AppState>,
    Path(asset): Path<String>,
    Query(query): Query<TimeframeQuery>,
) -> Result<Json<ChartResponse>> {
    let timeframe = state.timeframe(&query)?;
    let Some(asset) = state.dashboard.find_asset(&asset) else {
        tracing::warn!(asset = %asset, "Chart requested for unknown asset.");
        return Err(Error::NotFound(format!("Asset '{}' is not tracked", asset)));
    };

    let report = state.engine.analyze(&asset.symbol(), timeframe).await.map_err(|e| {
        tracing::warn!(asset = %asset.name, timeframe = %timeframe, error = %e, "No usable data for asset.");
        Error::from(e)
    })?;

    let skip = report.crossovers.len().saturating_sub(CHART_CROSSOVER_MARKERS);
    Ok(Json(ChartResponse {
        name: asset.name.clone(),
        id: asset.id.clone(),
        timeframe,
        bars: report.bars.clone(),
        crossovers: report.crossovers[skip..].to_vec(),
        analysis: report.analysis.clone(),
    }))
}

/// Handler for `GET /api/heatmap`
async fn get_heatmap_handler(State(state): State<AppState>) -> Json<HeatmapResponse> {
    let mut rows = Vec::with_capacity(state.dashboard.assets.len());
    for asset in &state.dashboard.assets {
        let symbol = asset.symbol();
        let mut values = Vec::with_capacity(Timeframe::ALL.len());
        for timeframe in Timeframe::ALL {
            let value = match state.engine.analyze(&symbol, timeframe).await {
                Ok(report) => Some(signed_strength(&report)),
                Err(e) => {
                    tracing::debug!(asset = %asset.name, timeframe = %timeframe, error = %e, "Heatmap cell left empty.");
                    None
                }
            };
            values.push(value);
        }
        rows.push(HeatmapRow {
            name: asset.name.clone(),
            id: asset.id.clone(),
            values,
        });
    }

    Json(HeatmapResponse {
        timeframes: Timeframe::ALL.to_vec(),
        rows,
    })
}

fn signed_strength(report: &TrendReport) -> f64 {
    let score = report.analysis.strength.score();
    match report.analysis.trend {
        TrendLabel::Bullish => score,
        TrendLabel::Bearish => -score,
        TrendLabel::Neutral => 0.0,
    }
}

/// Handler for `POST /api/refresh`
async fn refresh_handler(State(state): State<AppState>) -> StatusCode {
    state.engine.clear_cache().await;
    StatusCode::NO_CONTENT
}

/// The main entry point for running the web server.
///
/// Serves until the process receives Ctrl-C.
pub async fn run(settings: ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;
    tracing::info!("Dashboard listening on http://{}", address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::ServeError)?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
}
