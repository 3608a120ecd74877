use std::collections::BTreeMap;
use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use npisim::model::series::{SimulationSummary, TidyRow};
use npisim::schedule::{Epoch, NamedInterval, Schedule};
use npisim::{Compartment, Scenario, SimError};

#[derive(Clone)]
struct AppState {
    max_horizon_days: u32,
}

#[derive(Debug, Deserialize)]
struct ScheduleRequest {
    #[serde(default)]
    intervals: Vec<NamedInterval>,
    override_interval: NamedInterval,
    horizon_days: u32,
}

#[derive(Debug, Serialize)]
struct ScheduleResponse {
    intervals: Vec<NamedInterval>,
    epochs: Vec<Epoch>,
    table: String,
}

#[derive(Debug, Serialize)]
struct SimulateResponse {
    return_code: i32,
    epochs: Vec<Epoch>,
    summary: SimulationSummary,
    rows: Vec<TidyRow>,
}

#[derive(Debug, Serialize)]
struct TotalsResponse {
    return_code: i32,
    days: Vec<u32>,
    totals: BTreeMap<Compartment, Vec<f64>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8000);
    let max_horizon_days: u32 = std::env::var("MAX_HORIZON_DAYS").ok().and_then(|v| v.parse().ok()).unwrap_or(3650);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/schedule", post(schedule))
        .route("/simulate", post(simulate))
        .route("/simulate/totals", post(simulate_totals))
        .with_state(AppState { max_horizon_days });

    let addr: SocketAddr = format!("{}:{}", host, port).parse().context("invalid HOST/PORT")?;
    info!(%addr, max_horizon_days, "npisim-api listening");

    let listener = tokio::net::TcpListener::bind(addr).await.context("bind failed")?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

async fn schedule(State(st): State<AppState>, Json(req): Json<ScheduleRequest>) -> Response {
    if let Some(resp) = horizon_guard(&st, req.horizon_days) {
        return resp;
    }
    match Schedule::build(&req.intervals, &req.override_interval, req.horizon_days) {
        Ok(s) => {
            let table = s.render();
            (StatusCode::OK, Json(ScheduleResponse { intervals: s.intervals, epochs: s.epochs, table })).into_response()
        }
        Err(e) => sim_error(e),
    }
}

async fn simulate(State(st): State<AppState>, Json(sc): Json<Scenario>) -> Response {
    if let Some(resp) = horizon_guard(&st, sc.horizon_days) {
        return resp;
    }
    // Integration is CPU-bound; keep it off the async workers.
    let join = tokio::task::spawn_blocking(move || -> Result<SimulateResponse, SimError> {
        let (schedule, series) = sc.run_scheduled()?;
        Ok(SimulateResponse { return_code: 0, epochs: schedule.epochs, summary: series.summary(), rows: series.tidy_rows() })
    });
    match join.await {
        Ok(Ok(resp)) => (StatusCode::OK, Json(resp)).into_response(),
        Ok(Err(e)) => sim_error(e),
        Err(e) => join_error(e),
    }
}

async fn simulate_totals(State(st): State<AppState>, Json(sc): Json<Scenario>) -> Response {
    if let Some(resp) = horizon_guard(&st, sc.horizon_days) {
        return resp;
    }
    let join = tokio::task::spawn_blocking(move || -> Result<TotalsResponse, SimError> {
        let series = sc.run()?;
        let totals = Compartment::ALL.iter().map(|c| (*c, series.compartment_total(*c))).collect();
        Ok(TotalsResponse { return_code: 0, days: series.days, totals })
    });
    match join.await {
        Ok(Ok(resp)) => (StatusCode::OK, Json(resp)).into_response(),
        Ok(Err(e)) => sim_error(e),
        Err(e) => join_error(e),
    }
}

fn horizon_guard(st: &AppState, horizon_days: u32) -> Option<Response> {
    if horizon_days <= st.max_horizon_days {
        return None;
    }
    warn!(horizon_days, limit = st.max_horizon_days, "rejected horizon");
    Some(
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"return_code": 1, "error": format!("horizon_days {} exceeds limit {}", horizon_days, st.max_horizon_days)})),
        )
            .into_response(),
    )
}

fn sim_error(e: SimError) -> Response {
    let kind = match &e {
        SimError::InputRange { .. } => "input_range",
        SimError::Configuration(_) => "configuration",
        SimError::NumericalInstability { .. } => "numerical_instability",
    };
    warn!(kind, error = %e, "simulation request failed");
    (StatusCode::BAD_REQUEST, Json(json!({"return_code": 1, "kind": kind, "error": e.to_string()}))).into_response()
}

fn join_error(e: tokio::task::JoinError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"return_code": 2, "error": format!("join error: {e}")})),
    )
        .into_response()
}
