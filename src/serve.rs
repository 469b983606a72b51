use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use clap::ValueEnum;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc as StdArc, Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::{aggregate, Granularity};
use crate::drinks::DrinkType;
use crate::entry::LogEntry;
use crate::error::{DynError, LogError};
use crate::form::{parse_date_input, FormInput, Logbook};

/// State shared by the API handlers
///
/// The logbook sits behind a mutex so read-modify-write cycles never overlap.
pub struct AppState {
    pub logbook: Mutex<Logbook>,
    pub default_weight_kg: f64,
    pub default_amount_ml: u32,
}

impl AppState {
    pub fn new(logbook: Logbook, default_weight_kg: f64, default_amount_ml: u32) -> Self {
        Self {
            logbook: Mutex::new(logbook),
            default_weight_kg,
            default_amount_ml,
        }
    }

    /// Fill the form from optional request fields, falling back to defaults
    fn form_from(&self, params: &FormParams) -> Result<FormInput, LogError> {
        let mut form = FormInput::with_defaults(
            Local::now().date_naive(),
            self.default_weight_kg,
            self.default_amount_ml,
        );
        if let Some(date) = &params.date {
            form.date = parse_date_input(date)?;
        }
        if let Some(drink) = &params.drink {
            form.drink = drink.parse::<DrinkType>().map_err(LogError::InvalidInput)?;
        }
        if let Some(amount_ml) = params.amount_ml {
            form.amount_ml = amount_ml;
        }
        if let Some(weight_kg) = params.weight_kg {
            form.weight_kg = weight_kg;
        }
        Ok(form)
    }
}

/// Optional form fields, from a query string or a JSON body
#[derive(Debug, Default, Deserialize)]
pub struct FormParams {
    pub date: Option<String>,
    pub drink: Option<String>,
    pub amount_ml: Option<u32>,
    pub weight_kg: Option<f64>,
}

#[derive(Serialize)]
struct DrinkInfo {
    key: &'static str,
    label: &'static str,
    strength_pct: f64,
}

#[derive(Serialize)]
struct EstimateResponse {
    drink: &'static str,
    amount_ml: u32,
    weight_kg: f64,
    grams: f64,
    hours: f64,
    grams_display: String,
    hours_display: String,
    clear_time: String,
}

#[derive(Serialize)]
struct EntriesResponse {
    entries: Vec<LogEntry>,
    skipped_rows: usize,
    warning: Option<String>,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Map an extractor rejection onto the JSON error body
fn query_rejection_response(rejection: QueryRejection) -> Response {
    warn!("Rejected query string: {}", rejection.body_text());
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

fn json_rejection_response(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    error_response(status, rejection.body_text())
}

fn log_error_response(e: LogError) -> Response {
    let status = match &e {
        LogError::InvalidInput(_) | LogError::DivisionUndefined => StatusCode::BAD_REQUEST,
        LogError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        LogError::Store(_) | LogError::MalformedRow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    }
    error_response(status, e.to_string())
}

/// Run `f` against the logbook on the blocking pool
async fn with_logbook<T, F>(state: StdArc<AppState>, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&AppState, &mut Logbook) -> Result<T, LogError> + Send + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        let mut logbook = state
            .logbook
            .lock()
            .map_err(|_| LogError::Store("logbook lock poisoned".to_string()))?;
        f(&*state, &mut *logbook)
    })
    .await;

    match joined {
        Ok(result) => result.map_err(log_error_response),
        Err(e) => {
            error!("Logbook task failed: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task failed: {}", e),
            ))
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn drinks_handler() -> impl IntoResponse {
    let drinks: Vec<DrinkInfo> = DrinkType::ALL
        .into_iter()
        .map(|d| DrinkInfo {
            key: d.key(),
            label: d.label(),
            strength_pct: d.strength_pct(),
        })
        .collect();
    Json(drinks)
}

async fn estimate_handler(
    State(state): State<StdArc<AppState>>,
    params: Result<Query<FormParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return query_rejection_response(rejection),
    };
    let form = match state.form_from(&params) {
        Ok(form) => form,
        Err(e) => return log_error_response(e),
    };
    let metrics = match form.metrics() {
        Ok(m) => m,
        Err(e) => return log_error_response(e),
    };
    let clear_time = crate::estimator::project_clear_time(metrics.hours, Local::now());
    Json(EstimateResponse {
        drink: form.drink.label(),
        amount_ml: form.amount_ml,
        weight_kg: form.weight_kg,
        grams: metrics.grams,
        hours: metrics.hours,
        grams_display: metrics.grams_display(),
        hours_display: metrics.hours_display(),
        clear_time: crate::estimator::format_clear_time(&clear_time),
    })
    .into_response()
}

async fn list_entries_handler(State(state): State<StdArc<AppState>>) -> Response {
    let result = with_logbook(state, |_, logbook| {
        let snapshot = logbook.snapshot();
        Ok(EntriesResponse {
            entries: snapshot.entries,
            skipped_rows: snapshot.skipped_rows,
            warning: snapshot.warning,
        })
    })
    .await;
    match result {
        Ok(body) => Json(body).into_response(),
        Err(response) => response,
    }
}

async fn submit_entry_handler(
    State(state): State<StdArc<AppState>>,
    params: Result<Json<FormParams>, JsonRejection>,
) -> Response {
    let Json(params) = match params {
        Ok(params) => params,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let result = with_logbook(state, move |state, logbook| {
        let form = state.form_from(&params)?;
        logbook.submit(&form, Local::now())
    })
    .await;
    match result {
        Ok(dashboard) => (StatusCode::CREATED, Json(dashboard)).into_response(),
        Err(response) => response,
    }
}

async fn summary_handler(
    State(state): State<StdArc<AppState>>,
    Path(granularity): Path<String>,
) -> Response {
    let granularity = match Granularity::from_str(&granularity, true) {
        Ok(g) => g,
        Err(_) => {
            warn!("Unknown granularity requested: {}", granularity);
            return error_response(
                StatusCode::BAD_REQUEST,
                format!(
                    "Unknown granularity '{}', expected day, week or month",
                    granularity
                ),
            );
        }
    };
    let result = with_logbook(state, move |_, logbook| {
        let snapshot = logbook.snapshot();
        Ok(aggregate(&snapshot.entries, granularity))
    })
    .await;
    match result {
        Ok(buckets) => Json(buckets).into_response(),
        Err(response) => response,
    }
}

async fn dashboard_handler(
    State(state): State<StdArc<AppState>>,
    params: Result<Query<FormParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return query_rejection_response(rejection),
    };
    let result = with_logbook(state, move |state, logbook| {
        let form = state.form_from(&params)?;
        logbook.render(&form, Local::now())
    })
    .await;
    match result {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(response) => response,
    }
}

/// Build the API router
pub fn build_router(state: StdArc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/drinks", get(drinks_handler))
        .route("/api/estimate", get(estimate_handler))
        .route(
            "/api/entries",
            get(list_entries_handler).post(submit_entry_handler),
        )
        .route("/api/summary/{granularity}", get(summary_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .layer(cors)
        .with_state(state)
}

/// Serve the API until the process is stopped
pub fn serve_api(state: AppState, port: u16) -> Result<(), DynError> {
    println!("Listening on: http://[::]:{} (IPv4 + IPv6)", port);
    println!("Endpoints:");
    println!("  GET  /health");
    println!("  GET  /api/drinks  - Drink catalogue");
    println!("  GET  /api/estimate?drink=<key>&amount_ml=<N>&weight_kg=<N>");
    println!("  GET  /api/entries  - Stored entries");
    println!("  POST /api/entries  - Log an entry");
    println!("  GET  /api/summary/{{day|week|month}}");
    println!("  GET  /api/dashboard  - Metrics and all three charts");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let app = build_router(StdArc::new(state));
        let listener = tokio::net::TcpListener::bind(format!("[::]:{}", port))
            .await
            .map_err(|e| format!("Failed to bind port {}: {}", port, e))?;
        info!("API server started on port {}", port);
        axum::serve(listener, app).await?;
        Ok::<(), DynError>(())
    })
}
