use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use financas_core::config::DEMO_USER_ID;
use financas_core::domain::budget::{aggregate, BudgetParams, BudgetSummary};
use financas_core::domain::despesa::{Despesa, NewDespesa};
use financas_core::domain::forecast::{forecast, ForecastError, ForecastParams, ForecastResult};
use financas_core::ingest::{Lookback, MarketDataError, MarketDataProvider};
use financas_core::ledger::ExpenseLedger;

/// Cap on `GET /despesas`.
const DESPESAS_PAGE_SIZE: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<ExpenseLedger>,
    pub market: Arc<dyn MarketDataProvider>,
    pub pool: Option<SqlitePool>,
    pub api_key: String,
    pub forecast_params: ForecastParams,
    pub budget_params: BudgetParams,
    pub lookback: Lookback,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict/:ticker", get(predict))
        .route("/despesas", get(list_despesas).post(add_despesa))
        .route("/insights/budget", get(budget_insights))
        .route("/dashboard", get(dashboard))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Error surface of the API: a JSON `{"error": "..."}` body with a status
/// code per condition. Internal detail is captured, never exposed.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    fn invalid_input(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    fn data_unavailable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        ApiError::data_unavailable(err.to_string())
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError::data_unavailable(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "internal error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    api_key: Option<String>,
}

/// Static-key check: `api_key` query parameter or `Authorization: Bearer`.
/// Resolves to the synthetic demo user; nothing runs past a bad key.
fn authenticate(state: &AppState, headers: &HeaderMap, query: &AuthQuery) -> Result<i64, ApiError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match query.api_key.as_deref().or(bearer) {
        Some(key) if key == state.api_key => Ok(DEMO_USER_ID),
        _ => Err(ApiError::unauthorized("API key inválida")),
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Finanças API - online",
        "status": "success",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/health", "/predict/{ticker}", "/despesas", "/insights/budget", "/dashboard"],
        "timestamp": Utc::now(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn predict(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(auth): Query<AuthQuery>,
    headers: HeaderMap,
) -> Result<Json<ForecastResult>, ApiError> {
    authenticate(&state, &headers, &auth)?;

    let series = state
        .market
        .fetch_closing_prices(&ticker, state.lookback)
        .await?;
    let result = forecast(&ticker, &series, &state.forecast_params)?;

    tracing::info!(
        ticker = %result.ticker,
        provider = state.market.provider_name(),
        points = series.len(),
        "forecast generated"
    );
    Ok(Json(result))
}

async fn list_despesas(
    State(state): State<AppState>,
    Query(auth): Query<AuthQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Despesa>>, ApiError> {
    let user_id = authenticate(&state, &headers, &auth)?;
    Ok(Json(state.ledger.list(user_id, DESPESAS_PAGE_SIZE).await))
}

async fn add_despesa(
    State(state): State<AppState>,
    Query(auth): Query<AuthQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let user_id = authenticate(&state, &headers, &auth)?;

    let nova: NewDespesa = serde_json::from_value(body)
        .map_err(|e| ApiError::invalid_input(format!("invalid despesa payload: {e}")))?;
    let valid = nova
        .validate()
        .map_err(|e| ApiError::invalid_input(e.to_string()))?;

    let despesa = state.ledger.add(user_id, valid).await;
    persist_despesa(state.pool.as_ref(), user_id, &despesa).await;

    Ok(Json(json!({ "success": true, "despesa": despesa })))
}

async fn budget_insights(
    State(state): State<AppState>,
    Query(auth): Query<AuthQuery>,
    headers: HeaderMap,
) -> Result<Json<BudgetSummary>, ApiError> {
    let user_id = authenticate(&state, &headers, &auth)?;

    // The ledger hands records most-recent-first, so the aggregation
    // window covers the latest N appends.
    let window = state
        .ledger
        .list(user_id, state.budget_params.window_limit)
        .await;
    Ok(Json(aggregate(&window, &state.budget_params)))
}

async fn dashboard() -> Html<&'static str> {
    Html(crate::dashboard::PAGE)
}

/// Write-through to the optional store. Best-effort: the in-memory ledger
/// is authoritative, so a failed write is logged and the request succeeds.
pub(crate) async fn persist_despesa(pool: Option<&SqlitePool>, user_id: i64, despesa: &Despesa) {
    let Some(pool) = pool else { return };
    if let Err(err) = financas_core::storage::insert_despesa(pool, user_id, despesa).await {
        tracing::warn!(error = %err, despesa_id = despesa.id, "failed to persist despesa to store");
    }
}
