use sqlx::SqlitePool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use financas_core::config::{Settings, DEMO_USER_ID, DEMO_USER_NAME};
use financas_core::domain::budget::BudgetParams;
use financas_core::domain::despesa::ValidatedDespesa;
use financas_core::domain::forecast::ForecastParams;
use financas_core::ingest::yahoo::YahooFinanceProvider;
use financas_core::ingest::{Lookback, MarketDataProvider};
use financas_core::ledger::ExpenseLedger;

mod app;
mod dashboard;

const DEMO_DESPESAS: [(&str, f64, &str); 3] = [
    ("Supermercado", 847.50, "Alimentação"),
    ("Netflix", 55.90, "Lazer"),
    ("Gasolina", 245.00, "Transporte"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<SqlitePool> = match settings.database_url.as_deref() {
        Some(db_url) => match open_store(db_url, &settings).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "store init failed; starting API with in-memory ledger only");
                None
            }
        },
        None => {
            tracing::info!("DATABASE_URL not set; despesas live in memory only");
            None
        }
    };

    let ledger = Arc::new(ExpenseLedger::new());
    if let Some(pool) = &pool {
        match financas_core::storage::load_despesas(pool, DEMO_USER_ID).await {
            Ok(rows) if !rows.is_empty() => {
                tracing::info!(count = rows.len(), "restored despesas from store");
                ledger.restore(DEMO_USER_ID, rows).await;
            }
            Ok(_) => {}
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "loading despesas failed; starting empty");
            }
        }
    }
    if ledger.is_empty(DEMO_USER_ID).await {
        seed_demo_despesas(&ledger, pool.as_ref()).await;
    }

    let market: Arc<dyn MarketDataProvider> =
        Arc::new(YahooFinanceProvider::from_settings(&settings)?);

    let state = app::AppState {
        ledger,
        market,
        pool,
        api_key: settings.api_key().to_string(),
        forecast_params: ForecastParams::from_env(),
        budget_params: BudgetParams::from_env(),
        lookback: Lookback::from_env(),
    };

    let router = app::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn open_store(db_url: &str, settings: &Settings) -> anyhow::Result<SqlitePool> {
    let pool = financas_core::storage::connect(db_url).await?;
    financas_core::storage::bootstrap(&pool).await?;
    financas_core::storage::ensure_user(&pool, DEMO_USER_ID, DEMO_USER_NAME, settings.api_key())
        .await?;
    Ok(pool)
}

async fn seed_demo_despesas(ledger: &ExpenseLedger, pool: Option<&SqlitePool>) {
    for (descricao, valor, categoria) in DEMO_DESPESAS {
        let despesa = ledger
            .add(
                DEMO_USER_ID,
                ValidatedDespesa {
                    descricao: descricao.to_string(),
                    valor,
                    categoria: categoria.to_string(),
                },
            )
            .await;
        app::persist_despesa(pool, DEMO_USER_ID, &despesa).await;
    }
    tracing::info!(count = DEMO_DESPESAS.len(), "seeded demo despesas");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
