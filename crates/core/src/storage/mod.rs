use crate::domain::despesa::Despesa;
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Connects the optional local store. The file is created on first use.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid sqlite url: {database_url}"))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("connect {database_url} failed"))
}

/// Creates the three tables if missing. Idempotent; safe to run at every
/// startup.
pub async fn bootstrap(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users ( \
           id INTEGER PRIMARY KEY, \
           nome TEXT NOT NULL, \
           api_key TEXT NOT NULL UNIQUE \
         )",
    )
    .execute(pool)
    .await
    .context("create users table failed")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS despesas ( \
           user_id INTEGER NOT NULL REFERENCES users(id), \
           id INTEGER NOT NULL, \
           descricao TEXT NOT NULL, \
           valor REAL NOT NULL, \
           categoria TEXT NOT NULL, \
           criado_em TEXT NOT NULL, \
           PRIMARY KEY (user_id, id) \
         )",
    )
    .execute(pool)
    .await
    .context("create despesas table failed")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS portfolio ( \
           id INTEGER PRIMARY KEY AUTOINCREMENT, \
           user_id INTEGER NOT NULL REFERENCES users(id), \
           ticker TEXT NOT NULL, \
           quantidade REAL NOT NULL DEFAULT 0 \
         )",
    )
    .execute(pool)
    .await
    .context("create portfolio table failed")?;

    Ok(())
}

pub async fn ensure_user(
    pool: &SqlitePool,
    user_id: i64,
    nome: &str,
    api_key: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO users (id, nome, api_key) VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO UPDATE SET nome = EXCLUDED.nome, api_key = EXCLUDED.api_key",
    )
    .bind(user_id)
    .bind(nome)
    .bind(api_key)
    .execute(pool)
    .await
    .context("upsert users failed")?;
    Ok(())
}

/// All of one user's despesas, oldest first, ready for `ExpenseLedger::restore`.
pub async fn load_despesas(pool: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Despesa>> {
    let rows = sqlx::query_as::<_, (i64, String, f64, String, DateTime<Utc>)>(
        "SELECT id, descricao, valor, categoria, criado_em \
         FROM despesas \
         WHERE user_id = $1 \
         ORDER BY id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("select despesas failed")?;

    Ok(rows
        .into_iter()
        .map(|(id, descricao, valor, categoria, criado_em)| Despesa {
            id,
            descricao,
            valor,
            categoria,
            criado_em,
        })
        .collect())
}

/// Writes one ledger-assigned record through to the store. The id comes
/// from the ledger, so replays of the same append are conflicts, not dupes.
pub async fn insert_despesa(
    pool: &SqlitePool,
    user_id: i64,
    despesa: &Despesa,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO despesas (user_id, id, descricao, valor, categoria, criado_em) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user_id)
    .bind(despesa.id)
    .bind(&despesa.descricao)
    .bind(despesa.valor)
    .bind(&despesa.categoria)
    .bind(despesa.criado_em)
    .execute(pool)
    .await
    .context("insert despesas failed")?;
    Ok(())
}
