use dotenvy::dotenv;
use sqlx::Connection;
use std::env;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod seed;

#[cfg(test)]
mod generation_tests;

use config::SeedConfig;
use error::SeedResult;
use seed::Seeder;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = match SeedConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Erro de configuração: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut conn = match db::connect(&cfg.database_url).await {
        Ok(conn) => {
            println!("OK: conectado.");
            tracing::info!("Database connection established");
            conn
        }
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            eprintln!("Erro ao conectar: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = seed_all(&mut conn, cfg).await;
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close connection cleanly: {}", e);
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Seeding aborted: {}", e);
            eprintln!("Erro: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn seed_all(conn: &mut sqlx::PgConnection, cfg: SeedConfig) -> SeedResult<()> {
    db::ensure_schema(conn).await?;

    let min_rows = cfg.min_rows;
    let verify = cfg.verify;
    tracing::info!(
        "Seeding {} tables with at least {} rows each (seed {})",
        db::SCHEMA_TABLES.len(),
        min_rows,
        cfg.rng_seed
    );

    let report = Seeder::new(conn, cfg).run().await?;
    tracing::info!("run report: {}", serde_json::to_string(&report)?);

    if verify {
        let audit = seed::audit::run(conn).await?;
        tracing::info!("audit: {}", serde_json::to_string(&audit)?);
        if !audit.is_clean() {
            tracing::warn!("audit found {} failing checks", audit.violations.len());
        }
        for table in db::SCHEMA_TABLES {
            let rows = audit.rows_in(table).unwrap_or(0);
            if rows < min_rows as i64 {
                tracing::warn!("{} holds {} rows, below the minimum of {}", table, rows, min_rows);
            }
        }
    }

    println!(
        "Concluído: todas as tabelas com >={} registros.",
        min_rows
    );
    Ok(())
}
