use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgConnection};
use std::str::FromStr;

use crate::error::{SeedError, SeedResult};
use crate::seed::catalog::SensorKind;
use crate::seed::pools::{IdPool, ReadingProbe, SensorLookup};
use crate::seed::rows::TableRow;

/// Tables the seeder writes to, in insertion order.
pub const SCHEMA_TABLES: [&str; 13] = [
    "usuarios",
    "ambientes",
    "culturas",
    "fases_cultivo",
    "parametros_ideais",
    "ciclos",
    "ciclo_fases",
    "sensores",
    "leituras",
    "checklists",
    "checklist_itens",
    "alertas",
    "ajustes",
];

pub async fn connect(database_url: &str) -> SeedResult<PgConnection> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| SeedError::Config(format!("Invalid DB URL: {}", e)))?;

    Ok(opts.connect().await?)
}

/// Reads back every identity of a committed table.
pub async fn fetch_ids<R: TableRow>(conn: &mut PgConnection) -> SeedResult<IdPool> {
    let sql = format!(
        "SELECT {id} FROM {table} ORDER BY {id}",
        id = R::ID_COLUMN,
        table = R::TABLE
    );
    let ids: Vec<i64> = sqlx::query_scalar(&sql).fetch_all(&mut *conn).await?;
    let pool = IdPool::new(R::TABLE, ids);
    tracing::debug!("{}: {} identities in pool", R::TABLE, pool.len());
    Ok(pool)
}

/// Seeded tables absent from the connection's current schema.
pub async fn missing_tables(conn: &mut PgConnection) -> SeedResult<Vec<String>> {
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables
         WHERE table_schema = current_schema() AND table_name::text = ANY($1)",
    )
    .bind(&SCHEMA_TABLES[..])
    .fetch_all(&mut *conn)
    .await?;

    Ok(SCHEMA_TABLES
        .iter()
        .filter(|t| !present.iter().any(|p| p.as_str() == **t))
        .map(|t| t.to_string())
        .collect())
}

pub async fn ensure_schema(conn: &mut PgConnection) -> SeedResult<()> {
    let missing = missing_tables(conn).await?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SeedError::Schema(format!(
            "missing tables: {}",
            missing.join(", ")
        )))
    }
}

impl SensorLookup for PgConnection {
    async fn sensor_kind(&mut self, sensor_id: i64) -> SeedResult<Option<SensorKind>> {
        let tipo: String = sqlx::query_scalar("SELECT tipo FROM sensores WHERE id_sensor = $1")
            .bind(sensor_id)
            .fetch_one(&mut *self)
            .await?;
        Ok(SensorKind::from_label(&tipo))
    }

    async fn reading_probe(&mut self, reading_id: i64) -> SeedResult<ReadingProbe> {
        let (sensor_type, unit, value): (String, String, Decimal) = sqlx::query_as(
            r#"
            SELECT s.tipo, s.unidade, COALESCE(l.valor_num, 0)
            FROM leituras l
            JOIN sensores s ON s.id_sensor = l.id_sensor
            WHERE l.id_leitura = $1
            "#,
        )
        .bind(reading_id)
        .fetch_one(&mut *self)
        .await?;

        Ok(ReadingProbe {
            sensor_type,
            unit,
            value: value.to_f64().unwrap_or(0.0),
        })
    }
}
