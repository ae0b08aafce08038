pub mod audit;
pub mod catalog;
pub mod generate;
pub mod insert;
pub mod pools;
pub mod rows;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use sqlx::PgConnection;
use std::time::Instant;

use crate::config::SeedConfig;
use crate::db;
use crate::error::SeedResult;
use audit::TableCount;
use generate::RowGen;
use pools::{IdPool, Pools};
use rows::{
    AdjustmentRow, AlertRow, ChecklistItemRow, ChecklistRow, CropRow, CyclePhaseRow, CycleRow,
    EnvironmentRow, IdealParameterRow, PhaseRow, ReadingRow, SensorRow, TableRow, UserRow,
};

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub rng_seed: u64,
    pub min_rows: usize,
    pub tables: Vec<TableCount>,
    pub elapsed_ms: u128,
}

/// Runs the thirteen tables as a strict linear pipeline over one connection.
pub struct Seeder<'c> {
    conn: &'c mut PgConnection,
    cfg: SeedConfig,
    gen: RowGen<StdRng>,
    pools: Pools,
    tables: Vec<TableCount>,
}

impl<'c> Seeder<'c> {
    pub fn new(conn: &'c mut PgConnection, cfg: SeedConfig) -> Self {
        let gen = RowGen::new(StdRng::seed_from_u64(cfg.rng_seed), &cfg);
        Self {
            conn,
            cfg,
            gen,
            pools: Pools::default(),
            tables: Vec::with_capacity(db::SCHEMA_TABLES.len()),
        }
    }

    async fn store<R: TableRow>(&mut self, rows: Vec<R>, batch_size: usize) -> SeedResult<()> {
        let inserted = insert::insert_batched(self.conn, &rows, batch_size).await?;
        println!("> {}: {}", R::TABLE, inserted);
        tracing::info!("{}: committed {} rows", R::TABLE, inserted);
        self.tables.push(TableCount {
            table: R::TABLE,
            rows: inserted as i64,
        });
        Ok(())
    }

    async fn resolve<R: TableRow>(&mut self) -> SeedResult<IdPool> {
        db::fetch_ids::<R>(self.conn).await
    }

    pub async fn run(mut self) -> SeedResult<SeedReport> {
        let started = Instant::now();
        let batch = self.cfg.batch_size;

        let rows = self.gen.users();
        self.store(rows, batch).await?;
        let rows = self.gen.environments();
        self.store(rows, batch).await?;
        let rows = self.gen.crops();
        self.store(rows, batch).await?;
        let rows = self.gen.phases();
        self.store(rows, batch).await?;

        self.pools.users = self.resolve::<UserRow>().await?;
        self.pools.environments = self.resolve::<EnvironmentRow>().await?;
        self.pools.crops = self.resolve::<CropRow>().await?;
        self.pools.phases = self.resolve::<PhaseRow>().await?;

        let rows: Vec<IdealParameterRow> = self.gen.ideal_parameters(&self.pools)?;
        self.store(rows, batch).await?;

        let rows: Vec<CycleRow> = self.gen.cycles(&self.pools)?;
        self.store(rows, batch).await?;
        self.pools.cycles = self.resolve::<CycleRow>().await?;

        let rows = self.gen.cycle_phases(&self.pools)?;
        self.store(rows, batch).await?;
        self.pools.cycle_phases = self.resolve::<CyclePhaseRow>().await?;

        let rows = self.gen.sensors(&self.pools)?;
        self.store(rows, batch).await?;
        self.pools.sensors = self.resolve::<SensorRow>().await?;

        let rows = self.gen.readings(&self.pools, &mut *self.conn).await?;
        self.store(rows, self.cfg.reading_batch_size).await?;
        self.pools.readings = self.resolve::<ReadingRow>().await?;

        let rows = self.gen.checklists(&self.pools)?;
        self.store(rows, batch).await?;
        self.pools.checklists = self.resolve::<ChecklistRow>().await?;

        let rows: Vec<ChecklistItemRow> = self
            .gen
            .checklist_items(&self.pools, &mut *self.conn)
            .await?;
        self.store(rows, batch).await?;

        let rows = self.gen.alerts(&self.pools)?;
        self.store(rows, batch).await?;
        self.pools.alerts = self.resolve::<AlertRow>().await?;

        let rows: Vec<AdjustmentRow> = self.gen.adjustments(&self.pools)?;
        self.store(rows, batch).await?;

        Ok(SeedReport {
            rng_seed: self.cfg.rng_seed,
            min_rows: self.cfg.min_rows,
            tables: self.tables,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }
}
