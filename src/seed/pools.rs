use rand::seq::IndexedRandom;
use rand::Rng;

use super::catalog::SensorKind;
use crate::error::{SeedError, SeedResult};

/// Primary keys read back from a committed parent table. Read once, never refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdPool {
    table: &'static str,
    ids: Vec<i64>,
}

impl IdPool {
    pub fn new(table: &'static str, ids: Vec<i64>) -> Self {
        Self { table, ids }
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Uniform draw with replacement.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SeedResult<i64> {
        self.ids
            .choose(rng)
            .copied()
            .ok_or(SeedError::EmptyPool(self.table))
    }
}

/// Every pool the pipeline accumulates, filled in dependency order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pools {
    pub users: IdPool,
    pub environments: IdPool,
    pub crops: IdPool,
    pub phases: IdPool,
    pub cycles: IdPool,
    pub cycle_phases: IdPool,
    pub sensors: IdPool,
    pub readings: IdPool,
    pub checklists: IdPool,
    pub alerts: IdPool,
}

/// What a checklist item needs to know about a previously inserted reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingProbe {
    /// Raw `sensores.tipo`; may be outside the catalogue if rows came from elsewhere.
    pub sensor_type: String,
    pub unit: String,
    pub value: f64,
}

/// Point lookups against already committed rows.
#[allow(async_fn_in_trait)]
pub trait SensorLookup {
    async fn sensor_kind(&mut self, sensor_id: i64) -> SeedResult<Option<SensorKind>>;

    async fn reading_probe(&mut self, reading_id: i64) -> SeedResult<ReadingProbe>;
}
