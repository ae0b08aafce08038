//! One generator per table. Generators only touch the RNG, the identity pools and
//! (for readings and checklist items) point lookups of already committed rows.

use chrono::{Duration, NaiveDateTime};
use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;

use super::catalog::{
    in_range, range_for_label, SensorKind, ALERT_MESSAGE, ALERT_SEVERITIES, CHECKLIST_RULES,
    CHECKLIST_STATUSES, CROP_NAMES, CYCLE_STATUSES, EMAIL_DOMAINS, EXECUTED_ACTIONS,
    FALLBACK_RANGE, ITEM_NOTE, PHASE_NAMES, PHASE_NOTE, READING_QUALITY, RECOMMENDED_ACTION,
    USER_NAMES, USER_ROLES,
};
use super::pools::{Pools, SensorLookup};
use super::rows::{
    AdjustmentRow, AdjustmentTarget, AlertRow, AlertSource, ChecklistItemRow, ChecklistRow,
    CropRow, CyclePhaseRow, CycleRow, EnvironmentRow, IdealParameterRow, PhaseRow, ReadingRow,
    Resolution, SensorRow, UserRow,
};
use crate::config::SeedConfig;
use crate::error::SeedResult;

/// Latest day offset used for event timestamps.
const EVENT_WINDOW_DAYS: i64 = 300;
const SECONDS_PER_DAY: i64 = 86_400;

const ANOMALY_RATE: f64 = 0.15;
const READING_PHASE_LINK_RATE: f64 = 0.6;
const PARAM_ENV_LINK_RATE: f64 = 0.5;
const ALERT_FROM_READING_RATE: f64 = 0.6;
const ADJUSTMENT_FROM_ALERT_RATE: f64 = 0.7;

pub fn dec(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp(dp)
}

/// Upper bound of a min/max pair. Always at least `margin` above `min`.
pub fn derived_max(min: Decimal, margin: Decimal, high: Decimal) -> Decimal {
    (min + margin).max(high)
}

pub fn zero_padded(prefix: &str, i: usize) -> String {
    format!("{}_{:04}", prefix, i)
}

pub fn user_email(name: &str, i: usize, domain: &str) -> String {
    format!("{}.{}{}", name.to_lowercase().replace(' ', "."), i, domain)
}

pub struct RowGen<R> {
    rng: R,
    base_ts: NaiveDateTime,
    min_rows: usize,
    paired_cycle_sample: usize,
}

impl<R: Rng> RowGen<R> {
    pub fn new(rng: R, cfg: &SeedConfig) -> Self {
        Self {
            rng,
            base_ts: cfg.base_ts,
            min_rows: cfg.min_rows,
            paired_cycle_sample: cfg.paired_cycle_sample,
        }
    }

    fn label(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn day_offset(&mut self, max_days: i64) -> NaiveDateTime {
        self.base_ts + Duration::days(self.rng.random_range(0..=max_days))
    }

    fn event_ts(&mut self) -> NaiveDateTime {
        self.day_offset(EVENT_WINDOW_DAYS)
            + Duration::seconds(self.rng.random_range(0..=SECONDS_PER_DAY))
    }

    pub fn users(&mut self) -> Vec<UserRow> {
        (0..self.min_rows)
            .map(|i| {
                let name = self.label(&USER_NAMES);
                let domain = self.label(&EMAIL_DOMAINS);
                UserRow {
                    name: format!("{} {}", name, i),
                    email: user_email(name, i, domain),
                    role: self.label(&USER_ROLES),
                    active: true,
                }
            })
            .collect()
    }

    pub fn environments(&mut self) -> Vec<EnvironmentRow> {
        (0..self.min_rows)
            .map(|i| {
                let name = zero_padded("Estufa", i);
                EnvironmentRow {
                    description: format!("Ambiente de cultivo {}", name),
                    name,
                    area_m2: dec(self.rng.random_range(10.0..120.0), 2),
                    active: true,
                }
            })
            .collect()
    }

    pub fn crops(&mut self) -> Vec<CropRow> {
        (0..self.min_rows)
            .map(|i| {
                let name = zero_padded(self.label(&CROP_NAMES), i);
                CropRow {
                    description: format!("Cultura {} - variedade sintética", name),
                    name,
                }
            })
            .collect()
    }

    pub fn phases(&mut self) -> Vec<PhaseRow> {
        (0..self.min_rows)
            .map(|i| PhaseRow {
                name: zero_padded(self.label(&PHASE_NAMES), i),
                order: (i % 10) as i32 + 1,
            })
            .collect()
    }

    pub fn ideal_parameters(&mut self, pools: &Pools) -> SeedResult<Vec<IdealParameterRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for _ in 0..self.min_rows {
            let phase_id = pools.phases.pick(&mut self.rng)?;
            let crop_id = pools.crops.pick(&mut self.rng)?;
            let environment_id = if self.rng.random_bool(PARAM_ENV_LINK_RATE) {
                Some(pools.environments.pick(&mut self.rng)?)
            } else {
                None
            };

            let temp_min_c = dec(self.rng.random_range(18.0..22.0), 2);
            let temp_max_c = derived_max(
                temp_min_c,
                Decimal::new(15, 1),
                dec(self.rng.random_range(24.0..28.0), 2),
            );
            let humidity_min_pct = dec(self.rng.random_range(45.0..55.0), 2);
            let humidity_max_pct = derived_max(
                humidity_min_pct,
                Decimal::new(5, 0),
                dec(self.rng.random_range(60.0..80.0), 2),
            );
            let photoperiod_hours = dec(self.rng.random_range(12.0..18.0), 1);
            let ec_min_ms = dec(self.rng.random_range(1.0..1.8), 2);
            let ec_max_ms = derived_max(
                ec_min_ms,
                Decimal::new(4, 1),
                dec(self.rng.random_range(2.0..3.0), 2),
            );
            let ph_min = dec(self.rng.random_range(5.5..5.9), 2);
            let ph_max = derived_max(
                ph_min,
                Decimal::new(1, 1),
                dec(self.rng.random_range(6.0..6.5), 2),
            );

            rows.push(IdealParameterRow {
                phase_id,
                crop_id,
                environment_id,
                temp_min_c,
                temp_max_c,
                humidity_min_pct,
                humidity_max_pct,
                photoperiod_hours,
                ec_min_ms,
                ec_max_ms,
                ph_min,
                ph_max,
            });
        }
        Ok(rows)
    }

    pub fn cycles(&mut self, pools: &Pools) -> SeedResult<Vec<CycleRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for _ in 0..self.min_rows {
            let crop_id = pools.crops.pick(&mut self.rng)?;
            let environment_id = pools.environments.pick(&mut self.rng)?;
            let starts_at = self.day_offset(EVENT_WINDOW_DAYS);
            let ends_at = starts_at + Duration::days(self.rng.random_range(45..=90));
            rows.push(CycleRow {
                crop_id,
                environment_id,
                starts_at,
                ends_at,
                status: self.label(&CYCLE_STATUSES),
            });
        }
        Ok(rows)
    }

    /// Two sequential windows for a sample of cycles, then independent windows on
    /// random cycles until the minimum is reached. The padding windows may overlap
    /// the paired ones or fall outside their cycle's dates.
    pub fn cycle_phases(&mut self, pools: &Pools) -> SeedResult<Vec<CyclePhaseRow>> {
        let cycle_ids = pools.cycles.ids();
        let sample = self.paired_cycle_sample.min(cycle_ids.len());
        let sampled: Vec<i64> = cycle_ids
            .choose_multiple(&mut self.rng, sample)
            .copied()
            .collect();

        let mut rows = Vec::with_capacity(self.min_rows.max(sample * 2));
        for cycle_id in sampled {
            let mut starts_at = self.day_offset(EVENT_WINDOW_DAYS);
            for _ in 0..2 {
                let phase_id = pools.phases.pick(&mut self.rng)?;
                let ends_at = starts_at + Duration::days(self.rng.random_range(5..=40));
                rows.push(CyclePhaseRow {
                    cycle_id,
                    phase_id,
                    starts_at,
                    ends_at,
                    note: PHASE_NOTE,
                });
                starts_at = ends_at + Duration::days(1);
            }
        }

        while rows.len() < self.min_rows {
            let cycle_id = pools.cycles.pick(&mut self.rng)?;
            let phase_id = pools.phases.pick(&mut self.rng)?;
            let starts_at = self.day_offset(EVENT_WINDOW_DAYS);
            let ends_at = starts_at + Duration::days(self.rng.random_range(5..=40));
            rows.push(CyclePhaseRow {
                cycle_id,
                phase_id,
                starts_at,
                ends_at,
                note: PHASE_NOTE,
            });
        }
        Ok(rows)
    }

    pub fn sensors(&mut self, pools: &Pools) -> SeedResult<Vec<SensorRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for i in 0..self.min_rows {
            let environment_id = pools.environments.pick(&mut self.rng)?;
            let kind = SensorKind::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(SensorKind::Temperature);
            rows.push(SensorRow {
                environment_id,
                kind,
                model: zero_padded(kind.model(), i),
            });
        }
        Ok(rows)
    }

    /// Draws a value from the sensor type's valid range, or just outside it for
    /// roughly one reading in seven.
    pub fn coherent_value(&mut self, (low, high): (f64, f64)) -> f64 {
        if self.rng.random_bool(ANOMALY_RATE) {
            let overshoot = self.rng.random_range(0.2..0.8);
            if self.rng.random_bool(0.5) {
                low - overshoot
            } else {
                high + overshoot
            }
        } else {
            self.rng.random_range(low..high)
        }
    }

    pub async fn readings<L: SensorLookup>(
        &mut self,
        pools: &Pools,
        lookup: &mut L,
    ) -> SeedResult<Vec<ReadingRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for _ in 0..self.min_rows {
            let sensor_id = pools.sensors.pick(&mut self.rng)?;
            let cycle_phase_id = if self.rng.random_bool(READING_PHASE_LINK_RATE) {
                Some(pools.cycle_phases.pick(&mut self.rng)?)
            } else {
                None
            };
            let read_at = self.event_ts();

            let range = lookup
                .sensor_kind(sensor_id)
                .await?
                .map(SensorKind::valid_range)
                .unwrap_or(FALLBACK_RANGE);
            let value = self.coherent_value(range);

            rows.push(ReadingRow {
                sensor_id,
                cycle_phase_id,
                read_at,
                value: dec(value, 3),
                quality: READING_QUALITY,
            });
        }
        Ok(rows)
    }

    pub fn checklists(&mut self, pools: &Pools) -> SeedResult<Vec<ChecklistRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for _ in 0..self.min_rows {
            let cycle_phase_id = pools.cycle_phases.pick(&mut self.rng)?;
            let created_by = pools.users.pick(&mut self.rng)?;
            rows.push(ChecklistRow {
                cycle_phase_id,
                created_by,
                created_at: self.event_ts(),
                status: self.label(&CHECKLIST_STATUSES),
            });
        }
        Ok(rows)
    }

    /// Each item quotes a random earlier reading and flags whether it sits inside
    /// the valid range of that reading's sensor type.
    pub async fn checklist_items<L: SensorLookup>(
        &mut self,
        pools: &Pools,
        lookup: &mut L,
    ) -> SeedResult<Vec<ChecklistItemRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for _ in 0..self.min_rows {
            let checklist_id = pools.checklists.pick(&mut self.rng)?;
            let rule = self.label(&CHECKLIST_RULES);
            let reading_id = pools.readings.pick(&mut self.rng)?;

            let probe = lookup.reading_probe(reading_id).await?;
            let (low, high) = range_for_label(&probe.sensor_type);
            rows.push(ChecklistItemRow {
                checklist_id,
                rule,
                measured: format!("{:.2} {}", probe.value, probe.unit),
                ideal_range: format!("{:.1}-{:.1} {}", low, high, probe.unit),
                ok: in_range(probe.value, (low, high)),
                note: ITEM_NOTE,
            });
        }
        Ok(rows)
    }

    pub fn alerts(&mut self, pools: &Pools) -> SeedResult<Vec<AlertRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for _ in 0..self.min_rows {
            let source = if self.rng.random_bool(ALERT_FROM_READING_RATE) {
                AlertSource::Reading(pools.readings.pick(&mut self.rng)?)
            } else {
                AlertSource::Checklist(pools.checklists.pick(&mut self.rng)?)
            };
            let severity = self.label(&ALERT_SEVERITIES);
            let raised_at = self.event_ts();
            let resolution = if self.rng.random_bool(0.5) {
                Some(Resolution {
                    resolved_at: raised_at,
                    resolved_by: pools.users.pick(&mut self.rng)?,
                })
            } else {
                None
            };
            rows.push(AlertRow {
                source,
                message: ALERT_MESSAGE,
                severity,
                raised_at,
                resolution,
            });
        }
        Ok(rows)
    }

    pub fn adjustments(&mut self, pools: &Pools) -> SeedResult<Vec<AdjustmentRow>> {
        let mut rows = Vec::with_capacity(self.min_rows);
        for _ in 0..self.min_rows {
            let target = if self.rng.random_bool(ADJUSTMENT_FROM_ALERT_RATE) {
                AdjustmentTarget::Alert(pools.alerts.pick(&mut self.rng)?)
            } else {
                AdjustmentTarget::Checklist(pools.checklists.pick(&mut self.rng)?)
            };
            rows.push(AdjustmentRow {
                target,
                recommended: RECOMMENDED_ACTION,
                executed: self.label(&EXECUTED_ACTIONS),
                executed_at: self.event_ts(),
                executed_by: pools.users.pick(&mut self.rng)?,
            });
        }
        Ok(rows)
    }
}
