#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use std::collections::{HashMap, HashSet};

    use crate::config::SeedConfig;
    use crate::error::{SeedError, SeedResult};
    use crate::seed::catalog::{in_range, SensorKind, ALERT_TAG_CHECKLIST, ALERT_TAG_READING};
    use crate::seed::generate::{derived_max, user_email, zero_padded, RowGen};
    use crate::seed::pools::{IdPool, Pools, ReadingProbe, SensorLookup};
    use crate::seed::rows::*;

    /// Stands in for the database during point lookups. Identities are assigned
    /// sequentially from 1, the way an identity column would on an empty table.
    #[derive(Default)]
    struct FakeStore {
        sensors: HashMap<i64, SensorKind>,
        readings: HashMap<i64, (i64, f64)>,
    }

    impl SensorLookup for FakeStore {
        async fn sensor_kind(&mut self, sensor_id: i64) -> SeedResult<Option<SensorKind>> {
            self.sensors
                .get(&sensor_id)
                .copied()
                .map(Some)
                .ok_or(SeedError::Database(sqlx::Error::RowNotFound))
        }

        async fn reading_probe(&mut self, reading_id: i64) -> SeedResult<ReadingProbe> {
            let (sensor_id, value) = *self
                .readings
                .get(&reading_id)
                .ok_or(SeedError::Database(sqlx::Error::RowNotFound))?;
            let kind = self.sensors[&sensor_id];
            Ok(ReadingProbe {
                sensor_type: kind.label().to_string(),
                unit: kind.unit().to_string(),
                value,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Dataset {
        users: Vec<UserRow>,
        environments: Vec<EnvironmentRow>,
        crops: Vec<CropRow>,
        phases: Vec<PhaseRow>,
        ideal_parameters: Vec<IdealParameterRow>,
        cycles: Vec<CycleRow>,
        cycle_phases: Vec<CyclePhaseRow>,
        sensors: Vec<SensorRow>,
        readings: Vec<ReadingRow>,
        checklists: Vec<ChecklistRow>,
        checklist_items: Vec<ChecklistItemRow>,
        alerts: Vec<AlertRow>,
        adjustments: Vec<AdjustmentRow>,
        pools: Pools,
    }

    fn sequential(table: &'static str, n: usize) -> IdPool {
        IdPool::new(table, (1..=n as i64).collect())
    }

    async fn generate_all(cfg: &SeedConfig) -> Dataset {
        let mut gen = RowGen::new(StdRng::seed_from_u64(cfg.rng_seed), cfg);
        let mut pools = Pools::default();
        let mut store = FakeStore::default();

        let users = gen.users();
        let environments = gen.environments();
        let crops = gen.crops();
        let phases = gen.phases();
        pools.users = sequential("usuarios", users.len());
        pools.environments = sequential("ambientes", environments.len());
        pools.crops = sequential("culturas", crops.len());
        pools.phases = sequential("fases_cultivo", phases.len());

        let ideal_parameters = gen.ideal_parameters(&pools).unwrap();

        let cycles = gen.cycles(&pools).unwrap();
        pools.cycles = sequential("ciclos", cycles.len());

        let cycle_phases = gen.cycle_phases(&pools).unwrap();
        pools.cycle_phases = sequential("ciclo_fases", cycle_phases.len());

        let sensors = gen.sensors(&pools).unwrap();
        pools.sensors = sequential("sensores", sensors.len());
        for (i, s) in sensors.iter().enumerate() {
            store.sensors.insert(i as i64 + 1, s.kind);
        }

        let readings = gen.readings(&pools, &mut store).await.unwrap();
        pools.readings = sequential("leituras", readings.len());
        for (i, r) in readings.iter().enumerate() {
            store
                .readings
                .insert(i as i64 + 1, (r.sensor_id, r.value.to_f64().unwrap()));
        }

        let checklists = gen.checklists(&pools).unwrap();
        pools.checklists = sequential("checklists", checklists.len());

        let checklist_items = gen.checklist_items(&pools, &mut store).await.unwrap();

        let alerts = gen.alerts(&pools).unwrap();
        pools.alerts = sequential("alertas", alerts.len());

        let adjustments = gen.adjustments(&pools).unwrap();

        Dataset {
            users,
            environments,
            crops,
            phases,
            ideal_parameters,
            cycles,
            cycle_phases,
            sensors,
            readings,
            checklists,
            checklist_items,
            alerts,
            adjustments,
            pools,
        }
    }

    fn in_pool(pool: &IdPool, id: i64) -> bool {
        pool.ids().contains(&id)
    }

    #[tokio::test]
    async fn test_row_counts_meet_minimum() {
        let cfg = SeedConfig::default();
        let d = generate_all(&cfg).await;
        let n = cfg.min_rows;

        assert_eq!(d.users.len(), n);
        assert_eq!(d.environments.len(), n);
        assert_eq!(d.crops.len(), n);
        assert_eq!(d.phases.len(), n);
        assert_eq!(d.ideal_parameters.len(), n);
        assert_eq!(d.cycles.len(), n);
        assert!(d.cycle_phases.len() >= n);
        assert_eq!(d.sensors.len(), n);
        assert_eq!(d.readings.len(), n);
        assert_eq!(d.checklists.len(), n);
        assert_eq!(d.checklist_items.len(), n);
        assert_eq!(d.alerts.len(), n);
        assert_eq!(d.adjustments.len(), n);
    }

    #[tokio::test]
    async fn test_same_seed_regenerates_identical_rows() {
        let cfg = SeedConfig {
            min_rows: 120,
            ..SeedConfig::default()
        };
        let first = generate_all(&cfg).await;
        let second = generate_all(&cfg).await;
        assert_eq!(first, second);

        let other = generate_all(&SeedConfig {
            rng_seed: 43,
            ..cfg.clone()
        })
        .await;
        assert_ne!(first.readings, other.readings);
    }

    #[tokio::test]
    async fn test_unique_names_and_emails() {
        let d = generate_all(&SeedConfig::default()).await;

        let names: HashSet<_> = d.users.iter().map(|u| u.name.as_str()).collect();
        let emails: HashSet<_> = d.users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(names.len(), d.users.len());
        assert_eq!(emails.len(), d.users.len());

        let envs: HashSet<_> = d.environments.iter().map(|e| e.name.as_str()).collect();
        let crops: HashSet<_> = d.crops.iter().map(|c| c.name.as_str()).collect();
        let phases: HashSet<_> = d.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(envs.len(), d.environments.len());
        assert_eq!(crops.len(), d.crops.len());
        assert_eq!(phases.len(), d.phases.len());
    }

    #[tokio::test]
    async fn test_simple_tables_follow_their_vocabularies() {
        let d = generate_all(&SeedConfig::default()).await;

        for u in &d.users {
            assert!(u.role == "admin" || u.role == "operador");
            assert!(u.active);
        }
        for e in &d.environments {
            assert!(e.area_m2 >= Decimal::new(10, 0) && e.area_m2 <= Decimal::new(120, 0));
            assert_eq!(e.description, format!("Ambiente de cultivo {}", e.name));
        }
        for p in &d.phases {
            assert!((1..=10).contains(&p.order));
        }
        for s in &d.sensors {
            assert!(s.model.starts_with(s.kind.model()));
        }
    }

    #[tokio::test]
    async fn test_ideal_parameter_pairs_are_ordered() {
        let d = generate_all(&SeedConfig::default()).await;
        for p in &d.ideal_parameters {
            assert!(p.temp_min_c < p.temp_max_c, "{:?}", p);
            assert!(p.humidity_min_pct < p.humidity_max_pct, "{:?}", p);
            assert!(p.ec_min_ms < p.ec_max_ms, "{:?}", p);
            assert!(p.ph_min < p.ph_max, "{:?}", p);
            assert!(p.temp_max_c - p.temp_min_c >= Decimal::new(15, 1));
            assert!(p.humidity_max_pct - p.humidity_min_pct >= Decimal::new(5, 0));
            assert!(p.ec_max_ms - p.ec_min_ms >= Decimal::new(4, 1));
        }
        assert!(d.ideal_parameters.iter().any(|p| p.environment_id.is_none()));
        assert!(d.ideal_parameters.iter().any(|p| p.environment_id.is_some()));
    }

    #[tokio::test]
    async fn test_cycles_last_45_to_90_days() {
        let cfg = SeedConfig::default();
        let d = generate_all(&cfg).await;
        for c in &d.cycles {
            let length = c.ends_at - c.starts_at;
            assert!(length >= Duration::days(45) && length <= Duration::days(90));
            assert!(c.starts_at >= cfg.base_ts);
            assert!(["ativo", "concluido", "pausado"].contains(&c.status));
        }
    }

    #[tokio::test]
    async fn test_cycle_phase_windows() {
        let cfg = SeedConfig {
            min_rows: 50,
            paired_cycle_sample: 10,
            ..SeedConfig::default()
        };
        let d = generate_all(&cfg).await;
        assert_eq!(d.cycle_phases.len(), 50);

        // First 20 rows are ten sequential pairs on distinct cycles.
        let paired = &d.cycle_phases[..20];
        let mut seen = HashSet::new();
        for pair in paired.chunks(2) {
            assert_eq!(pair[0].cycle_id, pair[1].cycle_id);
            assert_eq!(pair[1].starts_at, pair[0].ends_at + Duration::days(1));
            assert!(seen.insert(pair[0].cycle_id));
        }
        for w in &d.cycle_phases {
            let length = w.ends_at - w.starts_at;
            assert!(length >= Duration::days(5) && length <= Duration::days(40));
        }
    }

    #[tokio::test]
    async fn test_paired_windows_can_exceed_minimum() {
        let cfg = SeedConfig {
            min_rows: 40,
            paired_cycle_sample: 300,
            ..SeedConfig::default()
        };
        let d = generate_all(&cfg).await;
        // All 40 cycles get a pair, no padding needed.
        assert_eq!(d.cycle_phases.len(), 80);
    }

    #[tokio::test]
    async fn test_readings_are_coherent_with_sensor_type() {
        let d = generate_all(&SeedConfig::default()).await;
        let mut anomalies = 0;
        for r in &d.readings {
            let kind = d.sensors[(r.sensor_id - 1) as usize].kind;
            let (low, high) = kind.valid_range();
            let v = r.value.to_f64().unwrap();
            if !in_range(v, (low, high)) {
                anomalies += 1;
                let distance = if v < low { low - v } else { v - high };
                assert!(distance >= 0.19 && distance <= 0.81, "{} for {:?}", v, kind);
            }
            assert_eq!(r.quality, "ok");
        }
        assert!(anomalies > 0);
        assert!(anomalies < d.readings.len() / 2);
    }

    #[tokio::test]
    async fn test_checklist_items_quote_their_reading() {
        let d = generate_all(&SeedConfig::default()).await;
        for item in &d.checklist_items {
            let unit = item.ideal_range.rsplit(' ').next().unwrap();
            assert!(item.measured.ends_with(unit));
            let measured: f64 = item.measured.split(' ').next().unwrap().parse().unwrap();
            let bounds: Vec<f64> = item
                .ideal_range
                .split(' ')
                .next()
                .unwrap()
                .split('-')
                .map(|b| b.parse().unwrap())
                .collect();
            // The quoted value is rounded to 2 dp; only check clear cases.
            if measured < bounds[0] - 0.01 || measured > bounds[1] + 0.01 {
                assert!(!item.ok, "{:?}", item);
            }
            if measured > bounds[0] + 0.01 && measured < bounds[1] - 0.01 {
                assert!(item.ok, "{:?}", item);
            }
            assert_eq!(item.note, "auto-gerado");
        }
    }

    #[tokio::test]
    async fn test_alerts_have_exactly_one_source() {
        let d = generate_all(&SeedConfig::default()).await;
        for a in &d.alerts {
            let (reading, checklist) = a.source.columns();
            assert!(reading.is_some() ^ checklist.is_some());
            match a.source {
                AlertSource::Reading(_) => assert_eq!(a.source.tag(), ALERT_TAG_READING),
                AlertSource::Checklist(_) => assert_eq!(a.source.tag(), ALERT_TAG_CHECKLIST),
            }
            if let Some(res) = a.resolution {
                assert_eq!(res.resolved_at, a.raised_at);
                assert!(in_pool(&d.pools.users, res.resolved_by));
            }
        }
        assert!(d.alerts.iter().any(|a| a.resolution.is_some()));
        assert!(d.alerts.iter().any(|a| a.resolution.is_none()));
    }

    #[tokio::test]
    async fn test_adjustments_have_exactly_one_target() {
        let d = generate_all(&SeedConfig::default()).await;
        let from_alerts = d
            .adjustments
            .iter()
            .filter(|a| matches!(a.target, AdjustmentTarget::Alert(_)))
            .count();
        for a in &d.adjustments {
            let (alert, checklist) = a.target.columns();
            assert!(alert.is_some() ^ checklist.is_some());
            assert!(in_pool(&d.pools.users, a.executed_by));
            assert!(a.executed == "Ajuste aplicado" || a.executed == "Pendente");
        }
        // Roughly 70/30; wide bounds keep this independent of the seed.
        assert!(from_alerts > d.adjustments.len() / 2);
        assert!(from_alerts < d.adjustments.len());
    }

    #[tokio::test]
    async fn test_foreign_keys_come_from_parent_pools() {
        let d = generate_all(&SeedConfig::default()).await;
        let p = &d.pools;

        for r in &d.ideal_parameters {
            assert!(in_pool(&p.phases, r.phase_id));
            assert!(in_pool(&p.crops, r.crop_id));
            assert!(r.environment_id.map_or(true, |id| in_pool(&p.environments, id)));
        }
        for r in &d.cycles {
            assert!(in_pool(&p.crops, r.crop_id));
            assert!(in_pool(&p.environments, r.environment_id));
        }
        for r in &d.cycle_phases {
            assert!(in_pool(&p.cycles, r.cycle_id));
            assert!(in_pool(&p.phases, r.phase_id));
        }
        for r in &d.sensors {
            assert!(in_pool(&p.environments, r.environment_id));
        }
        for r in &d.readings {
            assert!(in_pool(&p.sensors, r.sensor_id));
            assert!(r.cycle_phase_id.map_or(true, |id| in_pool(&p.cycle_phases, id)));
        }
        for r in &d.checklists {
            assert!(in_pool(&p.cycle_phases, r.cycle_phase_id));
            assert!(in_pool(&p.users, r.created_by));
        }
        for r in &d.checklist_items {
            assert!(in_pool(&p.checklists, r.checklist_id));
        }
        for r in &d.alerts {
            match r.source {
                AlertSource::Reading(id) => assert!(in_pool(&p.readings, id)),
                AlertSource::Checklist(id) => assert!(in_pool(&p.checklists, id)),
            }
        }
        for r in &d.adjustments {
            match r.target {
                AdjustmentTarget::Alert(id) => assert!(in_pool(&p.alerts, id)),
                AdjustmentTarget::Checklist(id) => assert!(in_pool(&p.checklists, id)),
            }
        }
    }

    #[test]
    fn test_dependent_generation_needs_parent_identities() {
        let cfg = SeedConfig {
            min_rows: 5,
            ..SeedConfig::default()
        };
        let mut gen = RowGen::new(StdRng::seed_from_u64(cfg.rng_seed), &cfg);
        let pools = Pools::default();
        assert!(matches!(gen.cycles(&pools), Err(SeedError::EmptyPool(_))));
        assert!(matches!(gen.cycle_phases(&pools), Err(SeedError::EmptyPool(_))));
    }

    #[test]
    fn test_string_helpers() {
        assert_eq!(zero_padded("Estufa", 7), "Estufa_0007");
        assert_eq!(zero_padded("DHT22", 1234), "DHT22_1234");
        assert_eq!(
            user_email("João Lima", 4, "@fiap.com.br"),
            "joão.lima.4@fiap.com.br"
        );
    }

    #[test]
    fn test_derived_max_keeps_margin() {
        let min = Decimal::new(2150, 2);
        assert_eq!(
            derived_max(min, Decimal::new(15, 1), Decimal::new(2200, 2)),
            Decimal::new(2300, 2)
        );
        assert_eq!(
            derived_max(min, Decimal::new(15, 1), Decimal::new(2700, 2)),
            Decimal::new(2700, 2)
        );
    }
}
