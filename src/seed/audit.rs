//! Post-run checks over the whole schema: row counts, dangling foreign keys and the
//! per-row rules the generators are supposed to uphold.

use serde::Serialize;
use sqlx::PgConnection;

use crate::db::SCHEMA_TABLES;
use crate::error::SeedResult;

/// `(child table, fk column, parent table, parent key)`
pub const FOREIGN_KEYS: [(&str, &str, &str, &str); 19] = [
    ("parametros_ideais", "id_fase", "fases_cultivo", "id_fase"),
    ("parametros_ideais", "id_cultura", "culturas", "id_cultura"),
    ("parametros_ideais", "id_ambiente", "ambientes", "id_ambiente"),
    ("ciclos", "id_cultura", "culturas", "id_cultura"),
    ("ciclos", "id_ambiente", "ambientes", "id_ambiente"),
    ("ciclo_fases", "id_ciclo", "ciclos", "id_ciclo"),
    ("ciclo_fases", "id_fase", "fases_cultivo", "id_fase"),
    ("sensores", "id_ambiente", "ambientes", "id_ambiente"),
    ("leituras", "id_sensor", "sensores", "id_sensor"),
    ("leituras", "id_ciclo_fase", "ciclo_fases", "id_ciclo_fase"),
    ("checklists", "id_ciclo_fase", "ciclo_fases", "id_ciclo_fase"),
    ("checklists", "criado_por", "usuarios", "id_usuario"),
    ("checklist_itens", "id_checklist", "checklists", "id_checklist"),
    ("alertas", "id_leitura", "leituras", "id_leitura"),
    ("alertas", "id_checklist", "checklists", "id_checklist"),
    ("alertas", "resolvido_por", "usuarios", "id_usuario"),
    ("ajustes", "id_alerta", "alertas", "id_alerta"),
    ("ajustes", "id_checklist", "checklists", "id_checklist"),
    ("ajustes", "executado_por", "usuarios", "id_usuario"),
];

/// `(check name, predicate matching offending rows, table)`
const ROW_RULES: [(&str, &str, &str); 8] = [
    (
        "ideal_parameter_min_below_max",
        "temp_min_c >= temp_max_c OR umid_rel_min_pct >= umid_rel_max_pct \
         OR ec_min_ms >= ec_max_ms OR ph_min >= ph_max",
        "parametros_ideais",
    ),
    (
        "cycle_length_45_to_90_days",
        "data_fim <= data_inicio \
         OR data_fim - data_inicio NOT BETWEEN INTERVAL '45 days' AND INTERVAL '90 days'",
        "ciclos",
    ),
    (
        "alert_single_source",
        "(id_leitura IS NULL) = (id_checklist IS NULL)",
        "alertas",
    ),
    (
        "alert_tag_matches_source",
        "(id_leitura IS NOT NULL AND tipo <> 'sensor_fora_faixa') \
         OR (id_checklist IS NOT NULL AND tipo <> 'checklist_reprovado')",
        "alertas",
    ),
    (
        "alert_resolution_complete",
        "NOT ((resolvido = 'Y' AND ts_resolucao IS NOT NULL AND resolvido_por IS NOT NULL) \
         OR (resolvido = 'N' AND ts_resolucao IS NULL AND resolvido_por IS NULL))",
        "alertas",
    ),
    (
        "adjustment_single_target",
        "(id_alerta IS NULL) = (id_checklist IS NULL)",
        "ajustes",
    ),
    (
        "adjustment_has_executor",
        "executado_por IS NULL",
        "ajustes",
    ),
    (
        "reading_quality_ok",
        "qualidade IS DISTINCT FROM 'ok'",
        "leituras",
    ),
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Violation {
    pub check: String,
    pub rows: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub row_counts: Vec<TableCount>,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn rows_in(&self, table: &str) -> Option<i64> {
        self.row_counts
            .iter()
            .find(|c| c.table == table)
            .map(|c| c.rows)
    }
}

pub fn orphan_sql(child: &str, column: &str, parent: &str, key: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {child} c WHERE c.{column} IS NOT NULL \
         AND NOT EXISTS (SELECT 1 FROM {parent} p WHERE p.{key} = c.{column})"
    )
}

async fn count(conn: &mut PgConnection, sql: &str) -> SeedResult<i64> {
    Ok(sqlx::query_scalar(sql).fetch_one(&mut *conn).await?)
}

pub async fn run(conn: &mut PgConnection) -> SeedResult<AuditReport> {
    let mut report = AuditReport::default();

    for table in SCHEMA_TABLES {
        let rows = count(conn, &format!("SELECT COUNT(*) FROM {}", table)).await?;
        report.row_counts.push(TableCount { table, rows });
    }

    for (child, column, parent, key) in FOREIGN_KEYS {
        let rows = count(conn, &orphan_sql(child, column, parent, key)).await?;
        if rows > 0 {
            tracing::warn!("{}.{}: {} rows without a parent in {}", child, column, rows, parent);
            report.violations.push(Violation {
                check: format!("fk_{}_{}", child, column),
                rows,
            });
        }
    }

    for (check, predicate, table) in ROW_RULES {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table, predicate);
        let rows = count(conn, &sql).await?;
        if rows > 0 {
            tracing::warn!("{}: {} offending rows in {}", check, rows, table);
            report.violations.push(Violation {
                check: check.to_string(),
                rows,
            });
        }
    }

    Ok(report)
}
