use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::Postgres;

use super::catalog::{SensorKind, ALERT_TAG_CHECKLIST, ALERT_TAG_READING};

/// Describes how a generated record maps onto its target table.
pub trait TableRow {
    const TABLE: &'static str;
    /// Surrogate key assigned by the database on insert.
    const ID_COLUMN: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Binds one value per entry of `COLUMNS`, in the same order.
    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>);
}

/// Boolean columns are CHAR(1) 'Y'/'N' in the schema.
pub fn yn(flag: bool) -> &'static str {
    if flag {
        "Y"
    } else {
        "N"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRow {
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub active: bool,
}

impl TableRow for UserRow {
    const TABLE: &'static str = "usuarios";
    const ID_COLUMN: &'static str = "id_usuario";
    const COLUMNS: &'static [&'static str] = &["nome", "email", "perfil", "ativo"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.role)
            .push_bind(yn(self.active));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentRow {
    pub name: String,
    pub description: String,
    pub area_m2: Decimal,
    pub active: bool,
}

impl TableRow for EnvironmentRow {
    const TABLE: &'static str = "ambientes";
    const ID_COLUMN: &'static str = "id_ambiente";
    const COLUMNS: &'static [&'static str] = &["nome", "descricao", "area_m2", "ativo"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.name.clone())
            .push_bind(self.description.clone())
            .push_bind(self.area_m2)
            .push_bind(yn(self.active));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRow {
    pub name: String,
    pub description: String,
}

impl TableRow for CropRow {
    const TABLE: &'static str = "culturas";
    const ID_COLUMN: &'static str = "id_cultura";
    const COLUMNS: &'static [&'static str] = &["nome", "descricao"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.name.clone())
            .push_bind(self.description.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRow {
    pub name: String,
    /// 1..=10, repeats across rows.
    pub order: i32,
}

impl TableRow for PhaseRow {
    const TABLE: &'static str = "fases_cultivo";
    const ID_COLUMN: &'static str = "id_fase";
    const COLUMNS: &'static [&'static str] = &["nome_fase", "ordem"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.name.clone()).push_bind(self.order);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealParameterRow {
    pub phase_id: i64,
    pub crop_id: i64,
    pub environment_id: Option<i64>,
    pub temp_min_c: Decimal,
    pub temp_max_c: Decimal,
    pub humidity_min_pct: Decimal,
    pub humidity_max_pct: Decimal,
    pub photoperiod_hours: Decimal,
    pub ec_min_ms: Decimal,
    pub ec_max_ms: Decimal,
    pub ph_min: Decimal,
    pub ph_max: Decimal,
}

impl TableRow for IdealParameterRow {
    const TABLE: &'static str = "parametros_ideais";
    const ID_COLUMN: &'static str = "id_parametro";
    const COLUMNS: &'static [&'static str] = &[
        "id_fase",
        "id_cultura",
        "id_ambiente",
        "temp_min_c",
        "temp_max_c",
        "umid_rel_min_pct",
        "umid_rel_max_pct",
        "fotoperiodo_horas",
        "ec_min_ms",
        "ec_max_ms",
        "ph_min",
        "ph_max",
    ];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.phase_id)
            .push_bind(self.crop_id)
            .push_bind(self.environment_id)
            .push_bind(self.temp_min_c)
            .push_bind(self.temp_max_c)
            .push_bind(self.humidity_min_pct)
            .push_bind(self.humidity_max_pct)
            .push_bind(self.photoperiod_hours)
            .push_bind(self.ec_min_ms)
            .push_bind(self.ec_max_ms)
            .push_bind(self.ph_min)
            .push_bind(self.ph_max);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRow {
    pub crop_id: i64,
    pub environment_id: i64,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub status: &'static str,
}

impl TableRow for CycleRow {
    const TABLE: &'static str = "ciclos";
    const ID_COLUMN: &'static str = "id_ciclo";
    const COLUMNS: &'static [&'static str] =
        &["id_cultura", "id_ambiente", "data_inicio", "data_fim", "status"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.crop_id)
            .push_bind(self.environment_id)
            .push_bind(self.starts_at)
            .push_bind(self.ends_at)
            .push_bind(self.status);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CyclePhaseRow {
    pub cycle_id: i64,
    pub phase_id: i64,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub note: &'static str,
}

impl TableRow for CyclePhaseRow {
    const TABLE: &'static str = "ciclo_fases";
    const ID_COLUMN: &'static str = "id_ciclo_fase";
    const COLUMNS: &'static [&'static str] =
        &["id_ciclo", "id_fase", "data_inicio", "data_fim", "observacao"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.cycle_id)
            .push_bind(self.phase_id)
            .push_bind(self.starts_at)
            .push_bind(self.ends_at)
            .push_bind(self.note);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRow {
    pub environment_id: i64,
    pub kind: SensorKind,
    pub model: String,
}

impl TableRow for SensorRow {
    const TABLE: &'static str = "sensores";
    const ID_COLUMN: &'static str = "id_sensor";
    const COLUMNS: &'static [&'static str] = &["id_ambiente", "tipo", "modelo", "unidade"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.environment_id)
            .push_bind(self.kind.label())
            .push_bind(self.model.clone())
            .push_bind(self.kind.unit());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRow {
    pub sensor_id: i64,
    pub cycle_phase_id: Option<i64>,
    pub read_at: NaiveDateTime,
    pub value: Decimal,
    pub quality: &'static str,
}

impl TableRow for ReadingRow {
    const TABLE: &'static str = "leituras";
    const ID_COLUMN: &'static str = "id_leitura";
    const COLUMNS: &'static [&'static str] =
        &["id_sensor", "id_ciclo_fase", "ts_leitura", "valor_num", "qualidade"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.sensor_id)
            .push_bind(self.cycle_phase_id)
            .push_bind(self.read_at)
            .push_bind(self.value)
            .push_bind(self.quality);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistRow {
    pub cycle_phase_id: i64,
    pub created_by: i64,
    pub created_at: NaiveDateTime,
    pub status: &'static str,
}

impl TableRow for ChecklistRow {
    const TABLE: &'static str = "checklists";
    const ID_COLUMN: &'static str = "id_checklist";
    const COLUMNS: &'static [&'static str] =
        &["id_ciclo_fase", "criado_por", "ts_criacao", "status"];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.cycle_phase_id)
            .push_bind(self.created_by)
            .push_bind(self.created_at)
            .push_bind(self.status);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItemRow {
    pub checklist_id: i64,
    pub rule: &'static str,
    pub measured: String,
    pub ideal_range: String,
    pub ok: bool,
    pub note: &'static str,
}

impl TableRow for ChecklistItemRow {
    const TABLE: &'static str = "checklist_itens";
    const ID_COLUMN: &'static str = "id_item";
    const COLUMNS: &'static [&'static str] = &[
        "id_checklist",
        "regra",
        "valor_medido",
        "faixa_ideal",
        "ok",
        "observacao",
    ];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        b.push_bind(self.checklist_id)
            .push_bind(self.rule)
            .push_bind(self.measured.clone())
            .push_bind(self.ideal_range.clone())
            .push_bind(yn(self.ok))
            .push_bind(self.note);
    }
}

/// What raised an alert. Exactly one origin per alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertSource {
    Reading(i64),
    Checklist(i64),
}

impl AlertSource {
    /// `(id_leitura, id_checklist)`
    pub fn columns(self) -> (Option<i64>, Option<i64>) {
        match self {
            AlertSource::Reading(id) => (Some(id), None),
            AlertSource::Checklist(id) => (None, Some(id)),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            AlertSource::Reading(_) => ALERT_TAG_READING,
            AlertSource::Checklist(_) => ALERT_TAG_CHECKLIST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub resolved_at: NaiveDateTime,
    pub resolved_by: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub source: AlertSource,
    pub message: &'static str,
    pub severity: &'static str,
    pub raised_at: NaiveDateTime,
    pub resolution: Option<Resolution>,
}

impl TableRow for AlertRow {
    const TABLE: &'static str = "alertas";
    const ID_COLUMN: &'static str = "id_alerta";
    const COLUMNS: &'static [&'static str] = &[
        "id_leitura",
        "id_checklist",
        "tipo",
        "mensagem",
        "severidade",
        "ts_alerta",
        "resolvido",
        "ts_resolucao",
        "resolvido_por",
    ];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        let (reading_id, checklist_id) = self.source.columns();
        b.push_bind(reading_id)
            .push_bind(checklist_id)
            .push_bind(self.source.tag())
            .push_bind(self.message)
            .push_bind(self.severity)
            .push_bind(self.raised_at)
            .push_bind(yn(self.resolution.is_some()))
            .push_bind(self.resolution.map(|r| r.resolved_at))
            .push_bind(self.resolution.map(|r| r.resolved_by));
    }
}

/// What an adjustment responds to. Exactly one target per adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdjustmentTarget {
    Alert(i64),
    Checklist(i64),
}

impl AdjustmentTarget {
    /// `(id_alerta, id_checklist)`
    pub fn columns(self) -> (Option<i64>, Option<i64>) {
        match self {
            AdjustmentTarget::Alert(id) => (Some(id), None),
            AdjustmentTarget::Checklist(id) => (None, Some(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentRow {
    pub target: AdjustmentTarget,
    pub recommended: &'static str,
    pub executed: &'static str,
    pub executed_at: NaiveDateTime,
    pub executed_by: i64,
}

impl TableRow for AdjustmentRow {
    const TABLE: &'static str = "ajustes";
    const ID_COLUMN: &'static str = "id_ajuste";
    const COLUMNS: &'static [&'static str] = &[
        "id_alerta",
        "id_checklist",
        "acao_recomendada",
        "acao_executada",
        "ts_execucao",
        "executado_por",
    ];

    fn push_binds<'args>(&self, b: &mut Separated<'_, 'args, Postgres, &'static str>) {
        let (alert_id, checklist_id) = self.target.columns();
        b.push_bind(alert_id)
            .push_bind(checklist_id)
            .push_bind(self.recommended)
            .push_bind(self.executed)
            .push_bind(self.executed_at)
            .push_bind(self.executed_by);
    }
}
