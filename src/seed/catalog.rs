//! Fixed vocabularies of the cultivation data set.

use serde::Serialize;

pub const USER_NAMES: [&str; 15] = [
    "Thomaz Requena",
    "Ana Silva",
    "Carlos Pereira",
    "Marina Souza",
    "João Lima",
    "Beatriz Nunes",
    "Luiz Santos",
    "Paula Castro",
    "Ricardo Alves",
    "Fernanda Dias",
    "Pedro Rocha",
    "Camila Prado",
    "Hugo Neri",
    "Julia Matos",
    "Rafael Souza",
];

pub const EMAIL_DOMAINS: [&str; 3] = [
    "@venezacomercio.com.br",
    "@aluminionacional.com.br",
    "@fiap.com.br",
];

pub const USER_ROLES: [&str; 2] = ["admin", "operador"];

pub const CROP_NAMES: [&str; 12] = [
    "Alface",
    "Tomate",
    "Manjericão",
    "Pimenta",
    "Cacau",
    "Soja",
    "Arroz",
    "Milho",
    "Trigo",
    "Café",
    "Cacau",
    "Cânhamo",
];

pub const PHASE_NAMES: [&str; 6] = [
    "Germinação",
    "Vegetativo",
    "Floração",
    "Colheita",
    "Secagem",
    "Cura",
];

pub const CYCLE_STATUSES: [&str; 3] = ["ativo", "concluido", "pausado"];
pub const CHECKLIST_STATUSES: [&str; 3] = ["aberto", "aprovado", "reprovado"];
pub const ALERT_SEVERITIES: [&str; 4] = ["baixa", "media", "alta", "critica"];
pub const EXECUTED_ACTIONS: [&str; 2] = ["Ajuste aplicado", "Pendente"];

pub const CHECKLIST_RULES: [&str; 5] = [
    "temperatura dentro do ideal",
    "umidade dentro do ideal",
    "EC dentro do ideal",
    "pH dentro do ideal",
    "luz suficiente",
];

pub const PHASE_NOTE: &str = "fase sintética";
pub const READING_QUALITY: &str = "ok";
pub const ITEM_NOTE: &str = "auto-gerado";
pub const ALERT_MESSAGE: &str = "evento gerado sintético";
pub const RECOMMENDED_ACTION: &str = "Ajustar parâmetro para dentro da faixa";

pub const ALERT_TAG_READING: &str = "sensor_fora_faixa";
pub const ALERT_TAG_CHECKLIST: &str = "checklist_reprovado";

/// Range used when a sensor row carries a type outside the catalogue.
pub const FALLBACK_RANGE: (f64, f64) = (0.0, 100.0);

/// Sensor types known to the monitoring schema. Each type has a fixed model, unit
/// and valid measurement range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Light,
    Ec,
    Ph,
}

impl SensorKind {
    pub const ALL: [SensorKind; 5] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Light,
        SensorKind::Ec,
        SensorKind::Ph,
    ];

    /// Value stored in `sensores.tipo`.
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperatura",
            SensorKind::Humidity => "umidade",
            SensorKind::Light => "luz",
            SensorKind::Ec => "EC",
            SensorKind::Ph => "pH",
        }
    }

    pub fn model(self) -> &'static str {
        match self {
            SensorKind::Temperature | SensorKind::Humidity => "DHT22",
            SensorKind::Light => "BH1750",
            SensorKind::Ec => "AtlasEC",
            SensorKind::Ph => "AtlasPH",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Temperature => "C",
            SensorKind::Humidity => "%",
            SensorKind::Light => "lux",
            SensorKind::Ec => "mS",
            SensorKind::Ph => "pH",
        }
    }

    pub fn valid_range(self) -> (f64, f64) {
        match self {
            SensorKind::Temperature => (20.0, 26.0),
            SensorKind::Humidity => (50.0, 70.0),
            SensorKind::Light => (10000.0, 25000.0),
            SensorKind::Ec => (1.4, 2.4),
            SensorKind::Ph => (5.6, 6.2),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }
}

/// Valid range for a raw `sensores.tipo` value, falling back for unknown types.
pub fn range_for_label(label: &str) -> (f64, f64) {
    SensorKind::from_label(label)
        .map(SensorKind::valid_range)
        .unwrap_or(FALLBACK_RANGE)
}

pub fn in_range(value: f64, (low, high): (f64, f64)) -> bool {
    low <= value && value <= high
}
