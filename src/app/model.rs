use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::snapshot::ReloadReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionsResponse {
    #[serde(rename = "ies_disponiveis")]
    pub institutions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub status: String,
    #[serde(rename = "arquivo")]
    pub workbook: String,
    #[serde(rename = "ies_carregadas")]
    pub institutions: Vec<String>,
    #[serde(rename = "aulas_carregadas")]
    pub lessons: usize,
    #[serde(rename = "carregado_em")]
    pub loaded_at: DateTime<Utc>,
}

impl From<ReloadReport> for ReloadResponse {
    fn from(report: ReloadReport) -> Self {
        Self {
            status: "dados_recarregados".to_owned(),
            workbook: report.workbook.display().to_string(),
            institutions: report.institutions,
            lessons: report.lessons,
            loaded_at: report.loaded_at,
        }
    }
}

/// `?format=html` switches a content route to its HTML rendering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    pub format: Option<String>,
}

impl ViewQuery {
    pub fn wants_html(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.trim().eq_ignore_ascii_case("html"))
    }
}
