use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Query string of `GET /efficiency/buildings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildingsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}
