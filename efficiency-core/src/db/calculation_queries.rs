use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;

use crate::domain::{EfficiencyCalculation, EfficiencySummary, PeriodMetrics};

/// DDL for the append-only calculation log. Periods and summaries are stored
/// as JSONB exactly as computed; nothing is ever updated in place.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS efficiency_calculations (
    id                    TEXT PRIMARY KEY,
    building_id           TEXT        NOT NULL,
    measure_name          TEXT        NOT NULL,
    calculation_timestamp TIMESTAMPTZ NOT NULL,
    periods               JSONB       NOT NULL,
    summary               JSONB       NOT NULL,
    created_at            TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS efficiency_calculations_building_ts
    ON efficiency_calculations (building_id, calculation_timestamp DESC);
"#;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CalculationRow {
    pub id: String,
    pub building_id: String,
    pub measure_name: String,
    pub calculation_timestamp: OffsetDateTime,
    pub periods: Json<Vec<PeriodMetrics>>,
    pub summary: Json<EfficiencySummary>,
    pub created_at: OffsetDateTime,
}

impl From<CalculationRow> for EfficiencyCalculation {
    fn from(r: CalculationRow) -> Self {
        EfficiencyCalculation {
            id: r.id,
            building_id: r.building_id,
            measure_name: r.measure_name,
            calculation_timestamp: r.calculation_timestamp,
            periods: r.periods.0,
            summary: r.summary.0,
            created_at: r.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        building_id,
        measure_name,
        calculation_timestamp,
        periods,
        summary,
        created_at
    FROM efficiency_calculations
"#;

/// Escapes `%`, `_` and `\` so a search term matches literally inside ILIKE.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await.map(|_| ())
}

/// Appends a calculation. Returns `false` when a calculation with the same id
/// is already stored.
pub async fn insert_calculation(pool: &PgPool, calc: &EfficiencyCalculation) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO efficiency_calculations
            (id, building_id, measure_name, calculation_timestamp, periods, summary, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&calc.id)
    .bind(&calc.building_id)
    .bind(&calc.measure_name)
    .bind(calc.calculation_timestamp)
    .bind(Json(&calc.periods))
    .bind(Json(&calc.summary))
    .bind(calc.created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn calculation_by_id(pool: &PgPool, id: &str) -> Result<Option<EfficiencyCalculation>, sqlx::Error> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
    let row = sqlx::query_as::<_, CalculationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Into::into))
}

/// A building's full log, newest first.
pub async fn building_log(pool: &PgPool, building_id: &str) -> Result<Vec<EfficiencyCalculation>, sqlx::Error> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE building_id = $1 \
         ORDER BY calculation_timestamp DESC, created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, CalculationRow>(&sql)
        .bind(building_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Calculations of a building that include a period with the given label,
/// newest first.
pub async fn building_log_for_period(
    pool: &PgPool,
    building_id: &str,
    period: &str,
) -> Result<Vec<EfficiencyCalculation>, sqlx::Error> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE building_id = $1 \
           AND periods @> jsonb_build_array(jsonb_build_object('period', $2::text)) \
         ORDER BY calculation_timestamp DESC, created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, CalculationRow>(&sql)
        .bind(building_id)
        .bind(period)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Every calculation whose building id contains `search` (case-insensitive),
/// grouped by building. With no search term the whole log is returned.
pub async fn calculations_matching(
    pool: &PgPool,
    search: Option<&str>,
) -> Result<Vec<EfficiencyCalculation>, sqlx::Error> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);

    let sql = format!(
        "{SELECT_COLUMNS} WHERE $1::text IS NULL OR building_id ILIKE $1 \
         ORDER BY building_id, calculation_timestamp DESC, created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, CalculationRow>(&sql)
        .bind(pattern)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("bldg"), "%bldg%");
        assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }
}
