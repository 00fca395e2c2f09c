use std::cmp::Ordering;

use crate::{
    domain::{AllBuildingsSummary, BuildingEfficiencySummary},
    validation::{validate_page, ValidationError},
};

use super::rollup::recency;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Case-insensitive substring match on a building id. A missing or blank
/// term matches everything.
pub fn matches_search(building_id: &str, search: Option<&str>) -> bool {
    match search.map(str::trim) {
        None | Some("") => true,
        Some(term) => building_id.to_lowercase().contains(&term.to_lowercase()),
    }
}

fn listing_order(a: &BuildingEfficiencySummary, b: &BuildingEfficiencySummary) -> Ordering {
    recency(&b.latest_calculation, &a.latest_calculation).then_with(|| a.building_id.cmp(&b.building_id))
}

/// Filters, orders and pages building rollups.
///
/// Buildings are listed by most recent activity. Pages are 1-indexed; a
/// filter with no matches yields an empty page with `total_pages == 0`.
pub fn paginate(
    mut buildings: Vec<BuildingEfficiencySummary>,
    page: u32,
    limit: u32,
    search: Option<&str>,
) -> Result<AllBuildingsSummary, ValidationError> {
    validate_page(page, limit)?;

    buildings.retain(|b| matches_search(&b.building_id, search));
    buildings.sort_by(listing_order);

    let total_buildings = buildings.len();
    let total_pages = total_buildings.div_ceil(limit as usize) as u32;

    let start = (page as usize - 1).saturating_mul(limit as usize);
    let page_items: Vec<_> = buildings.into_iter().skip(start).take(limit as usize).collect();

    Ok(AllBuildingsSummary {
        buildings: page_items,
        total_buildings,
        page,
        limit,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{EfficiencyCalculation, EfficiencySummary, PerformanceGrade},
        engine::aggregate_building,
    };
    use time::{macros::datetime, Duration};

    fn building(id: &str, day: i64) -> BuildingEfficiencySummary {
        let ts = datetime!(2024-01-01 00:00:00 UTC) + Duration::days(day);
        let calc = EfficiencyCalculation {
            id: format!("{id}-calc"),
            building_id: id.to_string(),
            measure_name: "Lighting".to_string(),
            calculation_timestamp: ts,
            periods: vec![],
            summary: EfficiencySummary {
                total_electric_savings_kwh: 10.0,
                total_gas_savings_therms: 0.0,
                total_electric_cost_savings: 1.0,
                total_gas_cost_savings: 0.0,
                total_cost_savings: 1.0,
                average_electric_efficiency_improvement: 5.0,
                average_gas_efficiency_improvement: 0.0,
                overall_efficiency_improvement: 5.0,
                performance_grade: PerformanceGrade::C,
            },
            created_at: ts,
        };
        aggregate_building(id, &[calc]).unwrap()
    }

    fn fleet() -> Vec<BuildingEfficiencySummary> {
        (0..25).map(|i| building(&format!("BLDG-{i:02}"), i)).collect()
    }

    #[test]
    fn pages_are_sliced_newest_first() {
        let first = paginate(fleet(), 1, 10, None).unwrap();
        assert_eq!(first.total_buildings, 25);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.buildings.len(), 10);
        assert_eq!(first.buildings[0].building_id, "BLDG-24");
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = paginate(fleet(), 3, 10, None).unwrap();
        assert_eq!(last.buildings.len(), 5);
        assert_eq!(last.buildings[4].building_id, "BLDG-00");
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = paginate(fleet(), 9, 10, None).unwrap();
        assert!(page.buildings.is_empty());
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let page = paginate(fleet(), 1, 10, Some("bldg-1")).unwrap();
        assert_eq!(page.total_buildings, 10);
        assert!(page.buildings.iter().all(|b| b.building_id.starts_with("BLDG-1")));
    }

    #[test]
    fn no_match_is_an_empty_success() {
        let page = paginate(fleet(), 1, 10, Some("zzz-no-match")).unwrap();
        assert!(page.buildings.is_empty());
        assert_eq!(page.total_buildings, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn blank_search_matches_everything() {
        assert!(matches_search("BLDG-1", Some("  ")));
        assert!(matches_search("BLDG-1", None));
        assert!(!matches_search("BLDG-1", Some("annex")));
    }

    #[test]
    fn invalid_page_is_rejected() {
        assert_eq!(paginate(fleet(), 0, 10, None), Err(ValidationError::InvalidPage));
        assert_eq!(paginate(fleet(), 1, 0, None), Err(ValidationError::InvalidLimit(0)));
    }
}
