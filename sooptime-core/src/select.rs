//! Month-keyed opening selection for joined schedule rows.

use crate::join::{CATEGORY_COLUMN, JoinedRow};
use crate::model::{MonthFilter, OpeningTimestamp, RawRow, ScheduleEntry, SkipReason};
use crate::timestamp::parse_openings;

/// Schedule-side region column used when the coordinates dataset has none.
pub const SCHEDULE_REGION_COLUMN: &str = "지역";
/// Schedule-side municipality column used when the coordinates dataset has none.
pub const SCHEDULE_MUNICIPALITY_COLUMN: &str = "지자체";

/// Column holding the openings of `month` (`1..=12`).
#[must_use]
pub fn month_column(month: u32) -> String {
    format!("{month}월 일반예약 오픈일시(복수)")
}

/// Openings of a schedule row under the month filter.
///
/// With [`MonthFilter::All`] the twelve month columns are concatenated in
/// calendar order without deduplication. The result is not sorted.
#[must_use]
pub fn select_openings(row: &RawRow, filter: MonthFilter) -> Vec<OpeningTimestamp> {
    match filter {
        MonthFilter::All => (1..=12)
            .flat_map(|month| parse_openings(row.get(&month_column(month))))
            .collect(),
        MonthFilter::Month(month) => parse_openings(row.get(&month_column(month))),
    }
}

/// Build the schedule entry of a joined row for the active month filter.
///
/// # Errors
///
/// Returns [`SkipReason::NoOpenings`] when the filter selects no valid opening.
pub fn select_entry(joined: &JoinedRow<'_>, filter: MonthFilter) -> Result<ScheduleEntry, SkipReason> {
    let openings = select_openings(joined.row, filter);
    if openings.is_empty() {
        return Err(SkipReason::NoOpenings);
    }

    let coordinates = joined.coordinates.clone();
    let region = fallback(&coordinates.region, joined.row.get(SCHEDULE_REGION_COLUMN));
    let municipality = fallback(
        &coordinates.municipality,
        joined.row.get(SCHEDULE_MUNICIPALITY_COLUMN),
    );

    Ok(ScheduleEntry {
        name: joined.name.to_owned(),
        category: joined.row.get(CATEGORY_COLUMN).to_owned(),
        region,
        municipality,
        coordinates,
        openings,
    })
}

fn fallback(primary: &str, secondary: &str) -> String {
    if primary.is_empty() {
        secondary.to_owned()
    } else {
        primary.to_owned()
    }
}
