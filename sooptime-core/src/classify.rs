//! Representative opening selection and past/today/upcoming classification.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::model::{ClassifiedRecord, FilterState, OpeningTimestamp, ScheduleEntry, SkipReason, Status};

/// Classify an opening against a civil reference date.
///
/// Comparison happens on the opening's calendar date in the schedule
/// timezone, so any time on the reference day is `Today`. A missing
/// opening is `Past`.
#[must_use]
pub fn classify_status(representative: Option<&OpeningTimestamp>, reference: NaiveDate) -> Status {
    let Some(opening) = representative else {
        return Status::Past;
    };
    match opening.date_naive().cmp(&reference) {
        Ordering::Equal => Status::Today,
        Ordering::Greater => Status::Upcoming,
        Ordering::Less => Status::Past,
    }
}

/// Pick the opening that represents a facility.
///
/// Without today-only this is the earliest opening. With today-only it is
/// the first opening, in selection order, that falls on the reference date.
#[must_use]
pub fn pick_representative(
    openings: &[OpeningTimestamp],
    reference: NaiveDate,
    today_only: bool,
) -> Option<OpeningTimestamp> {
    if today_only {
        openings
            .iter()
            .find(|opening| opening.date_naive() == reference)
            .copied()
    } else {
        openings.iter().min().copied()
    }
}

/// Classify a schedule entry under the active filters.
///
/// The returned record carries its openings sorted ascending; the sort is
/// stable, so equal instants keep their selection order.
///
/// # Errors
///
/// Returns [`SkipReason::NotToday`] when today-only is active and no opening
/// falls on the reference date, and [`SkipReason::NoOpenings`] for an entry
/// without openings.
pub fn classify_entry(
    mut entry: ScheduleEntry,
    filter: &FilterState,
) -> Result<ClassifiedRecord, SkipReason> {
    let representative = pick_representative(&entry.openings, filter.reference, filter.today_only)
        .ok_or(if filter.today_only {
            SkipReason::NotToday
        } else {
            SkipReason::NoOpenings
        })?;

    let status = classify_status(Some(&representative), filter.reference);
    entry.openings.sort();

    Ok(ClassifiedRecord {
        entry,
        representative,
        status,
    })
}
