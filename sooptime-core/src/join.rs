//! Coordinate lookup and the schedule/coordinates join.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{CoordinateRecord, LookupTally, RawRow, SkipReason, SkipTally};

/// Facility name column, shared by both datasets.
pub const NAME_COLUMN: &str = "휴양림명";
/// Latitude column of the coordinates dataset.
pub const LATITUDE_COLUMN: &str = "위도";
/// Longitude column of the coordinates dataset.
pub const LONGITUDE_COLUMN: &str = "경도";
/// Category column of the schedule dataset.
pub const CATEGORY_COLUMN: &str = "구분";

/// Accepted home page columns, in order of preference.
pub const HOME_URL_COLUMNS: &[&str] = &["공식URL", "홈페이지"];
/// Accepted region columns, in order of preference.
pub const REGION_COLUMNS: &[&str] = &["권역", "지역"];
/// Accepted municipality columns.
pub const MUNICIPALITY_COLUMNS: &[&str] = &["지자체"];

/// Facility name to coordinate record, built once per coordinates dataset.
#[derive(Debug, Clone, Default)]
pub struct CoordinateLookup {
    records: HashMap<String, CoordinateRecord>,
    tally: LookupTally,
}

impl CoordinateLookup {
    /// Scan the coordinates dataset once.
    ///
    /// Rows without a name or without a finite latitude/longitude are
    /// dropped. When a name repeats, the last usable row wins.
    #[must_use]
    pub fn build(rows: &[RawRow]) -> Self {
        let mut lookup = Self::default();

        for row in rows {
            lookup.tally.rows += 1;

            let name = row.get(NAME_COLUMN);
            if name.is_empty() {
                lookup.tally.empty_name += 1;
                continue;
            }

            let Some(record) = coordinate_record(row) else {
                lookup.tally.invalid_position += 1;
                continue;
            };

            if lookup.records.insert(name.to_owned(), record).is_some() {
                lookup.tally.overwritten += 1;
            }
        }

        debug!(
            facilities = lookup.records.len(),
            tally = ?lookup.tally,
            "Built coordinate lookup"
        );
        lookup
    }

    /// Record for an exact, case-sensitive facility name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CoordinateRecord> {
        self.records.get(name)
    }

    /// Number of facilities with usable coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no facility has usable coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counters collected while building the lookup.
    #[must_use]
    pub fn tally(&self) -> LookupTally {
        self.tally
    }
}

/// A schedule row together with its coordinate record.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    /// Facility name, trimmed and non-empty.
    pub name: &'a str,
    /// Schedule row.
    pub row: &'a RawRow,
    /// Matching coordinate record.
    pub coordinates: &'a CoordinateRecord,
}

/// Join one schedule row to its coordinate record.
///
/// # Errors
///
/// Returns the [`SkipReason`] when the row has no name or no coordinate match.
pub fn join_row<'a>(
    row: &'a RawRow,
    lookup: &'a CoordinateLookup,
) -> Result<JoinedRow<'a>, SkipReason> {
    let name = row.get(NAME_COLUMN);
    if name.is_empty() {
        return Err(SkipReason::EmptyName);
    }
    let coordinates = lookup.get(name).ok_or(SkipReason::MissingCoordinates)?;
    Ok(JoinedRow {
        name,
        row,
        coordinates,
    })
}

/// Join every schedule row, counting the rows that could not be joined.
#[must_use]
pub fn join_schedules<'a>(
    schedules: &'a [RawRow],
    lookup: &'a CoordinateLookup,
) -> (Vec<JoinedRow<'a>>, SkipTally) {
    let mut tally = SkipTally::default();
    let joined = schedules
        .iter()
        .filter_map(|row| {
            join_row(row, lookup)
                .map_err(|reason| tally.record(reason))
                .ok()
        })
        .collect();
    (joined, tally)
}

fn coordinate_record(row: &RawRow) -> Option<CoordinateRecord> {
    let latitude = parse_degrees(row.get(LATITUDE_COLUMN))?;
    let longitude = parse_degrees(row.get(LONGITUDE_COLUMN))?;
    Some(CoordinateRecord {
        latitude,
        longitude,
        home_url: row.first_non_empty(HOME_URL_COLUMNS).to_owned(),
        region: row.first_non_empty(REGION_COLUMNS).to_owned(),
        municipality: row.first_non_empty(MUNICIPALITY_COLUMNS).to_owned(),
    })
}

/// Read the longest numeric prefix of a cell, so `37.5°` and `127.1 E` still
/// parse; only finite values are accepted.
fn parse_degrees(value: &str) -> Option<f64> {
    numeric_prefix(value.trim_start())
        .parse::<f64>()
        .ok()
        .filter(|degrees| degrees.is_finite())
}

/// Longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`, or `""`.
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes
            .get(start..)
            .map_or(0, |rest| rest.iter().take_while(|byte| byte.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer = digits_from(end);
    end += integer;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if integer > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }
    if integer == 0 && fraction == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_digits = digits_from(exponent);
        if exponent_digits > 0 {
            end = exponent + exponent_digits;
        }
    }

    text.get(..end).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells.iter().copied().collect()
    }

    fn coords(name: &str, lat: &str, lng: &str) -> RawRow {
        row(&[(NAME_COLUMN, name), (LATITUDE_COLUMN, lat), (LONGITUDE_COLUMN, lng)])
    }

    #[test]
    fn invalid_positions_are_not_indexed() {
        let lookup = CoordinateLookup::build(&[
            coords("A숲", "37.0", "127.0"),
            coords("B숲", "", "127.0"),
            coords("C숲", "north", "127.0"),
            coords("D숲", "37.0", "Infinity"),
            coords("", "37.0", "127.0"),
        ]);

        assert_eq!(lookup.len(), 1);
        assert!(lookup.get("A숲").is_some(), "valid row is indexed");
        assert!(lookup.get("B숲").is_none(), "missing latitude");
        assert!(lookup.get("C숲").is_none(), "non-numeric latitude");
        assert!(lookup.get("D숲").is_none(), "non-finite longitude");

        let tally = lookup.tally();
        assert_eq!(tally.rows, 5);
        assert_eq!(tally.invalid_position, 3);
        assert_eq!(tally.empty_name, 1);
    }

    #[test]
    fn numeric_prefix_is_accepted() {
        let lookup = CoordinateLookup::build(&[coords("A숲", " 37.25°", "127.5 E")]);
        let record = lookup.get("A숲").expect("record");
        assert!((record.latitude - 37.25).abs() < f64::EPSILON);
        assert!((record.longitude - 127.5).abs() < f64::EPSILON);
    }

    #[test]
    fn numeric_prefix_stops_at_the_first_non_number() {
        assert_eq!(numeric_prefix("37.25°N"), "37.25");
        assert_eq!(numeric_prefix("-33.5S"), "-33.5");
        assert_eq!(numeric_prefix("1.5e1km"), "1.5e1");
        assert_eq!(numeric_prefix("12e"), "12");
        assert_eq!(numeric_prefix("37."), "37.");
        assert_eq!(numeric_prefix(".5"), ".5");
        assert_eq!(numeric_prefix("."), "");
        assert_eq!(numeric_prefix("Infinity"), "");
    }

    #[test]
    fn long_trailing_text_is_scanned_once() {
        let latitude = format!("36.5{}", "°".repeat(50_000));
        let lookup = CoordinateLookup::build(&[coords("A숲", &latitude, "127.5 E")]);

        let record = lookup.get("A숲").expect("record");
        assert!((record.latitude - 36.5).abs() < f64::EPSILON);
    }

    #[test]
    fn last_duplicate_wins() {
        let lookup = CoordinateLookup::build(&[
            coords("A숲", "37.0", "127.0"),
            coords("A숲", "35.5", "128.5"),
        ]);

        let record = lookup.get("A숲").expect("record");
        assert!((record.latitude - 35.5).abs() < f64::EPSILON);
        assert_eq!(lookup.tally().overwritten, 1);
    }

    #[test]
    fn aliases_resolve_in_order() {
        let lookup = CoordinateLookup::build(&[
            row(&[
                (NAME_COLUMN, "A숲"),
                (LATITUDE_COLUMN, "37"),
                (LONGITUDE_COLUMN, "127"),
                ("공식URL", "https://official.example"),
                ("홈페이지", "https://home.example"),
                ("권역", ""),
                ("지역", "강원"),
                ("지자체", "평창군"),
            ]),
            row(&[
                (NAME_COLUMN, "B숲"),
                (LATITUDE_COLUMN, "36"),
                (LONGITUDE_COLUMN, "128"),
                ("홈페이지", "https://home.example"),
                ("권역", "영남권"),
                ("지역", "경북"),
            ]),
        ]);

        let first = lookup.get("A숲").expect("A");
        assert_eq!(first.home_url, "https://official.example");
        assert_eq!(first.region, "강원");
        assert_eq!(first.municipality, "평창군");

        let second = lookup.get("B숲").expect("B");
        assert_eq!(second.home_url, "https://home.example");
        assert_eq!(second.region, "영남권");
        assert_eq!(second.municipality, "");
    }

    #[test]
    fn unmatched_and_unnamed_rows_are_counted() {
        let lookup = CoordinateLookup::build(&[coords("A숲", "37.0", "127.0")]);
        let schedules = vec![
            row(&[(NAME_COLUMN, "A숲")]),
            row(&[(NAME_COLUMN, "a숲")]),
            row(&[(NAME_COLUMN, "  ")]),
            row(&[(NAME_COLUMN, "없는숲")]),
        ];

        let (joined, tally) = join_schedules(&schedules, &lookup);

        assert_eq!(joined.len(), 1);
        assert_eq!(joined.first().map(|pair| pair.name), Some("A숲"));
        assert_eq!(tally.empty_name, 1);
        assert_eq!(tally.missing_coordinates, 2, "matching is case-sensitive");
    }
}
