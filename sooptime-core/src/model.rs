//! Domain data structures for facilities, openings, filters, and classified records.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Civil timezone every opening timestamp is anchored to.
pub const SCHEDULE_TZ: Tz = chrono_tz::Asia::Seoul;

/// Format used to parse and display opening timestamps.
pub const OPENING_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format used to parse and display reference dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A reservation window start, always expressed in [`SCHEDULE_TZ`].
pub type OpeningTimestamp = DateTime<Tz>;

/// Kinds of dataset sources known to sooptime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// CSV file on the local filesystem.
    File,
    /// CSV document served over HTTP(S).
    Http,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            SourceKind::File => "file",
            SourceKind::Http => "http",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a dataset source.
pub struct SourceMeta {
    /// Kind of location this source can read.
    pub kind: SourceKind,
    /// Human-friendly name.
    pub name: String,
}

/// One row of a tabular dataset, keyed by column name.
///
/// Keys and values are stored with non-breaking spaces replaced by regular
/// spaces and surrounding whitespace trimmed. Columns that are missing from
/// the row read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cell, normalizing both the column name and the value.
    pub fn insert(&mut self, column: &str, value: &str) {
        self.cells.insert(normalize_cell(column), normalize_cell(value));
    }

    /// Value of a column, or `""` when the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map_or("", String::as_str)
    }

    /// First non-empty value among the given column aliases, or `""`.
    #[must_use]
    pub fn first_non_empty(&self, columns: &[&str]) -> &str {
        columns
            .iter()
            .map(|column| self.get(column))
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }

    /// Number of stored columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row holds no columns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.insert(column.as_ref(), value.as_ref());
        }
        row
    }
}

/// Replace U+00A0 with a plain space and trim surrounding whitespace.
#[must_use]
pub fn normalize_cell(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Position and metadata of a facility taken from the coordinates dataset.
pub struct CoordinateRecord {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Official home page, empty when unknown.
    pub home_url: String,
    /// Region the facility belongs to, possibly empty.
    pub region: String,
    /// Municipality operating the facility, possibly empty.
    pub municipality: String,
}

/// Colour-coded state of a facility's representative opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Opening lies before the reference date.
    Past,
    /// Opening falls on the reference date.
    Today,
    /// Opening lies after the reference date.
    Upcoming,
}

impl fmt::Display for Status {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Status::Past => "past",
            Status::Today => "today",
            Status::Upcoming => "upcoming",
        };
        write!(formatter, "{slug}")
    }
}

/// Which month columns contribute openings to a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MonthFilter {
    /// All twelve months, concatenated in calendar order.
    #[default]
    All,
    /// A single month, `1..=12`.
    Month(u32),
}

impl MonthFilter {
    /// Build a filter from a selector index, `0` meaning all months.
    ///
    /// Indices outside `0..=12` fall back to [`MonthFilter::All`].
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        if (1..=12).contains(&index) {
            MonthFilter::Month(index)
        } else {
            MonthFilter::All
        }
    }

    /// Selector index of this filter, `0` for all months.
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            MonthFilter::All => 0,
            MonthFilter::Month(month) => month,
        }
    }

    /// Next selector position, wrapping from December back to all months.
    #[must_use]
    pub fn next(self) -> Self {
        Self::from_index((self.index() + 1) % 13)
    }

    /// Previous selector position, wrapping from all months to December.
    #[must_use]
    pub fn previous(self) -> Self {
        Self::from_index((self.index() + 12) % 13)
    }

    /// Label shown in the month selector.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            MonthFilter::All => "전체".to_owned(),
            MonthFilter::Month(month) => format!("{month}월"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Complete control state driving one render pass.
pub struct FilterState {
    /// Active month filter.
    pub month: MonthFilter,
    /// Only keep facilities with an opening on the reference date.
    pub today_only: bool,
    /// Civil date openings are classified against.
    pub reference: NaiveDate,
}

impl FilterState {
    /// All months, today-only disabled, classified against `reference`.
    #[must_use]
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            month: MonthFilter::All,
            today_only: false,
            reference,
        }
    }
}

/// Current civil date in [`SCHEDULE_TZ`].
#[must_use]
pub fn today_in_schedule_tz() -> NaiveDate {
    Utc::now().with_timezone(&SCHEDULE_TZ).date_naive()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A facility joined with its coordinates and the openings selected for a pass.
pub struct ScheduleEntry {
    /// Facility name (`휴양림명`).
    pub name: String,
    /// Free-text category (`구분`), possibly empty.
    pub category: String,
    /// Region for display; the schedule row's column is used when the
    /// coordinates dataset has none.
    pub region: String,
    /// Municipality for display, with the same fallback as `region`.
    pub municipality: String,
    /// Joined coordinate record.
    pub coordinates: CoordinateRecord,
    /// Openings relevant to the active month filter.
    pub openings: Vec<OpeningTimestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Output of the engine for one facility.
pub struct ClassifiedRecord {
    /// Joined entry; its openings are sorted ascending.
    pub entry: ScheduleEntry,
    /// Opening that determines the status.
    pub representative: OpeningTimestamp,
    /// Classification of `representative` against the reference date.
    pub status: Status,
}

/// Why a row contributed nothing to a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The schedule row has no facility name.
    EmptyName,
    /// No usable coordinate record exists for the facility.
    MissingCoordinates,
    /// No valid opening under the active month filter.
    NoOpenings,
    /// Today-only is active and no opening falls on the reference date.
    NotToday,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Per-pass count of schedule rows that were silently dropped.
pub struct SkipTally {
    /// Rows without a facility name.
    pub empty_name: usize,
    /// Rows whose facility has no coordinate record.
    pub missing_coordinates: usize,
    /// Rows without openings under the month filter.
    pub no_openings: usize,
    /// Rows removed by the today-only filter.
    pub not_today: usize,
}

impl SkipTally {
    /// Count one skipped row.
    pub fn record(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::EmptyName => &mut self.empty_name,
            SkipReason::MissingCoordinates => &mut self.missing_coordinates,
            SkipReason::NoOpenings => &mut self.no_openings,
            SkipReason::NotToday => &mut self.not_today,
        };
        *counter += 1;
    }

    /// Total number of skipped rows.
    #[must_use]
    pub fn total(&self) -> usize {
        self.empty_name + self.missing_coordinates + self.no_openings + self.not_today
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Counters collected while building the coordinate lookup.
pub struct LookupTally {
    /// Rows read from the coordinates dataset.
    pub rows: usize,
    /// Rows without a facility name.
    pub empty_name: usize,
    /// Rows whose latitude or longitude is not a finite number.
    pub invalid_position: usize,
    /// Rows that replaced an earlier record with the same name.
    pub overwritten: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Result of one render pass.
pub struct RenderPass {
    /// Classified records in schedule row order.
    pub records: Vec<ClassifiedRecord>,
    /// Rows dropped during the pass.
    pub skipped: SkipTally,
}

impl RenderPass {
    /// Whether the pass produced nothing to display.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of displayable records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
