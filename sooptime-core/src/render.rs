//! Turns classified records into marker descriptors, popup details, and GeoJSON.

use maud::html;
use serde::Serialize;

use crate::model::{ClassifiedRecord, RenderPass, Status};
use crate::ports::PortError;
use crate::timestamp::format_opening;

/// Shown when a dataset could not be loaded; the error text is appended.
pub const LOAD_FAILED_MESSAGE: &str = "데이터를 불러오지 못했습니다: ";
/// Shown when a render pass has nothing to display.
pub const EMPTY_PASS_MESSAGE: &str = "표시할 마커가 없습니다. (월/오늘만/기준일 필터를 확인하세요)";

/// User-facing message for a failed dataset load.
#[must_use]
pub fn load_failed_message(err: &PortError) -> String {
    format!("{LOAD_FAILED_MESSAGE}{err}")
}

const HOME_LINK_LABEL: &str = "바로가기";
const OPENINGS_HEADING: &str = "오픈일시";

/// Marker colour of a status, as a CSS hex string.
#[must_use]
pub fn status_color(status: Status) -> &'static str {
    match status {
        Status::Today => "#1d4ed8",
        Status::Upcoming => "#16a34a",
        Status::Past => "#9ca3af",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Visual style of a circle marker.
pub struct MarkerStyle {
    /// Radius in pixels.
    pub radius: u16,
    /// Stroke width in pixels.
    pub weight: u16,
    /// Stroke and fill colour.
    pub color: &'static str,
    /// Fill opacity between 0 and 1.
    pub fill_opacity: f32,
}

impl MarkerStyle {
    /// Style used for a status.
    #[must_use]
    pub fn for_status(status: Status) -> Self {
        Self {
            radius: 8,
            weight: 1,
            color: status_color(status),
            fill_opacity: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Where and how to draw one facility.
pub struct Marker {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Status that picked the style.
    pub status: Status,
    /// Visual style.
    pub style: MarkerStyle,
}

/// Marker descriptor for a classified record.
#[must_use]
pub fn marker(record: &ClassifiedRecord) -> Marker {
    Marker {
        latitude: record.entry.coordinates.latitude,
        longitude: record.entry.coordinates.longitude,
        status: record.status,
        style: MarkerStyle::for_status(record.status),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Human-readable details of a facility.
pub struct Detail {
    /// Facility name.
    pub title: String,
    /// `category · region · municipality`, empty parts kept as blanks.
    pub meta: String,
    /// Official home page, if known.
    pub home_url: Option<String>,
    /// Every applicable opening, ascending, formatted `YYYY-MM-DD HH:mm`.
    pub openings: Vec<String>,
}

/// Detail payload for a classified record.
#[must_use]
pub fn detail(record: &ClassifiedRecord) -> Detail {
    let entry = &record.entry;
    let home_url = Some(entry.coordinates.home_url.clone()).filter(|url| !url.is_empty());
    Detail {
        title: entry.name.clone(),
        meta: format!("{} · {} · {}", entry.category, entry.region, entry.municipality),
        home_url,
        openings: entry.openings.iter().map(format_opening).collect(),
    }
}

impl Detail {
    /// Popup HTML; every interpolated value is escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        html! {
            div class="popup" {
                div class="popup-title" { (self.title) }
                div class="popup-meta" { (self.meta) }
                @if let Some(url) = &self.home_url {
                    div {
                        "공식홈페이지: "
                        a href=(url) target="_blank" rel="noopener" { (HOME_LINK_LABEL) }
                    }
                }
                div class="popup-heading" { (OPENINGS_HEADING) }
                ul {
                    @for opening in &self.openings {
                        li { (opening) }
                    }
                }
            }
        }
        .into_string()
    }
}

#[derive(Debug, Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature<'a>>,
}

#[derive(Debug, Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Point,
    properties: FeatureProperties<'a>,
}

#[derive(Debug, Serialize)]
struct Point {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2],
}

#[derive(Debug, Serialize)]
struct FeatureProperties<'a> {
    name: &'a str,
    status: Status,
    representative: String,
    openings: Vec<String>,
    home_url: &'a str,
    category: &'a str,
    region: &'a str,
    municipality: &'a str,
    marker: MarkerStyle,
    popup: String,
}

/// Encode a render pass as a GeoJSON `FeatureCollection` of points.
///
/// # Errors
///
/// Returns [`PortError::Encode`] if serialization fails.
pub fn to_geojson(pass: &RenderPass) -> Result<String, PortError> {
    let features = pass
        .records
        .iter()
        .map(|record| {
            let entry = &record.entry;
            let details = detail(record);
            Feature {
                kind: "Feature",
                geometry: Point {
                    kind: "Point",
                    coordinates: [entry.coordinates.longitude, entry.coordinates.latitude],
                },
                properties: FeatureProperties {
                    name: &entry.name,
                    status: record.status,
                    representative: format_opening(&record.representative),
                    popup: details.to_html(),
                    openings: details.openings,
                    home_url: &entry.coordinates.home_url,
                    category: &entry.category,
                    region: &entry.region,
                    municipality: &entry.municipality,
                    marker: MarkerStyle::for_status(record.status),
                },
            }
        })
        .collect();

    let collection = FeatureCollection {
        kind: "FeatureCollection",
        features,
    };
    Ok(serde_json::to_string_pretty(&collection)?)
}

#[cfg(test)]
mod tests {
    use crate::model::{CoordinateRecord, ScheduleEntry, SourceKind};
    use crate::timestamp::{parse_opening, parse_openings};

    use super::*;

    fn record(home_url: &str, status: Status) -> ClassifiedRecord {
        let openings = parse_openings("2025-01-03 09:00;2025-01-10 10:00");
        ClassifiedRecord {
            entry: ScheduleEntry {
                name: "A<숲>".to_owned(),
                category: "국립".to_owned(),
                region: "강원".to_owned(),
                municipality: String::new(),
                coordinates: CoordinateRecord {
                    latitude: 37.5,
                    longitude: 128.25,
                    home_url: home_url.to_owned(),
                    region: "강원".to_owned(),
                    municipality: String::new(),
                },
                openings,
            },
            representative: parse_opening("2025-01-03 09:00").expect("valid token"),
            status,
        }
    }

    #[test]
    fn load_failure_message_carries_the_cause() {
        let message = load_failed_message(&PortError::UnsupportedSource(SourceKind::Http));

        assert_eq!(message, "데이터를 불러오지 못했습니다: Unsupported source: http");
    }

    #[test]
    fn marker_colour_follows_status() {
        assert_eq!(marker(&record("", Status::Today)).style.color, "#1d4ed8");
        assert_eq!(marker(&record("", Status::Upcoming)).style.color, "#16a34a");
        assert_eq!(marker(&record("", Status::Past)).style.color, "#9ca3af");
    }

    #[test]
    fn detail_lists_openings_and_meta() {
        let details = detail(&record("", Status::Upcoming));

        assert_eq!(details.meta, "국립 · 강원 · ");
        assert_eq!(details.home_url, None);
        assert_eq!(details.openings, vec!["2025-01-03 09:00", "2025-01-10 10:00"]);
    }

    #[test]
    fn popup_html_is_escaped() {
        let html = detail(&record("https://x.example/?a=1&b=\"2\"", Status::Past)).to_html();

        assert!(html.contains("A&lt;숲&gt;"), "title escaped: {html}");
        assert!(html.contains("href=\"https://x.example/?a=1&amp;b=&quot;2&quot;\""));
        assert!(html.contains("<li>2025-01-10 10:00</li>"));
    }

    #[test]
    fn popup_html_without_home_page_has_no_link() {
        let html = detail(&record("", Status::Upcoming)).to_html();

        assert!(html.starts_with("<div class=\"popup\"><div class=\"popup-title\">"));
        assert!(!html.contains("<a "), "no link without a home page: {html}");
        assert!(html.contains("<div class=\"popup-heading\">오픈일시</div><ul><li>2025-01-03 09:00</li>"));
    }

    #[test]
    fn geojson_uses_longitude_latitude_order() {
        let pass = RenderPass {
            records: vec![record("", Status::Upcoming)],
            ..RenderPass::default()
        };

        let encoded = to_geojson(&pass).expect("encodes");
        let value: serde_json::Value = serde_json::from_str(&encoded).expect("valid json");

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["geometry"]["coordinates"][0], 128.25);
        assert_eq!(value["features"][0]["geometry"]["coordinates"][1], 37.5);
        assert_eq!(value["features"][0]["properties"]["status"], "upcoming");
        assert_eq!(value["features"][0]["properties"]["representative"], "2025-01-03 09:00");
    }
}
