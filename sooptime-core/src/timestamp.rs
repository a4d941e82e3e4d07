//! Parsing of `;`-separated opening timestamp cells and reference dates.

use chrono::{NaiveDate, NaiveDateTime, TimeZone};

use crate::model::{DATE_FORMAT, OPENING_FORMAT, OpeningTimestamp, SCHEDULE_TZ};
use crate::ports::PortError;

// `d` stands for any ASCII digit, every other byte must match literally.
const OPENING_SHAPE: &[u8; 16] = b"dddd-dd-dd dd:dd";

/// Parse every valid opening in a cell, keeping token order.
///
/// Tokens are separated by `;` and trimmed. Empty tokens and tokens that are
/// not exactly `YYYY-MM-DD HH:mm` are dropped without error.
#[must_use]
pub fn parse_openings(cell: &str) -> Vec<OpeningTimestamp> {
    cell.split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(parse_opening)
        .collect()
}

/// Strictly parse a single `YYYY-MM-DD HH:mm` token in the schedule timezone.
///
/// Returns `None` for anything else, including calendar-invalid values such
/// as `2025-02-30 10:00` and local times skipped by a clock change.
#[must_use]
pub fn parse_opening(token: &str) -> Option<OpeningTimestamp> {
    if !matches_shape(token) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(token, OPENING_FORMAT).ok()?;
    SCHEDULE_TZ.from_local_datetime(&naive).earliest()
}

/// Render an opening the same way it is written in the datasets.
#[must_use]
pub fn format_opening(opening: &OpeningTimestamp) -> String {
    opening.format(OPENING_FORMAT).to_string()
}

/// Parse a user-supplied `YYYY-MM-DD` reference date.
///
/// # Errors
///
/// Returns [`PortError::Parse`] when the input is not a valid calendar date.
pub fn parse_reference_date(raw: &str) -> Result<NaiveDate, PortError> {
    Ok(NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)?)
}

fn matches_shape(token: &str) -> bool {
    token.len() == OPENING_SHAPE.len()
        && token
            .bytes()
            .zip(OPENING_SHAPE.iter())
            .all(|(byte, expected)| match expected {
                b'd' => byte.is_ascii_digit(),
                literal => byte == *literal,
            })
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    fn formatted(cell: &str) -> Vec<String> {
        parse_openings(cell).iter().map(format_opening).collect()
    }

    #[test]
    fn malformed_token_between_valid_ones_is_dropped() {
        assert_eq!(
            formatted("2025-01-10 10:00;not a date;2025-01-03 09:30"),
            vec!["2025-01-10 10:00", "2025-01-03 09:30"],
        );
    }

    #[test]
    fn empty_cells_yield_nothing() {
        assert!(parse_openings("").is_empty(), "empty string");
        assert!(parse_openings(" ; ;;  ").is_empty(), "separators only");
    }

    #[test]
    fn tokens_are_trimmed() {
        assert_eq!(
            formatted("  2025-03-01 10:00 ;\t2025-03-02 14:00\n"),
            vec!["2025-03-01 10:00", "2025-03-02 14:00"],
        );
    }

    #[test]
    fn loose_formats_are_rejected() {
        for token in [
            "2025-1-10 10:00",
            "2025-01-10 9:00",
            "2025/01/10 10:00",
            "2025-01-10T10:00",
            "2025-01-10 10:00:00",
            "2025-01-10",
            "2025-02-30 10:00",
            "2025-01-10 24:00",
            "２０２５-01-10 10:00",
        ] {
            assert!(parse_opening(token).is_none(), "{token} should be rejected");
        }
    }

    #[test]
    fn openings_are_anchored_to_seoul() {
        let opening = parse_opening("2025-01-10 10:00").expect("valid token");

        let utc = NaiveDate::from_ymd_opt(2025, 1, 10)
            .and_then(|date| date.and_hms_opt(1, 0, 0))
            .expect("valid utc time");
        assert_eq!(opening.naive_utc(), utc);
        assert_eq!(opening.hour(), 10, "local hour is preserved");
    }

    #[test]
    fn duplicate_tokens_are_kept() {
        assert_eq!(parse_openings("2025-05-01 10:00;2025-05-01 10:00").len(), 2);
    }

    #[test]
    fn reference_date_accepts_padded_input() {
        assert_eq!(
            parse_reference_date(" 2025-06-15 ").ok(),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
    }

    #[test]
    fn invalid_reference_date_is_a_parse_error() {
        for raw in ["2025-13-01", "2025-02-30", "tomorrow", ""] {
            assert!(
                matches!(parse_reference_date(raw), Err(PortError::Parse(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
