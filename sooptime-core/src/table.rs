//! CSV tokenizing into [`RawRow`] values.

use std::io::Read;

use crate::model::RawRow;
use crate::ports::PortError;

/// Read a CSV document with a header row into normalized rows.
///
/// Rows may be shorter or longer than the header; missing cells read as
/// empty and surplus cells are ignored. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`PortError::Table`] when the document is not valid UTF-8 CSV.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<RawRow>, PortError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_owned())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(columns.iter().zip(record.iter()).collect::<RawRow>());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_maps_cells_and_normalizes_them() {
        let csv = "\u{feff}휴양림명,위도 ,경도\n A숲\u{a0},37.0, 127.0\n\n\"B,숲\",36.5,128.0\n";
        let rows = read_table(csv.as_bytes()).expect("valid csv");

        assert_eq!(rows.len(), 2, "blank line is skipped");
        let first = rows.first().expect("first row");
        assert_eq!(first.get("휴양림명"), "A숲");
        assert_eq!(first.get("위도"), "37.0");
        assert_eq!(first.get("경도"), "127.0");
        assert_eq!(rows.get(1).map(|row| row.get("휴양림명")), Some("B,숲"));
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let rows = read_table("휴양림명,구분,1월 일반예약 오픈일시(복수)\nA숲\n".as_bytes())
            .expect("valid csv");

        let row = rows.first().expect("row");
        assert_eq!(row.get("휴양림명"), "A숲");
        assert_eq!(row.get("구분"), "");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let bytes: &[u8] = b"name\n\xff\xfe\n";
        assert!(matches!(read_table(bytes), Err(PortError::Table(_))));
    }
}
