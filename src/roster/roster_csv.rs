//! CSV parsing for roster uploads.
//
// Uploads must carry the fixed 19-column header below. Body rows become
// typed records: fields are trimmed and empty fields map to absent values,
// so later stages never see "".

use super::{ImportError, RowIssue};
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;

/// Column order the roster contract fixes for uploaded files.
pub const ROSTER_HEADER: [&str; 19] = [
    "familyId",
    "familyName",
    "relation",
    "name",
    "email",
    "phone",
    "password",
    "address",
    "status",
    "homeParish",
    "nativeDistrict",
    "birthday",
    "maritalStatus",
    "weddingDay",
    "subGroups",
    "avatarUrl",
    "zone",
    "ward",
    "role",
];

/// One body row, exactly as uploaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    pub family_id: Option<String>,
    pub family_name: Option<String>,
    pub relation: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
    pub home_parish: Option<String>,
    pub native_district: Option<String>,
    pub birthday: Option<String>,
    pub marital_status: Option<String>,
    pub wedding_day: Option<String>,
    pub sub_groups: Option<String>,
    pub avatar_url: Option<String>,
    pub zone: Option<String>,
    pub ward: Option<String>,
    pub role: Option<String>,
}

/// A row that survived parsing, with its file position for diagnostics.
#[derive(Debug, Clone)]
pub struct RosterLine {
    /// 1-based line in the uploaded file; the header is line 1.
    pub line: u64,
    pub name: String,
    pub row: RosterRow,
}

#[derive(Debug, Default)]
pub struct ParsedRoster {
    pub rows: Vec<RosterLine>,
    pub issues: Vec<RowIssue>,
}

/// Parse an uploaded blob into typed rows.
///
/// Rows without a name are unusable and turn into diagnostics instead of
/// aborting the upload; a wrong header aborts it.
pub fn parse_roster(csv_data: &str) -> Result<ParsedRoster, ImportError> {
    let mut reader =
        ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(csv_data.as_bytes());

    let headers = reader.headers()?.clone();
    let found: Vec<&str> = headers.iter().collect();
    if found != ROSTER_HEADER {
        return Err(ImportError::Header { found: found.join(",") });
    }

    let mut parsed = ParsedRoster::default();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let row: RosterRow = record.deserialize(Some(&headers))?;
        match row.name.clone() {
            Some(name) => parsed.rows.push(RosterLine { line, name, row }),
            None => parsed.issues.push(RowIssue::MissingName { line }),
        }
    }
    debug!("Parsed {} roster rows, {} unusable", parsed.rows.len(), parsed.issues.len());
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(rows: &[&str]) -> String {
        let mut blob = ROSTER_HEADER.join(",");
        for row in rows {
            blob.push('\n');
            blob.push_str(row);
        }
        blob
    }

    #[test]
    fn test_header_only_blob_parses_to_nothing() {
        let parsed = parse_roster(&with_header(&[])).unwrap();
        assert!(parsed.rows.is_empty());
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn test_wrong_header_is_rejected() {
        let result = parse_roster("name,birthday\nAlice,1990-01-01");
        match result {
            Err(ImportError::Header { found }) => assert_eq!(found, "name,birthday"),
            other => panic!("expected header error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_fields_become_absent() {
        let parsed =
            parse_roster(&with_header(&["F1,,Head,Alice,,,,,,,,,,,,,,,"])).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0].row;
        assert_eq!(row.family_id.as_deref(), Some("F1"));
        assert!(row.family_name.is_none());
        assert!(row.email.is_none());
        assert!(row.status.is_none());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let parsed =
            parse_roster(&with_header(&[" F1 , Doe Family ,Head,  Alice  ,,,,,,,,,,,,,,,"])).unwrap();
        let line = &parsed.rows[0];
        assert_eq!(line.name, "Alice");
        assert_eq!(line.row.family_id.as_deref(), Some("F1"));
        assert_eq!(line.row.family_name.as_deref(), Some("Doe Family"));
    }

    #[test]
    fn test_quoted_fields_keep_embedded_commas() {
        let parsed = parse_roster(&with_header(&[
            "F1,,Head,Alice,,,,,,,,,,,\"Choir, Sunday School\",,,,",
        ]))
        .unwrap();
        assert_eq!(parsed.rows[0].row.sub_groups.as_deref(), Some("Choir, Sunday School"));
    }

    #[test]
    fn test_nameless_rows_are_reported_with_their_line() {
        let parsed = parse_roster(&with_header(&[
            "F1,,Head,Alice,,,,,,,,,,,,,,,",
            "F1,,Spouse,,,,,,,,,,,,,,,,",
            "F2,,Head,Carol,,,,,,,,,,,,,,,",
        ]))
        .unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.issues, vec![RowIssue::MissingName { line: 3 }]);
    }

    #[test]
    fn test_short_rows_still_parse() {
        let parsed = parse_roster(&with_header(&["F1,,Head,Alice"])).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.rows[0].row.birthday.is_none());
        assert!(parsed.rows[0].row.role.is_none());
    }
}
