//! Field normalization and defaulting rules for roster rows.

use super::RowIssue;
use crate::model::{MaritalStatus, MemberStatus, Relation, Role};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shown for members uploaded without a photo reference.
pub const PLACEHOLDER_AVATAR_URL: &str = "https://placehold.co/128x128.png";
/// Interim credential for heads uploaded without one.
pub const PLACEHOLDER_PASSWORD: &str = "password123";

static DATE_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Validate date string has format YYYY-MM-DD and names a real calendar
/// day in a plausible year.
pub fn validate_date_format(date: &str) -> bool {
    if !DATE_FORMAT.is_match(date) {
        return false;
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => (1900..=2100).contains(&parsed.year()),
        Err(_) => false,
    }
}

/// Parse an uploaded date field. Invalid values degrade to absent with a
/// diagnostic; the row itself still imports.
pub fn parse_member_date(
    field: &'static str,
    line: u64,
    raw: Option<&str>,
    issues: &mut Vec<RowIssue>,
) -> Option<NaiveDate> {
    let raw = raw?;
    if validate_date_format(raw) {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    } else {
        issues.push(RowIssue::BadDate { line, field, value: raw.to_string() });
        None
    }
}

pub fn parse_status(raw: Option<&str>) -> MemberStatus {
    match raw {
        Some(value) if value.eq_ignore_ascii_case("inactive") => MemberStatus::Inactive,
        _ => MemberStatus::Active,
    }
}

pub fn parse_marital_status(raw: Option<&str>) -> MaritalStatus {
    match raw.map(|value| value.to_ascii_lowercase()) {
        Some(value) => match value.as_str() {
            "married" => MaritalStatus::Married,
            "widowed" => MaritalStatus::Widowed,
            "divorced" | "separated" | "divorced/separated" => MaritalStatus::Divorced,
            _ => MaritalStatus::Single,
        },
        None => MaritalStatus::Single,
    }
}

pub fn parse_role(raw: Option<&str>) -> Role {
    match raw {
        Some(value) if value.eq_ignore_ascii_case("admin") => Role::Admin,
        _ => Role::Member,
    }
}

/// Unrecognized labels yield `None`; callers decide the fallback.
pub fn parse_relation(raw: Option<&str>) -> Option<Relation> {
    raw.and_then(Relation::from_label)
}

/// Split a comma-separated organization list, dropping empty tokens.
pub fn split_sub_groups(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(value) => value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}
