//! Grouping rows into families and mapping them onto directory records.

use super::roster_validation::{
    parse_marital_status, parse_member_date, parse_relation, parse_role, parse_status,
    split_sub_groups,
};
use super::{ImportDefaults, RosterLine, RowIssue};
use crate::model::{Family, Person, Relation};
use chrono::{DateTime, Utc};
use log::debug;
use secrecy::SecretString;
use std::collections::HashMap;

/// Rows sharing one natural key, with the head already selected.
#[derive(Debug)]
pub struct FamilyGroup {
    /// Register number, or the head's name for rows uploaded without one.
    pub key: String,
    pub head: RosterLine,
    pub members: Vec<RosterLine>,
}

/// Bucket rows by natural key, preserving first-appearance order, and
/// resolve each bucket's head.
///
/// A multi-row bucket with no row marked "Head" cannot become a record and
/// is dropped with a diagnostic. A sole row heads its own family whatever
/// its relation column says.
pub fn group_rows(rows: Vec<RosterLine>, issues: &mut Vec<RowIssue>) -> Vec<FamilyGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<RosterLine>> = HashMap::new();
    for line in rows {
        let key = line.row.family_id.clone().unwrap_or_else(|| line.name.clone());
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(line);
    }

    let mut groups = Vec::with_capacity(order.len());
    for key in order {
        let bucket = buckets.remove(&key).unwrap_or_default();
        if let Some(group) = select_head(&key, bucket, issues) {
            groups.push(group);
        }
    }
    groups
}

fn select_head(key: &str, bucket: Vec<RosterLine>, issues: &mut Vec<RowIssue>) -> Option<FamilyGroup> {
    let total = bucket.len();
    if total == 1 {
        let mut rows = bucket;
        let head = rows.remove(0);
        return Some(FamilyGroup { key: key.to_string(), head, members: rows });
    }

    let mut head: Option<RosterLine> = None;
    let mut members = Vec::with_capacity(total.saturating_sub(1));
    for line in bucket {
        if is_head_row(&line) {
            if head.is_none() {
                head = Some(line);
            } else {
                issues.push(RowIssue::ExtraHead {
                    key: key.to_string(),
                    name: line.name.clone(),
                });
                members.push(line);
            }
        } else {
            members.push(line);
        }
    }

    match head {
        Some(head) => Some(FamilyGroup { key: key.to_string(), head, members }),
        None => {
            issues.push(RowIssue::HeadlessFamily { key: key.to_string(), rows: total });
            None
        }
    }
}

fn is_head_row(line: &RosterLine) -> bool {
    line.row.relation.as_deref().map_or(false, |relation| relation.eq_ignore_ascii_case("head"))
}

/// Map a grouped family onto a directory record, filling defaults for the
/// fields the upload left blank.
///
/// The record id is left empty; the store assigns one on create and the
/// upsert planner carries the existing one on replace. The group key always
/// becomes the stored register number so re-imports find the record again.
pub fn family_from_group(
    group: FamilyGroup,
    defaults: &ImportDefaults,
    joined: DateTime<Utc>,
    issues: &mut Vec<RowIssue>,
) -> Family {
    debug!("Mapping family '{}' with {} member rows", group.key, group.members.len());
    let head_row = group.head;
    let mut head = person_from_line(&head_row, defaults, issues);
    // The head is the implicit "self" of the record.
    head.relation = None;

    let members = group
        .members
        .iter()
        .map(|line| {
            let mut member = person_from_line(line, defaults, issues);
            member.relation =
                Some(parse_relation(line.row.relation.as_deref()).unwrap_or(Relation::Others));
            member
        })
        .collect();

    let password =
        head_row.row.password.clone().unwrap_or_else(|| defaults.placeholder_password.clone());

    Family {
        id: String::new(),
        family_id: Some(group.key),
        family_name: head_row.row.family_name.clone(),
        head,
        zone: head_row.row.zone.clone(),
        ward: head_row.row.ward.clone(),
        role: parse_role(head_row.row.role.as_deref()),
        family: members,
        join_date: Some(joined),
        password: Some(SecretString::from(password)),
    }
}

fn person_from_line(
    line: &RosterLine,
    defaults: &ImportDefaults,
    issues: &mut Vec<RowIssue>,
) -> Person {
    let row = &line.row;
    Person {
        name: line.name.clone(),
        relation: None,
        status: parse_status(row.status.as_deref()),
        birthday: parse_member_date("birthday", line.line, row.birthday.as_deref(), issues),
        marital_status: parse_marital_status(row.marital_status.as_deref()),
        wedding_day: parse_member_date("weddingDay", line.line, row.wedding_day.as_deref(), issues),
        sub_groups: split_sub_groups(row.sub_groups.as_deref()),
        phone: row.phone.clone(),
        email: row.email.clone(),
        address: row.address.clone(),
        avatar_url: Some(
            row.avatar_url.clone().unwrap_or_else(|| defaults.placeholder_avatar.clone()),
        ),
        home_parish: row.home_parish.clone(),
        native_district: row.native_district.clone(),
    }
}
