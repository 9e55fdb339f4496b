//! Bulk roster import.
//
// An uploaded CSV becomes family records in four steps: parse, group rows
// by natural key, select each group's head, then upsert the mapped records
// against the store in one atomic batch. Problem rows degrade into
// diagnostics instead of aborting the upload.

use crate::model::Principal;
use crate::store::{DirectoryStore, FamilyWrite, StoreError};
use chrono::Utc;
use log::{debug, info, warn};

mod roster_csv;
mod roster_grouping;
mod roster_validation;

pub use roster_csv::*;
pub use roster_grouping::*;
pub use roster_validation::*;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("permission denied: roster import requires an administrator")]
    PermissionDenied,
    #[error("CSV header does not match the roster contract (found: {found})")]
    Header { found: String },
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Non-fatal problem found in the uploaded file. The affected row or group
/// is skipped or adjusted and the rest of the import proceeds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowIssue {
    #[error("row at line {line} skipped: name is required")]
    MissingName { line: u64 },
    #[error("family '{key}' skipped: {rows} rows but none marked as Head")]
    HeadlessFamily { key: String, rows: usize },
    #[error("family '{key}': extra Head row '{name}' kept as a regular member")]
    ExtraHead { key: String, name: String },
    #[error("line {line}: ignoring invalid {field} '{value}'")]
    BadDate { line: u64, field: &'static str, value: String },
}

/// Values filled in when uploaded rows leave a field blank.
#[derive(Debug, Clone)]
pub struct ImportDefaults {
    pub placeholder_avatar: String,
    pub placeholder_password: String,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            placeholder_avatar: PLACEHOLDER_AVATAR_URL.to_string(),
            placeholder_password: PLACEHOLDER_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub issues: Vec<RowIssue>,
    /// Human-readable outcome shown to the uploading administrator.
    pub message: String,
}

/// Import an uploaded roster file on behalf of `principal`.
///
/// The principal must be an administrator; the check happens before the
/// blob is even parsed. Existing families are matched by register number
/// (or head name for rows without one) and replaced, everything else is
/// created. All writes land in a single atomic batch.
pub async fn import_families(
    store: &dyn DirectoryStore,
    principal: &Principal,
    csv_data: &str,
    defaults: &ImportDefaults,
) -> Result<ImportReport, ImportError> {
    debug!("Roster import requested by member {}", principal.member_id);
    if !store.is_administrator(&principal.member_id).await? {
        warn!("Roster import rejected: member {} is not an administrator", principal.member_id);
        return Err(ImportError::PermissionDenied);
    }

    let parsed = parse_roster(csv_data)?;
    let mut issues = parsed.issues;
    let groups = group_rows(parsed.rows, &mut issues);
    info!("Roster upload contains {} importable families", groups.len());

    let now = Utc::now();
    let mut writes = Vec::with_capacity(groups.len());
    let mut created = 0usize;
    let mut updated = 0usize;
    for group in groups {
        let existing = store.fetch_family_by_natural_key(&group.key).await?;
        let family = family_from_group(group, defaults, now, &mut issues);
        match existing {
            Some(existing) => {
                debug!("Replacing family '{}' stored as {}", family_label(&family), existing.id);
                updated += 1;
                writes.push(FamilyWrite::Replace { id: existing.id, family });
            }
            None => {
                debug!("Creating family '{}'", family_label(&family));
                created += 1;
                writes.push(FamilyWrite::Create(family));
            }
        }
    }

    for issue in &issues {
        warn!("Roster import: {issue}");
    }

    if !writes.is_empty() {
        store.commit_batch(writes).await?;
    }

    let message = summarize(created, updated, &issues);
    info!("{message}");
    Ok(ImportReport { created, updated, issues, message })
}

fn family_label(family: &crate::model::Family) -> &str {
    family.family_id.as_deref().unwrap_or(family.head.name.as_str())
}

fn summarize(created: usize, updated: usize, issues: &[RowIssue]) -> String {
    let processed = created + updated;
    let noun = if processed == 1 { "family" } else { "families" };
    let mut message =
        format!("Successfully processed {processed} {noun} ({created} created, {updated} updated).");
    if !issues.is_empty() {
        message.push_str(&format!(" {} row(s) needed attention; see diagnostics.", issues.len()));
    }
    message
}
