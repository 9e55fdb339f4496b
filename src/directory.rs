//! Directory browsing: text search, visibility rules and pagination.

use crate::model::{Family, MemberStatus, Person, SIGN_IN_ACCOUNT_ID};
use log::debug;

/// Rows per directory page when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Parameters of one directory view.
#[derive(Debug, Clone, Default)]
pub struct DirectoryQuery {
    /// Matched case-insensitively against head name, head email and
    /// family name. Empty matches everything.
    pub text: String,
    /// Organization whose members should be highlighted per family.
    pub subgroup: Option<String>,
    /// 1-based page number; zero is treated as the first page.
    pub page: usize,
    /// Rows per page; zero falls back to `DEFAULT_PAGE_SIZE`.
    pub page_size: usize,
}

#[derive(Debug)]
pub struct DirectoryEntry<'a> {
    pub family: &'a Family,
    /// Embedded members belonging to the selected subgroup; empty when no
    /// subgroup is selected.
    pub matching_members: Vec<&'a Person>,
}

#[derive(Debug)]
pub struct DirectoryPage<'a> {
    pub entries: Vec<DirectoryEntry<'a>>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// One page of the directory for the given viewer.
///
/// The sign-in account is never listed. Inactive records are shown to
/// administrators only.
pub fn directory_page<'a>(
    families: &'a [Family],
    viewer_is_admin: bool,
    query: &DirectoryQuery,
) -> DirectoryPage<'a> {
    let needle = query.text.to_lowercase();
    let matched: Vec<&Family> = families
        .iter()
        .filter(|family| is_listed(family, viewer_is_admin))
        .filter(|family| matches_text(family, &needle))
        .collect();

    let page_size = if query.page_size == 0 { DEFAULT_PAGE_SIZE } else { query.page_size };
    let page = query.page.max(1);
    let total_matches = matched.len();
    let total_pages = total_matches.div_ceil(page_size);

    let entries = matched
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .map(|family| DirectoryEntry {
            family,
            matching_members: match &query.subgroup {
                Some(subgroup) => family
                    .family
                    .iter()
                    .filter(|member| member.sub_groups.iter().any(|group| group == subgroup))
                    .collect(),
                None => Vec::new(),
            },
        })
        .collect();

    debug!("Directory page {page}/{total_pages} with {total_matches} matching records");
    DirectoryPage { entries, page, total_pages, total_matches }
}

fn is_listed(family: &Family, viewer_is_admin: bool) -> bool {
    // The Admin role is a privilege marker, not a visibility rule; only
    // the synthetic account itself is hidden.
    if family.id == SIGN_IN_ACCOUNT_ID {
        return false;
    }
    viewer_is_admin || family.head.status == MemberStatus::Active
}

fn matches_text(family: &Family, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    family.head.name.to_lowercase().contains(needle)
        || family
            .head
            .email
            .as_deref()
            .map_or(false, |email| email.to_lowercase().contains(needle))
        || family
            .family_name
            .as_deref()
            .map_or(false, |name| name.to_lowercase().contains(needle))
}
