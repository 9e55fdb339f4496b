//! Recurrence engine for upcoming birthdays and wedding anniversaries.
//
// Annual dates are resolved against every calendar year the window touches,
// so a window spanning New Year still finds early-January events. Feb 29
// falls back to Feb 28 in non-leap years.

use crate::model::{Family, MaritalStatus, MemberStatus, Person, SIGN_IN_ACCOUNT_ID};
use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Window length used when the caller does not configure one.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Inclusive date range for upcoming-event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid celebration window: end {end} precedes start {start}")]
pub struct InvalidRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRange> {
        if end < start {
            return Err(InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window covering `today` through `today + days`, both inclusive.
    pub fn next_days(today: NaiveDate, days: u32) -> Self {
        let end = today
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar years the window touches.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Birthday,
    Wedding,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Birthday => write!(f, "Birthday"),
            EventKind::Wedding => write!(f, "Wedding Anniversary"),
        }
    }
}

/// One celebration falling inside the queried window.
#[derive(Debug, Clone)]
pub struct Occurrence<'a> {
    pub person: &'a Person,
    /// Record the person belongs to; for dependents this is the head's record.
    pub family: &'a Family,
    pub kind: EventKind,
    /// The anniversary resolved into the window's calendar year.
    pub date: NaiveDate,
    pub is_family_member: bool,
}

/// Resolve an annual date into a concrete year. Feb 29 clamps to Feb 28
/// when the target year is not a leap year.
pub fn resolve_annual_date(raw: NaiveDate, year: i32) -> NaiveDate {
    raw.with_year(year).unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(year, 2, 28).expect("Feb 28 exists in every year")
    })
}

/// All birthdays and wedding anniversaries falling inside `window`,
/// sorted by date ascending.
///
/// The synthetic sign-in account and inactive records contribute nothing.
/// A wedding anniversary requires both a recorded wedding day and a
/// `Married` marital status.
pub fn upcoming_celebrations<'a>(families: &'a [Family], window: Window) -> Vec<Occurrence<'a>> {
    let mut occurrences = Vec::new();
    for family in families {
        if family.id == SIGN_IN_ACCOUNT_ID {
            continue;
        }
        // An inactive record is invisible, embedded members included.
        if family.head.status == MemberStatus::Inactive {
            continue;
        }
        collect_person(&mut occurrences, family, &family.head, false, window);
        for member in &family.family {
            if member.status == MemberStatus::Inactive {
                continue;
            }
            collect_person(&mut occurrences, family, member, true, window);
        }
    }
    occurrences.sort_by_key(|occurrence| occurrence.date);
    debug!(
        "Found {} celebrations between {} and {}",
        occurrences.len(),
        window.start(),
        window.end()
    );
    occurrences
}

fn collect_person<'a>(
    out: &mut Vec<Occurrence<'a>>,
    family: &'a Family,
    person: &'a Person,
    is_family_member: bool,
    window: Window,
) {
    if let Some(birthday) = person.birthday {
        collect_annual(out, family, person, EventKind::Birthday, birthday, is_family_member, window);
    }
    if person.marital_status == MaritalStatus::Married {
        if let Some(wedding_day) = person.wedding_day {
            collect_annual(
                out,
                family,
                person,
                EventKind::Wedding,
                wedding_day,
                is_family_member,
                window,
            );
        }
    }
}

fn collect_annual<'a>(
    out: &mut Vec<Occurrence<'a>>,
    family: &'a Family,
    person: &'a Person,
    kind: EventKind,
    raw: NaiveDate,
    is_family_member: bool,
    window: Window,
) {
    for year in window.years() {
        let date = resolve_annual_date(raw, year);
        if window.contains(date) {
            out.push(Occurrence { person, family, kind, date, is_family_member });
        }
    }
}
