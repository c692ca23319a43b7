// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar date helpers.
//!
//! Status intervals are whole days. Dates travel as `YYYY-MM-DD` strings and
//! "today" is always evaluated in the unit's declared timezone, never the
//! host's.

use crate::error::DomainError;
use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use time::{Date, Month};

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Returns the current calendar date in the given IANA timezone.
///
/// # Errors
///
/// Returns an error if the timezone name is not recognized.
pub fn today_in_timezone(timezone: &str) -> Result<Date, DomainError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
    let local: NaiveDate = chrono::Utc::now().with_timezone(&tz).date_naive();
    naive_to_date(local)
}

/// Converts a `chrono::NaiveDate` to a `time::Date`.
///
/// # Errors
///
/// Returns an error if the date is outside the range `time` supports.
pub fn naive_to_date(date: NaiveDate) -> Result<Date, DomainError> {
    let month: Month = u8::try_from(date.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| DomainError::DateConversion(format!("invalid month in {date}")))?;
    let day: u8 = u8::try_from(date.day())
        .map_err(|_| DomainError::DateConversion(format!("invalid day in {date}")))?;

    Date::from_calendar_date(date.year(), month, day)
        .map_err(|e| DomainError::DateConversion(e.to_string()))
}
