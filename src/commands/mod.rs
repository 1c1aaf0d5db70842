// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod users;
pub mod categories;
pub mod expenses;
pub mod dashboard;
pub mod analytics;
pub mod report;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::error::OutlayError;
use crate::models::{Period, User};

/// `--user` if given, else the user selected with `user use`.
pub fn resolve_user(conn: &Connection, m: &clap::ArgMatches) -> Result<User> {
    if let Some(name) = m.get_one::<String>("user") {
        return Ok(crate::users::find_active(conn, name)?);
    }
    let id = crate::users::current_user_id(conn)?
        .ok_or_else(|| anyhow!("No current user; run `outlay user use <username>` first"))?;
    let user = crate::users::find_by_id(conn, &id)?
        .with_context(|| format!("Current user {} no longer exists", id))?;
    if !user.is_active {
        return Err(OutlayError::UserNotFound(user.username).into());
    }
    Ok(user)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `--month`/`--year`, each defaulting to the month containing `today`.
pub fn month_period(sub: &clap::ArgMatches, today: NaiveDate) -> Result<Period> {
    let month = sub.get_one::<u32>("month").copied().unwrap_or(today.month());
    let year = sub.get_one::<i32>("year").copied().unwrap_or(today.year());
    Ok(Period::new(year, month)?)
}
