// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::period_summary;
use crate::commands::{month_period, resolve_user, today};
use crate::models::ReportPeriod;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let period = month_period(sub, today())?;
    let summary = period_summary(
        &SqliteStore::new(conn),
        &user.id,
        ReportPeriod::Month(period),
    )?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        let data = vec![
            vec!["Total spent".to_string(), fmt_money(&summary.total)],
            vec!["Transactions".to_string(), summary.count.to_string()],
            vec!["Average expense".to_string(), fmt_money(&summary.average)],
        ];
        println!("{} - {}", user.display_name(), period.title());
        println!("{}", pretty_table(&["Metric", "Value"], data));
    }
    Ok(())
}
