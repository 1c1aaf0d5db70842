// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{
    category_breakdown, category_totals, daily_spending, monthly_trend, payment_methods,
    top_categories,
};
use crate::charts;
use crate::commands::{month_period, resolve_user, today};
use crate::store::SqliteStore;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let user = resolve_user(conn, sub)?;
    let store = SqliteStore::new(conn);
    let today = today();

    match name {
        "by-category" => {
            let r = category_totals(&store, &user.id, month_period(sub, today)?)?;
            let rows = r
                .totals
                .iter()
                .map(|c| vec![c.category.clone(), fmt_money(&c.total)])
                .collect();
            emit(sub, &r, || charts::category_totals_chart(&r), &["Category", "Total"], rows)?;
        }
        "trend" => {
            let r = monthly_trend(&store, &user.id, today)?;
            let rows = r
                .points
                .iter()
                .map(|p| vec![p.label.clone(), fmt_money(&p.total)])
                .collect();
            emit(sub, &r, || charts::monthly_trend_chart(&r), &["Month", "Total"], rows)?;
        }
        "breakdown" => {
            let r = category_breakdown(&store, &user.id, month_period(sub, today)?)?;
            let mut rows = Vec::new();
            for node in &r.nodes {
                rows.push(vec![node.name.clone(), String::new(), fmt_money(&node.value)]);
                for leaf in &node.children {
                    rows.push(vec![String::new(), leaf.name.clone(), fmt_money(&leaf.value)]);
                }
            }
            emit(
                sub,
                &r,
                || charts::breakdown_tree(&r),
                &["Category", "Subcategory", "Total"],
                rows,
            )?;
        }
        "daily" => {
            let r = daily_spending(&store, &user.id, month_period(sub, today)?)?;
            let rows = r
                .days
                .iter()
                .enumerate()
                .map(|(i, d)| vec![(i + 1).to_string(), fmt_money(d)])
                .collect();
            emit(sub, &r, || charts::daily_spending_chart(&r), &["Day", "Total"], rows)?;
        }
        "top" => {
            let year = sub.get_one::<i32>("year").copied().unwrap_or(today.year());
            let limit = *sub.get_one::<usize>("limit").unwrap_or(&5);
            let r = top_categories(&store, &user.id, year, limit)?;
            let rows = r
                .entries
                .iter()
                .enumerate()
                .map(|(i, c)| vec![(i + 1).to_string(), c.category.clone(), fmt_money(&c.total)])
                .collect();
            emit(sub, &r, || charts::top_categories_chart(&r), &["Rank", "Category", "Total"], rows)?;
        }
        "payment-methods" => {
            let r = payment_methods(&store, &user.id, month_period(sub, today)?)?;
            let rows = r
                .entries
                .iter()
                .map(|p| vec![p.method.clone(), p.count.to_string(), fmt_money(&p.total)])
                .collect();
            emit(
                sub,
                &r,
                || charts::payment_methods_chart(&r),
                &["Method", "Transactions", "Total"],
                rows,
            )?;
        }
        _ => {}
    }
    Ok(())
}

/// `--chart` prints the chart payload, `--json`/`--jsonl` the raw result, otherwise a table.
fn emit<T: Serialize, C: Serialize>(
    sub: &clap::ArgMatches,
    result: &T,
    chart: impl FnOnce() -> C,
    headers: &[&str],
    rows: Vec<Vec<String>>,
) -> Result<()> {
    if sub.get_flag("chart") {
        println!("{}", serde_json::to_string_pretty(&chart())?);
    } else if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), result)? {
        println!("{}", pretty_table(headers, rows));
    }
    Ok(())
}
