// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{resolve_user, today};
use crate::expenses::{ExpenseDraft, create_expense, delete_expense, update_expense};
use crate::models::{validate_month, validate_year};
use crate::store::{ExpenseFilter, ExpenseStore, SqliteStore};
use crate::taxonomy::Taxonomy;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub fn handle(conn: &Connection, taxonomy: &dyn Taxonomy, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, taxonomy, sub)?,
        Some(("edit", sub)) => edit(conn, taxonomy, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn opt_string(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.get_one::<String>(id).map(|s| s.to_string())
}

fn parse_id(sub: &clap::ArgMatches) -> Result<Uuid> {
    let raw = sub.get_one::<String>("id").unwrap();
    Uuid::parse_str(raw.trim()).with_context(|| format!("Invalid expense id '{}'", raw))
}

fn add(conn: &Connection, taxonomy: &dyn Taxonomy, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let draft = ExpenseDraft {
        name: sub.get_one::<String>("name").unwrap().to_string(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        main_category: sub.get_one::<String>("category").unwrap().to_string(),
        subcategory: sub.get_one::<String>("subcategory").unwrap().to_string(),
        date,
        payment_method: opt_string(sub, "payment"),
        description: opt_string(sub, "description"),
    };
    let store = SqliteStore::new(conn);
    let e = create_expense(&store, taxonomy, &user.id, draft, Utc::now())?;
    println!(
        "Recorded {} '{}' on {} ({} / {}) id {}",
        fmt_money(&e.amount),
        e.name,
        e.date,
        e.main_category,
        e.subcategory,
        e.id
    );
    Ok(())
}

/// Flags left out keep their stored value.
fn edit(conn: &Connection, taxonomy: &dyn Taxonomy, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id = parse_id(sub)?;
    let store = SqliteStore::new(conn);
    let current = store
        .get(&user.id, &id)?
        .with_context(|| format!("Expense {} not found", id))?;

    let mut draft = ExpenseDraft::from(&current);
    if let Some(name) = opt_string(sub, "name") {
        draft.name = name;
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        draft.amount = parse_decimal(amount)?;
    }
    if let Some(cat) = opt_string(sub, "category") {
        draft.main_category = cat;
    }
    if let Some(subcat) = opt_string(sub, "subcategory") {
        draft.subcategory = subcat;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        draft.date = parse_date(d)?;
    }
    if let Some(p) = opt_string(sub, "payment") {
        draft.payment_method = Some(p);
    }
    if let Some(desc) = opt_string(sub, "description") {
        draft.description = Some(desc);
    }
    let e = update_expense(&store, taxonomy, &user.id, &id, draft, Utc::now())?;
    println!("Updated '{}' ({})", e.name, fmt_money(&e.amount));
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id = parse_id(sub)?;
    delete_expense(&SqliteStore::new(conn), &user.id, &id)?;
    println!("Removed expense {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (data, total) = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.name.clone(),
                    r.category.clone(),
                    r.subcategory.clone(),
                    r.payment_method.clone(),
                    fmt_money(&r.amount),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Name", "Category", "Subcategory", "Payment", "Amount", "Id"],
                rows,
            )
        );
        println!("Total: {} across {} expenses", fmt_money(&total), data.len());
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub subcategory: String,
    pub payment_method: String,
    pub description: String,
}

/// Expenses of the resolved user matching `--month/--year/--category`, plus their total.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<(Vec<ExpenseRow>, Decimal)> {
    let user = resolve_user(conn, sub)?;
    let year = sub.get_one::<i32>("year").copied();
    let month = sub.get_one::<u32>("month").copied();
    // A month without a year matches that month in every year.
    if let Some(y) = year {
        validate_year(y)?;
    }
    if let Some(m) = month {
        validate_month(m)?;
    }
    let filter = ExpenseFilter {
        year,
        month,
        category: opt_string(sub, "category"),
        ..ExpenseFilter::default()
    };
    let expenses = SqliteStore::new(conn).list(&user.id, &filter)?;
    let total = expenses.iter().map(|e| e.amount).sum();
    let rows = expenses
        .into_iter()
        .map(|e| ExpenseRow {
            id: e.id.to_string(),
            date: e.date.to_string(),
            name: e.name,
            amount: e.amount,
            category: e.main_category,
            subcategory: e.subcategory,
            payment_method: e.payment_method.unwrap_or_default(),
            description: e.description.unwrap_or_default(),
        })
        .collect();
    Ok((rows, total))
}
