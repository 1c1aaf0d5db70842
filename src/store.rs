// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Query surface over the expense collection.
//!
//! Everything the analytics engine and the report builder need goes through
//! [`ExpenseStore`]: a filtered listing and a grouped sum/count. Amounts are
//! stored as TEXT and summed as [`Decimal`] in Rust, never through SQLite's
//! floating-point `SUM`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{OutlayError, Result};
use crate::models::{Expense, Period, ReportPeriod};

/// Conjunctive filter over one user's expenses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub category: Option<String>,
    /// Inclusive lower bound on the expense date.
    pub since: Option<NaiveDate>,
    /// Drop expenses without a payment method.
    pub with_payment_method: bool,
}

impl ExpenseFilter {
    pub fn for_month(period: Period) -> Self {
        Self {
            year: Some(period.year()),
            month: Some(period.month()),
            ..Self::default()
        }
    }

    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn for_report(period: ReportPeriod) -> Self {
        match period {
            ReportPeriod::Year(y) => Self::for_year(y),
            ReportPeriod::Month(p) => Self::for_month(p),
        }
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_payment_method(mut self) -> Self {
        self.with_payment_method = true;
        self
    }

    fn where_clause(&self, user_id: &Uuid) -> (String, Vec<String>) {
        let mut sql = String::from(" WHERE user_id=?");
        let mut params_vec = vec![user_id.to_string()];
        if let Some(y) = self.year {
            sql.push_str(" AND substr(date,1,4)=?");
            params_vec.push(format!("{:04}", y));
        }
        if let Some(m) = self.month {
            sql.push_str(" AND substr(date,6,2)=?");
            params_vec.push(format!("{:02}", m));
        }
        if let Some(d) = self.day {
            sql.push_str(" AND substr(date,9,2)=?");
            params_vec.push(format!("{:02}", d));
        }
        if let Some(c) = &self.category {
            sql.push_str(" AND main_category=?");
            params_vec.push(c.clone());
        }
        if let Some(since) = self.since {
            sql.push_str(" AND date>=?");
            params_vec.push(since.to_string());
        }
        if self.with_payment_method {
            sql.push_str(" AND payment_method IS NOT NULL");
        }
        (sql, params_vec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    MainCategory,
    Subcategory,
    PaymentMethod,
    Year,
    Month,
    Day,
}

impl GroupField {
    fn column(&self) -> &'static str {
        match self {
            GroupField::MainCategory => "main_category",
            GroupField::Subcategory => "subcategory",
            GroupField::PaymentMethod => "payment_method",
            GroupField::Year => "CAST(substr(date,1,4) AS INTEGER)",
            GroupField::Month => "CAST(substr(date,6,2) AS INTEGER)",
            GroupField::Day => "CAST(substr(date,9,2) AS INTEGER)",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, GroupField::Year | GroupField::Month | GroupField::Day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Null,
    Int(i64),
    Text(String),
}

impl GroupKey {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GroupKey::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            GroupKey::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// One bucket of a grouped query, keys in the order they were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRow {
    pub keys: Vec<GroupKey>,
    pub sum: Decimal,
    pub count: u64,
}

impl GroupRow {
    pub fn text(&self, idx: usize) -> Option<&str> {
        self.keys.get(idx).and_then(GroupKey::as_text)
    }

    pub fn int(&self, idx: usize) -> Option<i64> {
        self.keys.get(idx).and_then(GroupKey::as_int)
    }
}

pub trait ExpenseStore {
    /// Matching expenses, newest date first.
    fn list(&self, user_id: &Uuid, filter: &ExpenseFilter) -> Result<Vec<Expense>>;

    /// Sum and count per distinct combination of `group_by`, in ascending key order.
    fn sum_and_count_by(
        &self,
        user_id: &Uuid,
        filter: &ExpenseFilter,
        group_by: &[GroupField],
    ) -> Result<Vec<GroupRow>>;
}

const EXPENSE_COLUMNS: &str = "id, user_id, name, amount, main_category, subcategory, date, payment_method, description, created_at, updated_at";

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, e: &Expense) -> Result<()> {
        self.conn.execute(
            "INSERT INTO expenses(id, user_id, name, amount, main_category, subcategory, date, payment_method, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                e.id.to_string(),
                e.user_id.to_string(),
                e.name,
                format!("{:.2}", e.amount),
                e.main_category,
                e.subcategory,
                e.date.to_string(),
                e.payment_method,
                e.description,
                fmt_timestamp(&e.created_at),
                fmt_timestamp(&e.updated_at),
            ],
        )?;
        tracing::info!(expense = %e.id, user = %e.user_id, "expense recorded");
        Ok(())
    }

    /// Rewrites every mutable field; false when the expense is not owned by `e.user_id`.
    pub fn update(&self, e: &Expense) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE expenses SET name=?1, amount=?2, main_category=?3, subcategory=?4, date=?5,
                payment_method=?6, description=?7, updated_at=?8
             WHERE id=?9 AND user_id=?10",
            params![
                e.name,
                format!("{:.2}", e.amount),
                e.main_category,
                e.subcategory,
                e.date.to_string(),
                e.payment_method,
                e.description,
                fmt_timestamp(&e.updated_at),
                e.id.to_string(),
                e.user_id.to_string(),
            ],
        )?;
        tracing::info!(expense = %e.id, changed, "expense updated");
        Ok(changed == 1)
    }

    pub fn delete(&self, user_id: &Uuid, id: &Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM expenses WHERE id=?1 AND user_id=?2",
            params![id.to_string(), user_id.to_string()],
        )?;
        tracing::info!(expense = %id, changed, "expense deleted");
        Ok(changed == 1)
    }

    pub fn get(&self, user_id: &Uuid, id: &Uuid) -> Result<Option<Expense>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses WHERE id=?1 AND user_id=?2",
                    EXPENSE_COLUMNS
                ),
                params![id.to_string(), user_id.to_string()],
                RawExpense::from_row,
            )
            .optional()?;
        raw.map(RawExpense::into_expense).transpose()
    }
}

impl ExpenseStore for SqliteStore<'_> {
    fn list(&self, user_id: &Uuid, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let (where_sql, params_vec) = filter.where_clause(user_id);
        let sql = format!(
            "SELECT {} FROM expenses{} ORDER BY date DESC, created_at DESC, id DESC",
            EXPENSE_COLUMNS, where_sql
        );
        tracing::debug!(%sql, "listing expenses");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params_vec.iter()))?;
        let mut data = Vec::new();
        while let Some(r) = rows.next()? {
            data.push(RawExpense::from_row(r)?.into_expense()?);
        }
        Ok(data)
    }

    fn sum_and_count_by(
        &self,
        user_id: &Uuid,
        filter: &ExpenseFilter,
        group_by: &[GroupField],
    ) -> Result<Vec<GroupRow>> {
        let (where_sql, params_vec) = filter.where_clause(user_id);
        let mut cols: Vec<&str> = group_by.iter().map(GroupField::column).collect();
        cols.push("amount");
        let sql = format!("SELECT {} FROM expenses{}", cols.join(", "), where_sql);
        tracing::debug!(%sql, "grouping expenses");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params_vec.iter()))?;
        let mut groups: BTreeMap<Vec<GroupKey>, (Decimal, u64)> = BTreeMap::new();
        while let Some(r) = rows.next()? {
            let mut keys = Vec::with_capacity(group_by.len());
            for (i, field) in group_by.iter().enumerate() {
                let key = if field.is_numeric() {
                    r.get::<_, Option<i64>>(i)?
                        .map(GroupKey::Int)
                        .unwrap_or(GroupKey::Null)
                } else {
                    r.get::<_, Option<String>>(i)?
                        .map(GroupKey::Text)
                        .unwrap_or(GroupKey::Null)
                };
                keys.push(key);
            }
            let amount_s: String = r.get(group_by.len())?;
            let amount = parse_amount(&amount_s)?;
            let entry = groups.entry(keys).or_insert((Decimal::ZERO, 0));
            entry.0 += amount;
            entry.1 += 1;
        }
        Ok(groups
            .into_iter()
            .map(|(keys, (sum, count))| GroupRow { keys, sum, count })
            .collect())
    }
}

struct RawExpense {
    id: String,
    user_id: String,
    name: String,
    amount: String,
    main_category: String,
    subcategory: String,
    date: String,
    payment_method: Option<String>,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawExpense {
    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            amount: r.get(3)?,
            main_category: r.get(4)?,
            subcategory: r.get(5)?,
            date: r.get(6)?,
            payment_method: r.get(7)?,
            description: r.get(8)?,
            created_at: r.get(9)?,
            updated_at: r.get(10)?,
        })
    }

    fn into_expense(self) -> Result<Expense> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            OutlayError::CorruptRecord(format!("date '{}' on expense {}", self.date, self.id))
        })?;
        Ok(Expense {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            name: self.name,
            amount: parse_amount(&self.amount)?,
            main_category: self.main_category,
            subcategory: self.subcategory,
            date,
            payment_method: self.payment_method,
            description: self.description,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_amount(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| OutlayError::CorruptRecord(format!("amount '{}'", s)))
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| OutlayError::CorruptRecord(format!("id '{}'", s)))
}

pub(crate) fn fmt_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| OutlayError::CorruptRecord(format!("timestamp '{}'", s)))
}
