// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rollups over one user's expenses.
//!
//! Every function here is a pure read against an [`ExpenseStore`]: the same
//! store contents always produce the same result, and an empty store yields
//! the zero-valued shape rather than an error. Group order follows the store
//! (ascending key), which is also the tie-break wherever totals are ranked.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{OutlayError, Result};
use crate::models::{Period, ReportPeriod, validate_year};
use crate::store::{ExpenseFilter, ExpenseStore, GroupField};

pub const TREND_POINTS: usize = 12;
pub const TREND_STEP_DAYS: i64 = 30;
pub const TREND_LOOKBACK_DAYS: i64 = 365;
pub const DEFAULT_TOP_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub period: Period,
    pub totals: Vec<CategoryTotal>,
}

impl CategoryTotals {
    pub fn grand_total(&self) -> Decimal {
        self.totals.iter().map(|c| c.total).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownLeaf {
    pub name: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownNode {
    pub name: String,
    pub value: Decimal,
    pub children: Vec<BreakdownLeaf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub period: Period,
    pub nodes: Vec<BreakdownNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySpending {
    pub period: Period,
    /// Index 0 is the first of the month.
    pub days: Vec<Decimal>,
}

impl DailySpending {
    pub fn total(&self) -> Decimal {
        self.days.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCategories {
    pub year: i32,
    pub entries: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethodTotal {
    pub method: String,
    pub total: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethodBreakdown {
    pub period: Period,
    pub entries: Vec<PaymentMethodTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub total: Decimal,
    pub count: u64,
    pub average: Decimal,
}

pub fn category_totals<S: ExpenseStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    period: Period,
) -> Result<CategoryTotals> {
    let rows = store.sum_and_count_by(
        user_id,
        &ExpenseFilter::for_month(period),
        &[GroupField::MainCategory],
    )?;
    let totals = rows
        .into_iter()
        .map(|r| CategoryTotal {
            category: r.text(0).unwrap_or_default().to_string(),
            total: r.sum,
        })
        .collect();
    Ok(CategoryTotals { period, totals })
}

/// The twelve `(year, month)` buckets ending at `today`, oldest first.
///
/// Buckets are found by stepping back a flat 30 days at a time, not by
/// calendar month, so a month can show up twice while its neighbour is
/// skipped.
pub fn trend_window(today: NaiveDate) -> Vec<(i32, u32)> {
    let mut window: Vec<(i32, u32)> = (0..TREND_POINTS as i64)
        .map(|i| {
            let d = today - Duration::days(TREND_STEP_DAYS * i);
            (d.year(), d.month())
        })
        .collect();
    window.reverse();
    window
}

pub fn monthly_trend<S: ExpenseStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    today: NaiveDate,
) -> Result<MonthlyTrend> {
    let since = today - Duration::days(TREND_LOOKBACK_DAYS);
    let rows = store.sum_and_count_by(
        user_id,
        &ExpenseFilter::default().since(since),
        &[GroupField::Year, GroupField::Month],
    )?;
    let by_month: HashMap<(i64, i64), Decimal> = rows
        .iter()
        .filter_map(|r| Some(((r.int(0)?, r.int(1)?), r.sum)))
        .collect();

    let points = trend_window(today)
        .into_iter()
        .map(|(year, month)| TrendPoint {
            label: format!("{} {}", short_month(month), year),
            year,
            month,
            total: by_month
                .get(&(year as i64, month as i64))
                .copied()
                .unwrap_or(Decimal::ZERO),
        })
        .collect();
    Ok(MonthlyTrend { points })
}

pub fn category_breakdown<S: ExpenseStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    period: Period,
) -> Result<CategoryBreakdown> {
    let rows = store.sum_and_count_by(
        user_id,
        &ExpenseFilter::for_month(period),
        &[GroupField::MainCategory, GroupField::Subcategory],
    )?;
    let mut nodes: Vec<BreakdownNode> = Vec::new();
    for r in rows {
        let main = r.text(0).unwrap_or_default();
        let leaf = BreakdownLeaf {
            name: r.text(1).unwrap_or_default().to_string(),
            value: r.sum,
        };
        // Rows arrive sorted by main category, so a new name opens a new node.
        match nodes.last_mut() {
            Some(node) if node.name == main => node.children.push(leaf),
            _ => nodes.push(BreakdownNode {
                name: main.to_string(),
                value: Decimal::ZERO,
                children: vec![leaf],
            }),
        }
    }
    for node in &mut nodes {
        node.value = node.children.iter().map(|c| c.value).sum();
    }
    Ok(CategoryBreakdown { period, nodes })
}

pub fn daily_spending<S: ExpenseStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    period: Period,
) -> Result<DailySpending> {
    let rows = store.sum_and_count_by(
        user_id,
        &ExpenseFilter::for_month(period),
        &[GroupField::Day],
    )?;
    let mut days = vec![Decimal::ZERO; period.days_in_month() as usize];
    for r in rows {
        let slot = r
            .int(0)
            .and_then(|d| usize::try_from(d - 1).ok())
            .and_then(|i| days.get_mut(i));
        match slot {
            Some(slot) => *slot = r.sum,
            None => {
                return Err(OutlayError::CorruptRecord(format!(
                    "day {:?} outside {}",
                    r.keys.first(),
                    period.title()
                )));
            }
        }
    }
    Ok(DailySpending { period, days })
}

pub fn top_categories<S: ExpenseStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    year: i32,
    limit: usize,
) -> Result<TopCategories> {
    let year = validate_year(year)?;
    let rows = store.sum_and_count_by(
        user_id,
        &ExpenseFilter::for_year(year),
        &[GroupField::MainCategory],
    )?;
    let mut entries: Vec<CategoryTotal> = rows
        .into_iter()
        .map(|r| CategoryTotal {
            category: r.text(0).unwrap_or_default().to_string(),
            total: r.sum,
        })
        .collect();
    // Stable: equal totals keep category-name order.
    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries.truncate(limit);
    Ok(TopCategories { year, entries })
}

pub fn payment_methods<S: ExpenseStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    period: Period,
) -> Result<PaymentMethodBreakdown> {
    let rows = store.sum_and_count_by(
        user_id,
        &ExpenseFilter::for_month(period).with_payment_method(),
        &[GroupField::PaymentMethod],
    )?;
    let entries = rows
        .into_iter()
        .filter_map(|r| {
            Some(PaymentMethodTotal {
                method: r.text(0)?.to_string(),
                total: r.sum,
                count: r.count,
            })
        })
        .collect();
    Ok(PaymentMethodBreakdown { period, entries })
}

/// Total, count and average spend for a month or a whole year.
pub fn period_summary<S: ExpenseStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    period: ReportPeriod,
) -> Result<PeriodSummary> {
    let rows = store.sum_and_count_by(user_id, &ExpenseFilter::for_report(period), &[])?;
    let (total, count) = rows
        .iter()
        .fold((Decimal::ZERO, 0u64), |(t, c), r| (t + r.sum, c + r.count));
    Ok(PeriodSummary {
        total,
        count,
        average: average(total, count),
    })
}

pub(crate) fn average(total: Decimal, count: u64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        (total / Decimal::from(count)).round_dp(2)
    }
}

pub(crate) fn short_month(month: u32) -> &'static str {
    let name = crate::models::month_name(month);
    name.get(..3).unwrap_or(name)
}
