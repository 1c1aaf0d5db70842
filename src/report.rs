// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Expense report assembly.
//!
//! [`assemble_report`] collects everything the document shows into a plain
//! [`Report`]; [`crate::pdf`] lays it out. [`build_report`] does both and
//! names the file.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::analytics::{PeriodSummary, period_summary};
use crate::error::Result;
use crate::models::{ReportPeriod, User};
use crate::store::{ExpenseFilter, ExpenseStore, GroupField};
use crate::utils::truncate_label;

pub const TOP_EXPENSES: usize = 10;
pub const NAME_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLine {
    pub category: String,
    pub amount: Decimal,
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopExpenseLine {
    pub date: NaiveDate,
    pub name: String,
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentLine {
    pub method: String,
    pub amount: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub period: ReportPeriod,
    pub period_label: String,
    pub generated_for: String,
    pub generated_at: DateTime<Utc>,
    pub summary: PeriodSummary,
    /// Largest amount first.
    pub categories: Vec<CategoryLine>,
    pub top_expenses: Vec<TopExpenseLine>,
    /// `None` when no expense in the period has a payment method.
    pub payment_methods: Option<Vec<PaymentLine>>,
}

pub fn assemble_report<S: ExpenseStore + ?Sized>(
    store: &S,
    user: &User,
    period: ReportPeriod,
    generated_at: DateTime<Utc>,
) -> Result<Report> {
    let filter = ExpenseFilter::for_report(period);
    let summary = period_summary(store, &user.id, period)?;

    let mut by_category = store.sum_and_count_by(&user.id, &filter, &[GroupField::MainCategory])?;
    by_category.sort_by(|a, b| b.sum.cmp(&a.sum));
    let amounts: Vec<Decimal> = by_category.iter().map(|r| r.sum).collect();
    let categories = by_category
        .iter()
        .zip(percent_shares(&amounts, summary.total))
        .map(|(r, percent)| CategoryLine {
            category: r.text(0).unwrap_or_default().to_string(),
            amount: r.sum,
            percent,
        })
        .collect();

    let mut expenses = store.list(&user.id, &filter)?;
    // Stable sort: equal amounts stay in retrieval order.
    expenses.sort_by(|a, b| b.amount.cmp(&a.amount));
    let top_expenses = expenses
        .iter()
        .take(TOP_EXPENSES)
        .map(|e| TopExpenseLine {
            date: e.date,
            name: truncate_label(&e.name, NAME_WIDTH),
            category: e.main_category.clone(),
            amount: e.amount,
        })
        .collect();

    let payment_methods = if expenses.iter().any(|e| e.payment_method.is_some()) {
        let mut rows = store.sum_and_count_by(
            &user.id,
            &filter.clone().with_payment_method(),
            &[GroupField::PaymentMethod],
        )?;
        rows.sort_by(|a, b| b.sum.cmp(&a.sum));
        Some(
            rows.into_iter()
                .map(|r| PaymentLine {
                    method: r.text(0).unwrap_or_default().to_string(),
                    amount: r.sum,
                    count: r.count,
                })
                .collect(),
        )
    } else {
        None
    };

    Ok(Report {
        period,
        period_label: period.title(),
        generated_for: format!("{} ({})", user.display_name(), user.username),
        generated_at,
        summary,
        categories,
        top_expenses,
        payment_methods,
    })
}

/// Renders the report for `month`/`year` (`month == 0` is the whole year).
pub fn build_report<S: ExpenseStore + ?Sized>(
    store: &S,
    user: &User,
    month: u32,
    year: i32,
    generated_at: DateTime<Utc>,
) -> Result<(Vec<u8>, String)> {
    let period = ReportPeriod::from_parts(year, month)?;
    let report = assemble_report(store, user, period, generated_at)?;
    let bytes = crate::pdf::render(&report)?;
    let filename = report_filename(period, &user.username);
    tracing::info!(
        user = %user.id,
        %filename,
        bytes = bytes.len(),
        "report generated"
    );
    Ok((bytes, filename))
}

pub fn report_filename(period: ReportPeriod, username: &str) -> String {
    let who: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    match period {
        ReportPeriod::Year(y) => format!("expense_report_{}_{}.pdf", y, who),
        ReportPeriod::Month(p) => {
            format!("expense_report_{}_{:02}_{}.pdf", p.year(), p.month(), who)
        }
    }
}

/// Share of `total` for each amount, in percent with one decimal.
///
/// Rounded by largest remainder so the shares add up to exactly 100.0 when
/// `total` is positive; all zero otherwise.
pub fn percent_shares(amounts: &[Decimal], total: Decimal) -> Vec<Decimal> {
    if total <= Decimal::ZERO {
        return vec![Decimal::ZERO; amounts.len()];
    }
    // Work in tenths of a percent.
    let scale = Decimal::ONE_THOUSAND;
    let raw: Vec<Decimal> = amounts.iter().map(|a| a * scale / total).collect();
    let mut tenths: Vec<Decimal> = raw.iter().map(|r| r.floor()).collect();
    let assigned: Decimal = tenths.iter().sum();
    let missing = (scale - assigned).to_usize().unwrap_or(0);

    let mut by_remainder: Vec<usize> = (0..raw.len()).collect();
    by_remainder.sort_by(|&a, &b| (raw[b] - tenths[b]).cmp(&(raw[a] - tenths[a])));
    for &i in by_remainder.iter().take(missing) {
        tenths[i] += Decimal::ONE;
    }
    tenths.into_iter().map(|t| t / Decimal::TEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn thirds_round_to_exactly_one_hundred() {
        let shares = percent_shares(&[d("10"), d("10"), d("10")], d("30"));
        assert_eq!(shares, vec![d("33.4"), d("33.3"), d("33.3")]);
        assert_eq!(shares.iter().sum::<Decimal>(), d("100"));
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        assert_eq!(percent_shares(&[Decimal::ZERO], Decimal::ZERO), vec![Decimal::ZERO]);
        assert!(percent_shares(&[], Decimal::ZERO).is_empty());
    }

    #[test]
    fn filenames_differ_for_year_and_month() {
        let p = ReportPeriod::from_parts(2024, 0).unwrap();
        assert_eq!(report_filename(p, "ana"), "expense_report_2024_ana.pdf");
        let p = ReportPeriod::from_parts(2024, 3).unwrap();
        assert_eq!(report_filename(p, "ana b/c"), "expense_report_2024_03_ana_b_c.pdf");
    }
}
