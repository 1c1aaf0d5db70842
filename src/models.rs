// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OutlayError, Result};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

pub const PAYMENT_METHODS: &[&str] = &[
    "Cash",
    "Credit Card",
    "Debit Card",
    "Bank Transfer",
    "Check",
    "PayPal",
    "Venmo",
    "Other",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the account is deactivated; the row itself is kept.
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub main_category: String,
    pub subcategory: String,
    pub date: NaiveDate,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        Ok(Self {
            year: validate_year(year)?,
            month: validate_month(month)?,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ => {
                if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() {
                    29
                } else {
                    28
                }
            }
        }
    }

    /// "March 2024"
    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

/// The span a report covers: a whole year, or one month of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportPeriod {
    Year(i32),
    Month(Period),
}

impl ReportPeriod {
    /// `month == 0` selects the whole year.
    pub fn from_parts(year: i32, month: u32) -> Result<Self> {
        if month == 0 {
            Ok(ReportPeriod::Year(validate_year(year)?))
        } else {
            Ok(ReportPeriod::Month(Period::new(year, month)?))
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            ReportPeriod::Year(y) => *y,
            ReportPeriod::Month(p) => p.year(),
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            ReportPeriod::Year(_) => None,
            ReportPeriod::Month(p) => Some(p.month()),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ReportPeriod::Year(y) => format!("Year {}", y),
            ReportPeriod::Month(p) => p.title(),
        }
    }
}

pub fn validate_year(year: i32) -> Result<i32> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(OutlayError::InvalidPeriod(format!(
            "year {} is outside {}-{}",
            year, MIN_YEAR, MAX_YEAR
        )))
    }
}

pub fn validate_month(month: u32) -> Result<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(OutlayError::InvalidPeriod(format!(
            "month {} is outside 1-12",
            month
        )))
    }
}

/// Full English month name for 1-12; empty for anything else.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("")
}
