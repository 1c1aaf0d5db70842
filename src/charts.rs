// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Label/dataset payloads for a Chart.js-style front end.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::analytics::{
    CategoryBreakdown, CategoryTotals, DailySpending, MonthlyTrend, PaymentMethodBreakdown,
    TopCategories,
};

pub const CATEGORY_PALETTE: &[&str] = &[
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#FF6384", "#C9CBCF",
    "#4BC0C0", "#FF6384", "#36A2EB", "#FFCE56", "#FF9F40", "#9966FF", "#C9CBCF",
];
pub const TOP_CATEGORY_PALETTE: &[&str] = &["#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF"];
pub const PAYMENT_PALETTE: &[&str] = &["#FF9F40", "#FF6384", "#C9CBCF", "#4BC0C0", "#36A2EB"];
pub const TREND_COLOR: &str = "#36A2EB";
pub const DAILY_COLOR: &str = "#4BC0C0";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartLabel {
    Text(String),
    Day(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    Single(&'static str),
    PerPoint(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub data: Vec<f64>,
    pub background_color: Colors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

impl Dataset {
    fn new(label: Option<&'static str>, data: Vec<f64>, background_color: Colors) -> Self {
        Self {
            label,
            data,
            background_color,
            border_color: None,
            border_width: None,
            fill: None,
            tension: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub labels: Vec<ChartLabel>,
    pub datasets: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapLeaf {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub name: String,
    pub children: Vec<TreemapLeaf>,
    pub value: f64,
}

/// `palette` repeated until it covers `len` points.
pub fn cycled(palette: &[&'static str], len: usize) -> Vec<&'static str> {
    palette.iter().copied().cycle().take(len).collect()
}

fn to_f64(d: &Decimal) -> f64 {
    d.to_f64().unwrap_or_default()
}

fn text_labels<'a>(names: impl Iterator<Item = &'a str>) -> Vec<ChartLabel> {
    names.map(|n| ChartLabel::Text(n.to_string())).collect()
}

/// Pie chart of one month's category totals.
pub fn category_totals_chart(r: &CategoryTotals) -> ChartPayload {
    let data: Vec<f64> = r.totals.iter().map(|c| to_f64(&c.total)).collect();
    let colors = Colors::PerPoint(cycled(CATEGORY_PALETTE, data.len()));
    ChartPayload {
        labels: text_labels(r.totals.iter().map(|c| c.category.as_str())),
        datasets: vec![Dataset::new(None, data, colors)],
        counts: None,
    }
}

pub fn monthly_trend_chart(r: &MonthlyTrend) -> ChartPayload {
    let data = r.points.iter().map(|p| to_f64(&p.total)).collect();
    let dataset = Dataset {
        border_color: Some(TREND_COLOR),
        fill: Some(false),
        tension: Some(0.4),
        ..Dataset::new(Some("Monthly Expenses"), data, Colors::Single(TREND_COLOR))
    };
    ChartPayload {
        labels: text_labels(r.points.iter().map(|p| p.label.as_str())),
        datasets: vec![dataset],
        counts: None,
    }
}

pub fn daily_spending_chart(r: &DailySpending) -> ChartPayload {
    let data = r.days.iter().map(to_f64).collect();
    let dataset = Dataset {
        border_color: Some(DAILY_COLOR),
        border_width: Some(1),
        ..Dataset::new(Some("Daily Spending"), data, Colors::Single(DAILY_COLOR))
    };
    ChartPayload {
        labels: (1..=r.days.len() as u32).map(ChartLabel::Day).collect(),
        datasets: vec![dataset],
        counts: None,
    }
}

pub fn top_categories_chart(r: &TopCategories) -> ChartPayload {
    let data: Vec<f64> = r.entries.iter().map(|c| to_f64(&c.total)).collect();
    let colors = Colors::PerPoint(cycled(TOP_CATEGORY_PALETTE, data.len()));
    ChartPayload {
        labels: text_labels(r.entries.iter().map(|c| c.category.as_str())),
        datasets: vec![Dataset::new(Some("Total Spent"), data, colors)],
        counts: None,
    }
}

pub fn payment_methods_chart(r: &PaymentMethodBreakdown) -> ChartPayload {
    let data: Vec<f64> = r.entries.iter().map(|m| to_f64(&m.total)).collect();
    let colors = Colors::PerPoint(cycled(PAYMENT_PALETTE, data.len()));
    ChartPayload {
        labels: text_labels(r.entries.iter().map(|m| m.method.as_str())),
        datasets: vec![Dataset::new(
            Some("Amount by Payment Method"),
            data,
            colors,
        )],
        counts: Some(r.entries.iter().map(|m| m.count).collect()),
    }
}

/// Treemap/sunburst nodes; subcategories nest under their main category.
pub fn breakdown_tree(r: &CategoryBreakdown) -> Vec<TreemapNode> {
    r.nodes
        .iter()
        .map(|n| TreemapNode {
            name: n.name.clone(),
            children: n
                .children
                .iter()
                .map(|c| TreemapLeaf {
                    name: c.name.clone(),
                    value: to_f64(&c.value),
                })
                .collect(),
            value: to_f64(&n.value),
        })
        .collect()
}
