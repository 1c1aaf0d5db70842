// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use outlay::analytics::{
    category_breakdown, category_totals, daily_spending, monthly_trend, payment_methods,
    period_summary, top_categories, trend_window,
};
use outlay::expenses::{ExpenseDraft, create_expense};
use outlay::models::{Period, ReportPeriod};
use outlay::store::{ExpenseFilter, ExpenseStore, SqliteStore};
use outlay::taxonomy::Taxonomy;
use outlay::{OutlayError, db, users};
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Accepts any main category with a handful of generic subcategories.
struct AnyCategory;

impl Taxonomy for AnyCategory {
    fn main_categories(&self) -> Vec<String> {
        Vec::new()
    }

    fn valid_subcategories(&self, _main_category: &str) -> Vec<String> {
        ["General", "Groceries", "Dining", "Bus", "Train"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> (Connection, Uuid) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let user =
        users::create_user(&conn, "ana", "ana@example.com", Some("Ana"), Some("Silva")).unwrap();
    (conn, user.id)
}

fn spend(
    conn: &Connection,
    user: &Uuid,
    on: &str,
    cat: &str,
    sub: &str,
    amount: &str,
    payment: Option<&str>,
) {
    let draft = ExpenseDraft {
        name: format!("{} on {}", sub, on),
        amount: d(amount),
        main_category: cat.to_string(),
        subcategory: sub.to_string(),
        date: date(on),
        payment_method: payment.map(str::to_string),
        description: None,
    };
    create_expense(&SqliteStore::new(conn), &AnyCategory, user, draft, Utc::now()).unwrap();
}

fn march_2024() -> Period {
    Period::new(2024, 3).unwrap()
}

#[test]
fn food_and_transit_scenario() {
    let (conn, user) = setup();
    spend(&conn, &user, "2024-03-02", "Food", "Groceries", "10.00", None);
    spend(&conn, &user, "2024-03-09", "Food", "Dining", "5.00", None);
    spend(&conn, &user, "2024-03-20", "Transit", "Bus", "15.00", None);
    let store = SqliteStore::new(&conn);

    let totals = category_totals(&store, &user, march_2024()).unwrap();
    let pairs: Vec<(&str, Decimal)> = totals
        .totals
        .iter()
        .map(|c| (c.category.as_str(), c.total))
        .collect();
    assert_eq!(pairs, vec![("Food", d("15.00")), ("Transit", d("15.00"))]);
    assert_eq!(totals.grand_total(), d("30.00"));

    let top = top_categories(&store, &user, 2024, 5).unwrap();
    assert_eq!(top.entries.len(), 2);
    assert!(top.entries.iter().all(|e| e.total == d("15.00")));
    // Equal totals keep category-name order.
    assert_eq!(top.entries[0].category, "Food");
    assert_eq!(top.entries[1].category, "Transit");
}

#[test]
fn category_totals_match_store_total_and_ignore_other_periods_and_users() {
    let (conn, user) = setup();
    let other = users::create_user(&conn, "bo", "bo@example.com", None, None).unwrap();
    spend(&conn, &user, "2024-03-01", "Housing", "General", "1200.10", Some("Bank Transfer"));
    spend(&conn, &user, "2024-03-31", "Food", "Groceries", "0.10", None);
    spend(&conn, &user, "2024-03-15", "Food", "Groceries", "0.20", None);
    spend(&conn, &user, "2024-04-01", "Food", "Groceries", "99.99", None);
    spend(&conn, &user, "2023-03-10", "Food", "Groceries", "42.00", None);
    spend(&conn, &other.id, "2024-03-10", "Food", "Groceries", "7.00", None);
    let store = SqliteStore::new(&conn);

    let totals = category_totals(&store, &user, march_2024()).unwrap();
    let listed: Decimal = store
        .list(&user, &ExpenseFilter::for_month(march_2024()))
        .unwrap()
        .iter()
        .map(|e| e.amount)
        .sum();
    assert_eq!(totals.grand_total(), listed);
    assert_eq!(totals.grand_total(), d("1200.40"));
    assert_eq!(totals.totals[0].category, "Food");
    assert_eq!(totals.totals[0].total, d("0.30"));
}

#[test]
fn daily_series_covers_every_day_of_the_month() {
    let (conn, user) = setup();
    spend(&conn, &user, "2024-02-01", "Food", "Groceries", "3.50", None);
    spend(&conn, &user, "2024-02-01", "Food", "Dining", "1.25", None);
    spend(&conn, &user, "2024-02-29", "Transit", "Train", "8.00", None);
    let store = SqliteStore::new(&conn);

    let feb = Period::new(2024, 2).unwrap();
    let daily = daily_spending(&store, &user, feb).unwrap();
    assert_eq!(daily.days.len(), 29);
    assert_eq!(daily.days[0], d("4.75"));
    assert_eq!(daily.days[28], d("8.00"));
    assert!(daily.days[1..28].iter().all(|v| v.is_zero()));
    assert_eq!(
        daily.total(),
        category_totals(&store, &user, feb).unwrap().grand_total()
    );

    let feb_2023 = daily_spending(&store, &user, Period::new(2023, 2).unwrap()).unwrap();
    assert_eq!(feb_2023.days.len(), 28);
    let april = daily_spending(&store, &user, Period::new(2024, 4).unwrap()).unwrap();
    assert_eq!(april.days.len(), 30);
    assert!(april.total().is_zero());
}

#[test]
fn trend_window_steps_thirty_days_not_calendar_months() {
    let window = trend_window(date("2024-03-31"));
    assert_eq!(
        window,
        vec![
            (2023, 5),
            (2023, 6),
            (2023, 7),
            (2023, 8),
            (2023, 9),
            (2023, 10),
            (2023, 11),
            (2023, 12),
            (2024, 1),
            (2024, 1),
            (2024, 3),
            (2024, 3),
        ]
    );
}

#[test]
fn monthly_trend_reproduces_duplicate_and_skipped_months() {
    let (conn, user) = setup();
    // One expense per calendar month, amount = month number.
    for (y, m) in [
        (2023, 4),
        (2023, 5),
        (2023, 6),
        (2023, 7),
        (2023, 8),
        (2023, 9),
        (2023, 10),
        (2023, 11),
        (2023, 12),
        (2024, 1),
        (2024, 2),
        (2024, 3),
    ] {
        let on = format!("{:04}-{:02}-15", y, m);
        spend(&conn, &user, &on, "Food", "Groceries", &m.to_string(), None);
    }
    let trend = monthly_trend(&SqliteStore::new(&conn), &user, date("2024-03-31")).unwrap();

    let labels: Vec<&str> = trend.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "May 2023", "Jun 2023", "Jul 2023", "Aug 2023", "Sep 2023", "Oct 2023", "Nov 2023",
            "Dec 2023", "Jan 2024", "Jan 2024", "Mar 2024", "Mar 2024",
        ]
    );
    let data: Vec<Decimal> = trend.points.iter().map(|p| p.total).collect();
    let expected: Vec<Decimal> = [5, 6, 7, 8, 9, 10, 11, 12, 1, 1, 3, 3]
        .into_iter()
        .map(Decimal::from)
        .collect();
    assert_eq!(data, expected);
}

#[test]
fn monthly_trend_buckets_by_year_and_month() {
    let (conn, user) = setup();
    spend(&conn, &user, "2023-03-15", "Food", "Groceries", "50.00", None);
    spend(&conn, &user, "2024-03-02", "Food", "Groceries", "7.00", None);
    // Later in the current month still counts.
    spend(&conn, &user, "2024-03-25", "Food", "Dining", "3.00", None);
    let trend = monthly_trend(&SqliteStore::new(&conn), &user, date("2024-03-10")).unwrap();
    assert_eq!(trend.points.len(), 12);
    let last = trend.points.last().unwrap();
    assert_eq!((last.year, last.month), (2024, 3));
    assert_eq!(last.total, d("10.00"));
    assert!(trend.points.iter().all(|p| p.year != 2023 || p.month != 3));
    let sum: Decimal = trend.points.iter().map(|p| p.total).sum();
    assert_eq!(sum, d("10.00"));
}

#[test]
fn breakdown_nodes_reconcile_with_children() {
    let (conn, user) = setup();
    spend(&conn, &user, "2024-03-01", "Food", "Groceries", "10.01", None);
    spend(&conn, &user, "2024-03-02", "Food", "Dining", "20.02", None);
    spend(&conn, &user, "2024-03-03", "Food", "Groceries", "0.03", None);
    spend(&conn, &user, "2024-03-04", "Transit", "Bus", "2.50", None);
    spend(&conn, &user, "2024-02-04", "Housing", "General", "900.00", None);
    let r = category_breakdown(&SqliteStore::new(&conn), &user, march_2024()).unwrap();

    let names: Vec<&str> = r.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Food", "Transit"]);
    for node in &r.nodes {
        let children: Decimal = node.children.iter().map(|c| c.value).sum();
        assert_eq!(node.value, children);
    }
    let food = &r.nodes[0];
    assert_eq!(food.value, d("30.06"));
    assert_eq!(food.children.len(), 2);
    assert_eq!(food.children[0].name, "Dining");
    assert_eq!(food.children[1].value, d("10.04"));
}

#[test]
fn top_categories_are_limited_and_descending() {
    let (conn, user) = setup();
    for (i, cat) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
        let amount = format!("{}.00", (i % 4 + 1) * 10);
        spend(&conn, &user, "2024-07-01", cat, "General", &amount, None);
    }
    spend(&conn, &user, "2023-07-01", "Z", "General", "9999.00", None);
    let store = SqliteStore::new(&conn);

    let top = top_categories(&store, &user, 2024, 5).unwrap();
    assert_eq!(top.entries.len(), 5);
    assert!(top.entries.windows(2).all(|w| w[0].total >= w[1].total));
    assert_eq!(top.entries[0].category, "D");
    assert!(top.entries.iter().all(|e| e.category != "Z"));

    assert!(top_categories(&store, &user, 2024, 0).unwrap().entries.is_empty());
    assert_eq!(top_categories(&store, &user, 2024, 50).unwrap().entries.len(), 7);
}

#[test]
fn payment_methods_skip_expenses_without_a_method() {
    let (conn, user) = setup();
    spend(&conn, &user, "2024-03-01", "Food", "Groceries", "10.00", Some("Cash"));
    spend(&conn, &user, "2024-03-02", "Food", "Groceries", "2.50", Some("Cash"));
    spend(&conn, &user, "2024-03-03", "Food", "Dining", "40.00", Some("Credit Card"));
    spend(&conn, &user, "2024-03-04", "Food", "Dining", "99.00", None);
    spend(&conn, &user, "2024-03-05", "Food", "Dining", "1.00", Some(""));
    let store = SqliteStore::new(&conn);

    let r = payment_methods(&store, &user, march_2024()).unwrap();
    let methods: Vec<(&str, Decimal, u64)> = r
        .entries
        .iter()
        .map(|m| (m.method.as_str(), m.total, m.count))
        .collect();
    assert_eq!(
        methods,
        vec![("Cash", d("12.50"), 2), ("Credit Card", d("40.00"), 1)]
    );
    let with_method = store
        .list(&user, &ExpenseFilter::for_month(march_2024()))
        .unwrap()
        .iter()
        .filter(|e| e.payment_method.is_some())
        .count() as u64;
    assert_eq!(r.entries.iter().map(|m| m.count).sum::<u64>(), with_method);
}

#[test]
fn empty_store_degrades_to_zero_shapes() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);
    let p = march_2024();

    assert!(category_totals(&store, &user, p).unwrap().totals.is_empty());
    let trend = monthly_trend(&store, &user, date("2024-03-31")).unwrap();
    assert_eq!(trend.points.len(), 12);
    assert!(trend.points.iter().all(|t| t.total.is_zero()));
    assert!(category_breakdown(&store, &user, p).unwrap().nodes.is_empty());
    let daily = daily_spending(&store, &user, p).unwrap();
    assert_eq!(daily.days.len(), 31);
    assert!(daily.total().is_zero());
    assert!(top_categories(&store, &user, 2024, 5).unwrap().entries.is_empty());
    assert!(payment_methods(&store, &user, p).unwrap().entries.is_empty());

    let summary = period_summary(&store, &user, ReportPeriod::Month(p)).unwrap();
    assert_eq!(summary.count, 0);
    assert!(summary.total.is_zero());
    assert!(summary.average.is_zero());
}

#[test]
fn period_summary_averages_to_the_cent() {
    let (conn, user) = setup();
    spend(&conn, &user, "2024-03-01", "Food", "Groceries", "10.00", None);
    spend(&conn, &user, "2024-03-02", "Food", "Groceries", "10.00", None);
    spend(&conn, &user, "2024-11-02", "Food", "Groceries", "0.01", None);
    let store = SqliteStore::new(&conn);

    let year = period_summary(&store, &user, ReportPeriod::Year(2024)).unwrap();
    assert_eq!(year.total, d("20.01"));
    assert_eq!(year.count, 3);
    assert_eq!(year.average, d("6.67"));
}

#[test]
fn out_of_range_periods_are_rejected_not_clamped() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);

    for bad in [Period::new(2024, 0), Period::new(2024, 13), Period::new(1800, 3)] {
        let err = bad.unwrap_err();
        assert!(matches!(err, OutlayError::InvalidPeriod(_)));
        assert!(err.is_client_error());
    }
    let err = top_categories(&store, &user, 10_000, 5).unwrap_err();
    assert!(matches!(err, OutlayError::InvalidPeriod(_)));
}

#[test]
fn store_failures_surface_as_server_errors() {
    let conn = Connection::open_in_memory().unwrap();
    // No schema: every query fails.
    let err = category_totals(&SqliteStore::new(&conn), &Uuid::new_v4(), march_2024()).unwrap_err();
    assert!(matches!(err, OutlayError::StoreUnavailable(_)));
    assert!(!err.is_client_error());
}
