// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use outlay::expenses::{ExpenseDraft, create_expense, delete_expense, update_expense};
use outlay::models::User;
use outlay::store::{ExpenseFilter, ExpenseStore, SqliteStore};
use outlay::taxonomy::StaticTaxonomy;
use outlay::{OutlayError, cli, commands, db, users};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (Connection, User) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let user = users::create_user(&conn, "ana", "ana@example.com", None, None).unwrap();
    (conn, user)
}

fn draft() -> ExpenseDraft {
    ExpenseDraft {
        name: "  Weekly shop ".into(),
        amount: d("54.3"),
        main_category: "Food & Groceries".into(),
        subcategory: "Groceries".into(),
        date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        payment_method: Some("Debit Card".into()),
        description: Some("   ".into()),
    }
}

fn rejected(conn: &Connection, user: &User, bad: ExpenseDraft) -> OutlayError {
    create_expense(
        &SqliteStore::new(conn),
        &StaticTaxonomy,
        &user.id,
        bad,
        Utc::now(),
    )
    .unwrap_err()
}

#[test]
fn create_normalizes_and_persists() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);
    let e = create_expense(&store, &StaticTaxonomy, &user.id, draft(), Utc::now()).unwrap();

    assert_eq!(e.name, "Weekly shop");
    assert_eq!(e.description, None);
    assert_eq!(e.created_at, e.updated_at);
    let stored = store.get(&user.id, &e.id).unwrap().unwrap();
    assert_eq!(stored.amount, d("54.30"));
    assert_eq!(stored.payment_method.as_deref(), Some("Debit Card"));
    assert_eq!(stored.date, e.date);
}

#[test]
fn invalid_drafts_are_rejected() {
    let (conn, user) = setup();
    let cases = [
        ExpenseDraft { name: "   ".into(), ..draft() },
        ExpenseDraft { name: "x".repeat(65), ..draft() },
        ExpenseDraft { amount: Decimal::ZERO, ..draft() },
        ExpenseDraft { amount: d("-3.00"), ..draft() },
        ExpenseDraft { amount: d("1.005"), ..draft() },
        ExpenseDraft { subcategory: "Fuel".into(), ..draft() },
        ExpenseDraft { main_category: "Snacks".into(), ..draft() },
        ExpenseDraft { payment_method: Some("Bitcoin".into()), ..draft() },
        ExpenseDraft { description: Some("d".repeat(256)), ..draft() },
        ExpenseDraft { date: NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap(), ..draft() },
        ExpenseDraft { date: NaiveDate::from_ymd_opt(-5, 1, 1).unwrap(), ..draft() },
        ExpenseDraft { date: NaiveDate::from_ymd_opt(1899, 12, 31).unwrap(), ..draft() },
    ];
    for bad in cases {
        let err = rejected(&conn, &user, bad);
        assert!(matches!(err, OutlayError::Validation(_)), "{err}");
        assert!(err.is_client_error());
    }
    let all = SqliteStore::new(&conn)
        .list(&user.id, &ExpenseFilter::default())
        .unwrap();
    assert!(all.is_empty());
}

#[test]
fn dates_at_the_year_bounds_are_accepted_and_listed() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);
    for on in [(1900, 1, 1), (9999, 12, 31)] {
        let draft = ExpenseDraft {
            date: NaiveDate::from_ymd_opt(on.0, on.1, on.2).unwrap(),
            ..draft()
        };
        create_expense(&store, &StaticTaxonomy, &user.id, draft, Utc::now()).unwrap();
    }
    let far = ExpenseDraft {
        date: NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap(),
        ..draft()
    };
    assert!(create_expense(&store, &StaticTaxonomy, &user.id, far, Utc::now()).is_err());

    // Every stored expense is reachable through a year filter.
    let all = store.list(&user.id, &ExpenseFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    for year in [1900, 9999] {
        assert_eq!(store.list(&user.id, &ExpenseFilter::for_year(year)).unwrap().len(), 1);
    }
}

#[test]
fn empty_payment_method_is_stored_as_none() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);
    let e = create_expense(
        &store,
        &StaticTaxonomy,
        &user.id,
        ExpenseDraft { payment_method: Some(String::new()), ..draft() },
        Utc::now(),
    )
    .unwrap();
    assert_eq!(e.payment_method, None);
}

#[test]
fn update_refreshes_updated_at_only() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);
    let created = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
    let e = create_expense(&store, &StaticTaxonomy, &user.id, draft(), created).unwrap();

    let later = created + Duration::hours(3);
    let changed = ExpenseDraft {
        amount: d("60.00"),
        subcategory: "Dining Out".into(),
        ..draft()
    };
    let updated = update_expense(&store, &StaticTaxonomy, &user.id, &e.id, changed, later).unwrap();
    assert_eq!(updated.id, e.id);
    assert_eq!(updated.created_at, created);
    assert_eq!(updated.updated_at, later);

    let stored = store.get(&user.id, &e.id).unwrap().unwrap();
    assert_eq!(stored.amount, d("60.00"));
    assert_eq!(stored.subcategory, "Dining Out");
    assert_eq!(stored.created_at, created);
    assert_eq!(stored.updated_at, later);
}

#[test]
fn other_users_cannot_touch_an_expense() {
    let (conn, user) = setup();
    let other = users::create_user(&conn, "bo", "bo@example.com", None, None).unwrap();
    let store = SqliteStore::new(&conn);
    let e = create_expense(&store, &StaticTaxonomy, &user.id, draft(), Utc::now()).unwrap();

    let err = update_expense(&store, &StaticTaxonomy, &other.id, &e.id, draft(), Utc::now())
        .unwrap_err();
    assert!(matches!(err, OutlayError::ExpenseNotFound(id) if id == e.id));
    let err = delete_expense(&store, &other.id, &e.id).unwrap_err();
    assert!(matches!(err, OutlayError::ExpenseNotFound(_)));
    assert!(store.get(&other.id, &e.id).unwrap().is_none());

    delete_expense(&store, &user.id, &e.id).unwrap();
    assert!(store.get(&user.id, &e.id).unwrap().is_none());
    assert!(delete_expense(&store, &user.id, &e.id).is_err());
}

#[test]
fn list_filters_combine() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);
    for (on, cat, sub) in [
        ("2024-03-01", "Food & Groceries", "Groceries"),
        ("2024-03-15", "Transportation", "Fuel"),
        ("2024-03-15", "Food & Groceries", "Coffee Shops"),
        ("2023-03-15", "Food & Groceries", "Groceries"),
        ("2024-04-01", "Food & Groceries", "Groceries"),
    ] {
        let draft = ExpenseDraft {
            main_category: cat.into(),
            subcategory: sub.into(),
            date: NaiveDate::parse_from_str(on, "%Y-%m-%d").unwrap(),
            ..draft()
        };
        create_expense(&store, &StaticTaxonomy, &user.id, draft, Utc::now()).unwrap();
    }

    let filter = ExpenseFilter {
        year: Some(2024),
        month: Some(3),
        ..ExpenseFilter::default()
    }
    .category("Food & Groceries");
    let found = store.list(&user.id, &filter).unwrap();
    let dates: Vec<String> = found.iter().map(|e| e.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-03-15", "2024-03-01"]);

    let march_any_year = ExpenseFilter {
        month: Some(3),
        ..ExpenseFilter::default()
    };
    assert_eq!(store.list(&user.id, &march_any_year).unwrap().len(), 4);

    let day = ExpenseFilter {
        day: Some(15),
        ..ExpenseFilter::for_year(2024)
    };
    assert_eq!(store.list(&user.id, &day).unwrap().len(), 2);
}

#[test]
fn expense_list_command_resolves_user_and_filters() {
    let (conn, user) = setup();
    let store = SqliteStore::new(&conn);
    create_expense(&store, &StaticTaxonomy, &user.id, draft(), Utc::now()).unwrap();
    let april = ExpenseDraft {
        date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        amount: d("10.00"),
        ..draft()
    };
    create_expense(&store, &StaticTaxonomy, &user.id, april, Utc::now()).unwrap();

    let matches = cli::build_cli().get_matches_from([
        "outlay", "--user", "ana", "expense", "list", "--month", "3", "--year", "2024",
    ]);
    let (_, expense) = matches.subcommand().unwrap();
    let (_, list) = expense.subcommand().unwrap();
    let (rows, total) = commands::expenses::query_rows(&conn, list).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "2024-03-09");
    assert_eq!(rows[0].payment_method, "Debit Card");
    assert_eq!(total, d("54.30"));

    let matches = cli::build_cli().get_matches_from([
        "outlay", "--user", "nobody", "expense", "list",
    ]);
    let (_, expense) = matches.subcommand().unwrap();
    let (_, list) = expense.subcommand().unwrap();
    assert!(commands::expenses::query_rows(&conn, list).is_err());
}

#[test]
fn current_user_falls_back_to_selection() {
    let (conn, user) = setup();
    assert!(users::current_user_id(&conn).unwrap().is_none());
    users::set_current_user(&conn, &user.id).unwrap();
    assert_eq!(users::current_user_id(&conn).unwrap(), Some(user.id));

    let matches = cli::build_cli().get_matches_from(["outlay", "expense", "list"]);
    let (_, expense) = matches.subcommand().unwrap();
    let (_, list) = expense.subcommand().unwrap();
    let resolved = commands::resolve_user(&conn, list).unwrap();
    assert_eq!(resolved.username, "ana");
    assert_eq!(resolved.display_name(), "ana");
}

#[test]
fn user_input_is_validated() {
    let (conn, _) = setup();
    let err = users::create_user(&conn, "cy", "not-an-email", None, None).unwrap_err();
    assert!(matches!(err, OutlayError::Validation(_)));
    let err = users::create_user(&conn, "  ", "cy@example.com", None, None).unwrap_err();
    assert!(matches!(err, OutlayError::Validation(_)));

    let names: Vec<String> = users::list_users(&conn)
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["ana"]);
}
