// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::resolve_user;
use crate::users::{
    create_user, deactivate, find_active, list_users, set_current_user, update_profile,
};
use crate::utils::pretty_table;
use anyhow::{Result, bail};
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let username = sub.get_one::<String>("username").unwrap();
            let email = sub.get_one::<String>("email").unwrap();
            let user = create_user(
                conn,
                username,
                email,
                sub.get_one::<String>("first-name").map(String::as_str),
                sub.get_one::<String>("last-name").map(String::as_str),
            )?;
            println!("Added user '{}' ({})", user.username, user.email);
        }
        Some(("list", _)) => {
            let data = list_users(conn)?
                .into_iter()
                .map(|u| {
                    vec![
                        u.username.clone(),
                        u.display_name(),
                        u.email,
                        u.created_at.format("%Y-%m-%d").to_string(),
                        if u.is_active { "active" } else { "deactivated" }.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Username", "Name", "Email", "Created", "Status"], data)
            );
        }
        Some(("use", sub)) => {
            let name = sub.get_one::<String>("username").unwrap();
            let user = find_active(conn, name)?;
            set_current_user(conn, &user.id)?;
            println!("Now acting as '{}'", user.username);
        }
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let user = resolve_user(conn, sub)?;
            if !sub.get_flag("yes") {
                bail!(
                    "Deactivating '{}' hides the account; pass --yes to confirm",
                    user.username
                );
            }
            deactivate(conn, &user.id, Utc::now())?;
            println!("Deactivated '{}'", user.username);
        }
        _ => {}
    }
    Ok(())
}

/// Flags left out keep the stored value; an empty name clears it.
fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let email = sub
        .get_one::<String>("email")
        .map(String::as_str)
        .unwrap_or(&user.email);
    let first = match sub.get_one::<String>("first-name") {
        Some(v) => Some(v.as_str()),
        None => user.first_name.as_deref(),
    };
    let last = match sub.get_one::<String>("last-name") {
        Some(v) => Some(v.as_str()),
        None => user.last_name.as_deref(),
    };
    let updated = update_profile(conn, &user.id, email, first, last, Utc::now())?;
    println!(
        "Updated '{}': {} <{}>",
        updated.username,
        updated.display_name(),
        updated.email
    );
    Ok(())
}
