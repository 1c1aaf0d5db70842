// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::error::{OutlayError, Result};
use crate::models::User;
use crate::store::{fmt_timestamp, parse_timestamp, parse_uuid};

const CURRENT_USER_KEY: &str = "current_user";
const MAX_USERNAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 320;
const MAX_NAME_LEN: usize = 100;

fn clean_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') || email.chars().count() > MAX_EMAIL_LEN {
        return Err(OutlayError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(email)
}

fn clean_name(name: Option<&str>) -> Result<Option<String>> {
    let name = name.map(str::trim).filter(|s| !s.is_empty());
    if name.is_some_and(|n| n.chars().count() > MAX_NAME_LEN) {
        return Err(OutlayError::Validation(format!(
            "names are limited to {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.map(str::to_string))
}

/// Emails are unique across all accounts, deactivated ones included.
fn ensure_email_free(conn: &Connection, email: &str, owner: Option<&Uuid>) -> Result<()> {
    let holder: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE email=?1",
            params![email],
            |r| r.get(0),
        )
        .optional()?;
    if holder.is_some() && holder != owner.map(Uuid::to_string) {
        return Err(OutlayError::Validation(format!(
            "email '{}' is already in use",
            email
        )));
    }
    Ok(())
}

pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<User> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(OutlayError::Validation(format!(
            "username must be 1-{} characters",
            MAX_USERNAME_LEN
        )));
    }
    if find_by_username(conn, username)?.is_some() {
        return Err(OutlayError::Validation(format!(
            "username '{}' is already taken",
            username
        )));
    }
    let email = clean_email(email)?;
    ensure_email_free(conn, &email, None)?;
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email,
        first_name: clean_name(first_name)?,
        last_name: clean_name(last_name)?,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        is_active: true,
    };
    conn.execute(
        "INSERT INTO users(id, username, email, first_name, last_name, created_at, updated_at, deleted_at, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 1)",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.first_name,
            user.last_name,
            fmt_timestamp(&user.created_at),
            fmt_timestamp(&user.updated_at),
        ],
    )?;
    tracing::info!(user = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Replaces email and names. The username never changes.
pub fn update_profile(
    conn: &Connection,
    id: &Uuid,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<User> {
    let current = find_by_id(conn, id)?
        .filter(|u| u.is_active)
        .ok_or_else(|| OutlayError::UserNotFound(id.to_string()))?;
    let email = clean_email(email)?;
    ensure_email_free(conn, &email, Some(id))?;
    let user = User {
        email,
        first_name: clean_name(first_name)?,
        last_name: clean_name(last_name)?,
        updated_at: now,
        ..current
    };
    conn.execute(
        "UPDATE users SET email=?1, first_name=?2, last_name=?3, updated_at=?4 WHERE id=?5",
        params![
            user.email,
            user.first_name,
            user.last_name,
            fmt_timestamp(&user.updated_at),
            user.id.to_string(),
        ],
    )?;
    tracing::info!(user = %user.id, "profile updated");
    Ok(user)
}

/// Soft delete: the account and its expenses stay, but it can no longer be
/// selected. Clears the current-user setting when it points here.
pub fn deactivate(conn: &Connection, id: &Uuid, now: DateTime<Utc>) -> Result<()> {
    let changed = conn.execute(
        "UPDATE users SET is_active=0, deleted_at=?1, updated_at=?1 WHERE id=?2 AND is_active=1",
        params![fmt_timestamp(&now), id.to_string()],
    )?;
    if changed == 0 {
        return Err(OutlayError::UserNotFound(id.to_string()));
    }
    conn.execute(
        "DELETE FROM settings WHERE key=?1 AND value=?2",
        params![CURRENT_USER_KEY, id.to_string()],
    )?;
    tracing::info!(user = %id, "account deactivated");
    Ok(())
}

struct RawUser {
    id: String,
    username: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
    is_active: bool,
}

impl RawUser {
    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            username: r.get(1)?,
            email: r.get(2)?,
            first_name: r.get(3)?,
            last_name: r.get(4)?,
            created_at: r.get(5)?,
            updated_at: r.get(6)?,
            deleted_at: r.get(7)?,
            is_active: r.get(8)?,
        })
    }

    fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            deleted_at: self.deleted_at.as_deref().map(parse_timestamp).transpose()?,
            is_active: self.is_active,
        })
    }
}

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, created_at, updated_at, deleted_at, is_active";

/// Finds deactivated accounts too; check `is_active` before acting as one.
pub fn find_by_id(conn: &Connection, id: &Uuid) -> Result<Option<User>> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id=?1", USER_COLUMNS),
            params![id.to_string()],
            RawUser::from_row,
        )
        .optional()?;
    raw.map(RawUser::into_user).transpose()
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE username=?1", USER_COLUMNS),
            params![username],
            RawUser::from_row,
        )
        .optional()?;
    raw.map(RawUser::into_user).transpose()
}

/// The active account called `username`.
pub fn find_active(conn: &Connection, username: &str) -> Result<User> {
    find_by_username(conn, username)?
        .filter(|u| u.is_active)
        .ok_or_else(|| OutlayError::UserNotFound(username.to_string()))
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY username",
        USER_COLUMNS
    ))?;
    let rows = stmt.query_map([], RawUser::from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?.into_user()?);
    }
    Ok(data)
}

/// The user selected with `user use`, standing in for a login session.
pub fn current_user_id(conn: &Connection) -> Result<Option<Uuid>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![CURRENT_USER_KEY],
            |r| r.get(0),
        )
        .optional()?;
    v.as_deref().map(parse_uuid).transpose()
}

pub fn set_current_user(conn: &Connection, id: &Uuid) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![CURRENT_USER_KEY, id.to_string()],
    )?;
    Ok(())
}
