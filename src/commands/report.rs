// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{resolve_user, today};
use crate::report::build_report;
use crate::store::SqliteStore;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = write_report(conn, sub)?;
    println!("Report written to {}", path.display());
    Ok(())
}

/// Builds the PDF for `--year/--month` and writes it under `--out`.
pub fn write_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let user = resolve_user(conn, sub)?;
    let year = sub.get_one::<i32>("year").copied().unwrap_or(today().year());
    let month = *sub.get_one::<u32>("month").unwrap_or(&0);
    let out = sub.get_one::<String>("out").map(String::as_str).unwrap_or(".");

    let (bytes, filename) = build_report(&SqliteStore::new(conn), &user, month, year, Utc::now())?;
    let dir = Path::new(out);
    std::fs::create_dir_all(dir).with_context(|| format!("Create {}", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes).with_context(|| format!("Write {}", path.display()))?;
    Ok(path)
}
