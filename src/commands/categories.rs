// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::taxonomy::Taxonomy;
use crate::utils::pretty_table;
use anyhow::{Result, bail};

pub fn handle(taxonomy: &dyn Taxonomy, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        if let Some(main) = sub.get_one::<String>("main") {
            let subs = taxonomy.valid_subcategories(main);
            if subs.is_empty() {
                bail!("Unknown category '{}'", main);
            }
            let data = subs.into_iter().map(|s| vec![s]).collect();
            println!("{}", pretty_table(&[main.as_str()], data));
        } else {
            let data = taxonomy
                .main_categories()
                .into_iter()
                .map(|c| {
                    let n = taxonomy.valid_subcategories(&c).len();
                    vec![c, n.to_string()]
                })
                .collect();
            println!("{}", pretty_table(&["Category", "Subcategories"], data));
        }
    }
    Ok(())
}
