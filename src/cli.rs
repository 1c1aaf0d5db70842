// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_parser(value_parser!(u32))
        .help("Month 1-12 (defaults to the current month)")
}

fn year_arg() -> Arg {
    Arg::new("year")
        .long("year")
        .value_parser(value_parser!(i32))
        .help("Four-digit year (defaults to the current year)")
}

fn expense_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(required))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(
            Arg::new("category")
                .long("category")
                .required(required)
                .help("Main category"),
        )
        .arg(Arg::new("subcategory").long("subcategory").required(required))
        .arg(
            Arg::new("date")
                .long("date")
                .help("YYYY-MM-DD (defaults to today)"),
        )
        .arg(
            Arg::new("payment")
                .long("payment")
                .help("Cash, Credit Card, Debit Card, Bank Transfer, Check, PayPal, Venmo, Other"),
        )
        .arg(Arg::new("description").long("description"))
}

fn analytics_cmd(name: &'static str, about: &'static str) -> Command {
    json_flags(Command::new(name).about(about)).arg(
        Arg::new("chart")
            .long("chart")
            .action(ArgAction::SetTrue)
            .conflicts_with_all(["json", "jsonl"])
            .help("Print the chart payload"),
    )
}

fn monthly_cmd(name: &'static str, about: &'static str) -> Command {
    analytics_cmd(name, about).arg(month_arg()).arg(year_arg())
}

pub fn build_cli() -> Command {
    Command::new("outlay")
        .version(crate_version!())
        .about("Personal expense tracking with analytics and PDF reports")
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .value_name("USERNAME")
                .help("Act as this user instead of the current one"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("username").long("username").required(true))
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("first-name").long("first-name"))
                        .arg(Arg::new("last-name").long("last-name")),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("use")
                        .about("Select the current user")
                        .arg(Arg::new("username").required(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change the email or names of the current user")
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("first-name").long("first-name"))
                        .arg(Arg::new("last-name").long("last-name")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Deactivate the current user")
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Confirm the deactivation"),
                        ),
                ),
        )
        .subcommand(
            Command::new("expense")
                .about("Record and manage expenses")
                .subcommand(expense_fields(Command::new("add"), true))
                .subcommand(expense_fields(
                    Command::new("edit").arg(Arg::new("id").required(true)),
                    false,
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true)))
                .subcommand(
                    json_flags(Command::new("list"))
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(Arg::new("year").long("year").value_parser(value_parser!(i32)))
                        .arg(Arg::new("category").long("category")),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Browse the category taxonomy")
                .subcommand(
                    Command::new("list").arg(
                        Arg::new("main")
                            .long("main")
                            .help("Show the subcategories of this main category"),
                    ),
                ),
        )
        .subcommand(
            json_flags(Command::new("dashboard").about("Total, count and average for a month"))
                .arg(month_arg())
                .arg(year_arg()),
        )
        .subcommand(
            Command::new("analytics")
                .about("Spending aggregates")
                .subcommand(monthly_cmd("by-category", "Totals per category for a month"))
                .subcommand(analytics_cmd("trend", "Twelve-month spending trend"))
                .subcommand(monthly_cmd(
                    "breakdown",
                    "Category and subcategory tree for a month",
                ))
                .subcommand(monthly_cmd("daily", "Spending per day of a month"))
                .subcommand(
                    analytics_cmd("top", "Largest categories of a year")
                        .arg(year_arg())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .default_value("5"),
                        ),
                )
                .subcommand(monthly_cmd(
                    "payment-methods",
                    "Totals per payment method for a month",
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Write a PDF expense report")
                .arg(year_arg())
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_parser(value_parser!(u32))
                        .default_value("0")
                        .help("Month 1-12, or 0 for the whole year"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value(".")
                        .help("Directory to write the PDF into"),
                ),
        )
}
