// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category lookups. Expense writes take a `&dyn Taxonomy` so callers can
//! swap the built-in table for their own.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub trait Taxonomy {
    fn main_categories(&self) -> Vec<String>;

    /// Empty when `main_category` is unknown.
    fn valid_subcategories(&self, main_category: &str) -> Vec<String>;

    fn is_valid(&self, main_category: &str, subcategory: &str) -> bool {
        self.valid_subcategories(main_category)
            .iter()
            .any(|s| s == subcategory)
    }
}

const EXPENSE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Housing",
        &[
            "Rent/Mortgage",
            "Property Taxes",
            "Home Insurance",
            "Maintenance & Repairs",
            "HOA Fees",
            "Utilities (Electric, Water, Gas)",
        ],
    ),
    (
        "Food & Groceries",
        &["Groceries", "Dining Out", "Coffee Shops", "Meal Delivery"],
    ),
    (
        "Transportation",
        &[
            "Fuel",
            "Public Transit",
            "Car Payment",
            "Car Insurance",
            "Maintenance/Repairs",
            "Parking & Tolls",
            "Rideshare",
        ],
    ),
    (
        "Utilities & Subscriptions",
        &[
            "Internet",
            "Mobile Phone",
            "Streaming Services",
            "Cloud Storage",
            "Software Subscriptions",
        ],
    ),
    (
        "Health & Insurance",
        &[
            "Health Insurance",
            "Dental & Vision",
            "Medical Bills",
            "Prescriptions",
            "Therapy/Counseling",
            "Fitness",
        ],
    ),
    (
        "Education & Personal Development",
        &[
            "Tuition",
            "Student Loans",
            "Books & Supplies",
            "Online Courses",
            "Certifications",
        ],
    ),
    (
        "Shopping & Personal",
        &[
            "Clothing & Accessories",
            "Beauty & Grooming",
            "Gifts & Special Occasions",
            "Retail Spending",
        ],
    ),
    (
        "Family & Children",
        &[
            "Childcare",
            "School Supplies",
            "Allowance",
            "Baby Essentials",
            "Kids' Activities",
        ],
    ),
    (
        "Entertainment & Leisure",
        &[
            "Movies, Concerts, Events",
            "Hobbies",
            "Gaming",
            "Other Subscriptions",
        ],
    ),
    (
        "Travel & Vacations",
        &[
            "Flights",
            "Hotels",
            "Transportation",
            "Travel Insurance",
            "Souvenirs",
        ],
    ),
    (
        "Debt & Loans",
        &[
            "Credit Card Payments",
            "Personal Loans",
            "Payday Loans",
            "Installment Plans",
        ],
    ),
    (
        "Savings & Investments",
        &[
            "Emergency Fund",
            "Retirement",
            "Stock Investments",
            "Crypto",
            "Real Estate Investment",
        ],
    ),
    (
        "Business & Side Hustles",
        &[
            "Office Supplies",
            "Business Tools & Software",
            "Advertising",
            "Contractors/Freelancers",
            "Taxes",
        ],
    ),
    (
        "Donations & Giving",
        &["Charities", "Church/Tithing", "Fundraisers"],
    ),
    (
        "Miscellaneous/Uncategorized",
        &[
            "ATM Withdrawals",
            "Cash Expenses",
            "One-Time Payments",
            "Other",
        ],
    ),
];

static INDEX: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| EXPENSE_CATEGORIES.iter().copied().collect());

/// The built-in category table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTaxonomy;

impl Taxonomy for StaticTaxonomy {
    fn main_categories(&self) -> Vec<String> {
        EXPENSE_CATEGORIES
            .iter()
            .map(|(main, _)| main.to_string())
            .collect()
    }

    fn valid_subcategories(&self, main_category: &str) -> Vec<String> {
        INDEX
            .get(main_category)
            .map(|subs| subs.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }
}
