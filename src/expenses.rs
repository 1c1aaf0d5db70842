// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{OutlayError, Result};
use crate::models::{Expense, MAX_YEAR, MIN_YEAR, PAYMENT_METHODS, validate_year};
use crate::store::SqliteStore;
use crate::taxonomy::Taxonomy;

pub const MAX_NAME_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// User-supplied fields of an expense, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub name: String,
    pub amount: Decimal,
    pub main_category: String,
    pub subcategory: String,
    pub date: NaiveDate,
    pub payment_method: Option<String>,
    pub description: Option<String>,
}

impl ExpenseDraft {
    /// Trims text, folds empty optionals to `None` and checks every field.
    pub fn validate(self, taxonomy: &dyn Taxonomy) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(OutlayError::Validation("name is required".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(OutlayError::Validation(format!(
                "name is limited to {} characters",
                MAX_NAME_LEN
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(OutlayError::Validation(
                "amount must be greater than 0".into(),
            ));
        }
        if self.amount.normalize().scale() > 2 {
            return Err(OutlayError::Validation(format!(
                "amount {} has more than two decimal places",
                self.amount
            )));
        }
        if validate_year(self.date.year()).is_err() {
            return Err(OutlayError::Validation(format!(
                "date {} is outside years {}-{}",
                self.date, MIN_YEAR, MAX_YEAR
            )));
        }
        if !taxonomy.is_valid(&self.main_category, &self.subcategory) {
            return Err(OutlayError::Validation(format!(
                "'{}' is not a subcategory of '{}'",
                self.subcategory, self.main_category
            )));
        }
        let payment_method = self
            .payment_method
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if let Some(p) = &payment_method {
            if !PAYMENT_METHODS.contains(&p.as_str()) {
                return Err(OutlayError::Validation(format!(
                    "unknown payment method '{}' (use one of: {})",
                    p,
                    PAYMENT_METHODS.join(", ")
                )));
            }
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            return Err(OutlayError::Validation(format!(
                "description is limited to {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
        Ok(Self {
            name,
            amount: self.amount.round_dp(2),
            payment_method,
            description,
            ..self
        })
    }
}

pub fn create_expense(
    store: &SqliteStore<'_>,
    taxonomy: &dyn Taxonomy,
    user_id: &Uuid,
    draft: ExpenseDraft,
    now: DateTime<Utc>,
) -> Result<Expense> {
    let d = draft.validate(taxonomy)?;
    let expense = Expense {
        id: Uuid::new_v4(),
        user_id: *user_id,
        name: d.name,
        amount: d.amount,
        main_category: d.main_category,
        subcategory: d.subcategory,
        date: d.date,
        payment_method: d.payment_method,
        description: d.description,
        created_at: now,
        updated_at: now,
    };
    store.insert(&expense)?;
    Ok(expense)
}

/// Replaces all user-editable fields of an owned expense and refreshes `updated_at`.
pub fn update_expense(
    store: &SqliteStore<'_>,
    taxonomy: &dyn Taxonomy,
    user_id: &Uuid,
    expense_id: &Uuid,
    draft: ExpenseDraft,
    now: DateTime<Utc>,
) -> Result<Expense> {
    let current = store
        .get(user_id, expense_id)?
        .ok_or(OutlayError::ExpenseNotFound(*expense_id))?;
    let d = draft.validate(taxonomy)?;
    let expense = Expense {
        name: d.name,
        amount: d.amount,
        main_category: d.main_category,
        subcategory: d.subcategory,
        date: d.date,
        payment_method: d.payment_method,
        description: d.description,
        updated_at: now,
        ..current
    };
    if !store.update(&expense)? {
        return Err(OutlayError::ExpenseNotFound(*expense_id));
    }
    Ok(expense)
}

pub fn delete_expense(store: &SqliteStore<'_>, user_id: &Uuid, expense_id: &Uuid) -> Result<()> {
    if store.delete(user_id, expense_id)? {
        Ok(())
    } else {
        Err(OutlayError::ExpenseNotFound(*expense_id))
    }
}

impl From<&Expense> for ExpenseDraft {
    fn from(e: &Expense) -> Self {
        Self {
            name: e.name.clone(),
            amount: e.amount,
            main_category: e.main_category.clone(),
            subcategory: e.subcategory.clone(),
            date: e.date,
            payment_method: e.payment_method.clone(),
            description: e.description.clone(),
        }
    }
}
