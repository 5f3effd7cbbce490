//! Monthly budget model.
//!
//! A budget is keyed by `(user, month)`; the composite document ID enforces
//! the uniqueness the original data model requires.

use serde::{Deserialize, Serialize};

/// Per-category spending limit inside a monthly budget.
///
/// An amount of 0 means "no limit configured for this category" and is
/// skipped by the threshold evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category_id: String,
    pub amount: f64,
}

/// Spending limits for one user and one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Owning user
    pub user_id: String,
    /// Month key, `YYYY-MM`
    pub month: String,
    /// Overall limit for the month; 0 means unset
    pub total_budget: f64,
    #[serde(default)]
    pub category_budgets: Vec<CategoryBudget>,
    pub updated_at: String,
}

impl Budget {
    /// Document ID enforcing `(user, month)` uniqueness.
    pub fn doc_id(user_id: &str, month: &str) -> String {
        format!("{user_id}_{month}")
    }

    /// Configured limit for a category, if one is listed.
    pub fn category_limit(&self, category_id: &str) -> Option<f64> {
        self.category_budgets
            .iter()
            .find(|entry| entry.category_id == category_id)
            .map(|entry| entry.amount)
    }
}
