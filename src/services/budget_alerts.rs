// SPDX-License-Identifier: MIT

//! Budget threshold evaluation.
//!
//! Runs synchronously after every transaction create/update, but purely as
//! an observer: it emits warning-level log events when the month's spending
//! approaches (90%) or exceeds (100%) a configured limit, and never blocks,
//! rejects or modifies the transaction. There is no persisted alert entity,
//! no deduplication and no retry; every qualifying write re-evaluates.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::Transaction;
use crate::time_utils::{month_bounds, month_key, month_key_from_rfc3339};

/// Fraction of a limit at which the "approaching" warning fires.
const APPROACH_THRESHOLD: f64 = 0.9;

/// Outcome of comparing spend against a single limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThresholdAlert {
    Approaching,
    Exceeded,
}

/// Evaluates monthly spending against the owner's budget after transaction
/// writes.
#[derive(Clone)]
pub struct BudgetAlertService {
    db: FirestoreDb,
}

impl BudgetAlertService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Evaluate a freshly written transaction.
    ///
    /// All internal failures are caught and logged here; the caller's
    /// response must never depend on the outcome.
    pub async fn evaluate(&self, transaction: &Transaction) {
        if !transaction.is_expense() {
            return;
        }

        if let Err(e) = self.check_thresholds(transaction).await {
            tracing::warn!(
                error = %e,
                transaction_id = %transaction.id,
                "Budget evaluation failed"
            );
        }
    }

    async fn check_thresholds(&self, transaction: &Transaction) -> Result<()> {
        let month = month_key_from_rfc3339(&transaction.date)
            .unwrap_or_else(|| month_key(chrono::Utc::now()));

        // No budget configured for this month: nothing to evaluate
        let Some(budget) = self.db.get_budget(&transaction.user_id, &month).await? else {
            return Ok(());
        };

        let Some(window) = month_bounds(&month) else {
            tracing::debug!(month = %month, "Skipping evaluation for unparseable month key");
            return Ok(());
        };

        // A limit of 0 means "unset" for that scope; skip the query entirely
        if budget.total_budget > 0.0 {
            let total_spent = self
                .db
                .sum_expense_amounts(&transaction.user_id, &window, None)
                .await?;

            log_alert(
                &transaction.user_id,
                &month,
                "total",
                None,
                total_spent,
                budget.total_budget,
            );
        }

        if let Some(category_id) = &transaction.category_id {
            if let Some(limit) = budget.category_limit(category_id) {
                if limit > 0.0 {
                    let category_spent = self
                        .db
                        .sum_expense_amounts(&transaction.user_id, &window, Some(category_id))
                        .await?;

                    log_alert(
                        &transaction.user_id,
                        &month,
                        "category",
                        Some(category_id.as_str()),
                        category_spent,
                        limit,
                    );
                }
            }
        }

        Ok(())
    }
}

/// Pure threshold policy. A non-positive limit means the scope is unset.
fn classify(spent: f64, limit: f64) -> Option<ThresholdAlert> {
    if limit <= 0.0 {
        return None;
    }

    if spent >= limit {
        Some(ThresholdAlert::Exceeded)
    } else if spent >= APPROACH_THRESHOLD * limit {
        Some(ThresholdAlert::Approaching)
    } else {
        None
    }
}

fn log_alert(
    user_id: &str,
    month: &str,
    scope: &str,
    category_id: Option<&str>,
    spent: f64,
    limit: f64,
) {
    match classify(spent, limit) {
        Some(ThresholdAlert::Exceeded) => {
            tracing::warn!(
                user_id,
                month,
                scope,
                category_id,
                spent,
                limit,
                "Budget exceeded"
            );
        }
        Some(ThresholdAlert::Approaching) => {
            tracing::warn!(
                user_id,
                month,
                scope,
                category_id,
                spent,
                limit,
                percentage = 90,
                "Approaching budget limit"
            );
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_threshold_is_quiet() {
        assert_eq!(classify(89.9, 100.0), None);
        assert_eq!(classify(0.0, 100.0), None);
    }

    #[test]
    fn test_approaching_at_90_percent() {
        assert_eq!(classify(90.0, 100.0), Some(ThresholdAlert::Approaching));
        assert_eq!(classify(95.0, 100.0), Some(ThresholdAlert::Approaching));
        assert_eq!(classify(99.99, 100.0), Some(ThresholdAlert::Approaching));
    }

    #[test]
    fn test_exceeded_at_and_over_limit() {
        assert_eq!(classify(100.0, 100.0), Some(ThresholdAlert::Exceeded));
        assert_eq!(classify(105.0, 100.0), Some(ThresholdAlert::Exceeded));
    }

    #[test]
    fn test_zero_limit_never_triggers() {
        assert_eq!(classify(1_000_000.0, 0.0), None);
        assert_eq!(classify(0.0, 0.0), None);
    }

    #[test]
    fn test_negative_limit_never_triggers() {
        assert_eq!(classify(50.0, -10.0), None);
    }

    #[test]
    fn test_small_limits_keep_ratio() {
        // 90% of 10 is 9
        assert_eq!(classify(8.99, 10.0), None);
        assert_eq!(classify(9.0, 10.0), Some(ThresholdAlert::Approaching));
        assert_eq!(classify(10.0, 10.0), Some(ThresholdAlert::Exceeded));
    }
}
