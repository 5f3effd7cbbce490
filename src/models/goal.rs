//! Savings goal model.

use serde::{Deserialize, Serialize};

/// A savings target the user contributes toward over time.
///
/// Contributions increase `current_amount` and also record a synthetic
/// expense transaction; they do not touch budget evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// UUID v4 (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    /// Optional target date (RFC3339)
    #[serde(default)]
    pub deadline: Option<String>,
    pub created_at: String,
}

impl Goal {
    /// Whether contributions have reached the target.
    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_reached() {
        let mut goal = Goal {
            id: "g1".to_string(),
            user_id: "u1".to_string(),
            name: "Emergency fund".to_string(),
            target_amount: 1000.0,
            current_amount: 999.0,
            deadline: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        assert!(!goal.is_reached());

        goal.current_amount = 1000.0;
        assert!(goal.is_reached());
    }
}
