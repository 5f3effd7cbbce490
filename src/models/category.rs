//! Category model.

use serde::{Deserialize, Serialize};

/// User-defined transaction category. Names are unique per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// UUID v4 (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    pub name: String,
    pub created_at: String,
}
