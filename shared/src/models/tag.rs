//! Tag Model

use serde::{Deserialize, Serialize};

/// Tag entity — unique-named course label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}
