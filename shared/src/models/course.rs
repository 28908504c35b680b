//! Course Model

use serde::{Deserialize, Serialize};

/// Course entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Price in whole currency units; 0 = free course. Never negative.
    pub price: i32,
    /// Featured on the landing page
    pub feature: bool,
    /// Thumbnail URL in the external blob store
    pub thumbnail: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Course {
    /// Free courses bypass entitlement checks entirely.
    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(price: i32) -> Course {
        Course {
            id: 1,
            title: "Rust from scratch".to_string(),
            description: String::new(),
            price,
            feature: false,
            thumbnail: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_is_free() {
        assert!(course(0).is_free());
        assert!(!course(100).is_free());
    }
}
