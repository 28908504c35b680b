//! Database access layer — plain async functions over the connection pool

pub mod courses;
pub mod lessons;
pub mod orders;
pub mod profiles;
pub mod tags;
pub mod users;

/// True when the error is a Postgres UNIQUE constraint violation
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_unique_violation())
}

/// Name of the violated constraint, when the driver reports one
pub fn violated_constraint(e: &sqlx::Error) -> Option<&str> {
    e.as_database_error().and_then(|db| db.constraint())
}
