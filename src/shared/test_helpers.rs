#[cfg(test)]
use sqlx::sqlite::SqlitePoolOptions;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::features::auth::models::{CurrentUser, User, UserRole};

#[cfg(test)]
pub fn student_user(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("student{}", id),
        email: format!("student{}@campus.test", id),
        role: UserRole::Student,
        display_name: format!("Student {}", id),
    }
}

#[cfg(test)]
pub fn staff_user(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("staff{}", id),
        email: format!("staff{}@campus.test", id),
        role: UserRole::Staff,
        display_name: format!("Staff {}", id),
    }
}

/// Fresh in-memory database with migrations applied.
///
/// A single connection keeps the in-memory database alive for the whole test.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Insert a user row directly and return it.
#[cfg(test)]
pub async fn seed_user(pool: &SqlitePool, username: &str, role: UserRole) -> User {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, role, display_name, created_at) \
         VALUES (?, ?, 'x', ?, ?, ?) \
         RETURNING id, username, email, password_hash, role, display_name, created_at",
    )
    .bind(username)
    .bind(format!("{}@campus.test", username))
    .bind(role)
    .bind(username)
    .bind(chrono::Utc::now())
    .fetch_one(pool)
    .await
    .expect("failed to seed user")
}
