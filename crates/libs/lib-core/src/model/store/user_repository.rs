//! # User Repository
//!
//! Provides database access layer for user-related operations.
//!
//! This module implements the repository pattern for user data access,
//! providing a clean abstraction over SQL queries. Every method takes a plain
//! connection so it can run inside a [`DbSession`](super::DbSession).
//!
//! Placeholders use the `$N` form, which both PostgreSQL and SQLite accept.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{acquire_session, DbPool, UserForCreate, UserRepository};
//! # async fn example(pool: &DbPool) -> lib_core::Result<()> {
//! let mut session = acquire_session(pool).await?;
//!
//! // Create a new user
//! let user = UserRepository::create(
//!     &mut session,
//!     UserForCreate::new("Alice".to_string(), "alice@example.com".to_string()),
//! ).await?;
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```

use super::models::{User, UserForCreate, UserForUpdate};
use sqlx::AnyConnection;
use sqlx::query_as;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by primary key.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that id
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_id(conn: &mut AnyConnection, id: i64) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a user by their email address (exact match).
    pub async fn find_by_email(conn: &mut AnyConnection, email: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, name, email FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a user other than `id` that owns `email`.
    ///
    /// Used by updates: a user keeping their own email is not a conflict.
    pub async fn find_by_email_excluding(
        conn: &mut AnyConnection,
        email: &str,
        id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, name, email FROM users WHERE email = $1 AND id <> $2")
            .bind(email)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List all users in insertion order.
    pub async fn list(conn: &mut AnyConnection) -> Result<Vec<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&mut *conn)
            .await
    }

    /// Create a new user in the database.
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The newly created user with the storage-assigned id
    /// * `Err(sqlx::Error)` - Database error (e.g., UNIQUE constraint violation on email)
    pub async fn create(conn: &mut AnyConnection, user_data: UserForCreate) -> Result<User, sqlx::Error> {
        query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(user_data.name)
        .bind(user_data.email)
        .fetch_one(&mut *conn)
        .await
    }

    /// Replace the name and email of an existing user.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - The row as it is now stored
    /// * `Ok(None)` - No user with that id
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn update(
        conn: &mut AnyConnection,
        id: i64,
        user_data: UserForUpdate,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>(
            "UPDATE users SET name = $1, email = $2 WHERE id = $3 RETURNING id, name, email",
        )
        .bind(user_data.name)
        .bind(user_data.email)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Delete a user by id.
    ///
    /// Returns `true` when a row was removed.
    pub async fn delete(conn: &mut AnyConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(conn: &mut AnyConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::store::{acquire_session, create_pool, create_schema, DbPool};

    async fn setup_test_db() -> DbPool {
        let pool = create_pool(&Config::for_database("sqlite::memory:"))
            .expect("Failed to create test database");
        create_schema(&pool).await.expect("Failed to create users table");
        pool
    }

    fn new_user(name: &str, email: &str) -> UserForCreate {
        UserForCreate::new(name.to_string(), email.to_string())
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let user = UserRepository::create(&mut conn, new_user("Ada", "ada@example.com"))
            .await
            .unwrap();
        assert!(user.id > 0);
        assert_eq!(user.name, "Ada");

        let by_id = UserRepository::find_by_id(&mut conn, user.id).await.unwrap();
        assert_eq!(by_id, Some(user.clone()));

        let by_email = UserRepository::find_by_email(&mut conn, "ada@example.com").await.unwrap();
        assert_eq!(by_email, Some(user));

        assert_eq!(UserRepository::find_by_id(&mut conn, 999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_by_email_excluding() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let ada = UserRepository::create(&mut conn, new_user("Ada", "ada@example.com"))
            .await
            .unwrap();
        let bob = UserRepository::create(&mut conn, new_user("Bob", "bob@example.com"))
            .await
            .unwrap();

        let own = UserRepository::find_by_email_excluding(&mut conn, "ada@example.com", ada.id)
            .await
            .unwrap();
        assert_eq!(own, None);

        let other = UserRepository::find_by_email_excluding(&mut conn, "ada@example.com", bob.id)
            .await
            .unwrap();
        assert_eq!(other.map(|u| u.id), Some(ada.id));
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        for (name, email) in [("C", "c@example.com"), ("A", "a@example.com"), ("B", "b@example.com")] {
            UserRepository::create(&mut conn, new_user(name, email)).await.unwrap();
        }

        let names: Vec<String> = UserRepository::list(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = setup_test_db().await;
        let mut session = acquire_session(&pool).await.unwrap();

        let user = UserRepository::create(&mut session, new_user("Ada", "ada@example.com"))
            .await
            .unwrap();

        let updated = UserRepository::update(
            &mut session,
            user.id,
            UserForUpdate::new("Ada L.".to_string(), "lovelace@example.com".to_string()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.email, "lovelace@example.com");

        let missing = UserRepository::update(
            &mut session,
            user.id + 1,
            UserForUpdate::new("X".to_string(), "x@example.com".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(missing, None);

        assert!(UserRepository::delete(&mut session, user.id).await.unwrap());
        assert!(!UserRepository::delete(&mut session, user.id).await.unwrap());
        assert_eq!(UserRepository::count(&mut session).await.unwrap(), 0);

        session.commit().await.unwrap();
    }
}
// endregion: --- Tests
