//! # User Service
//!
//! Business logic for the user CRUD operations.
//!
//! Every operation borrows one [`DbSession`](lib_core::DbSession) from the pool. Writes
//! commit before the result is returned; any early return drops the session, which
//! rolls back and hands the connection back to the pool.
//!
//! ## Email Uniqueness
//!
//! Create and update check for an existing owner of the email inside the session. Two
//! concurrent requests can both pass that check; the loser then trips the `UNIQUE`
//! constraint on `users.email`, which [`AppError`]'s `From<sqlx::Error>` turns into the
//! same Conflict the check would have produced.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lib_core::dto::UserCreate;
//! use lib_web::services::UserService;
//!
//! # async fn example(pool: lib_core::DbPool) -> lib_core::Result<()> {
//! let service = UserService::new(pool);
//! let user = service
//!     .create(UserCreate { name: "Ada".into(), email: "ada@example.com".into() })
//!     .await?;
//! let same = service.get(user.id).await?;
//! # Ok(())
//! # }
//! ```

use lib_core::dto::{UserCreate, UserDelete, UserResponse};
use lib_core::error::{EMAIL_TAKEN, USER_NOT_FOUND};
use lib_core::model::store::UserRepository;
use lib_core::{acquire_session, AppError, DbPool, Result};
use tracing::{debug, info, instrument, warn};

/// User CRUD service backed by the connection pool.
#[derive(Clone)]
pub struct UserService {
    db: DbPool,
}

impl UserService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Create a user. Fails with Conflict when the email is taken.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: UserCreate) -> Result<UserResponse> {
        let mut session = acquire_session(&self.db).await?;

        if UserRepository::find_by_email(&mut session, &input.email).await?.is_some() {
            warn!(operation = "create", email = %input.email, "Email already registered");
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user = UserRepository::create(&mut session, input.into())
            .await
            .map_err(|e| log_conflict("create", e))?;
        session.commit().await?;

        info!(user_id = user.id, "User created");
        Ok(user.into())
    }

    /// Fetch one user by id.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: i64) -> Result<UserResponse> {
        let mut session = acquire_session(&self.db).await?;

        let user = UserRepository::find_by_id(&mut session, user_id)
            .await?
            .ok_or_else(|| not_found("get", user_id))?;

        Ok(user.into())
    }

    /// List every user in insertion order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserResponse>> {
        let mut session = acquire_session(&self.db).await?;

        let users = UserRepository::list(&mut session).await?;
        debug!(count = users.len(), "Users listed");

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Replace a user's name and email.
    ///
    /// Fails with NotFound for an unknown id, and with Conflict when the email belongs
    /// to a different user.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn update(&self, user_id: i64, input: UserCreate) -> Result<UserResponse> {
        let mut session = acquire_session(&self.db).await?;

        if UserRepository::find_by_id(&mut session, user_id).await?.is_none() {
            return Err(not_found("update", user_id));
        }

        if UserRepository::find_by_email_excluding(&mut session, &input.email, user_id)
            .await?
            .is_some()
        {
            warn!(operation = "update", user_id, email = %input.email, "Email already registered");
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user = UserRepository::update(&mut session, user_id, input.into())
            .await
            .map_err(|e| log_conflict("update", e))?
            // Deleted between the lookup and the update.
            .ok_or_else(|| not_found("update", user_id))?;
        session.commit().await?;

        info!(user_id, "User updated");
        Ok(user.into())
    }

    /// Hard-delete a user.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64) -> Result<UserDelete> {
        let mut session = acquire_session(&self.db).await?;

        if UserRepository::find_by_id(&mut session, user_id).await?.is_none() {
            return Err(not_found("delete", user_id));
        }

        if !UserRepository::delete(&mut session, user_id).await? {
            return Err(not_found("delete", user_id));
        }
        session.commit().await?;

        info!(user_id, "User deleted");
        Ok(UserDelete {
            id: user_id,
            deleted: true,
        })
    }
}

fn not_found(operation: &'static str, user_id: i64) -> AppError {
    warn!(operation, user_id, "User not found");
    AppError::NotFound(USER_NOT_FOUND.to_string())
}

/// Convert a storage error, logging when it is a lost uniqueness race.
fn log_conflict(operation: &'static str, err: sqlx::Error) -> AppError {
    let err = AppError::from(err);
    if matches!(err, AppError::Conflict(_)) {
        warn!(operation, "Email already registered (unique constraint)");
    }
    err
}

// endregion: --- Tests
