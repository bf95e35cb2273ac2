use sqlx::FromRow;

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Data structure for creating a new user.
///
/// Storage assigns the id.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub name: String,
    pub email: String,
}

impl UserForCreate {
    /// Create a new `UserForCreate` instance.
    pub fn new(name: String, email: String) -> Self {
        Self { name, email }
    }
}

/// Data structure for updating an existing user.
///
/// Updates replace both mutable fields; the id never changes.
#[derive(Debug, Clone)]
pub struct UserForUpdate {
    pub name: String,
    pub email: String,
}

impl UserForUpdate {
    /// Create a new `UserForUpdate` instance.
    pub fn new(name: String, email: String) -> Self {
        Self { name, email }
    }
}
