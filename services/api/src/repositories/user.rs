//! User repository for database operations

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{NewUser, Role, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn row_to_user(row: PgRow) -> ApiResult<User> {
    let role: String = row.get("role");
    let role: Role = role
        .parse()
        .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        address: row.get("address"),
        avatar: row.get("avatar"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password
    ///
    /// Duplicate usernames or emails surface as a conflict error.
    pub async fn create(&self, new_user: &NewUser) -> ApiResult<User> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, address, avatar, role,
                      created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(&new_user.address)
        .fetch_one(&self.pool)
        .await?;

        row_to_user(row)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, address, avatar, role,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, address, avatar, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }

    /// Verify a user's password against the stored hash
    pub fn verify_password(&self, user: &User, password: &str) -> ApiResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to parse password hash: {}", e)))?;

        let argon2 = Argon2::default();
        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    /// Update a user's address and avatar
    pub async fn update_profile(
        &self,
        id: Uuid,
        address: Option<&str>,
        avatar: Option<&str>,
    ) -> ApiResult<User> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET address = COALESCE($2, address),
                avatar = COALESCE($3, avatar),
                updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, password_hash, address, avatar, role,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(address)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

        row_to_user(row)
    }

    /// Replace a user's password hash with a hash of the new password
    pub async fn change_password(&self, id: Uuid, new_password: &str) -> ApiResult<()> {
        let password_hash = hash_password(new_password)?;

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User"));
        }
        Ok(())
    }

    /// Delete a user account
    ///
    /// Cart lines and favourites cascade; existing order records survive.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_is_never_the_plaintext() {
        let hash = hash_password("hunter2secret").unwrap();
        assert_ne!(hash, "hunter2secret");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn hash_verifies_the_original_and_rejects_others() {
        let hash = hash_password("correct horse").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        let argon2 = Argon2::default();

        assert!(argon2.verify_password(b"correct horse", &parsed).is_ok());
        assert!(argon2.verify_password(b"wrong horse", &parsed).is_err());
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let a = hash_password("bookworm99").unwrap();
        let b = hash_password("bookworm99").unwrap();
        assert_ne!(a, b);
    }
}
