//! # User Repository
//!
//! Accounts, authentication and password changes.
//!
//! ## Credential Flow
//! ```text
//! create(username, password, role)
//!      │
//!      ▼
//! hash_password ──► users.password_hash ($argon2id$...)
//!                          │
//! authenticate(username, password)
//!      │                   │
//!      ▼                   ▼
//! verify_password(password, password_hash) ──► Some(User) / None
//! ```
//! Clear-text passwords are never stored or compared.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::password::{hash_password, verify_password};
use voucher_core::{Role, User};

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists users ordered by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Gets a user by username (exact match).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Creates a user with a hashed password.
    ///
    /// Password strength is checked by the caller; this only hashes.
    ///
    /// ## Errors
    /// UniqueViolation if the username is taken.
    pub async fn create(&self, username: &str, password: &str, role: Role) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(username))?;

        info!(username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Returns the user if the password matches, `None` otherwise.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let user = self.get_by_username(username).await?;

        match user {
            Some(user) if verify_password(password, &user.password_hash) => Ok(Some(user)),
            _ => {
                warn!(username = %username, "Authentication failed");
                Ok(None)
            }
        }
    }

    /// Replaces a user's password after verifying the old one.
    ///
    /// Returns false (and changes nothing) if `old_password` is wrong.
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> DbResult<bool> {
        let user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))?;

        if !verify_password(old_password, &user.password_hash) {
            warn!(username = %user.username, "Password change rejected: old password mismatch");
            return Ok(false);
        }

        let new_hash = hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(new_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!(username = %user.username, "Password changed");
        Ok(true)
    }

    /// Creates the given admin account if there are no users at all.
    /// Returns true if it seeded.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        self.create(username, password, Role::Admin).await?;
        warn!(username = %username, "Seeded default administrator; change its password");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn repo() -> UserRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().users()
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let repo = repo().await;
        let user = repo.create("clerk", "Secret99", Role::User).await.unwrap();
        assert_ne!(user.password_hash, "Secret99");

        let found = repo.authenticate("clerk", "Secret99").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::User);

        assert!(repo.authenticate("clerk", "wrong").await.unwrap().is_none());
        assert!(repo.authenticate("nobody", "Secret99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_unique() {
        let repo = repo().await;
        repo.create("clerk", "Secret99", Role::User).await.unwrap();
        let err = repo.create("clerk", "Other999", Role::Admin).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_change_password() {
        let repo = repo().await;
        let user = repo.create("clerk", "Secret99", Role::User).await.unwrap();

        assert!(!repo.change_password(&user.id, "wrong", "Newpass11").await.unwrap());
        assert!(repo.authenticate("clerk", "Secret99").await.unwrap().is_some());

        assert!(repo.change_password(&user.id, "Secret99", "Newpass11").await.unwrap());
        assert!(repo.authenticate("clerk", "Secret99").await.unwrap().is_none());
        assert!(repo.authenticate("clerk", "Newpass11").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ensure_admin_only_on_empty_table() {
        let repo = repo().await;
        assert!(repo.ensure_admin("admin", "Admin123").await.unwrap());
        assert!(!repo.ensure_admin("admin2", "Admin123").await.unwrap());

        let users = repo.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
    }
}
