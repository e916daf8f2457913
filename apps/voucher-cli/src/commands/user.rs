//! # User Commands
//!
//! Account management (administrators) and password change (everyone).

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::error::{ApiError, ErrorCode};
use crate::state::DbState;
use voucher_core::validation::{validate_password, validate_password_change, validate_username};
use voucher_core::{Capability, Role, Session, User};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    /// Password hashes are never serialized.
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangedResponse {
    pub username: String,
}

pub async fn list_users(db: &DbState, session: &Session) -> Result<UserListResponse, ApiError> {
    session.require(Capability::ManageUsers)?;
    let users = db.inner().users().list().await?;
    Ok(UserListResponse { users })
}

/// Creates an account. The password must pass the strength rule.
pub async fn add_user(
    db: &DbState,
    session: &Session,
    username: &str,
    password: &str,
    role: Role,
) -> Result<UserResponse, ApiError> {
    session.require(Capability::ManageUsers)?;
    let username = validate_username(username)?;
    validate_password(password)?;

    let user = db.inner().users().create(&username, password, role).await?;
    info!(username = %user.username, role = %user.role, by = %session.username, "User added");
    Ok(UserResponse { user })
}

/// Changes the session user's own password.
pub async fn change_password(
    db: &DbState,
    session: &Session,
    old_password: &str,
    new_password: &str,
    confirmation: &str,
) -> Result<PasswordChangedResponse, ApiError> {
    session.require(Capability::ChangeOwnPassword)?;
    validate_password_change(new_password, confirmation)?;

    let changed = db
        .inner()
        .users()
        .change_password(&session.user_id, old_password, new_password)
        .await?;
    if !changed {
        warn!(username = %session.username, "Password change refused");
        return Err(ApiError::new(
            ErrorCode::Unauthorized,
            "Current password is incorrect",
        ));
    }

    Ok(PasswordChangedResponse {
        username: session.username.clone(),
    })
}

impl fmt::Display for UserListResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .users
            .iter()
            .map(|u| format!("{:<32} {}", u.username, u.role))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl fmt::Display for UserResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Created {} user '{}'", self.user.role, self.user.username)
    }
}

impl fmt::Display for PasswordChangedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password changed for '{}'", self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::TestApp;
    use crate::state::authenticate;

    #[tokio::test]
    async fn test_admin_adds_user() {
        let app = TestApp::new().await;

        let resp = add_user(&app.db, &app.admin, "agent.two", "Welcome1", Role::User)
            .await
            .unwrap();
        assert_eq!(resp.user.role, Role::User);

        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("argon2"));

        let session = authenticate(&app.db, Some("agent.two"), Some("Welcome1")).await.unwrap();
        assert_eq!(session.role, Role::User);
    }

    #[tokio::test]
    async fn test_add_user_rules() {
        let app = TestApp::new().await;

        let err = add_user(&app.db, &app.clerk, "x_user", "Welcome1", Role::User)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = add_user(&app.db, &app.admin, "weakling", "password", Role::User)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_user(&app.db, &app.admin, "clerk", "Welcome1", Role::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);
    }

    #[tokio::test]
    async fn test_list_users_is_admin_only() {
        let app = TestApp::new().await;

        let resp = list_users(&app.db, &app.admin).await.unwrap();
        let names: Vec<&str> = resp.users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["admin", "clerk"]);

        let err = list_users(&app.db, &app.clerk).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_change_own_password() {
        let app = TestApp::new().await;

        let err = change_password(&app.db, &app.clerk, "Clerk123", "Newpass1", "Newpass2")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = change_password(&app.db, &app.clerk, "wrong", "Newpass1", "Newpass1")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        change_password(&app.db, &app.clerk, "Clerk123", "Newpass1", "Newpass1")
            .await
            .unwrap();
        assert!(authenticate(&app.db, Some("clerk"), Some("Clerk123")).await.is_err());
        assert!(authenticate(&app.db, Some("clerk"), Some("Newpass1")).await.is_ok());
    }
}
