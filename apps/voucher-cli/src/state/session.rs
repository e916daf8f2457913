//! Operator authentication.
//!
//! Every command runs on behalf of one user. Credentials come from
//! `--username/--password` or `VOUCHER_USERNAME/VOUCHER_PASSWORD`.

use tracing::info;

use super::db::DbState;
use crate::error::ApiError;
use voucher_core::{CoreError, Session};

/// Verifies credentials and opens a session.
///
/// Missing credentials, unknown users and wrong passwords all fail with
/// `UNAUTHORIZED`; the last two share one message.
pub async fn authenticate(
    db: &DbState,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Session, ApiError> {
    let (username, password) = match (username, password) {
        (Some(u), Some(p)) if !u.trim().is_empty() => (u.trim(), p),
        _ => {
            return Err(ApiError::unauthorized(
                "Credentials required: pass --username and --password \
                 or set VOUCHER_USERNAME and VOUCHER_PASSWORD",
            ))
        }
    };

    let user = db
        .inner()
        .users()
        .authenticate(username, password)
        .await?
        .ok_or(CoreError::AuthenticationFailed)?;

    let session = Session::from_user(&user);
    info!(username = %session.username, role = %session.role, "Session opened");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use voucher_core::Role;
    use voucher_db::{Database, DbConfig, SeedDefaults};

    async fn seeded() -> DbState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.ensure_seeded(&SeedDefaults::default()).await.unwrap();
        DbState::new(db)
    }

    #[tokio::test]
    async fn test_seeded_admin_can_log_in() {
        let db = seeded().await;
        let session = authenticate(&db, Some("admin"), Some("Admin123")).await.unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.username, "admin");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let db = seeded().await;
        let wrong = authenticate(&db, Some("admin"), Some("nope")).await.unwrap_err();
        let unknown = authenticate(&db, Some("ghost"), Some("Admin123")).await.unwrap_err();
        assert_eq!(wrong.code, ErrorCode::Unauthorized);
        assert_eq!(wrong.message, unknown.message);
        assert_eq!(wrong.message, "Invalid username or password");
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let db = seeded().await;
        let err = authenticate(&db, None, Some("Admin123")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(err.message.starts_with("Credentials required"));
    }
}
