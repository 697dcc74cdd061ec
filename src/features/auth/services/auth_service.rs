use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    LoginRequestDto, RegisterRequestDto, TokenResponseDto, UserResponseDto,
};
use crate::features::auth::models::User;
use crate::features::auth::services::password;
use crate::features::auth::services::TokenService;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, display_name, created_at";

/// Service for registration, login and user lookup
pub struct AuthService {
    pool: SqlitePool,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, token_service: Arc<TokenService>) -> Self {
        Self {
            pool,
            token_service,
        }
    }

    /// Register a new user account
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<UserResponseDto> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ? OR email = ?")
                .bind(&dto.username)
                .bind(&dto.email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to check existing user: {:?}", e);
                    AppError::Database(e)
                })?;

        if existing.is_some() {
            return Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }

        let password_hash = password::hash_password(&dto.password)?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, role, display_name, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(dto.role)
        .bind(&dto.display_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "User registered: id={}, username={}, role={}",
            user.id,
            user.username,
            user.role
        );

        Ok(user.into())
    }

    /// Login with username and password, returning a bearer token
    pub async fn login(&self, dto: LoginRequestDto) -> Result<TokenResponseDto> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(&dto.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user for login: {:?}", e);
            AppError::Database(e)
        })?;

        // Uniform failure: do not reveal whether the username or the password
        // was the wrong half.
        let Some(user) = user else {
            return Err(Self::invalid_credentials());
        };

        if !password::verify_password(&dto.password, &user.password_hash) {
            return Err(Self::invalid_credentials());
        }

        let access_token = self.token_service.issue(user.id)?;

        tracing::info!("User logged in: id={}, username={}", user.id, user.username);

        Ok(TokenResponseDto {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.token_service.ttl_secs(),
        })
    }

    /// Look up a user by id (used by the auth middleware and /users/me)
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch user by id: {:?}", e);
                AppError::Database(e)
            })
    }

    fn invalid_credentials() -> AppError {
        AppError::Auth("Invalid username or password".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::config::AuthConfig;
    use crate::features::auth::models::UserRole;
    use crate::shared::test_helpers::test_pool;

    async fn service() -> AuthService {
        let token_service = Arc::new(TokenService::new(&AuthConfig {
            secret_key: "test-secret".to_string(),
            token_ttl: Duration::from_secs(3600),
            jwt_leeway: Duration::from_secs(0),
        }));
        AuthService::new(test_pool().await, token_service)
    }

    fn register_dto(username: &str, email: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            username: username.to_string(),
            email: email.to_string(),
            password: "rahasia1".to_string(),
            role: UserRole::Student,
            display_name: "Budi Santoso".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_verifiable_token() {
        let service = service().await;
        let user = service
            .register(register_dto("budi", "budi@campus.test"))
            .await
            .unwrap();
        assert_eq!(user.username, "budi");

        let token = service
            .login(LoginRequestDto {
                username: "budi".to_string(),
                password: "rahasia1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(service.token_service.verify(&token.access_token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_conflict() {
        let service = service().await;
        service
            .register(register_dto("budi", "budi@campus.test"))
            .await
            .unwrap();

        let err = service
            .register(register_dto("budi", "other@campus.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .register(register_dto("other", "budi@campus.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_failures_are_uniform() {
        let service = service().await;
        service
            .register(register_dto("budi", "budi@campus.test"))
            .await
            .unwrap();

        let wrong_password = service
            .login(LoginRequestDto {
                username: "budi".to_string(),
                password: "salah".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_user = service
            .login(LoginRequestDto {
                username: "nobody".to_string(),
                password: "rahasia1".to_string(),
            })
            .await
            .unwrap_err();

        // Same message either way, no username oracle.
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_password() {
        let service = service().await;
        let user = service
            .register(register_dto("budi", "budi@campus.test"))
            .await
            .unwrap();

        let row = service.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_ne!(row.password_hash, "rahasia1");
        assert!(row.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn get_user_by_id_returns_none_for_missing() {
        let service = service().await;
        assert!(service.get_user_by_id(9999).await.unwrap().is_none());
    }
}
