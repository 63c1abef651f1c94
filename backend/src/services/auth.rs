//! Authentication service
//!
//! Password login and JWT issuance. Token claims carry the user's role and
//! optional store/department affinity; the store-scope middleware consumes
//! them on every protected request.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Claims;
use shared::{Role, User};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtConfig,
}

/// Input for login
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Public view of a user account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub store_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtConfig) -> Self {
        Self { db, jwt }
    }

    /// Verify credentials and issue a JWT
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1",
        )
        .bind(input.email.to_lowercase())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let ok = bcrypt::verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.into()))?;
        if !ok {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.sign_token(&user)?;

        Ok(LoginResponse {
            token,
            user: UserInfo {
                id: user.id,
                name: user.name,
                role: user.role,
                store_id: user.store_id,
                department_id: user.department_id,
            },
        })
    }

    fn sign_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            store_id: user.store_id.map(|id| id.to_string()),
            department_id: user.department_id.map(|id| id.to_string()),
            iat: now,
            exp: now + self.jwt.token_expiry,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.into()))
    }
}
