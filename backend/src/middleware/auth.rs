//! Authentication middleware
//!
//! JWT authentication and store-scope enforcement

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, ErrorDetail, ErrorResponse};
use shared::Role;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    /// Store affinity; `None` for a store keeper means all stores
    pub store_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

impl AuthUser {
    /// Fail with Forbidden unless the user holds one of the given roles
    pub fn require_role(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Requires one of: {}",
                roles
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }

    /// Store scope rules:
    /// - ADMIN and ACCOUNTS_VIEW operate on all stores
    /// - STORE_KEEPER with no store affinity operates on all stores
    ///   (single login, hotel selection in the UI)
    /// - everyone else must match their own store
    pub fn enforce_store_scope(&self, store_id: Uuid) -> Result<(), AppError> {
        if self.role.sees_all_stores() {
            return Ok(());
        }
        if self.role == Role::StoreKeeper && self.store_id.is_none() {
            return Ok(());
        }
        if self.store_id == Some(store_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Store scope violation".to_string()))
        }
    }

    /// Resolve the store filter for list endpoints.
    ///
    /// Callers who see all stores may omit the filter and list
    /// everything. Everyone else must name a store, and it must be
    /// their own; omitting it fails with "storeId is required" rather
    /// than silently widening the listing beyond their scope.
    pub fn resolve_store_filter(
        &self,
        requested: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppError> {
        match requested {
            Some(store_id) => {
                self.enforce_store_scope(store_id)?;
                Ok(Some(store_id))
            }
            None => {
                if self.role.sees_all_stores()
                    || (self.role == Role::StoreKeeper && self.store_id.is_none())
                {
                    Ok(None)
                } else {
                    Err(AppError::validation("storeId", "storeId is required"))
                }
            }
        }
    }
}

/// Authentication middleware that validates JWT tokens and injects
/// [`AuthUser`] into request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    // Get JWT secret from environment (fallback for middleware without state)
    let jwt_secret = std::env::var("HIM__JWT__SECRET")
        .or_else(|_| std::env::var("HIM_JWT_SECRET"))
        .unwrap_or_else(|_| "development-secret-key".to_string());

    let claims = match decode_jwt(token, &jwt_secret) {
        Ok(claims) => claims,
        Err(_) => {
            return AppError::InvalidToken.into_response();
        }
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let role = match Role::parse(&claims.role) {
        Some(role) => role,
        None => return unauthorized_response("Invalid role in token"),
    };

    let store_id = match claims.store_id.as_deref().map(Uuid::parse_str).transpose() {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid store ID in token"),
    };

    let department_id = match claims
        .department_id
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
    {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid department ID in token"),
    };

    let auth_user = AuthUser {
        user_id,
        role,
        store_id,
        department_id,
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// JWT claims structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub store_id: Option<String>,
    pub department_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Decode and validate JWT token
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail::new("UNAUTHORIZED", message),
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);


#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail::new("UNAUTHORIZED", "Authentication required"),
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
