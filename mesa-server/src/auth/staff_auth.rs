//! Staff authentication middleware
//!
//! `staff_auth_middleware` verifies the bearer token and inserts a
//! [`StaffIdentity`] into the request extensions once the account is
//! known to be active; `require_role` layers narrow a route group to one
//! role (admins pass every check).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use shared::models::StaffRole;

use super::account_cache::ensure_active;
use super::jwt::{self, JwtError, StaffClaims};
use crate::state::AppState;

/// Authenticated staff member, scoped to one store
#[derive(Debug, Clone)]
pub struct StaffIdentity {
    pub user_id: i64,
    pub store_id: i64,
    pub role: StaffRole,
    pub driver_id: Option<i64>,
}

impl From<StaffClaims> for StaffIdentity {
    fn from(claims: StaffClaims) -> Self {
        Self {
            user_id: claims.sub,
            store_id: claims.store_id,
            role: claims.role,
            driver_id: claims.driver_id,
        }
    }
}

impl StaffIdentity {
    /// Driver row of a driver account
    pub fn require_driver(&self) -> Result<i64, AppError> {
        match (self.role, self.driver_id) {
            (StaffRole::Driver, Some(id)) => Ok(id),
            _ => Err(AppError::with_message(
                ErrorCode::RoleRequired,
                "A driver account is required",
            )
            .with_detail("required_role", StaffRole::Driver.as_str())),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for StaffIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StaffIdentity>()
            .cloned()
            .ok_or_else(AppError::not_authenticated)
    }
}

/// Map a token verification failure to its API error
pub fn token_error(e: JwtError) -> AppError {
    match e {
        JwtError::Expired => AppError::new(ErrorCode::TokenExpired),
        other => {
            tracing::debug!("JWT validation failed: {other}");
            AppError::new(ErrorCode::TokenInvalid)
        }
    }
}

/// Middleware that extracts and verifies the staff JWT from the Authorization header
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::with_message(ErrorCode::TokenInvalid, "Invalid Authorization format")
    })?;

    let claims = jwt::verify_token(token, &state.jwt_secret).map_err(token_error)?;
    ensure_active(&state, claims.store_id, claims.sub).await?;
    request.extensions_mut().insert(StaffIdentity::from(claims));

    Ok(next.run(request).await)
}

type RoleFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>;

/// Role guard for a route group, applied after `staff_auth_middleware`
///
/// ```ignore
/// Router::new()
///     .route("/api/kitchen/tickets", get(kitchen::list_tickets))
///     .layer(middleware::from_fn(require_role(StaffRole::Kitchen)));
/// ```
pub fn require_role(role: StaffRole) -> impl Fn(Request, Next) -> RoleFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let identity = req
                .extensions()
                .get::<StaffIdentity>()
                .ok_or_else(AppError::not_authenticated)?;

            if !identity.role.allows(role) {
                tracing::warn!(
                    user_id = identity.user_id,
                    store_id = identity.store_id,
                    role = %identity.role,
                    required_role = %role,
                    "Role check failed"
                );
                let code = if role == StaffRole::Admin {
                    ErrorCode::AdminRequired
                } else {
                    ErrorCode::RoleRequired
                };
                return Err(AppError::new(code).with_detail("required_role", role.as_str()));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Like `require_role`, accepting any of `roles`
pub fn require_any_role(roles: &'static [StaffRole]) -> impl Fn(Request, Next) -> RoleFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let identity = req
                .extensions()
                .get::<StaffIdentity>()
                .ok_or_else(AppError::not_authenticated)?;

            if !roles.iter().any(|r| identity.role.allows(*r)) {
                tracing::warn!(
                    user_id = identity.user_id,
                    store_id = identity.store_id,
                    role = %identity.role,
                    "Role check failed"
                );
                return Err(AppError::new(ErrorCode::RoleRequired));
            }

            Ok(next.run(req).await)
        })
    }
}
