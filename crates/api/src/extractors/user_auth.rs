//! User JWT authentication extractor.
//!
//! Validates the `Authorization: Bearer` token against the configured public key.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::jwt::{extract_user_id, JwtError, Role};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user taken from the token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub role: Role,
}

impl UserAuth {
    /// Owner filter for job lists: `None` for elevated roles.
    pub fn owner_scope(&self) -> Option<Uuid> {
        if self.role.is_elevated() {
            None
        } else {
            Some(self.user_id)
        }
    }

    /// Whether the user may see and change a job owned by `owner_id`.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.role.is_elevated() || self.user_id == owner_id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    ApiError::Unauthorized("Missing Authorization header".to_string())
                } else {
                    ApiError::Unauthorized("Invalid Authorization header format".to_string())
                }
            })?;

        let claims = state.jwt.validate_token(bearer.token()).map_err(|e| match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            other => {
                tracing::debug!(error = %other, "JWT validation failed");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
        })?;

        let user_id = extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(UserAuth {
            user_id,
            role: claims.role,
        })
    }
}
