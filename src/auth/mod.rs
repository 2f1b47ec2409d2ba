//! Bearer-credential resolution against the external identity provider.

mod verifier;

pub use verifier::{AuthError, IdentityConfig, IdentityVerifier};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::{error::AppError, state::SharedState};

/// Authenticated owner identity extracted from the `Authorization` header.
///
/// The raw credential never travels past this extractor; handlers only see
/// the resolved owner id.
pub struct Owner(pub Uuid);

impl FromRequestParts<SharedState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

        let owner = state.identity().resolve_owner(token).await?;
        Ok(Owner(owner))
    }
}
