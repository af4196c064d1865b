use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::jwt::Claims,
    error::AppError,
    state::AppState,
    store::{Store, User},
};

/// Extracts and validates the bearer token, resolving it to the full
/// user record handlers act on behalf of.
pub struct AuthUser(pub User);

/// Map verified claims to a user: `sub` is interpreted as one of our
/// user ids, falling back to the email claim when it is not (tokens
/// minted by the frontend issuer carry an opaque subject). A `sub`
/// that parses as a uuid but matches no row does not fall back.
pub(crate) async fn resolve_principal(
    store: &dyn Store,
    claims: &Claims,
) -> Result<User, AppError> {
    let user = match Uuid::parse_str(&claims.sub) {
        Ok(id) => store.find_user_by_id(id).await?,
        Err(_) => match claims.email.as_deref() {
            Some(email) => {
                store
                    .find_user_by_email(&email.trim().to_lowercase())
                    .await?
            }
            None => None,
        },
    };
    user.ok_or_else(|| {
        warn!(sub = %claims.sub, "token resolves to no user");
        AppError::PrincipalNotFound
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::TokenInvalid)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::TokenInvalid)?;

        let claims = state.jwt.verify(token)?;
        let user = resolve_principal(state.store.as_ref(), &claims).await?;
        Ok(AuthUser(user))
    }
}
