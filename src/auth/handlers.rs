use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use time::Duration;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest, RegisterResponse, TokenResponse},
        password,
    },
    error::{ApiJson, AppError},
    state::AppState,
};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Emails are compared and stored lowercased, so `Bob@X` and `bob@x`
/// are one account.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!("register rejected: invalid email format");
        return Err(AppError::Validation("Invalid email format".into()));
    }
    if payload.password.chars().count() < 8 {
        warn!("register rejected: password too short");
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    // Ensure email is not taken
    if state.store.find_user_by_email(&email).await?.is_some() {
        info!(email = %email, "registration with existing email");
        return Err(AppError::DuplicateEmail);
    }

    let hash = password::hash_password(&payload.password)?;
    let user = state.store.insert_user(&email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&payload.email);

    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            // keep the unknown-email path as slow as the known one
            password::dummy_verify(&payload.password);
            info!(email = %email, "failed login attempt");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !password::verify_password(&payload.password, &user.password_hash) {
        info!(user_id = %user.id, "failed login attempt");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.jwt.issue(
        &user.id.to_string(),
        Some(user.email.as_str()),
        Some(Duration::minutes(state.config.auth.token_ttl_minutes)),
    )?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".into(),
    }))
}
