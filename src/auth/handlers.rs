use std::time::Duration;

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    dto::MessageResponse,
    error::{ApiError, ApiResult},
    mailer,
    state::AppState,
};

use super::{
    dto::{
        ForgotPassRequest, LoginRequest, LoginResponse, PublicUser, RegisterRequest,
        ResetPassRequest, UpdateEmailRequest, UpdateNameRequest, UpdatePasswordRequest,
        VerifyEmailQuery,
    },
    jwt::{AuthUser, JwtKeys, TokenKind},
    password::{hash_password, verify_password},
    repo::User,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/login", post(login))
        .route("/users/forgot-pass", post(forgot_pass))
        .route("/verify-email", get(verify_email))
        .route("/users/verify-email", get(verify_email))
        .route("/users/reset-pass", patch(reset_password))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(me).delete(delete_me))
        .route("/users/update-name", patch(update_name))
        .route("/users/update-password", patch(update_password))
        .route("/users/update-email", patch(update_email))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal
    })?;
    let user = User::create(&state.db, &name, &payload.email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_email_verify(user.id, None).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal
    })?;
    User::store_email_token(&state.db, user.id, &token).await?;

    // The account is created regardless of the mail leg.
    let verify_url = format!("{}?token={}", state.config.mail.verify_url, token);
    let (subject, body) = mailer::verification_email(&user.name, &verify_url);
    mailer::send_best_effort(
        state.mailer.as_ref(),
        Duration::from_secs(state.config.mail.timeout_secs),
        &user.email,
        &subject,
        &body,
    )
    .await;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password are indistinguishable.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Authentication("Invalid credentials".into()));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Authentication("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_session(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
async fn forgot_pass(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPassRequest>,
) -> ApiResult<Json<MessageResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_password_reset(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal
    })?;
    User::store_reset_token(&state.db, user.id, &token).await?;

    let reset_url = format!("{}?token={}", state.config.mail.reset_url, token);
    let (subject, body) = mailer::reset_email(&user.name, &reset_url);
    mailer::send_best_effort(
        state.mailer.as_ref(),
        Duration::from_secs(state.config.mail.timeout_secs),
        &user.email,
        &subject,
        &body,
    )
    .await;

    info!(user_id = %user.id, "password reset requested");
    Ok(Json(MessageResponse::new("Password reset email sent")))
}

#[instrument(skip(state, query))]
async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_expecting(&query.token, TokenKind::EmailVerify)
        .map_err(|_| ApiError::Authentication("Invalid or expired token".into()))?;

    // Conditional update; a replayed or raced token consumes zero rows.
    let consumed = User::consume_email_token(
        &state.db,
        claims.sub,
        &query.token,
        claims.new_email.as_deref(),
    )
    .await?;
    if !consumed {
        return Err(ApiError::Authentication("Invalid or expired token".into()));
    }

    info!(user_id = %claims.sub, "email verified");
    Ok(Json(MessageResponse::new("Email verified")))
}

#[instrument(skip(state, payload))]
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPassRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_expecting(&payload.token, TokenKind::PasswordReset)
        .map_err(|_| ApiError::Authentication("Invalid or expired token".into()))?;

    let hash = hash_password(&payload.new_password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal
    })?;
    let consumed = User::consume_reset_token(&state.db, claims.sub, &payload.token, &hash).await?;
    if !consumed {
        return Err(ApiError::Authentication("Invalid or expired token".into()));
    }

    info!(user_id = %claims.sub, "password reset");
    Ok(Json(MessageResponse::new("Password updated")))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Authentication("User not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::Authentication("User not found".into()));
    }
    info!(%user_id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

#[instrument(skip(state, payload))]
async fn update_name(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateNameRequest>,
) -> ApiResult<Json<PublicUser>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    let user = User::update_name(&state.db, user_id, &name)
        .await?
        .ok_or_else(|| ApiError::Authentication("User not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
async fn update_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Authentication("User not found".into()))?;

    let ok = verify_password(&payload.current_password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal
    })?;
    if !ok {
        warn!(%user_id, "password change with wrong current password");
        return Err(ApiError::Authentication("Invalid credentials".into()));
    }

    let hash = hash_password(&payload.new_password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal
    })?;
    User::update_password_hash(&state.db, user_id, &hash).await?;

    info!(%user_id, "password changed");
    Ok(Json(MessageResponse::new("Password updated")))
}

#[instrument(skip(state, payload))]
async fn update_email(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateEmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let new_email = payload.new_email.trim().to_lowercase();
    if !is_valid_email(&new_email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if User::find_by_email(&state.db, &new_email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Authentication("User not found".into()))?;

    // The address only changes once the confirmation link is consumed.
    let keys = JwtKeys::from_ref(&state);
    let token = keys
        .sign_email_verify(user.id, Some(new_email.clone()))
        .map_err(|e| {
            error!(error = %e, "jwt sign failed");
            ApiError::Internal
        })?;
    User::store_email_token(&state.db, user.id, &token).await?;

    let verify_url = format!("{}?token={}", state.config.mail.verify_url, token);
    let (subject, body) = mailer::verification_email(&user.name, &verify_url);
    mailer::send_best_effort(
        state.mailer.as_ref(),
        Duration::from_secs(state.config.mail.timeout_secs),
        &new_email,
        &subject,
        &body,
    )
    .await;

    info!(%user_id, "email change requested");
    Ok(Json(MessageResponse::new("Confirmation email sent")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("joao@email.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("joao@email"));
        assert!(!is_valid_email("joao email@x.com"));
        assert!(!is_valid_email("@email.com"));
        assert!(!is_valid_email(""));
    }
}
