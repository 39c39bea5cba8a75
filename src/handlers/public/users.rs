use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::response::{ApiResponse, ApiResult};
use crate::auth::password;
use crate::database::models::{NewUser, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation as v;

/// POST /users/register - Self-registration.
///
/// The role is always `client` and the account starts unverified; a
/// verification token goes out by mail. Registration succeeds even if
/// the mail hand-off fails.
pub async fn register(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> ApiResult<&'static str> {
    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["email", "password", "firstname", "lastname"])?;

    let email = v::required_email(&fields, "email")?;
    let plain = v::required_password(&fields, "password")?;
    let firstname = v::required_name(&fields, "firstname")?;
    let lastname = v::required_name(&fields, "lastname")?;

    let password_hash = password::hash(&plain, &state.config.security)?;
    let user = state
        .users()
        .create(NewUser {
            email,
            password_hash,
            firstname,
            lastname,
            role: Role::Client,
            verified: false,
        })
        .await?;

    let token = state.tokens.issue_verification(&user.email)?;
    tracing::debug!("verification token for {}: {}", user.email, token);
    state.mailer.send_verification(&user.email, &token);

    Ok(ApiResponse::created("User registered successfully"))
}

/// POST /users/login - Credential check and session-token issuance.
///
/// Unknown address and wrong password collapse to the same message;
/// an unverified account is told to verify first.
pub async fn login(State(state): State<AppState>, body: Option<Json<Value>>) -> ApiResult<Value> {
    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["email", "password"])?;

    let email = v::required_email(&fields, "email")?;
    let plain = v::required_password(&fields, "password")?;

    let user = state
        .users()
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !user.verified {
        return Err(ApiError::unauthorized("Please verify your email"));
    }

    if !password::verify(&plain, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.tokens.issue_session(user.id)?;
    Ok(ApiResponse::success(json!({ "user": user, "token": token })))
}

/// POST /users/verify - Redeem an email-verification token.
///
/// Tampered, expired, and unknown-address tokens are indistinguishable
/// to the caller. A successful redemption logs the user straight in.
pub async fn verify(State(state): State<AppState>, body: Option<Json<Value>>) -> ApiResult<Value> {
    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["token"])?;
    let token = fields.required_string("token")?;

    let email = state
        .tokens
        .redeem_verification(&token)
        .ok_or_else(|| ApiError::validation("Token is invalid or expired"))?;

    let mut user = state
        .users()
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::validation("Token is invalid or expired"))?;

    if user.verified {
        return Ok(ApiResponse::rejected(json!("The user is already verified")));
    }

    state.users().set_verified(user.id).await?;
    user.verified = true;

    let session = state.tokens.issue_session(user.id)?;
    Ok(ApiResponse::success(json!({ "user": user, "token": session })))
}

/// POST /users/resend - Re-issue the verification mail
pub async fn resend(State(state): State<AppState>, body: Option<Json<Value>>) -> ApiResult<Value> {
    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["email"])?;
    let email = v::required_email(&fields, "email")?;

    let user = match state.users().find_by_email(&email).await? {
        None => return Ok(ApiResponse::rejected(json!("You are not registered yet"))),
        Some(user) if user.verified => {
            return Ok(ApiResponse::rejected(json!("You have already verified email")))
        }
        Some(user) => user,
    };

    let token = state.tokens.issue_verification(&user.email)?;
    tracing::debug!("verification token for {}: {}", user.email, token);
    state.mailer.send_verification(&user.email, &token);

    Ok(ApiResponse::success(json!("Email sent successfully")))
}
