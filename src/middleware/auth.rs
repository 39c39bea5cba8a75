use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated account, loaded fresh from the directory on every
/// request and injected as a request extension.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Authentication guard for every protected route. Expects
/// `Authorization: JWT <token>`; validates the token, resolves the
/// account, and rejects with 401 before any handler runs.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers)?;

    let user_id = state
        .tokens
        .authenticate(&token)
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    // The token only carries the id; the account itself may have been
    // deleted or changed since issuance
    let user = state
        .users()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match value.strip_prefix("JWT ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::unauthorized(
            "Authorization header must use JWT token format",
        )),
    }
}
