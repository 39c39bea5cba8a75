use axum::extract::State;
use axum::{Extension, Json};
use serde_json::Value;

use crate::api::response::{ApiResponse, ApiResult};
use crate::auth::password;
use crate::database::models::{User, UserChanges};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::validation as v;

/// GET /profile - The caller's own record
pub async fn get_profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// POST /users/profile - Self-service partial update. Identity comes
/// from the session; there is no id parameter.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Option<Json<Value>>,
) -> ApiResult<&'static str> {
    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["email", "firstname", "lastname"])?;

    let changes = UserChanges {
        email: v::optional_email(&fields, "email")?,
        firstname: v::optional_name(&fields, "firstname")?,
        lastname: v::optional_name(&fields, "lastname")?,
        ..Default::default()
    };

    state.users().update(user.id, changes).await?;
    Ok(ApiResponse::success("Profile updated successfully"))
}

/// POST /users/change-password - Self-service password rotation; the
/// old password must verify before the new one is stored.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Option<Json<Value>>,
) -> ApiResult<&'static str> {
    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["oldPassword", "newPassword"])?;

    let old_password = v::required_password(&fields, "oldPassword")?;
    let new_password = v::required_password(&fields, "newPassword")?;

    if !password::verify(&old_password, &user.password_hash) {
        return Err(ApiError::validation("Wrong password"));
    }

    let password_hash = password::hash(&new_password, &state.config.security)?;
    state
        .users()
        .update(
            user.id,
            UserChanges {
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::success("Password changed successfully"))
}
