use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ApiResult};
use crate::auth::password;
use crate::database::models::{NewUser, Role, User, UserChanges};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::policy::{self, Actor};
use crate::state::AppState;
use crate::validation as v;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Can't find the user"))
}

/// Parse and restrict a submitted role: the admin surface can only
/// assign realtor or client, never admin.
fn parse_assignable_role(raw: &str) -> Result<Role, ApiError> {
    v::one_of("role", raw, &["realtor", "client"])?;
    Ok(match raw {
        "realtor" => Role::Realtor,
        _ => Role::Client,
    })
}

/// GET /users - Admin-only listing; admin accounts are never surfaced.
/// An optional `?role=` narrows to one of the visible roles.
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Vec<User>> {
    let actor = Actor::from(&user);
    let visible = policy::user_list(&actor).require()?;

    let roles: Vec<Role> = match query.role.as_deref() {
        None => visible.to_vec(),
        Some("realtor") => vec![Role::Realtor],
        Some("client") => vec![Role::Client],
        Some(_) => return Err(ApiError::validation("Invalid role")),
    };

    let users = state.users().find_by_roles(&roles).await?;
    Ok(ApiResponse::success(users))
}

/// POST /users - Admin invite: creates a realtor or client account,
/// optionally pre-verified, and mails an invitation token.
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Option<Json<Value>>,
) -> ApiResult<User> {
    let actor = Actor::from(&user);
    policy::user_admin(&actor).require()?;

    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["email", "password", "firstname", "lastname", "role", "verified"])?;

    let email = v::required_email(&fields, "email")?;
    let plain = v::required_password(&fields, "password")?;
    let firstname = v::required_name(&fields, "firstname")?;
    let lastname = v::required_name(&fields, "lastname")?;
    let role = parse_assignable_role(&fields.required_string("role")?)?;
    let verified = fields.optional_bool("verified")?.unwrap_or(false);

    let password_hash = password::hash(&plain, &state.config.security)?;
    let created = state
        .users()
        .create(NewUser {
            email,
            password_hash,
            firstname,
            lastname,
            role,
            verified,
        })
        .await?;

    let token = state.tokens.issue_verification(&created.email)?;
    state.mailer.send_invitation(&created.email, &token);

    Ok(ApiResponse::created(created))
}

/// GET /users/:id - Admin-only single lookup; admin targets are opaque
pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let actor = Actor::from(&user);
    policy::user_admin(&actor).require()?;

    let id = parse_user_id(&id)?;
    let target = state
        .users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist"))?;

    policy::user_target(&actor, target.role).require()?;
    Ok(ApiResponse::success(target))
}

/// PUT /users/:id - Admin partial update. The role can move between
/// realtor and client only; admin targets are untouchable.
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<&'static str> {
    let actor = Actor::from(&user);
    policy::user_admin(&actor).require()?;

    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&["email", "password", "firstname", "lastname", "role", "verified"])?;

    let role = match fields.optional_string("role")? {
        Some(raw) => Some(parse_assignable_role(&raw)?),
        None => None,
    };
    let password_hash = match v::optional_password(&fields, "password")? {
        Some(plain) => Some(password::hash(&plain, &state.config.security)?),
        None => None,
    };
    let changes = UserChanges {
        email: v::optional_email(&fields, "email")?,
        password_hash,
        firstname: v::optional_name(&fields, "firstname")?,
        lastname: v::optional_name(&fields, "lastname")?,
        role,
        verified: fields.optional_bool("verified")?,
    };

    let id = parse_user_id(&id)?;
    let target = state
        .users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Can't find the user"))?;

    policy::user_target(&actor, target.role).require()?;

    state.users().update(id, changes).await?;
    Ok(ApiResponse::success("User updated successfully"))
}

/// DELETE /users/:id - Admin delete; admin targets are untouchable
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    let actor = Actor::from(&user);
    policy::user_admin(&actor).require()?;

    let id = parse_user_id(&id)?;
    let target = state
        .users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Can't find the user"))?;

    policy::user_target(&actor, target.role).require()?;

    state.users().delete(id).await?;
    Ok(ApiResponse::success("User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignable_roles_exclude_admin() {
        assert_eq!(parse_assignable_role("realtor").unwrap(), Role::Realtor);
        assert_eq!(parse_assignable_role("client").unwrap(), Role::Client);

        let err = parse_assignable_role("admin").unwrap_err();
        assert_eq!(err.message(), "\"role\" must be one of [realtor, client]");
    }

    #[test]
    fn malformed_ids_read_as_missing_users() {
        let err = parse_user_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
