use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde_json::Value;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ApiResult};
use crate::database::models::{Apartment, ApartmentChanges, ApartmentStatus, NewApartment, Role};
use crate::error::ApiError;
use crate::filter::{ListingFilterParams, Predicate};
use crate::middleware::CurrentUser;
use crate::policy::{self, Actor};
use crate::state::AppState;
use crate::validation as v;

fn parse_apartment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Can't find the apartment"))
}

fn parse_status(raw: &str) -> Result<ApartmentStatus, ApiError> {
    v::one_of("status", raw, &["Available", "Rented"])?;
    Ok(match raw {
        "Available" => ApartmentStatus::Available,
        _ => ApartmentStatus::Rented,
    })
}

/// The submitted `realtor` value: the empty string counts as absent
fn parse_realtor_field(raw: Option<String>) -> Result<Option<Uuid>, ApiError> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| ApiError::validation("\"realtor\" must be a valid id")),
    }
}

/// The listing invariant: a non-null owner must be an existing account
/// with role realtor. Only admin-assigned owners reach this check; a
/// realtor's own id is trusted from the session.
async fn ensure_realtor_exists(state: &AppState, owner: Uuid) -> Result<(), ApiError> {
    let owner_user = state
        .users()
        .find_by_id(owner)
        .await?
        .filter(|user| user.role == Role::Realtor);
    if owner_user.is_none() {
        return Err(ApiError::validation("\"realtor\" must be an existing realtor"));
    }
    Ok(())
}

/// GET /apartments - Filtered listing. Every authenticated role may
/// list; the policy scope is merged into the predicate before the
/// query runs, never applied after the fact.
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListingFilterParams>,
) -> ApiResult<Vec<Apartment>> {
    let actor = Actor::from(&user);
    let scope = policy::listing_list(&actor).require()?;

    let mut predicate = Predicate::from_params(&params)?;
    predicate.apply_scope(&scope);

    let apartments = state.apartments().find_many(&predicate).await?;
    Ok(ApiResponse::success(apartments))
}

/// GET /apartments/:id - Single lookup, any authenticated role
pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Apartment> {
    let actor = Actor::from(&user);
    policy::listing_read(&actor).require()?;

    let id = parse_apartment_id(&id)?;
    let apartment = state
        .apartments()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Can't find the apartment"))?;

    Ok(ApiResponse::success(apartment))
}

/// POST /apartments - Create a listing. The role gate runs before the
/// body is even read; the effective owner comes from the policy engine,
/// so a realtor can never create on someone else's behalf.
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Option<Json<Value>>,
) -> ApiResult<Apartment> {
    let actor = Actor::from(&user);
    policy::listing_manage(&actor).require()?;

    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(&[
        "name",
        "description",
        "floorAreaSize",
        "pricePerMonth",
        "numberOfRooms",
        "address",
        "latitude",
        "longitude",
        "realtor",
        "status",
    ])?;

    let name = fields.required_string("name")?;
    let description = fields.optional_string("description")?.unwrap_or_default();
    let floor_area_size = fields.required_number("floorAreaSize")?;
    v::positive("floorAreaSize", floor_area_size)?;
    let price_per_month = fields.required_number("pricePerMonth")?;
    v::positive("pricePerMonth", price_per_month)?;
    let number_of_rooms = fields.required_integer("numberOfRooms")?;
    v::positive("numberOfRooms", number_of_rooms as f64)?;
    let number_of_rooms = i32::try_from(number_of_rooms)
        .map_err(|_| ApiError::validation("\"numberOfRooms\" must be an integer"))?;
    let address = fields.required_string("address")?;
    let latitude = fields.required_number("latitude")?;
    let longitude = fields.required_number("longitude")?;
    let requested_owner = parse_realtor_field(fields.optional_string("realtor")?)?;
    let status = parse_status(&fields.required_string("status")?)?;

    let owner = policy::listing_create(&actor, requested_owner).require()?;
    if let Some(owner_id) = owner {
        if owner_id != actor.id {
            ensure_realtor_exists(&state, owner_id).await?;
        }
    }

    let apartment = state
        .apartments()
        .create(NewApartment {
            name,
            description,
            floor_area_size,
            price_per_month,
            number_of_rooms,
            address,
            latitude,
            longitude,
            status,
            realtor: owner,
        })
        .await?;

    Ok(ApiResponse::created(apartment))
}

/// PUT /apartments/:id - Partial update by the owning realtor or an
/// admin. The allow-listed field set comes from the policy engine, so a
/// realtor submitting `realtor` fails validation outright.
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<&'static str> {
    let actor = Actor::from(&user);
    policy::listing_manage(&actor).require()?;

    let id = parse_apartment_id(&id)?;
    let apartment = state
        .apartments()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Can't find the apartment"))?;

    policy::listing_mutate(&actor, apartment.realtor).require()?;

    let fields = v::Fields::from_body(body.map(|Json(b)| b))?;
    fields.deny_unknown(policy::listing_update_fields(&actor))?;

    let floor_area_size = fields.optional_number("floorAreaSize")?;
    if let Some(value) = floor_area_size {
        v::positive("floorAreaSize", value)?;
    }
    let price_per_month = fields.optional_number("pricePerMonth")?;
    if let Some(value) = price_per_month {
        v::positive("pricePerMonth", value)?;
    }
    let number_of_rooms = match fields.optional_integer("numberOfRooms")? {
        Some(value) => {
            v::positive("numberOfRooms", value as f64)?;
            Some(
                i32::try_from(value)
                    .map_err(|_| ApiError::validation("\"numberOfRooms\" must be an integer"))?,
            )
        }
        None => None,
    };
    let status = match fields.optional_string("status")? {
        Some(raw) => Some(parse_status(&raw)?),
        None => None,
    };
    // Only reachable for admins; the allow-list strips it for realtors
    let realtor = parse_realtor_field(fields.optional_string("realtor")?)?;
    if let Some(owner_id) = realtor {
        ensure_realtor_exists(&state, owner_id).await?;
    }

    let changes = ApartmentChanges {
        name: fields.optional_string("name")?,
        description: fields.optional_string("description")?,
        floor_area_size,
        price_per_month,
        number_of_rooms,
        address: fields.optional_string("address")?,
        latitude: fields.optional_number("latitude")?,
        longitude: fields.optional_number("longitude")?,
        status,
        realtor,
    };

    state.apartments().update(id, changes).await?;
    Ok(ApiResponse::success("Apartment updated successfully"))
}

/// DELETE /apartments/:id - Owning realtor or admin
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    let actor = Actor::from(&user);
    policy::listing_manage(&actor).require()?;

    let id = parse_apartment_id(&id)?;
    let apartment = state
        .apartments()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Can't find the apartment"))?;

    policy::listing_mutate(&actor, apartment.realtor).require()?;

    state.apartments().delete(id).await?;
    Ok(ApiResponse::success("Apartment deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_values_are_closed() {
        assert_eq!(parse_status("Available").unwrap(), ApartmentStatus::Available);
        assert_eq!(parse_status("Rented").unwrap(), ApartmentStatus::Rented);

        let err = parse_status("available").unwrap_err();
        assert_eq!(err.message(), "\"status\" must be one of [Available, Rented]");
    }

    #[test]
    fn empty_realtor_counts_as_absent() {
        assert_eq!(parse_realtor_field(None).unwrap(), None);
        assert_eq!(parse_realtor_field(Some(String::new())).unwrap(), None);

        let id = Uuid::new_v4();
        assert_eq!(parse_realtor_field(Some(id.to_string())).unwrap(), Some(id));
        assert!(parse_realtor_field(Some("nonsense".into())).is_err());
    }

    #[test]
    fn malformed_ids_read_as_missing_apartments() {
        let err = parse_apartment_id("42").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Can't find the apartment");
    }
}
