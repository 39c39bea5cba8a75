//! Authorization policy engine.
//!
//! The single source of truth for which role may perform which operation
//! on which resource, and for the implicit scope a role forces onto a
//! query. Handlers never inspect `role` themselves; they ask for a
//! decision here and stop on `Deny` before touching the data layer.
//! Every function is a pure function of its arguments.

use uuid::Uuid;

use crate::database::models::{Role, User};
use crate::error::ApiError;

const PERMISSION_DENIED: &str = "Permission denied";

/// The authenticated user a decision is being made for
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// Outcome of a policy check. `Permit` may carry a payload: a forced
/// scope filter, an effective owner, a visible role set.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<S = ()> {
    Permit(S),
    Deny(&'static str),
}

impl<S> Decision<S> {
    /// Unwrap a permit, or surface the denial as a 403
    pub fn require(self) -> Result<S, ApiError> {
        match self {
            Decision::Permit(payload) => Ok(payload),
            Decision::Deny(reason) => {
                tracing::warn!("policy denial: {}", reason);
                Err(ApiError::forbidden(reason))
            }
        }
    }
}

/// Query restriction a role forces onto listing reads
#[derive(Debug, Clone, PartialEq)]
pub enum ListingScope {
    /// No forced filter (admins see everything)
    All,
    /// Only listings with status Available (clients)
    AvailableOnly,
    /// Only listings owned by the given realtor
    OwnedBy(Uuid),
}

/// Listing list: every authenticated role may list, each behind its
/// role's scope filter.
pub fn listing_list(actor: &Actor) -> Decision<ListingScope> {
    let scope = match actor.role {
        Role::Admin => ListingScope::All,
        Role::Realtor => ListingScope::OwnedBy(actor.id),
        Role::Client => ListingScope::AvailableOnly,
    };
    Decision::Permit(scope)
}

/// Listing read by id: any authenticated role, no ownership filter
pub fn listing_read(_actor: &Actor) -> Decision {
    Decision::Permit(())
}

/// Role gate for the listing-management surface (create/update/delete),
/// evaluated before the target listing is even fetched. Ownership is
/// checked separately by [`listing_mutate`] once the listing is known.
pub fn listing_manage(actor: &Actor) -> Decision {
    match actor.role {
        Role::Admin | Role::Realtor => Decision::Permit(()),
        Role::Client => Decision::Deny(PERMISSION_DENIED),
    }
}

/// Listing create: realtors and admins only. The payload is the
/// effective owner: a realtor always owns what it creates, whatever id
/// was submitted; an admin's request passes through (possibly unowned).
pub fn listing_create(actor: &Actor, requested_owner: Option<Uuid>) -> Decision<Option<Uuid>> {
    match actor.role {
        Role::Admin => Decision::Permit(requested_owner),
        Role::Realtor => Decision::Permit(Some(actor.id)),
        Role::Client => Decision::Deny(PERMISSION_DENIED),
    }
}

/// Listing update/delete: admins may mutate anything; a realtor only a
/// listing it owns. Clients never mutate.
pub fn listing_mutate(actor: &Actor, owner: Option<Uuid>) -> Decision {
    match actor.role {
        Role::Admin => Decision::Permit(()),
        Role::Realtor if owner == Some(actor.id) => Decision::Permit(()),
        Role::Realtor | Role::Client => Decision::Deny(PERMISSION_DENIED),
    }
}

const LISTING_UPDATE_FIELDS: &[&str] = &[
    "name",
    "description",
    "floorAreaSize",
    "pricePerMonth",
    "numberOfRooms",
    "address",
    "latitude",
    "longitude",
    "status",
];

const LISTING_UPDATE_FIELDS_ADMIN: &[&str] = &[
    "name",
    "description",
    "floorAreaSize",
    "pricePerMonth",
    "numberOfRooms",
    "address",
    "latitude",
    "longitude",
    "status",
    "realtor",
];

/// Allow-listed partial-update fields for a listing. Only admins may
/// reassign ownership; for a realtor the `realtor` field is absent from
/// the schema, so submitting it fails validation rather than being
/// silently ignored.
pub fn listing_update_fields(actor: &Actor) -> &'static [&'static str] {
    match actor.role {
        Role::Admin => LISTING_UPDATE_FIELDS_ADMIN,
        _ => LISTING_UPDATE_FIELDS,
    }
}

/// Admin-only user-directory endpoints
pub fn user_admin(actor: &Actor) -> Decision {
    match actor.role {
        Role::Admin => Decision::Permit(()),
        _ => Decision::Deny(PERMISSION_DENIED),
    }
}

/// Per-target gate on user read/update/delete: admin accounts are opaque
/// to the directory, including to the acting admin itself.
pub fn user_target(_actor: &Actor, target_role: Role) -> Decision {
    match target_role {
        Role::Admin => Decision::Deny(PERMISSION_DENIED),
        _ => Decision::Permit(()),
    }
}

/// User list: admin only; the payload is the set of roles the listing
/// may surface (admin accounts are never listed).
pub fn user_list(actor: &Actor) -> Decision<&'static [Role]> {
    match actor.role {
        Role::Admin => Decision::Permit(&[Role::Realtor, Role::Client]),
        _ => Decision::Deny(PERMISSION_DENIED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn listing_list_scopes_by_role() {
        let admin = actor(Role::Admin);
        let realtor = actor(Role::Realtor);
        let client = actor(Role::Client);

        assert_eq!(listing_list(&admin), Decision::Permit(ListingScope::All));
        assert_eq!(listing_list(&realtor), Decision::Permit(ListingScope::OwnedBy(realtor.id)));
        assert_eq!(listing_list(&client), Decision::Permit(ListingScope::AvailableOnly));
    }

    #[test]
    fn realtor_always_owns_what_it_creates() {
        let realtor = actor(Role::Realtor);
        let someone_else = Uuid::new_v4();

        assert_eq!(
            listing_create(&realtor, Some(someone_else)),
            Decision::Permit(Some(realtor.id))
        );
        assert_eq!(listing_create(&realtor, None), Decision::Permit(Some(realtor.id)));
    }

    #[test]
    fn admin_create_passes_requested_owner_through() {
        let admin = actor(Role::Admin);
        let owner = Uuid::new_v4();

        assert_eq!(listing_create(&admin, Some(owner)), Decision::Permit(Some(owner)));
        assert_eq!(listing_create(&admin, None), Decision::Permit(None));
    }

    #[test]
    fn client_cannot_create_listings() {
        let client = actor(Role::Client);
        assert!(matches!(listing_create(&client, None), Decision::Deny(_)));
    }

    #[test]
    fn manage_gate_admits_realtors_and_admins_only() {
        assert_eq!(listing_manage(&actor(Role::Admin)), Decision::Permit(()));
        assert_eq!(listing_manage(&actor(Role::Realtor)), Decision::Permit(()));
        assert!(matches!(listing_manage(&actor(Role::Client)), Decision::Deny(_)));
    }

    #[test]
    fn anyone_authenticated_reads_single_listings() {
        assert_eq!(listing_read(&actor(Role::Client)), Decision::Permit(()));
        assert_eq!(listing_read(&actor(Role::Realtor)), Decision::Permit(()));
        assert_eq!(listing_read(&actor(Role::Admin)), Decision::Permit(()));
    }

    #[test]
    fn mutation_requires_ownership_or_admin() {
        let admin = actor(Role::Admin);
        let realtor = actor(Role::Realtor);
        let client = actor(Role::Client);
        let other = Uuid::new_v4();

        assert_eq!(listing_mutate(&admin, Some(other)), Decision::Permit(()));
        assert_eq!(listing_mutate(&admin, None), Decision::Permit(()));
        assert_eq!(listing_mutate(&realtor, Some(realtor.id)), Decision::Permit(()));
        assert!(matches!(listing_mutate(&realtor, Some(other)), Decision::Deny(_)));
        assert!(matches!(listing_mutate(&realtor, None), Decision::Deny(_)));
        assert!(matches!(listing_mutate(&client, Some(client.id)), Decision::Deny(_)));
    }

    #[test]
    fn realtor_update_schema_excludes_ownership() {
        let realtor = actor(Role::Realtor);
        let admin = actor(Role::Admin);

        assert!(!listing_update_fields(&realtor).contains(&"realtor"));
        assert!(listing_update_fields(&admin).contains(&"realtor"));
    }

    #[test]
    fn user_directory_is_admin_only() {
        assert_eq!(user_admin(&actor(Role::Admin)), Decision::Permit(()));
        assert!(matches!(user_admin(&actor(Role::Realtor)), Decision::Deny(_)));
        assert!(matches!(user_admin(&actor(Role::Client)), Decision::Deny(_)));
    }

    #[test]
    fn admins_are_opaque_to_each_other() {
        let admin = actor(Role::Admin);
        assert!(matches!(user_target(&admin, Role::Admin), Decision::Deny(_)));
        assert_eq!(user_target(&admin, Role::Realtor), Decision::Permit(()));
        assert_eq!(user_target(&admin, Role::Client), Decision::Permit(()));
    }

    #[test]
    fn user_list_never_surfaces_admins() {
        let roles = user_list(&actor(Role::Admin)).require().unwrap();
        assert!(!roles.contains(&Role::Admin));
        assert!(matches!(user_list(&actor(Role::Client)), Decision::Deny(_)));
    }

    #[test]
    fn deny_maps_to_forbidden() {
        let err = user_admin(&actor(Role::Client)).require().unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Permission denied");
    }
}
