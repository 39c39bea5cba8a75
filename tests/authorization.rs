// End-to-end checks of the pure core: the policy engine's forced scopes,
// the condition builder's merge behavior, and the token service. No
// database or network involved.

use uuid::Uuid;

use apartments_api::auth::TokenService;
use apartments_api::config::SecurityConfig;
use apartments_api::database::models::Role;
use apartments_api::filter::{ListingFilterParams, Predicate, SqlParam};
use apartments_api::policy::{self, Actor, Decision, ListingScope};

fn actor(role: Role) -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role,
    }
}

fn security() -> SecurityConfig {
    SecurityConfig {
        jwt_secret: "integration-secret".into(),
        session_ttl_hours: 24,
        verification_ttl_hours: 24,
        hash_memory_kib: 8,
        hash_iterations: 1,
    }
}

#[test]
fn client_listing_queries_are_pinned_to_available() {
    let client = actor(Role::Client);

    let scope = match policy::listing_list(&client) {
        Decision::Permit(scope) => scope,
        Decision::Deny(reason) => panic!("client list denied: {reason}"),
    };
    assert_eq!(scope, ListingScope::AvailableOnly);

    // The scope lands inside the WHERE clause, AND-combined with the
    // user's own filter, so no post-filtering step can be skipped
    let params = ListingFilterParams {
        price_op: Some("lt".into()),
        price_val: Some("300".into()),
        ..Default::default()
    };
    let mut predicate = Predicate::from_params(&params).unwrap();
    predicate.apply_scope(&scope);

    let sql = predicate.to_sql(0);
    assert_eq!(sql.clause, "\"price_per_month\" < $1 AND \"status\" = $2");
}

#[test]
fn realtor_listing_queries_are_pinned_to_their_own_id() {
    let realtor = actor(Role::Realtor);

    let scope = match policy::listing_list(&realtor) {
        Decision::Permit(scope) => scope,
        Decision::Deny(reason) => panic!("realtor list denied: {reason}"),
    };
    assert_eq!(scope, ListingScope::OwnedBy(realtor.id));

    let mut predicate = Predicate::default();
    predicate.apply_scope(&scope);
    let sql = predicate.to_sql(0);
    assert_eq!(sql.params, vec![SqlParam::Uuid(realtor.id)]);
}

#[test]
fn admin_listing_queries_are_unfiltered() {
    let admin = actor(Role::Admin);

    let scope = match policy::listing_list(&admin) {
        Decision::Permit(scope) => scope,
        Decision::Deny(reason) => panic!("admin list denied: {reason}"),
    };

    let mut predicate = Predicate::default();
    predicate.apply_scope(&scope);
    assert!(predicate.is_empty());
}

#[test]
fn cross_realtor_mutation_is_denied_before_any_query() {
    let realtor = actor(Role::Realtor);
    let rival = actor(Role::Realtor);

    // Whatever the request body claims, ownership comes from the stored
    // listing; a rival realtor is denied outright
    assert!(matches!(
        policy::listing_mutate(&rival, Some(realtor.id)),
        Decision::Deny(_)
    ));

    // And the rival's update schema cannot even name a new owner
    assert!(!policy::listing_update_fields(&rival).contains(&"realtor"));
}

#[test]
fn verification_token_round_trips_until_tampered() {
    let tokens = TokenService::new(&security());

    let token = tokens.issue_verification("a@x.com").unwrap();
    assert_eq!(tokens.redeem_verification(&token).as_deref(), Some("a@x.com"));

    let mut corrupted = token.into_bytes();
    let i = corrupted.len() / 3;
    corrupted[i] = if corrupted[i] == b'x' { b'y' } else { b'x' };
    let corrupted = String::from_utf8(corrupted).unwrap();
    assert_eq!(tokens.redeem_verification(&corrupted), None);
}

#[test]
fn session_tokens_identify_the_issued_user() {
    let tokens = TokenService::new(&security());
    let user_id = Uuid::new_v4();

    let token = tokens.issue_session(user_id).unwrap();
    assert_eq!(tokens.authenticate(&token), Some(user_id));
    assert_eq!(tokens.authenticate("not-a-token"), None);
}
