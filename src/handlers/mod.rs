// Two security tiers: public (no authentication) and protected (JWT
// required, user context injected by the auth middleware).
pub mod protected;
pub mod public;
