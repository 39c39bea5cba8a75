// Protected endpoints: the auth middleware has already validated the
// session token and injected the CurrentUser extension. Role and
// ownership decisions are delegated to the policy engine; handlers
// never branch on `role` themselves.
pub mod apartments;
pub mod profile;
pub mod users;
