// Public endpoints: registration, verification, and token acquisition.
// Everything here must validate its own input; there is no trusted
// user context.
pub mod users;
