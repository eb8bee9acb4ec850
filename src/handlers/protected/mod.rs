// handlers/protected/mod.rs - handlers behind the session middleware
//
// Every handler here receives `Extension<AuthUser>` and passes it to the
// service explicitly; none of them read identity from anywhere else.
pub mod auth;
pub mod entries;
pub mod glossaries;
