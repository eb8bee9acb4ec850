// handlers/public/mod.rs - endpoints reachable without a session
//
// Route Prefix: / and /health, plus /api/auth/logout which only clears the cookie.
pub mod root;

pub use root::{health, logout, root};
