// handlers/mod.rs - two security tiers
//
// Public (no session) → Protected (session required, `AuthUser` injected).
pub mod protected;
pub mod public;
