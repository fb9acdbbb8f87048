//! Navigation gating.
//!
//! Only the redirect *decision* lives here; performing the navigation
//! is the presentation layer's concern.

pub mod guard;

pub use guard::{RouteDecision, RouteGuard, RoutePolicy};
