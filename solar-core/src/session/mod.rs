//! Admin session tracking.
//!
//! [`SessionGate`] owns the session state and is the only thing that changes
//! it; [`RouteGuard`] reads it to decide whether protected views may render.
//! The durable copy of the session lives behind the [`SessionStore`] port.

pub mod factory;
pub mod gate;
pub mod guard;
pub mod state;
pub mod store;

pub use factory::{MemoryStoreFactory, SessionStoreFactory, SessionStoreRegistry, StoreConfig};
pub use gate::{GateError, LogoutOutcome, SessionGate};
pub use guard::{GuardDecision, Guarded, RouteGuard};
pub use state::{SessionState, Verification};
pub use store::{MemorySessionStore, SessionStore, StoreError};
