//! Gateway sessions: identifiers, the in-memory store, and idle cleanup.

pub mod cleanup;
pub mod id;
pub mod store;

pub use cleanup::SessionCleanup;
pub use id::SessionId;
pub use store::SessionStore;
