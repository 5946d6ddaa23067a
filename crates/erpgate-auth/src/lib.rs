//! # erpgate-auth
//!
//! Everything between an HTTP request and the ERP client:
//!
//! ## Modules
//!
//! - `allowlist`: the allow-list and the credential validator that checks it
//! - `credential`: transient login credentials
//! - `policy`: which ERP endpoints and databases a client may target
//! - `session`: session identifiers, the in-memory store and its cleanup task
//! - `gateway`: the login/logout/who-am-i/call state machine

pub mod allowlist;
pub mod credential;
pub mod gateway;
pub mod policy;
pub mod session;

pub use allowlist::{AllowList, CredentialValidator};
pub use credential::Credential;
pub use gateway::{AuthGateway, GatewayState, Identity, LoginOutcome};
pub use policy::{EndpointGuard, ErpTarget};
pub use session::{SessionCleanup, SessionId, SessionStore};
