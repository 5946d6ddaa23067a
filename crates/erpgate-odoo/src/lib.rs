//! # erpgate-odoo
//!
//! Client side of the Odoo JSON-RPC protocol as far as erpgate needs it:
//!
//! - `client`: [`OdooClient`], the reqwest-backed [`ErpConnector`]
//! - `connector`: the [`ErpConnector`] seam used by the auth gateway
//! - `rpc`: JSON-RPC envelopes and remote error classification
//! - `session`: the [`ErpSession`] produced by a successful handshake
//! - `error`: [`ErpError`], already classified for the gateway

pub mod client;
pub mod connector;
pub mod error;
pub mod rpc;
pub mod session;

pub use client::OdooClient;
pub use connector::ErpConnector;
pub use error::ErpError;
pub use session::ErpSession;
