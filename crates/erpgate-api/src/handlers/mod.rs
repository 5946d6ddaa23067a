//! HTTP request handlers.

pub mod auth;
pub mod erp;
pub mod health;
