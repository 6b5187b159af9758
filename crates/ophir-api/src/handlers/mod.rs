//! Route handlers. Each one validates, calls a port, and shapes the JSON.

pub mod auth;
pub mod contacts;
pub mod properties;
pub mod upload;
