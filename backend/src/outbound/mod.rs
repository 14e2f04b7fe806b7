//! Outbound adapters implementing the domain ports.

pub mod email;
pub mod persistence;
pub mod security;
pub mod tokens;
