//! Core types for connector-agent.

pub mod message;

pub use message::*;
