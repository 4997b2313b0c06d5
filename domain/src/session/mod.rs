//! Session types: the request shared across a fan-out and the token-level
//! streaming events bridged up from provider transports.

pub mod entities;
pub mod stream;
