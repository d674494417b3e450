//! HTTP surface
//!
//! - `server` - router construction and process lifecycle
//! - `handlers` - one handler per endpoint
//! - `fault` - random fault injection middleware
//! - `types` - request and response bodies

pub mod fault;
pub mod handlers;
pub mod server;
pub mod types;
