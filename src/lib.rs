//! Todo backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds the entities,
//! error taxonomy, ports, and repository-logic services; `inbound` exposes
//! the HTTP adapter; `outbound` provides driven adapters implementing the
//! storage ports.

pub mod domain;
pub mod inbound;
pub mod outbound;
