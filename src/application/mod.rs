//! Application layer: ports and the session use case

pub mod ports;
pub mod session;
