//! Domain types and the ports the application layer talks through.

pub mod identifier;
pub mod payment;
pub mod ports;
