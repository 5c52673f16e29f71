//! Outer surfaces: the HTTP gateway, the simulated bank and CSV batch I/O.

pub mod bank_simulator;
pub mod batch;
pub mod csv;
pub mod http;
