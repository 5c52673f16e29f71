//! Card-payment gateway.
//!
//! Accepts card-payment requests, rejects replays within a window, asks an
//! external backend for a verdict, records the outcome and serves masked
//! payment details back by identifier.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
