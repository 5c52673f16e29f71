//! Application layer containing the payment processing orchestration.
//!
//! This module defines the `PaymentOrchestrator`, the entry point for
//! processing and retrieving payments, and the `DuplicateGuard` it uses to
//! reject replays.

pub mod duplicate_guard;
pub mod orchestrator;
