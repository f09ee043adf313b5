//! Application core, pure domain logic with zero I/O.
//!
//! This module contains the business rules for the greenhouse
//! controller: mode handling, safety gating, climate policy evaluation,
//! actuation queueing and schedule reactions.  All interaction with the
//! greenhouse happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod actuation;
pub mod commands;
pub mod events;
pub mod mode;
pub mod ports;
pub mod service;
