//! Greenhouse controller library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulator binary.  Nothing here performs I/O except the adapters.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod readings;
pub mod safety;
pub mod scheduler;
pub mod status;

pub mod adapters;
pub mod drivers;
