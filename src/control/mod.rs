//! Closed-loop climate control.
//!
//! [`policy`] holds the automatic valve/fan decision rules.  It is pure:
//! the [`AppService`](crate::app::service::AppService) calls it once per
//! control tick in Automatic mode and routes the result through the
//! actuation queue.

pub mod policy;
