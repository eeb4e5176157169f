//! # beacon-server
//!
//! HTTP server library for the beacon-range proximity estimator.
//!
//! This library provides the API handlers, shared state and logging setup
//! used by the `beacon-server` binary.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod api;
pub mod logging;
pub mod state;
