//! # beacon-core
//!
//! Core logic for the beacon-range proximity estimator.
//!
//! This crate provides:
//! - RSSI path-loss distance estimation and proximity classification
//! - A beacon reading record whose derived values are computed once
//! - A flat, ordered field container for moving readings between processes
//! - Ranking helpers for "nearest beacon" style consumers
//! - Identity validation and configuration management
//!
//! ## Architecture
//!
//! - [`estimator`] - The path-loss model, proximity bands and rounding
//! - [`beacon`] - [`Beacon`], one reading with memoized distance/proximity
//! - [`memo`] - Compute-once cell backing the derived values
//! - [`parcel`] - Ordered primitive-field transport form
//! - [`ranking`] - Sorting and de-duplicating readings
//! - [`validation`] - MAC address and proximity UUID checks
//! - [`config`] - Configuration loading, saving, and validation
//! - [`error`] - Unified error types for the crate
//! - [`types`] - Shared types and OpenAPI schemas
//!
//! ## Example
//!
//! ```rust
//! use beacon_core::{Beacon, Proximity};
//!
//! let beacon = Beacon::new(
//!     "e2c56db5-dffb-48d2-b060-d0f5a71096e0",
//!     "Lobby",
//!     "AA:BB:CC:DD:EE:FF",
//!     1,
//!     2,
//!     -59,
//!     -50,
//! );
//! assert_eq!(beacon.distance(), 0.19);
//! assert_eq!(beacon.proximity(), Proximity::Immediate);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod beacon;
pub mod config;
pub mod error;
pub mod estimator;
pub mod memo;
pub mod parcel;
pub mod ranking;
pub mod types;
pub mod validation;

// Re-export primary types for convenience
pub use crate::beacon::{Beacon, UNKNOWN_NAME};
pub use crate::config::{
    default_config_path, default_log_dir, Config, ConfigError, ConfigResult, LoggingConfig,
    ServerConfig,
};
pub use crate::error::{BeaconError, Result};
pub use crate::estimator::{
    classify_proximity, estimate_accuracy, round_half_up, UNKNOWN_ACCURACY,
};
pub use crate::memo::{Memo, MemoState};
pub use crate::parcel::{Parcel, ParcelError, ParcelValue, Parcelable};
pub use crate::ranking::{dedup_by_address, nearest, rank_by_distance};
pub use crate::types::{BeaconModel, DistanceEstimate, Proximity};
pub use crate::validation::{is_valid_mac_address, is_valid_proximity_uuid, validate_identity};
