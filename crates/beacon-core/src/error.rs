//! Unified error types for the beacon-range core library.
//!
//! Distance estimation itself never fails: degraded readings come back as
//! the `-1.0` / [`crate::Proximity::Unknown`] sentinel. Errors only arise at
//! the edges, when readings are decoded from a transport form, when their
//! identity fields are validated, or when configuration is loaded.
//!
//! Each edge has its own error type ([`crate::ParcelError`],
//! [`crate::ConfigError`]) which converts into [`BeaconError`].
//!
//! # Example
//!
//! ```rust
//! use beacon_core::error::{BeaconError, Result};
//!
//! fn require_mac(address: &str) -> Result<()> {
//!     if !beacon_core::is_valid_mac_address(address) {
//!         return Err(BeaconError::InvalidMacAddress(address.to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_mac("AA:BB:CC:DD:EE:FF").is_ok());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The unified error type for all beacon-range operations.
#[derive(Debug, Error)]
pub enum BeaconError {
    // =========================================================================
    // TRANSPORT ERRORS
    // =========================================================================
    /// A parcel ended before every field was read.
    #[error("Parcel is missing field '{0}'")]
    ParcelUnderflow(&'static str),

    /// A parcel field held the wrong primitive type.
    #[error("Parcel field '{field}' should be a {expected}")]
    ParcelTypeMismatch {
        /// Field being read.
        field: &'static str,
        /// Expected primitive type.
        expected: &'static str,
    },

    // =========================================================================
    // IDENTITY ERRORS
    // =========================================================================
    /// The MAC address is not six colon-separated hex octets.
    #[error("Invalid MAC address: '{0}'. Expected format 'AA:BB:CC:DD:EE:FF'.")]
    InvalidMacAddress(String),

    /// The proximity UUID of an iBeacon reading is not a hyphenated UUID.
    #[error("Invalid proximity UUID: '{0}'. Expected format 'e2c56db5-dffb-48d2-b060-d0f5a71096e0'.")]
    InvalidProximityUuid(String),

    /// The beacon model string is not one of `iBeacon`, `url`, `uid`.
    #[error("Unknown beacon model: '{0}'. Expected one of 'iBeacon', 'url', 'uid'.")]
    UnknownModel(String),

    /// A proximity code outside `0..=3`.
    #[error("Invalid proximity code: {0}. Expected 0 (unknown) to 3 (far).")]
    InvalidProximityCode(i32),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration file was not found at the expected path.
    #[error("Configuration file not found at: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    /// The configuration file could not be read or written.
    #[error("Configuration I/O error: {0}")]
    ConfigIoError(String),
}

/// A specialized [`Result`] type for beacon-range operations.
pub type Result<T> = std::result::Result<T, BeaconError>;

impl BeaconError {
    /// Returns `true` if a reading could not be decoded from its transport form.
    #[inline]
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::ParcelUnderflow(_) | Self::ParcelTypeMismatch { .. }
        )
    }

    /// Returns `true` if a reading carried malformed identity fields.
    #[inline]
    #[must_use]
    pub const fn is_identity_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMacAddress(_)
                | Self::InvalidProximityUuid(_)
                | Self::UnknownModel(_)
                | Self::InvalidProximityCode(_)
        )
    }

    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_)
                | Self::ConfigParseError(_)
                | Self::ConfigValidationError(_)
                | Self::ConfigIoError(_)
        )
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::ParcelUnderflow(_)
            | Self::ParcelTypeMismatch { .. }
            | Self::InvalidMacAddress(_)
            | Self::InvalidProximityUuid(_)
            | Self::UnknownModel(_)
            | Self::InvalidProximityCode(_) => 400,

            // 404 Not Found
            Self::ConfigNotFound(_) => 404,

            // 422 Unprocessable Entity - semantic errors
            Self::ConfigParseError(_) | Self::ConfigValidationError(_) => 422,

            // 500 Internal Server Error - server-side issues
            Self::ConfigIoError(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ParcelUnderflow(_) => "PARCEL_UNDERFLOW",
            Self::ParcelTypeMismatch { .. } => "PARCEL_TYPE_MISMATCH",
            Self::InvalidMacAddress(_) => "INVALID_MAC_ADDRESS",
            Self::InvalidProximityUuid(_) => "INVALID_PROXIMITY_UUID",
            Self::UnknownModel(_) => "UNKNOWN_MODEL",
            Self::InvalidProximityCode(_) => "INVALID_PROXIMITY_CODE",
            Self::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::ConfigIoError(_) => "CONFIG_IO_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<crate::parcel::ParcelError> for BeaconError {
    fn from(err: crate::parcel::ParcelError) -> Self {
        use crate::parcel::ParcelError;
        match err {
            ParcelError::Underflow { field } => Self::ParcelUnderflow(field),
            ParcelError::TypeMismatch { field, expected } => {
                Self::ParcelTypeMismatch { field, expected }
            }
        }
    }
}

impl From<crate::config::ConfigError> for BeaconError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::NotFound(path) => Self::ConfigNotFound(path),
            ConfigError::ReadError { path, source } => {
                Self::ConfigIoError(format!("Failed to read {}: {}", path.display(), source))
            }
            ConfigError::WriteError { path, source } => {
                Self::ConfigIoError(format!("Failed to write {}: {}", path.display(), source))
            }
            ConfigError::ParseError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::SerializeError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::LayerError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
            ConfigError::MultipleValidationErrors(errors) => {
                let messages: Vec<String> = errors.into_iter().map(|e| e.to_string()).collect();
                Self::ConfigValidationError(messages.join("; "))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
