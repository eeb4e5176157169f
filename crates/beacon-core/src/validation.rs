//! Identity field validation.
//!
//! The estimator never looks at identity fields, but callers that accept
//! readings from the outside (the HTTP layer) check them before building a
//! [`crate::Beacon`].

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::{BeaconError, Result};
use crate::types::BeaconModel;

static MAC_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$").expect("MAC address regex is valid")
});

/// Check for a colon-separated, six-octet MAC address (`AA:BB:CC:DD:EE:FF`).
#[must_use]
pub fn is_valid_mac_address(address: &str) -> bool {
    MAC_ADDRESS_RE.is_match(address)
}

/// Check for a hyphenated UUID (`e2c56db5-dffb-48d2-b060-d0f5a71096e0`).
#[must_use]
pub fn is_valid_proximity_uuid(uuid: &str) -> bool {
    uuid.len() == 36 && Uuid::parse_str(uuid).is_ok()
}

/// Validate the identity of an incoming reading.
///
/// The MAC address is always checked. The proximity UUID is only checked
/// for iBeacon advertisements; Eddystone frames carry other identifiers.
///
/// # Errors
///
/// Returns [`BeaconError::InvalidMacAddress`] or
/// [`BeaconError::InvalidProximityUuid`].
pub fn validate_identity(
    proximity_uuid: &str,
    mac_address: &str,
    model: Option<BeaconModel>,
) -> Result<()> {
    if !is_valid_mac_address(mac_address) {
        tracing::warn!(mac_address, "rejecting reading with invalid MAC address");
        return Err(BeaconError::InvalidMacAddress(mac_address.to_string()));
    }
    if model == Some(BeaconModel::IBeacon) && !is_valid_proximity_uuid(proximity_uuid) {
        tracing::warn!(proximity_uuid, "rejecting iBeacon reading with invalid UUID");
        return Err(BeaconError::InvalidProximityUuid(proximity_uuid.to_string()));
    }
    Ok(())
}
