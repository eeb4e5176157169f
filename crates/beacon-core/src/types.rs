//! Shared types and OpenAPI schemas.
//!
//! These types cross the crate boundary: the HTTP layer serializes them
//! directly, so their serde representations are part of the public API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::BeaconError;

/// Coarse distance band derived from an accuracy estimate.
///
/// The integer codes (`0..=3`) are stable and exposed through
/// [`Proximity::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Proximity {
    /// Distance could not be estimated.
    #[default]
    Unknown = 0,
    /// Closer than 0.5 m.
    Immediate = 1,
    /// Between 0.5 m and 3 m.
    Near = 2,
    /// 3 m or further.
    Far = 3,
}

impl Proximity {
    /// Stable integer code for this band.
    #[inline]
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Lowercase name, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Immediate => "immediate",
            Self::Near => "near",
            Self::Far => "far",
        }
    }
}

impl TryFrom<i32> for Proximity {
    type Error = BeaconError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Immediate),
            2 => Ok(Self::Near),
            3 => Ok(Self::Far),
            other => Err(BeaconError::InvalidProximityCode(other)),
        }
    }
}

impl fmt::Display for Proximity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advertisement format a beacon was discovered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BeaconModel {
    /// Apple iBeacon (proximity UUID + major/minor).
    #[serde(rename = "iBeacon")]
    IBeacon,
    /// Eddystone-URL.
    #[serde(rename = "url")]
    Url,
    /// Eddystone-UID.
    #[serde(rename = "uid")]
    Uid,
}

impl BeaconModel {
    /// Canonical model string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IBeacon => "iBeacon",
            Self::Url => "url",
            Self::Uid => "uid",
        }
    }
}

impl fmt::Display for BeaconModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeaconModel {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iBeacon" => Ok(Self::IBeacon),
            "url" => Ok(Self::Url),
            "uid" => Ok(Self::Uid),
            other => Err(BeaconError::UnknownModel(other.to_string())),
        }
    }
}

/// Distance estimate for a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "accuracy": 3.47,
    "proximity": "far"
}))]
pub struct DistanceEstimate {
    /// Estimated distance in metres, or `-1.0` when unknown.
    #[schema(example = 3.47)]
    pub accuracy: f64,

    /// Band the distance falls into.
    pub proximity: Proximity,
}

impl DistanceEstimate {
    /// Whether the distance could be estimated at all.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.proximity != Proximity::Unknown
    }
}
