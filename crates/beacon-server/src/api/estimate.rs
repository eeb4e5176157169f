//! Distance estimation API endpoints.
//!
//! Provides endpoints for ranging single readings, ranking batches of
//! readings, and converting readings to and from their parcel form.

use axum::routing::post;
use axum::{Json, Router};
use beacon_core::{
    dedup_by_address, nearest, rank_by_distance, validate_identity, Beacon, BeaconModel, Parcel,
    ParcelValue, Parcelable, Proximity,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::state::SharedState;

/// Creates the estimation router.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/estimate", post(estimate))
        .route("/rank", post(rank))
        .route("/parcel/decode", post(decode_parcel))
        .route("/parcel/encode", post(encode_parcel))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A single beacon reading as reported by a scanner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "proximity_uuid": "e2c56db5-dffb-48d2-b060-d0f5a71096e0",
    "name": "Lobby",
    "mac_address": "AA:BB:CC:DD:EE:FF",
    "major": 1,
    "minor": 2,
    "measured_power": -59,
    "rssi": -70,
    "model": "iBeacon"
}))]
pub struct EstimateRequest {
    /// Proximity UUID (iBeacon) or namespace identifier (Eddystone).
    #[schema(example = "e2c56db5-dffb-48d2-b060-d0f5a71096e0")]
    pub proximity_uuid: String,

    /// Advertised name; "Unknown" when absent or empty.
    #[schema(example = "Lobby")]
    pub name: Option<String>,

    /// Hardware address (XX:XX:XX:XX:XX:XX format).
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub mac_address: String,

    /// Major identifier.
    #[schema(example = 1)]
    pub major: i32,

    /// Minor identifier.
    #[schema(example = 2)]
    pub minor: i32,

    /// Calibrated RSSI at 1 m in dBm; 0 when the beacon is uncalibrated.
    #[schema(example = -59)]
    pub measured_power: i32,

    /// Observed RSSI in dBm. Positive values are unsigned-byte encodings.
    #[schema(example = -70)]
    pub rssi: i32,

    /// Battery/power level, if the firmware reports one.
    #[schema(example = 85)]
    pub power: Option<i32>,

    /// Externally averaged RSSI to range with instead of `rssi`.
    #[schema(example = -68.5)]
    pub running_average_rssi: Option<f64>,

    /// Advertisement format. iBeacon readings must carry a valid UUID.
    pub model: Option<BeaconModel>,
}

impl EstimateRequest {
    /// Validate identity fields and build a reading.
    fn into_beacon(self) -> ApiResult<Beacon> {
        validate_identity(&self.proximity_uuid, &self.mac_address, self.model)?;

        let mut beacon = Beacon::new(
            self.proximity_uuid,
            self.name.unwrap_or_default(),
            self.mac_address,
            self.major,
            self.minor,
            self.measured_power,
            self.rssi,
        );
        if let Some(power) = self.power {
            beacon = beacon.with_power(power);
        }
        if let Some(average) = self.running_average_rssi {
            beacon = beacon.with_running_average_rssi(average);
        }
        Ok(beacon)
    }
}

/// Distance estimate for one reading.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "proximity_uuid": "e2c56db5-dffb-48d2-b060-d0f5a71096e0",
    "name": "Lobby",
    "mac_address": "AA:BB:CC:DD:EE:FF",
    "major": 1,
    "minor": 2,
    "power": 0,
    "distance_m": 3.47,
    "proximity": "far",
    "proximity_code": 3,
    "estimated_at_utc": "2025-01-15T03:30:00Z"
}))]
pub struct EstimateResponse {
    /// Proximity UUID as received.
    #[schema(example = "e2c56db5-dffb-48d2-b060-d0f5a71096e0")]
    pub proximity_uuid: String,

    /// Advertised name.
    #[schema(example = "Lobby")]
    pub name: String,

    /// Hardware address.
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub mac_address: String,

    /// Major identifier.
    #[schema(example = 1)]
    pub major: i32,

    /// Minor identifier.
    #[schema(example = 2)]
    pub minor: i32,

    /// Battery/power level, 0 when not reported.
    #[schema(example = 0)]
    pub power: i32,

    /// Estimated distance in metres (two decimals), or -1.0 when unknown.
    #[schema(example = 3.47)]
    pub distance_m: f64,

    /// Proximity band.
    pub proximity: Proximity,

    /// Numeric proximity code: 0 unknown, 1 immediate, 2 near, 3 far.
    #[schema(example = 3)]
    pub proximity_code: i32,

    /// UTC timestamp of when this estimate was produced.
    #[schema(example = "2025-01-15T03:30:00Z")]
    pub estimated_at_utc: String,
}

impl EstimateResponse {
    fn from_beacon(beacon: &Beacon, estimated_at_utc: &str) -> Self {
        let proximity = beacon.proximity();
        Self {
            proximity_uuid: beacon.proximity_uuid().to_string(),
            name: beacon.name().to_string(),
            mac_address: beacon.mac_address().to_string(),
            major: beacon.major(),
            minor: beacon.minor(),
            power: beacon.power(),
            distance_m: beacon.distance(),
            proximity,
            proximity_code: proximity.code(),
            estimated_at_utc: estimated_at_utc.to_string(),
        }
    }
}

/// A batch of readings to rank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankRequest {
    /// Readings, in scan order.
    pub readings: Vec<EstimateRequest>,
}

/// Readings ordered nearest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "beacons": [],
    "nearest": "AA:BB:CC:DD:EE:FF",
    "duplicates_dropped": 0
}))]
pub struct RankResponse {
    /// One entry per MAC address, ascending distance, unknown distances last.
    pub beacons: Vec<EstimateResponse>,

    /// MAC address of the closest beacon with a known distance.
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub nearest: Option<String>,

    /// Readings dropped because an earlier reading had the same MAC address.
    #[schema(example = 0)]
    pub duplicates_dropped: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Estimate the distance to a beacon from one reading.
#[utoipa::path(
    post,
    path = "/api/estimate",
    tag = "estimation",
    operation_id = "estimateDistance",
    summary = "Estimate distance from one reading",
    description = "Applies the path-loss model to the reading's measured power and \
        RSSI. Readings without calibration or with a zero RSSI are answered with \
        distance -1.0 and proximity 'unknown', not an error.",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Estimate produced", body = EstimateResponse),
        (status = 400, description = "Invalid identity fields", body = ErrorResponse)
    )
)]
pub async fn estimate(Json(request): Json<EstimateRequest>) -> ApiResult<Json<EstimateResponse>> {
    let beacon = request.into_beacon()?;
    let response = EstimateResponse::from_beacon(&beacon, &Utc::now().to_rfc3339());

    tracing::debug!(
        mac_address = %response.mac_address,
        distance_m = response.distance_m,
        proximity = %response.proximity,
        "estimated distance"
    );

    Ok(Json(response))
}

/// Rank a batch of readings by distance.
#[utoipa::path(
    post,
    path = "/api/rank",
    tag = "estimation",
    operation_id = "rankReadings",
    summary = "Rank readings nearest first",
    description = "Keeps the first reading per MAC address, estimates each, and \
        returns them in ascending distance with unknown distances last.",
    request_body = RankRequest,
    responses(
        (status = 200, description = "Readings ranked", body = RankResponse),
        (status = 400, description = "A reading has invalid identity fields", body = ErrorResponse)
    )
)]
pub async fn rank(Json(request): Json<RankRequest>) -> ApiResult<Json<RankResponse>> {
    let received = request.readings.len();
    let beacons = request
        .readings
        .into_iter()
        .map(EstimateRequest::into_beacon)
        .collect::<ApiResult<Vec<_>>>()?;

    let beacons = dedup_by_address(beacons);
    let duplicates_dropped = received - beacons.len();

    let estimated_at_utc = Utc::now().to_rfc3339();
    let ranked = rank_by_distance(&beacons)
        .into_iter()
        .map(|beacon| EstimateResponse::from_beacon(beacon, &estimated_at_utc))
        .collect();
    let nearest = nearest(&beacons).map(|beacon| beacon.mac_address().to_string());

    tracing::debug!(received, duplicates_dropped, nearest = ?nearest, "ranked readings");

    Ok(Json(RankResponse {
        beacons: ranked,
        nearest,
        duplicates_dropped,
    }))
}

/// Rebuild a reading from its parcel form and estimate it.
#[utoipa::path(
    post,
    path = "/api/parcel/decode",
    tag = "transport",
    operation_id = "decodeParcel",
    summary = "Estimate a reading received as a parcel",
    description = "Accepts the flat array [proximity_uuid, name, mac_address, major, \
        minor, measured_power, rssi] with an optional trailing power level. Distance \
        and proximity are recomputed here; they are never part of the parcel.",
    request_body = Vec<ParcelValue>,
    responses(
        (status = 200, description = "Estimate produced", body = EstimateResponse),
        (status = 400, description = "Parcel is short, mistyped, or has an invalid MAC address", body = ErrorResponse)
    )
)]
pub async fn decode_parcel(Json(mut parcel): Json<Parcel>) -> ApiResult<Json<EstimateResponse>> {
    let beacon = Beacon::from_parcel(&mut parcel).map_err(ApiError::from)?;
    validate_identity(beacon.proximity_uuid(), beacon.mac_address(), None)?;

    Ok(Json(EstimateResponse::from_beacon(
        &beacon,
        &Utc::now().to_rfc3339(),
    )))
}

/// Convert a reading into its parcel form.
#[utoipa::path(
    post,
    path = "/api/parcel/encode",
    tag = "transport",
    operation_id = "encodeParcel",
    summary = "Flatten a reading into a parcel",
    description = "Returns [proximity_uuid, name, mac_address, major, minor, \
        measured_power, rssi]. Power level, running average and derived values are \
        not included.",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Parcel produced", body = Vec<ParcelValue>),
        (status = 400, description = "Invalid identity fields", body = ErrorResponse)
    )
)]
pub async fn encode_parcel(Json(request): Json<EstimateRequest>) -> ApiResult<Json<Parcel>> {
    let beacon = request.into_beacon()?;
    Ok(Json(beacon.to_parcel()))
}
