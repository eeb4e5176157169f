//! OpenAPI specification generation for the beacon-range API.
//!
//! The document is served at `/api/openapi.json`, rendered by Swagger UI at
//! `/swagger-ui`, and written to disk by the `gen-openapi` binary.

use axum::Json;
use utoipa::OpenApi;

use super::error::ErrorResponse;
use super::estimate::{EstimateRequest, EstimateResponse, RankRequest, RankResponse};
use super::health::HealthResponse;
use beacon_core::{BeaconModel, DistanceEstimate, ParcelValue, Proximity};

/// Serve the OpenAPI specification as JSON.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Returns the OpenAPI specification as pretty JSON.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn get_openapi_json() -> serde_json::Result<String> {
    ApiDoc::openapi().to_pretty_json()
}

/// Main OpenAPI document structure for beacon-range.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "beacon-range API",
        version = "0.1.0",
        description = r#"
# beacon-range API

Estimates how far away a Bluetooth beacon is from a single signal-strength reading.

## Model

Each reading carries the beacon's calibrated signal strength at one metre
(`measured_power`) and the observed `rssi`. Their ratio is mapped onto a
path-loss curve and the result, in metres, is bucketed:

| Proximity   | Distance        |
|-------------|-----------------|
| `immediate` | under 0.5 m     |
| `near`      | 0.5 m to 3 m    |
| `far`       | 3 m and beyond  |
| `unknown`   | not estimable   |

Uncalibrated readings (`measured_power = 0`) and zero RSSI readings are
answered with `distance_m = -1.0` and `proximity = "unknown"`.

## Transport

Readings can also be exchanged as a *parcel*: a flat JSON array of the
scanner fields in a fixed order. Derived values are never part of a parcel.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local beacon-range server")
    ),
    tags(
        (
            name = "system",
            description = "Health checks"
        ),
        (
            name = "estimation",
            description = "Distance estimation and ranking"
        ),
        (
            name = "transport",
            description = "Parcel encoding and decoding"
        )
    ),
    paths(
        super::health::health_check,
        super::estimate::estimate,
        super::estimate::rank,
        super::estimate::decode_parcel,
        super::estimate::encode_parcel,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            EstimateRequest,
            EstimateResponse,
            RankRequest,
            RankResponse,
            Proximity,
            BeaconModel,
            DistanceEstimate,
            ParcelValue,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "beacon-range API");
        assert!(spec.paths.paths.contains_key("/api/estimate"));
        assert!(spec.paths.paths.contains_key("/health"));
    }

    #[test]
    fn test_openapi_json_serialization() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("\"openapi\":"));
        assert!(json.contains("\"beacon-range API\""));
    }
}
