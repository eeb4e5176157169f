//! A single beacon reading and its lazily derived distance.
//!
//! A [`Beacon`] carries the raw fields a scanner reported (identity,
//! calibration, RSSI) plus two derived values, distance and proximity,
//! each held in a [`Memo`] and computed on first access.
//!
//! # Identity
//!
//! Two readings are equal when their MAC addresses match; every other field
//! is ignored. Hashing, however, uses the proximity UUID, major and minor.
//! Equal readings therefore only hash alike when those fields agree too,
//! which holds for well-behaved deployments where each MAC advertises one
//! UUID/major/minor triple.

use std::any::Any;
use std::hash::{Hash, Hasher};

use crate::estimator::{
    classify_proximity, estimate_accuracy, round_half_up, DISTANCE_SCALE, UNKNOWN_ACCURACY,
    UNSIGNED_RSSI_OFFSET,
};
use crate::memo::{Memo, MemoState};
use crate::parcel::{Parcel, ParcelResult, Parcelable};
use crate::types::{DistanceEstimate, Proximity};

/// Name given to beacons that advertise none.
pub const UNKNOWN_NAME: &str = "Unknown";

/// One reading of one beacon.
#[derive(Debug, Clone)]
pub struct Beacon {
    proximity_uuid: String,
    name: String,
    mac_address: String,
    major: i32,
    minor: i32,
    measured_power: i32,
    rssi: i32,
    power: i32,
    running_average_rssi: Option<f64>,
    accuracy: Memo<f64>,
    proximity: Memo<Proximity>,
}

impl Beacon {
    /// Create a reading from scanner output.
    ///
    /// An empty `name` becomes [`UNKNOWN_NAME`]. The power level starts at
    /// `0`; use [`Beacon::with_power`] when the firmware reports one.
    #[must_use]
    pub fn new(
        proximity_uuid: impl Into<String>,
        name: impl Into<String>,
        mac_address: impl Into<String>,
        major: i32,
        minor: i32,
        measured_power: i32,
        rssi: i32,
    ) -> Self {
        let name = name.into();
        Self {
            proximity_uuid: proximity_uuid.into(),
            name: if name.is_empty() {
                UNKNOWN_NAME.to_string()
            } else {
                name
            },
            mac_address: mac_address.into(),
            major,
            minor,
            measured_power,
            rssi,
            power: 0,
            running_average_rssi: None,
            accuracy: Memo::new(),
            proximity: Memo::new(),
        }
    }

    /// Set the reported battery/power level.
    #[must_use]
    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }

    /// Attach an externally averaged RSSI to range with instead of the raw
    /// reading.
    ///
    /// Any distance already derived from the raw reading is discarded. A
    /// non-finite average cannot be ranged and yields an unknown distance.
    #[must_use]
    pub fn with_running_average_rssi(mut self, average: f64) -> Self {
        self.running_average_rssi = Some(average);
        self.accuracy = Memo::new();
        self.proximity = Memo::new();
        self
    }

    /// Proximity UUID (or namespace for Eddystone beacons).
    #[must_use]
    pub fn proximity_uuid(&self) -> &str {
        &self.proximity_uuid
    }

    /// Advertised name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hardware address; the equality key.
    #[must_use]
    pub fn mac_address(&self) -> &str {
        &self.mac_address
    }

    /// Major identifier.
    #[must_use]
    pub const fn major(&self) -> i32 {
        self.major
    }

    /// Minor identifier.
    #[must_use]
    pub const fn minor(&self) -> i32 {
        self.minor
    }

    /// Calibrated RSSI at 1 m; `0` when uncalibrated.
    #[must_use]
    pub const fn measured_power(&self) -> i32 {
        self.measured_power
    }

    /// Raw RSSI as reported.
    #[must_use]
    pub const fn rssi(&self) -> i32 {
        self.rssi
    }

    /// Battery/power level, `0` when not reported.
    #[must_use]
    pub const fn power(&self) -> i32 {
        self.power
    }

    /// Externally averaged RSSI, if one was attached.
    #[must_use]
    pub const fn running_average_rssi(&self) -> Option<f64> {
        self.running_average_rssi
    }

    /// Estimated distance in metres, rounded half-up to two decimals.
    ///
    /// Computed on first call and cached for the life of this reading.
    /// Returns `-1.0` when the distance cannot be estimated.
    pub fn distance(&self) -> f64 {
        *self.accuracy.get_or_compute(|| {
            let rssi = self.ranging_rssi();
            let raw = if rssi.is_finite() {
                estimate_accuracy(self.measured_power, rssi)
            } else {
                UNKNOWN_ACCURACY
            };
            let accuracy = round_half_up(raw, DISTANCE_SCALE);
            tracing::trace!(
                mac_address = %self.mac_address,
                measured_power = self.measured_power,
                rssi = self.rssi,
                accuracy,
                "computed beacon distance"
            );
            accuracy
        })
    }

    /// Proximity band of [`Beacon::distance`], computed once and cached.
    pub fn proximity(&self) -> Proximity {
        *self
            .proximity
            .get_or_compute(|| classify_proximity(self.distance()))
    }

    /// Distance and proximity together.
    pub fn estimate(&self) -> DistanceEstimate {
        DistanceEstimate {
            accuracy: self.distance(),
            proximity: self.proximity(),
        }
    }

    /// Whether the distance has been derived yet, and its value if so.
    #[must_use]
    pub fn distance_state(&self) -> MemoState<'_, f64> {
        self.accuracy.state()
    }

    /// Whether the proximity has been derived yet, and its value if so.
    #[must_use]
    pub fn proximity_state(&self) -> MemoState<'_, Proximity> {
        self.proximity.state()
    }

    /// Compare against a value of any type.
    ///
    /// Anything that is not a [`Beacon`] is simply not the same beacon.
    #[must_use]
    pub fn same_beacon(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|beacon| beacon == self)
    }

    /// RSSI fed to the estimator. Unsigned-byte encodings are shifted back
    /// to signed dBm here, before [`estimate_accuracy`] applies its own
    /// identical guard.
    fn ranging_rssi(&self) -> f64 {
        match self.running_average_rssi {
            Some(average) if average > 0.0 => average - f64::from(UNSIGNED_RSSI_OFFSET),
            Some(average) => average,
            None if self.rssi > 0 => f64::from(self.rssi - UNSIGNED_RSSI_OFFSET),
            None => f64::from(self.rssi),
        }
    }
}

impl PartialEq for Beacon {
    fn eq(&self, other: &Self) -> bool {
        self.mac_address == other.mac_address
    }
}

impl Eq for Beacon {}

impl Hash for Beacon {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.proximity_uuid.hash(state);
        self.major.hash(state);
        self.minor.hash(state);
    }
}

impl Parcelable for Beacon {
    /// Writes the seven scanner fields. Power, the running average and the
    /// derived values are not transported.
    fn write_to_parcel(&self, parcel: &mut Parcel) {
        parcel.write_string(self.proximity_uuid.as_str());
        parcel.write_string(self.name.as_str());
        parcel.write_string(self.mac_address.as_str());
        parcel.write_int(self.major);
        parcel.write_int(self.minor);
        parcel.write_int(self.measured_power);
        parcel.write_int(self.rssi);
    }

    /// Reads the seven scanner fields, then a power level if one follows.
    fn from_parcel(parcel: &mut Parcel) -> ParcelResult<Self> {
        let proximity_uuid = parcel.read_string("proximity_uuid")?;
        let name = parcel.read_string("name")?;
        let mac_address = parcel.read_string("mac_address")?;
        let major = parcel.read_int("major")?;
        let minor = parcel.read_int("minor")?;
        let measured_power = parcel.read_int("measured_power")?;
        let rssi = parcel.read_int("rssi")?;
        let power = parcel.read_optional_int().unwrap_or(0);

        tracing::debug!(%mac_address, power, "reconstructed beacon from parcel");

        Ok(Self {
            proximity_uuid,
            name,
            mac_address,
            major,
            minor,
            measured_power,
            rssi,
            power,
            running_average_rssi: None,
            accuracy: Memo::new(),
            proximity: Memo::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::{ParcelError, ParcelValue};
    use std::collections::hash_map::DefaultHasher;
    use std::sync::Arc;

    const UUID: &str = "e2c56db5-dffb-48d2-b060-d0f5a71096e0";
    const MAC: &str = "AA:BB:CC:DD:EE:FF";

    fn reading(measured_power: i32, rssi: i32) -> Beacon {
        Beacon::new(UUID, "Lobby", MAC, 100, 7, measured_power, rssi)
    }

    fn hash_of(beacon: &Beacon) -> u64 {
        let mut hasher = DefaultHasher::new();
        beacon.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_far_reading() {
        let beacon = reading(-59, -70);
        assert_eq!(beacon.distance(), 3.47);
        assert_eq!(beacon.proximity(), Proximity::Far);
    }

    #[test]
    fn test_immediate_reading() {
        let beacon = reading(-59, -50);
        assert_eq!(beacon.distance(), 0.19);
        assert_eq!(beacon.proximity(), Proximity::Immediate);
    }

    #[test]
    fn test_near_reading() {
        let beacon = reading(-59, -65);
        assert_eq!(beacon.distance(), 2.01);
        assert_eq!(beacon.proximity(), Proximity::Near);
    }

    #[test]
    fn test_unsigned_encoded_rssi() {
        let beacon = reading(-59, 60);
        assert_eq!(beacon.distance(), 2.8);
        assert_eq!(beacon.proximity(), Proximity::Near);
    }

    #[test]
    fn test_zero_rssi_is_unknown() {
        let beacon = reading(-59, 0);
        assert_eq!(beacon.distance(), UNKNOWN_ACCURACY);
        assert_eq!(beacon.proximity(), Proximity::Unknown);
    }

    #[test]
    fn test_uncalibrated_is_unknown() {
        for rssi in [-90, -50, 0, 60, 200] {
            let beacon = reading(0, rssi);
            assert_eq!(beacon.distance(), UNKNOWN_ACCURACY);
            assert_eq!(beacon.proximity(), Proximity::Unknown);
        }
    }

    #[test]
    fn test_derived_values_are_lazy_and_stable() {
        let beacon = reading(-59, -70);
        assert_eq!(beacon.distance_state(), MemoState::Uncomputed);
        assert_eq!(beacon.proximity_state(), MemoState::Uncomputed);

        let proximity = beacon.proximity();
        assert_eq!(beacon.distance_state(), MemoState::Computed(&3.47));
        assert_eq!(beacon.proximity_state(), MemoState::Computed(&Proximity::Far));

        assert_eq!(beacon.distance().to_bits(), beacon.distance().to_bits());
        assert_eq!(beacon.proximity(), proximity);
    }

    #[test]
    fn test_estimate() {
        let estimate = reading(-59, -50).estimate();
        assert_eq!(estimate.accuracy, 0.19);
        assert_eq!(estimate.proximity, Proximity::Immediate);
    }

    #[test]
    fn test_empty_name_becomes_unknown() {
        let beacon = Beacon::new(UUID, "", MAC, 1, 2, -59, -70);
        assert_eq!(beacon.name(), UNKNOWN_NAME);
        assert_eq!(reading(-59, -70).name(), "Lobby");
    }

    #[test]
    fn test_power_defaults_to_zero() {
        assert_eq!(reading(-59, -70).power(), 0);
        assert_eq!(reading(-59, -70).with_power(85).power(), 85);
    }

    #[test]
    fn test_running_average_replaces_raw_rssi() {
        let beacon = reading(-59, -90).with_running_average_rssi(-70.0);
        assert_eq!(beacon.running_average_rssi(), Some(-70.0));
        assert_eq!(beacon.distance(), 3.47);

        let encoded = reading(-59, -90).with_running_average_rssi(60.0);
        assert_eq!(encoded.distance(), 2.8);
    }

    #[test]
    fn test_running_average_discards_cached_distance() {
        let beacon = reading(-59, -90);
        assert_eq!(beacon.distance(), 23.44);
        let averaged = beacon.with_running_average_rssi(-50.0);
        assert_eq!(averaged.distance_state(), MemoState::Uncomputed);
        assert_eq!(averaged.proximity(), Proximity::Immediate);
    }

    #[test]
    fn test_non_finite_running_average_is_unknown() {
        for average in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let beacon = reading(-59, -70).with_running_average_rssi(average);
            assert_eq!(beacon.distance(), UNKNOWN_ACCURACY);
            assert_eq!(beacon.proximity(), Proximity::Unknown);
        }
    }

    #[test]
    fn test_huge_distances_keep_raw_value() {
        for rssi in [-106, -98, -96] {
            let beacon = reading(-1, rssi);
            let raw = estimate_accuracy(-1, f64::from(rssi));
            assert!(raw > 1e15);
            assert_eq!(beacon.distance().to_bits(), raw.to_bits());
            assert_eq!(beacon.proximity(), Proximity::Far);
        }
    }

    #[test]
    fn test_equality_uses_mac_only() {
        let a = Beacon::new(UUID, "A", MAC, 1, 1, -59, -70);
        let b = Beacon::new("other", "B", MAC, 2, 2, -65, -40);
        let c = Beacon::new(UUID, "A", "11:22:33:44:55:66", 1, 1, -59, -70);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_uses_uuid_major_minor() {
        let a = Beacon::new(UUID, "A", MAC, 1, 1, -59, -70);
        let same_key = Beacon::new(UUID, "B", "11:22:33:44:55:66", 1, 1, -40, -90);
        let equal_but_different_key = Beacon::new(UUID, "A", MAC, 1, 2, -59, -70);

        assert_eq!(hash_of(&a), hash_of(&same_key));
        assert_eq!(a, equal_but_different_key);
        assert_ne!(hash_of(&a), hash_of(&equal_but_different_key));
    }

    #[test]
    fn test_same_beacon_with_unrelated_type() {
        let beacon = reading(-59, -70);
        assert!(beacon.same_beacon(&reading(-40, -40)));
        assert!(!beacon.same_beacon(&"AA:BB:CC:DD:EE:FF"));
        assert!(!beacon.same_beacon(&42_i32));
    }

    #[test]
    fn test_parcel_layout_excludes_power_and_derived_values() {
        let beacon = reading(-59, -70).with_power(90);
        beacon.distance();

        let parcel = beacon.to_parcel();
        assert_eq!(
            parcel.values(),
            &[
                ParcelValue::Str(UUID.into()),
                ParcelValue::Str("Lobby".into()),
                ParcelValue::Str(MAC.into()),
                ParcelValue::Int(100),
                ParcelValue::Int(7),
                ParcelValue::Int(-59),
                ParcelValue::Int(-70),
            ]
        );
    }

    #[test]
    fn test_from_parcel_recomputes_on_receiving_side() {
        let original = reading(-59, -70).with_power(90);
        assert_eq!(original.distance(), 3.47);

        let mut parcel = original.to_parcel();
        let rebuilt = Beacon::from_parcel(&mut parcel).unwrap();

        assert_eq!(rebuilt, original);
        assert_eq!(rebuilt.power(), 0);
        assert_eq!(rebuilt.distance_state(), MemoState::Uncomputed);
        assert_eq!(rebuilt.distance(), 3.47);
    }

    #[test]
    fn test_from_parcel_reads_trailing_power() {
        let mut parcel = reading(-59, -70).to_parcel();
        parcel.write_int(64);
        let rebuilt = Beacon::from_parcel(&mut parcel).unwrap();
        assert_eq!(rebuilt.power(), 64);
        assert_eq!(parcel.remaining(), 0);
    }

    #[test]
    fn test_from_short_parcel_fails() {
        let mut parcel = Parcel::from_values(vec![
            ParcelValue::Str(UUID.into()),
            ParcelValue::Str("Lobby".into()),
            ParcelValue::Str(MAC.into()),
            ParcelValue::Int(1),
        ]);
        assert_eq!(
            Beacon::from_parcel(&mut parcel).unwrap_err(),
            ParcelError::Underflow { field: "minor" }
        );
    }

    #[test]
    fn test_concurrent_readers_agree() {
        let beacon = Arc::new(reading(-59, -80));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let beacon = Arc::clone(&beacon);
                std::thread::spawn(move || (beacon.distance(), beacon.proximity()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), (9.52, Proximity::Far));
        }
    }

    #[test]
    fn test_beacon_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Beacon>();
        assert_sync::<Beacon>();
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_uncalibrated_reading_is_unknown(rssi in any::<i32>()) {
            let beacon = Beacon::new("u", "n", "AA:BB:CC:DD:EE:FF", 0, 0, 0, rssi);
            prop_assert_eq!(beacon.distance(), -1.0);
            prop_assert_eq!(beacon.proximity(), Proximity::Unknown);
        }

        #[test]
        fn prop_proximity_matches_distance(
            measured_power in -100i32..=-30,
            rssi in -110i32..=-1,
        ) {
            let beacon = Beacon::new("u", "n", "AA:BB:CC:DD:EE:FF", 0, 0, measured_power, rssi);
            prop_assert_eq!(beacon.proximity(), classify_proximity(beacon.distance()));
        }

        #[test]
        fn prop_distance_is_idempotent(
            measured_power in -100i32..=-30,
            rssi in -110i32..=255,
        ) {
            let beacon = Beacon::new("u", "n", "AA:BB:CC:DD:EE:FF", 0, 0, measured_power, rssi);
            let first = beacon.distance();
            prop_assert_eq!(first.to_bits(), beacon.distance().to_bits());
            prop_assert_eq!(beacon.proximity(), beacon.proximity());
        }
    }
}
