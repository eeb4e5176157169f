//! RSSI path-loss distance estimation and proximity classification.
//!
//! The model takes the calibrated signal strength at one metre (the
//! beacon's *measured power*) and an observed RSSI, and maps their ratio
//! onto an empirically fitted curve:
//!
//! - `ratio < 1.0`: near field, `ratio^10`
//! - `ratio >= 1.0`: far field, `0.89976 * ratio^7.7095 + 0.111`
//!
//! Nothing in here fails. Readings that cannot be ranged (no calibration,
//! zero RSSI) produce [`UNKNOWN_ACCURACY`], which classifies as
//! [`Proximity::Unknown`].

use crate::types::Proximity;

/// Sentinel accuracy meaning "distance unknown". Never a valid distance.
pub const UNKNOWN_ACCURACY: f64 = -1.0;

/// Offset that turns an unsigned-byte encoded RSSI back into signed dBm.
pub const UNSIGNED_RSSI_OFFSET: i32 = 128;

/// Decimal places kept by [`crate::Beacon::distance`].
pub const DISTANCE_SCALE: u32 = 2;

/// Upper bound (exclusive, metres) of the [`Proximity::Immediate`] band.
pub const IMMEDIATE_THRESHOLD_M: f64 = 0.5;

/// Upper bound (exclusive, metres) of the [`Proximity::Near`] band.
pub const NEAR_THRESHOLD_M: f64 = 3.0;

/// Far-field curve: `A * ratio^B + C`.
const FAR_FIELD_COEFFICIENT: f64 = 0.89976;
const FAR_FIELD_EXPONENT: f64 = 7.7095;
const FAR_FIELD_INTERCEPT: f64 = 0.111;

/// Near-field curve exponent.
const NEAR_FIELD_EXPONENT: f64 = 10.0;

/// Largest scale [`round_half_up`] honours; `10^15 * 2^53` still fits a `u128`.
const MAX_SCALE: u32 = 15;

/// Estimate the distance in metres between receiver and beacon.
///
/// # Parameters
///
/// * `measured_power`: calibrated RSSI (dBm) at 1 m. `0` means the beacon
///   carries no calibration.
/// * `rssi`: observed RSSI (dBm). A positive value is treated as an
///   unsigned-byte encoding and shifted down by [`UNSIGNED_RSSI_OFFSET`].
///
/// # Returns
///
/// The estimated distance, or [`UNKNOWN_ACCURACY`] when `rssi` is zero or
/// `measured_power` is zero. Very weak signals can produce arbitrarily large
/// (even infinite) values; callers must not expect clamping.
#[must_use]
#[allow(clippy::float_cmp, clippy::suboptimal_flops)]
pub fn estimate_accuracy(measured_power: i32, rssi: f64) -> f64 {
    if rssi == 0.0 {
        return UNKNOWN_ACCURACY;
    }
    if measured_power == 0 {
        return UNKNOWN_ACCURACY;
    }

    let rssi = if rssi > 0.0 {
        rssi - f64::from(UNSIGNED_RSSI_OFFSET)
    } else {
        rssi
    };

    let ratio = rssi / f64::from(measured_power);
    if ratio < 1.0 {
        ratio.powf(NEAR_FIELD_EXPONENT)
    } else {
        FAR_FIELD_COEFFICIENT * ratio.powf(FAR_FIELD_EXPONENT) + FAR_FIELD_INTERCEPT
    }
}

/// Bucket a distance estimate into a [`Proximity`] band.
///
/// Bands are half-open: `[0, 0.5)` is immediate, `[0.5, 3.0)` is near and
/// anything from `3.0` up is far. Negative accuracies are unknown.
#[must_use]
pub fn classify_proximity(accuracy: f64) -> Proximity {
    if accuracy < 0.0 {
        Proximity::Unknown
    } else if accuracy < IMMEDIATE_THRESHOLD_M {
        Proximity::Immediate
    } else if accuracy < NEAR_THRESHOLD_M {
        Proximity::Near
    } else {
        Proximity::Far
    }
}

/// Round `value` to `scale` decimal places, ties away from zero.
///
/// Works on the exact binary value of the `f64` using integer arithmetic,
/// so `1.005` (stored as `1.00499999999999989...`) rounds down while `0.125`
/// rounds up to `0.13`. No string formatting is involved, so the result is
/// independent of locale. Non-finite values come back unchanged and `scale`
/// is capped at 15.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
pub fn round_half_up(value: f64, scale: u32) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }

    let bits = value.to_bits();
    let negative = bits >> 63 == 1;
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1_u64 << 52) - 1);
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1_u64 << 52), biased_exponent - 1075)
    };

    // value = mantissa * 2^exponent; non-negative exponents are integers already.
    if exponent >= 0 {
        return value;
    }

    let factor = 10_u128.pow(scale.min(MAX_SCALE));
    let scaled = u128::from(mantissa) * factor;
    let shift = exponent.unsigned_abs();
    let rounded = if shift >= 128 {
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled - (quotient << shift);
        if remainder >= 1_u128 << (shift - 1) {
            quotient + 1
        } else {
            quotient
        }
    };

    if rounded == 0 {
        return 0.0;
    }
    // Beyond 2^53 the spacing of doubles exceeds 10^-scale, so `value` is
    // already the nearest double to the rounded decimal.
    if rounded >= 1_u128 << 53 {
        return value;
    }

    let magnitude = rounded as f64 / factor as f64;
    if negative {
        -magnitude
    } else {
        magnitude
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_uncalibrated_is_always_unknown(rssi in -200.0f64..200.0) {
            prop_assert_eq!(estimate_accuracy(0, rssi), UNKNOWN_ACCURACY);
        }

        #[test]
        fn prop_zero_rssi_is_always_unknown(measured_power in any::<i32>()) {
            prop_assert_eq!(estimate_accuracy(measured_power, 0.0), UNKNOWN_ACCURACY);
        }

        #[test]
        fn prop_accuracy_is_sentinel_or_non_negative(
            measured_power in -120i32..=-1,
            rssi in -127i32..=255,
        ) {
            let accuracy = estimate_accuracy(measured_power, f64::from(rssi));
            prop_assert!(accuracy == UNKNOWN_ACCURACY || accuracy >= 0.0);
        }

        #[test]
        fn prop_immediate_band(accuracy in 0.0f64..0.5) {
            prop_assert_eq!(classify_proximity(accuracy), Proximity::Immediate);
        }

        #[test]
        fn prop_near_band(accuracy in 0.5f64..3.0) {
            prop_assert_eq!(classify_proximity(accuracy), Proximity::Near);
        }

        #[test]
        fn prop_far_band(accuracy in 3.0f64..1e9) {
            prop_assert_eq!(classify_proximity(accuracy), Proximity::Far);
        }

        #[test]
        fn prop_rounding_keeps_two_places(value in 0.0f64..1000.0) {
            let rounded = round_half_up(value, 2);
            prop_assert!((rounded - value).abs() <= 0.005 + 1e-9);
            let hundredths = rounded * 100.0;
            prop_assert!((hundredths - hundredths.round()).abs() < 1e-6);
        }
    }
}
