//! Ordering readings for display.
//!
//! Consumers such as a "nearby beacons" list want the closest beacon first
//! and readings without a usable distance at the bottom.

use std::cmp::Ordering;

use crate::beacon::Beacon;

/// Sort readings by ascending distance, unknown distances last.
///
/// The sort is stable, so readings at the same distance keep their input
/// order.
#[must_use]
pub fn rank_by_distance(beacons: &[Beacon]) -> Vec<&Beacon> {
    let mut ranked: Vec<&Beacon> = beacons.iter().collect();
    ranked.sort_by(|a, b| compare_distance(a.distance(), b.distance()));
    ranked
}

/// The closest reading with a known distance.
#[must_use]
pub fn nearest(beacons: &[Beacon]) -> Option<&Beacon> {
    beacons
        .iter()
        .filter(|beacon| beacon.distance() >= 0.0)
        .min_by(|a, b| compare_distance(a.distance(), b.distance()))
}

/// Keep the first reading seen for each MAC address.
#[must_use]
pub fn dedup_by_address(beacons: Vec<Beacon>) -> Vec<Beacon> {
    let mut kept: Vec<Beacon> = Vec::with_capacity(beacons.len());
    for beacon in beacons {
        if !kept.contains(&beacon) {
            kept.push(beacon);
        }
    }
    kept
}

fn compare_distance(a: f64, b: f64) -> Ordering {
    match (a < 0.0, b < 0.0) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(mac: &str, rssi: i32) -> Beacon {
        Beacon::new("uuid", "b", mac, 1, 1, -59, rssi)
    }

    #[test]
    fn test_rank_puts_unknown_last() {
        let beacons = vec![
            at("00:00:00:00:00:01", -70),
            at("00:00:00:00:00:02", 0),
            at("00:00:00:00:00:03", -50),
            at("00:00:00:00:00:04", -65),
        ];

        let order: Vec<&str> = rank_by_distance(&beacons)
            .into_iter()
            .map(Beacon::mac_address)
            .collect();

        assert_eq!(
            order,
            vec![
                "00:00:00:00:00:03",
                "00:00:00:00:00:04",
                "00:00:00:00:00:01",
                "00:00:00:00:00:02",
            ]
        );
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let beacons = vec![at("00:00:00:00:00:01", -70), at("00:00:00:00:00:02", -70)];
        let ranked = rank_by_distance(&beacons);
        assert_eq!(ranked[0].mac_address(), "00:00:00:00:00:01");
        assert_eq!(ranked[1].mac_address(), "00:00:00:00:00:02");
    }

    #[test]
    fn test_nearest_skips_unknown() {
        let beacons = vec![at("00:00:00:00:00:01", 0), at("00:00:00:00:00:02", -80)];
        assert_eq!(
            nearest(&beacons).map(Beacon::mac_address),
            Some("00:00:00:00:00:02")
        );

        let unknown_only = vec![at("00:00:00:00:00:01", 0)];
        assert!(nearest(&unknown_only).is_none());
        assert!(nearest(&[]).is_none());
    }

    #[test]
    fn test_dedup_keeps_first_per_address() {
        let beacons = vec![
            at("00:00:00:00:00:01", -70),
            at("00:00:00:00:00:02", -60),
            at("00:00:00:00:00:01", -40),
        ];
        let kept = dedup_by_address(beacons);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].rssi(), -70);
    }
}
