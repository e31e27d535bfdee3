//! Unit tests for drt-core primitives.

#[cfg(test)]
mod ids {
    use crate::{LinkId, NodeId, RequestId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = VehicleId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(VehicleId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(VehicleId(0) < VehicleId(1));
        assert!(RequestId(100) > RequestId(99));
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(NodeId::default(), NodeId::INVALID);
        assert_eq!(LinkId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(RequestId(7).to_string(), "RequestId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(52.52, 13.40);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_latitude() {
        let a = GeoPoint::new(52.0, 13.0);
        let b = GeoPoint::new(53.0, 13.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn symmetric() {
        let a = GeoPoint::new(30.69, -88.05);
        let b = GeoPoint::new(30.70, -88.03);
        assert!((a.distance_m(b) - b.distance_m(a)).abs() < 0.5);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimTime};

    #[test]
    fn arithmetic() {
        let t = SimTime(100);
        assert_eq!(t + 5, SimTime(105));
        assert_eq!(SimTime(150) - SimTime(100), 50);
        // Subtraction saturates instead of wrapping.
        assert_eq!(SimTime(10) - SimTime(20), 0);
        assert_eq!(SimTime::MAX + 1, SimTime::MAX);
    }

    #[test]
    fn display_is_hms() {
        assert_eq!(SimTime(3_725).to_string(), "01:02:05");
    }

    #[test]
    fn clock_steps() {
        let mut clock = SimClock::new(SimTime(0), 30);
        clock.advance();
        clock.advance();
        assert_eq!(clock.now, SimTime(60));
        assert_eq!(clock.steps_elapsed(), 2);
    }
}

#[cfg(test)]
mod config {
    use crate::{DispatchConfig, SimConfig, SimTime};

    #[test]
    fn default_dispatch_config_is_valid() {
        let cfg = DispatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.handles_aimless_drives());
    }

    #[test]
    fn aimless_handling_needs_both_flags() {
        let cfg = DispatchConfig {
            unschedule_awaiting_requests: true,
            vehicle_diversion: false,
            ..DispatchConfig::default()
        };
        assert!(!cfg.handles_aimless_drives());
        let cfg = DispatchConfig { vehicle_diversion: true, ..cfg };
        assert!(cfg.handles_aimless_drives());
    }

    #[test]
    fn zero_candidate_vehicles_rejected() {
        let cfg = DispatchConfig { candidate_vehicles: Some(0), ..DispatchConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sim_config_steps() {
        let cfg = SimConfig { start: SimTime(0), step_secs: 60, end: SimTime(3_600) };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.total_steps(), 60);
        let bad = SimConfig { step_secs: 0, ..cfg };
        assert!(bad.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::DemandRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = DemandRng::new(12345);
        let mut r2 = DemandRng::new(12345);
        for _ in 0..100 {
            let a: u32 = r1.gen_range(0..1_000);
            let b: u32 = r2.gen_range(0..1_000);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn arrival_gaps_are_positive() {
        let mut rng = DemandRng::new(7);
        for _ in 0..100 {
            assert!(rng.arrival_gap_secs(60.0) >= 1);
        }
        assert_eq!(rng.arrival_gap_secs(0.0), u64::MAX);
    }
}
