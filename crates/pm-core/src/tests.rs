//! Unit tests for pm-core primitives.

#[cfg(test)]
mod ids {
    use crate::{LinkId, PersonId, ProducerId};

    #[test]
    fn producer_id_index_roundtrip() {
        let id = ProducerId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(ProducerId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinel_is_max() {
        assert_eq!(ProducerId::INVALID.0, u32::MAX);
        assert_eq!(ProducerId::default(), ProducerId::INVALID);
    }

    #[test]
    fn producer_id_display() {
        assert_eq!(ProducerId(7).to_string(), "ProducerId(7)");
    }

    #[test]
    fn named_ids_compare_by_content() {
        let a = PersonId::new("100");
        let b = PersonId::from(String::from("100"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "100");
        assert_eq!(a.to_string(), "100");
    }

    #[test]
    fn named_id_clone_shares_text() {
        let link = LinkId::new("1-2");
        let copy = link.clone();
        assert!(std::ptr::eq(link.as_str(), copy.as_str()));
    }

    #[test]
    fn default_named_id_is_empty() {
        assert!(LinkId::default().is_empty());
    }
}

#[cfg(test)]
mod time {
    use crate::SimTime;

    #[test]
    fn parse_hours_minutes() {
        assert_eq!(SimTime::parse_clock("06:00"), Some(SimTime(21_600.0)));
        assert_eq!(SimTime::parse_clock("00:30"), Some(SimTime(1_800.0)));
    }

    #[test]
    fn parse_with_seconds() {
        assert_eq!(SimTime::parse_clock("07:30:15"), Some(SimTime(27_015.0)));
    }

    #[test]
    fn parse_past_midnight() {
        assert_eq!(SimTime::parse_clock("25:00:00"), Some(SimTime(90_000.0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(SimTime::parse_clock(""), None);
        assert_eq!(SimTime::parse_clock("noon"), None);
        assert_eq!(SimTime::parse_clock("12"), None);
        assert_eq!(SimTime::parse_clock("12:60"), None);
        assert_eq!(SimTime::parse_clock("12:00:00:00"), None);
        assert_eq!(SimTime::parse_clock("-1:00"), None);
    }

    #[test]
    fn total_order_handles_nan() {
        let mut times = vec![
            SimTime(f64::NAN),
            SimTime(5.0),
            SimTime(-f64::NAN),
            SimTime(f64::NEG_INFINITY),
            SimTime(1.0),
        ];
        times.sort();
        assert!(times[0].0.is_nan() && times[0].0.is_sign_negative());
        assert_eq!(times[1], SimTime(f64::NEG_INFINITY));
        assert_eq!(times[2], SimTime(1.0));
        assert_eq!(times[3], SimTime(5.0));
        assert!(times[4].0.is_nan() && times[4].0.is_sign_positive());
    }

    #[test]
    fn arithmetic() {
        let t = SimTime::from_hms(8, 0, 0) + SimTime::from_secs(90.0);
        assert_eq!(t, SimTime(28_890.0));
        assert_eq!(t - SimTime(890.0), SimTime(28_000.0));
    }

    #[test]
    fn display_is_plain_seconds() {
        assert_eq!(SimTime(21_600.0).to_string(), "21600");
        assert_eq!(SimTime(1.5).to_string(), "1.5");
    }
}

#[cfg(test)]
mod event {
    use crate::{ActType, Event, EventKind, LinkId, PersonId, SimTime};

    #[test]
    fn kind_labels() {
        assert_eq!(EventKind::ActivityEnd.as_str(), "actEnd");
        assert_eq!("actStart".parse::<EventKind>().unwrap(), EventKind::ActivityStart);
        assert_eq!("actend".parse::<EventKind>().unwrap(), EventKind::ActivityEnd);
        assert!("leave".parse::<EventKind>().is_err());
    }

    #[test]
    fn constructors_set_kind() {
        let e = Event::activity_end(
            SimTime(10.0),
            PersonId::new("p"),
            LinkId::new("l"),
            ActType::new("home"),
        );
        assert_eq!(e.kind, EventKind::ActivityEnd);
        assert_eq!(e.to_string(), "10 actEnd person=p link=l actType=home");
    }
}

#[cfg(test)]
mod config {
    use crate::{MergeConfig, MergeMode, OrderPolicy, PlanSelection};

    #[test]
    fn default_is_classic_behavior() {
        let c = MergeConfig::default();
        assert_eq!(c.mode, MergeMode::TwoPhase);
        assert_eq!(c.order_policy, OrderPolicy::Drop);
        assert_eq!(c.plan_selection, PlanSelection::All);
        assert!(c.stall_timeout().is_none());
        assert!(c.run_timeout().is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_timeouts_rejected() {
        let c = MergeConfig { stall_timeout_ms: Some(0), ..Default::default() };
        assert!(c.validate().is_err());
        let c = MergeConfig { run_timeout_ms: Some(0), ..Default::default() };
        assert!(c.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::PersonRng;

    #[test]
    fn person_rng_is_deterministic() {
        let mut a = PersonRng::new(42, 3);
        let mut b = PersonRng::new(42, 3);
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_persons_diverge() {
        let mut a = PersonRng::new(42, 0);
        let mut b = PersonRng::new(42, 1);
        let xs: Vec<u64> = (0..8).map(|_| a.gen_range(0..u64::MAX)).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.gen_range(0..u64::MAX)).collect();
        assert_ne!(xs, ys);
    }
}
