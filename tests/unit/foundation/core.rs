use super::*;

#[test]
fn time_range_contains_boundaries() {
    let r = TimeRange::new(ClockTime(2), ClockTime(5)).unwrap();
    assert!(!r.contains(ClockTime(1)));
    assert!(r.contains(ClockTime(2)));
    assert!(r.contains(ClockTime(4)));
    assert!(!r.contains(ClockTime(5)));
}

#[test]
fn time_range_rejects_inverted_bounds() {
    assert!(TimeRange::new(ClockTime(5), ClockTime(2)).is_err());
    assert!(TimeRange::new(ClockTime::NONE, ClockTime::NONE).is_err());
    assert!(TimeRange::new(ClockTime(3), ClockTime(3)).unwrap().is_empty());
}

#[test]
fn open_ended_range_has_no_duration() {
    let r = TimeRange::from_start(ClockTime::from_secs(1));
    assert!(r.is_open_ended());
    assert_eq!(r.duration(), None);
    assert!(r.contains(ClockTime::from_secs(3600)));
    assert!(!r.contains(ClockTime::NONE));

    let closed = TimeRange::new(ClockTime::from_millis(250), ClockTime::from_secs(1)).unwrap();
    assert_eq!(closed.duration(), Some(ClockTime::from_millis(750)));
}

#[test]
fn intersects_is_half_open() {
    let a = TimeRange::new(ClockTime(0), ClockTime(10)).unwrap();
    let b = TimeRange::new(ClockTime(10), ClockTime(20)).unwrap();
    assert!(!a.intersects(b));
    assert!(b.intersects(TimeRange::from_start(ClockTime(10))));
    assert!(a.intersects(TimeRange::from_start(ClockTime(9))));
    assert!(!a.intersects(TimeRange::from_start(ClockTime(10))));
}

#[test]
fn saturating_math_keeps_sentinel() {
    assert_eq!(ClockTime::NONE.saturating_add(ClockTime(1)), ClockTime::NONE);
    assert_eq!(ClockTime(3).saturating_sub(ClockTime(5)), ClockTime::ZERO);
    assert_eq!(ClockTime(u64::MAX - 1).saturating_add(ClockTime(9)), ClockTime::NONE);
    assert!(!ClockTime::NONE.is_valid());
}

#[test]
fn display_formats_hms() {
    assert_eq!(ClockTime::from_millis(61_500).to_string(), "0:01:01.500000000");
    assert_eq!(ClockTime::NONE.to_string(), "none");
}
