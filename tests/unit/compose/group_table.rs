use super::*;
use crate::foundation::core::ClockTime;
use crate::media::clip_group::ClipGroup;

fn group(name: &str, a: u64, b: u64) -> Box<dyn Group> {
    let r = TimeRange::new(ClockTime(a), ClockTime(b)).unwrap();
    Box::new(ClipGroup::single(name, r, ClockTime(1)).unwrap())
}

#[test]
fn empty_table_spans_zero_to_infinity() {
    let t = GroupTable::default();
    assert_eq!(t.aggregate_range(), TimeRange::from_start(ClockTime::ZERO));
    assert!(!t.covers(TimeRange::from_start(ClockTime::ZERO)));
    assert_eq!(t.len(), 0);
}

#[test]
fn aggregate_is_min_start_max_stop() {
    let mut t = GroupTable::default();
    t.insert(group("b", 10, 20));
    t.insert(group("a", 5, 12));
    let r = t.aggregate_range();
    assert_eq!(r.start, ClockTime(5));
    assert_eq!(r.stop, ClockTime(20));
}

#[test]
fn removed_ids_are_not_reused() {
    let mut t = GroupTable::default();
    let a = t.insert(group("a", 0, 10));
    let b = t.insert(group("b", 10, 20));
    assert_eq!(t.remove(a).unwrap().name(), "a");
    assert!(t.remove(a).is_none());
    assert!(t.get(a).is_none());

    let c = t.insert(group("c", 20, 30));
    assert_ne!(c, a);
    assert_eq!(t.ids(), vec![b, c]);
    assert_eq!(t.len(), 2);
}

#[test]
fn iteration_follows_insertion_order() {
    let mut t = GroupTable::default();
    t.insert(group("late", 50, 60));
    t.insert(group("early", 0, 10));
    let names: Vec<_> = t.iter().map(|(_, g)| g.name().to_owned()).collect();
    assert_eq!(names, vec!["late", "early"]);
}

#[test]
fn covers_asks_every_group() {
    let mut t = GroupTable::default();
    t.insert(group("a", 0, 10));
    t.insert(group("b", 10, 20));
    assert!(t.covers(TimeRange::from_start(ClockTime(10))));
    assert!(!t.covers(TimeRange::from_start(ClockTime(20))));
}

#[test]
fn clear_hands_back_every_group() {
    let mut t = GroupTable::default();
    let a = t.insert(group("a", 0, 10));
    t.insert(group("b", 10, 20));
    t.remove(a);
    let drained = t.clear();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].1.name(), "b");
    assert_eq!(t.len(), 0);
}

#[test]
fn ids_are_slot_indices() {
    let mut t = GroupTable::default();
    let ids: Vec<GroupId> = (0..3)
        .map(|i| t.insert(group(&format!("g{i}"), 0, 10)))
        .collect();
    assert_eq!(ids, vec![GroupId(0), GroupId(1), GroupId(2)]);
    t.remove(ids[1]);
    assert_eq!(t.insert(group("g3", 0, 10)), GroupId(3));
    assert_eq!(GroupId(3).to_string(), "group#3");
}
