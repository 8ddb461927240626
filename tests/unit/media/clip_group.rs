use super::*;

fn ms(v: u64) -> ClockTime {
    ClockTime::from_millis(v)
}

fn range(a: u64, b: u64) -> TimeRange {
    TimeRange::new(ms(a), ms(b)).unwrap()
}

fn clip(name: &str, a: u64, b: u64) -> Clip {
    Clip {
        name: name.to_owned(),
        range: range(a, b),
        frame_duration: ms(1),
    }
}

fn drain(port: &mut dyn Port) -> (Vec<u64>, bool) {
    let mut out = Vec::new();
    loop {
        match port.pull().unwrap() {
            DataUnit::Buffer(b) => out.push(b.timestamp.millis()),
            DataUnit::EndOfStream => return (out, true),
        }
    }
}

fn two_clip_group() -> ClipGroup {
    let mut g = ClipGroup::new("track", range(0, 20))
        .with_clip(clip("b", 10, 20))
        .unwrap()
        .with_clip(clip("a", 0, 10))
        .unwrap();
    assert!(g.set_state(State::Playing));
    g
}

#[test]
fn seek_builds_one_segment_per_clip() {
    let mut g = two_clip_group();
    assert!(g.send_seek(&SeekEvent::from_start(ClockTime::ZERO)));
    let mut port = g.output_port().unwrap();
    let (ts, eos) = drain(port.as_mut());
    assert_eq!(ts, (0..10).collect::<Vec<_>>());
    assert!(eos);
    assert_eq!(g.position(), ms(10));

    assert!(g.covers(TimeRange::from_start(ms(10))));
    assert!(g.send_seek(&SeekEvent::from_start(ms(10))));
    let mut port = g.output_port().unwrap();
    let (ts, _) = drain(port.as_mut());
    assert_eq!(ts, (10..20).collect::<Vec<_>>());
    assert_eq!(g.position(), ms(20));
    assert!(!g.covers(TimeRange::from_start(ms(20))));
}

#[test]
fn seek_into_a_gap_jumps_to_next_clip() {
    let mut g = ClipGroup::new("late", range(0, 20))
        .with_clip(clip("late", 10, 12))
        .unwrap();
    assert!(g.set_state(State::Paused));
    assert!(g.send_seek(&SeekEvent::from_start(ClockTime::ZERO)));
    assert_eq!(g.position(), ms(10));
    let mut port = g.output_port().unwrap();
    assert_eq!(drain(port.as_mut()).0, vec![10, 11]);
}

#[test]
fn accurate_seek_lands_on_next_frame_boundary() {
    let mut g = ClipGroup::new("g", range(0, 10))
        .with_clip(Clip {
            name: "c".to_owned(),
            range: range(0, 10),
            frame_duration: ms(4),
        })
        .unwrap();
    assert!(g.set_state(State::Playing));
    assert!(g.send_seek(&SeekEvent::from_start(ms(5))));
    let mut port = g.output_port().unwrap();
    let DataUnit::Buffer(b) = port.pull().unwrap() else {
        panic!("expected buffer");
    };
    assert_eq!(b.timestamp, ms(8));
    assert_eq!(b.duration, ms(2));
    assert_eq!(b.data, b"c".to_vec());
}

#[test]
fn seek_past_content_reports_end_at_target() {
    let mut g = ClipGroup::single("g", range(0, 10), ms(1)).unwrap();
    assert!(g.set_state(State::Playing));
    assert!(g.send_seek(&SeekEvent::from_start(ms(15))));
    assert_eq!(g.position(), ms(15));
    let mut port = g.output_port().unwrap();
    assert_eq!(port.pull().unwrap(), DataUnit::EndOfStream);
}

#[test]
fn stale_port_is_invalidated_by_seek() {
    let mut g = ClipGroup::single("g", range(0, 10), ms(1)).unwrap();
    assert!(g.set_state(State::Playing));
    assert!(g.send_seek(&SeekEvent::from_start(ClockTime::ZERO)));
    let mut old = g.output_port().unwrap();
    assert!(g.send_seek(&SeekEvent::from_start(ms(3))));
    assert!(matches!(old.pull(), Err(CutlineError::Pull(_))));
    assert_eq!(g.seek_count(), 2);
}

#[test]
fn group_range_clamps_content_and_coverage() {
    let mut g = ClipGroup::single("g", range(0, 10), ms(1)).unwrap();
    g.set_range(range(0, 5));
    assert!(!g.covers(TimeRange::from_start(ms(5))));
    assert!(g.set_state(State::Playing));
    assert!(g.send_seek(&SeekEvent::from_start(ClockTime::ZERO)));
    let mut port = g.output_port().unwrap();
    assert_eq!(drain(port.as_mut()).0, vec![0, 1, 2, 3, 4]);
}

#[test]
fn failure_knobs() {
    let mut g = ClipGroup::single("g", range(0, 10), ms(1))
        .unwrap()
        .without_port()
        .rejecting_seeks()
        .rejecting_state_changes();
    assert!(g.output_port().is_none());
    assert!(!g.send_seek(&SeekEvent::from_start(ClockTime::ZERO)));
    assert!(!g.set_state(State::Ready));
    assert_eq!(g.state(), State::Null);
}

#[test]
fn pull_in_null_state_fails() {
    let mut g = ClipGroup::single("g", range(0, 10), ms(1)).unwrap();
    assert!(g.send_seek(&SeekEvent::from_start(ClockTime::ZERO)));
    let mut port = g.output_port().unwrap();
    assert!(port.pull().is_err());
}

#[test]
fn invalid_clips_are_rejected() {
    let zero = Clip {
        frame_duration: ClockTime::ZERO,
        ..clip("z", 0, 1)
    };
    assert!(ClipGroup::new("g", range(0, 1)).with_clip(zero).is_err());

    let open = Clip {
        range: TimeRange::from_start(ClockTime::ZERO),
        ..clip("o", 0, 1)
    };
    assert!(ClipGroup::new("g", range(0, 1)).with_clip(open).is_err());
}

#[test]
fn probe_observes_boxed_group() {
    let g = ClipGroup::single("g", range(0, 10), ms(1)).unwrap();
    let probe = g.probe();
    let mut boxed: Box<dyn Group> = Box::new(g);
    assert!(boxed.set_state(State::Ready));
    assert!(boxed.send_seek(&SeekEvent::from_start(ms(4))));
    assert_eq!(probe.state(), State::Ready);
    assert_eq!(probe.seek_count(), 1);
    assert_eq!(probe.position(), ms(4));
}
