use super::*;
use crate::foundation::core::ClockTime;
use crate::pipeline::buffer::Buffer;

struct Counter {
    name: String,
    next: u64,
}

impl Port for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn pull(&mut self) -> CutlineResult<DataUnit> {
        let ts = ClockTime(self.next);
        self.next += 1;
        Ok(DataUnit::Buffer(Buffer::empty(ts, ClockTime(1))))
    }

    fn caps(&self) -> Option<Caps> {
        Some(Caps::new("video/x-raw"))
    }
}

fn counter(name: &str) -> Box<dyn Port> {
    Box::new(Counter {
        name: name.to_owned(),
        next: 0,
    })
}

#[test]
fn pull_on_unlinked_input_is_a_link_error() {
    let mut input = InputPort::new("sink_a");
    assert!(matches!(input.pull(), Err(CutlineError::Link(_))));
}

#[test]
fn second_link_requires_unlink() {
    let mut input = InputPort::new("sink_a");
    input.link(counter("src_1")).unwrap();
    assert!(matches!(
        input.link(counter("src_2")),
        Err(CutlineError::Link(_))
    ));

    let old = input.unlink().unwrap();
    assert_eq!(old.name(), "src_1");
    assert!(!input.is_linked());

    input.link(counter("src_2")).unwrap();
    assert_eq!(input.peer_name(), Some("src_2"));
}

#[test]
fn pull_and_caps_go_to_the_peer() {
    let mut input = InputPort::new("sink_a");
    input.link(counter("src")).unwrap();
    assert_eq!(input.peer_caps(), Some(Caps::new("video/x-raw")));
    let DataUnit::Buffer(b0) = input.pull().unwrap() else {
        panic!("expected buffer");
    };
    let DataUnit::Buffer(b1) = input.pull().unwrap() else {
        panic!("expected buffer");
    };
    assert_eq!(b0.timestamp, ClockTime(0));
    assert_eq!(b1.timestamp, ClockTime(1));
}

#[test]
fn output_port_tracks_activity_and_allowed_caps() {
    let mut out = OutputPort::new("src_a");
    assert!(out.is_active());
    assert!(out.allowed_caps().is_none());
    out.set_active(false);
    out.set_allowed_caps(Some(Caps::new("audio/x-raw")));
    assert!(!out.is_active());
    assert_eq!(out.allowed_caps(), Some(&Caps::new("audio/x-raw")));
}
