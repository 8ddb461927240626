use super::*;

struct Fixed {
    caps: Option<Caps>,
}

impl Port for Fixed {
    fn name(&self) -> &str {
        "fixed_src"
    }

    fn pull(&mut self) -> CutlineResult<DataUnit> {
        Ok(DataUnit::EndOfStream)
    }

    fn caps(&self) -> Option<Caps> {
        self.caps.clone()
    }
}

fn port(caps: Option<Caps>) -> Box<dyn Port> {
    Box::new(Fixed { caps })
}

#[test]
fn ports_are_named_after_the_group() {
    let link = TimerLink::new(GroupId(3), "video");
    assert_eq!(link.input().name(), "sink_video");
    assert_eq!(link.output().name(), "src_video");
    assert_eq!(link.group(), GroupId(3));
    assert!(!link.is_usable());
}

#[test]
fn linking_makes_the_link_usable_and_unlink_reverts() {
    let mut link = TimerLink::new(GroupId(0), "g");
    link.link_input(port(None)).unwrap();
    assert!(link.is_usable());
    assert!(link.input().is_linked());

    let old = link.unlink_input().unwrap();
    assert_eq!(old.name(), "fixed_src");
    assert!(!link.is_usable());
    assert!(!link.input().is_linked());
}

#[test]
fn caps_queries_pass_through_to_the_other_side() {
    let mut link = TimerLink::new(GroupId(0), "g");
    let raw = Caps::new("video/x-raw").with_field("width", "640");
    link.output_mut()
        .set_allowed_caps(Some(Caps::new("video/x-raw").with_field("height", "480")));
    link.link_input(port(Some(raw))).unwrap();

    let out = link.query_output_caps().unwrap();
    assert_eq!(out.fields.get("width").map(String::as_str), Some("640"));
    assert_eq!(out.fields.get("height").map(String::as_str), Some("480"));
    assert_eq!(
        link.query_input_caps(),
        Some(Caps::new("video/x-raw").with_field("height", "480"))
    );
}

#[test]
fn incompatible_peer_is_refused() {
    let mut link = TimerLink::new(GroupId(0), "g");
    link.output_mut()
        .set_allowed_caps(Some(Caps::new("audio/x-raw")));
    let err = link
        .link_input(port(Some(Caps::new("video/x-raw"))))
        .unwrap_err();
    assert!(matches!(err, CutlineError::Link(_)));
    assert!(!link.is_usable());
    assert!(!link.input().is_linked());
}

#[test]
fn deactivate_and_release() {
    let mut link = TimerLink::new(GroupId(0), "g");
    link.link_input(port(None)).unwrap();
    link.deactivate();
    assert!(!link.is_usable());
    assert!(!link.output().is_active());
    assert!(link.input().is_linked());

    link.release();
    assert!(!link.input().is_linked());
}
