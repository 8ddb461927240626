use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CutlineError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CutlineError::link("x").to_string().contains("link error:"));
    assert!(CutlineError::seek("x").to_string().contains("seek error:"));
    assert!(CutlineError::state("x").to_string().contains("state error:"));
    assert!(CutlineError::pull("x").to_string().contains("pull error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CutlineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
