use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CompositorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CompositorError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        CompositorError::surface("x")
            .to_string()
            .contains("surface error:")
    );
    assert!(
        CompositorError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn only_resource_errors_are_recoverable() {
    assert!(CompositorError::resource("oom").is_recoverable());
    assert!(!CompositorError::surface("lost").is_recoverable());
    assert!(!CompositorError::validation("empty").is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CompositorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
