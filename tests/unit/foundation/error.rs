use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SnapError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SnapError::capture("x").to_string().contains("capture error:"));
    assert!(SnapError::persist("x").to_string().contains("persist error:"));
    assert!(SnapError::config("x").to_string().contains("config error:"));
    assert!(
        SnapError::from(crate::normalize::NormalizeError::EmptyFrame)
            .to_string()
            .contains("normalize error:")
    );
}

#[test]
fn io_errors_are_wrapped_transparently() {
    let base = std::io::Error::other("boom");
    let err = SnapError::from(base);
    assert!(matches!(err, SnapError::Other(_)));
    assert!(err.to_string().contains("boom"));
}
