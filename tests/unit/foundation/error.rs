use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PixelspreadError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PixelspreadError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        PixelspreadError::worker("x")
            .to_string()
            .contains("worker error:")
    );
    assert!(
        PixelspreadError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PixelspreadError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
