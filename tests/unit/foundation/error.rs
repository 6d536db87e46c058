use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RasterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(RasterError::render("x").to_string().contains("render error:"));
    assert!(RasterError::media("x").to_string().contains("media error:"));
    assert!(
        RasterError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RasterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn anyhow_converts_via_question_mark() {
    fn inner() -> RasterResult<()> {
        Err(anyhow::anyhow!("lower layer failed"))?;
        Ok(())
    }
    let err = inner().unwrap_err();
    assert!(matches!(err, RasterError::Other(_)));
}
