use super::*;
use serde_json::json;

#[test]
fn parses_hex_long_and_short() {
    let c: Rgb8 = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Rgb8::new(255, 0, 0));

    let c: Rgb8 = serde_json::from_value(json!("#0a8")).unwrap();
    assert_eq!(c, Rgb8::new(0, 170, 136));
}

#[test]
fn parses_object_and_array() {
    let c: Rgb8 = serde_json::from_value(json!({"r": 10, "g": 20, "b": 30})).unwrap();
    assert_eq!(c, Rgb8::new(10, 20, 30));

    let c: Rgb8 = serde_json::from_value(json!([1, 2, 3])).unwrap();
    assert_eq!(c, Rgb8::new(1, 2, 3));
}

#[test]
fn rejects_bad_input() {
    assert!(serde_json::from_value::<Rgb8>(json!("#12345")).is_err());
    assert!(serde_json::from_value::<Rgb8>(json!([1, 2])).is_err());
    assert!(serde_json::from_value::<Rgb8>(json!({"r": 300, "g": 0, "b": 0})).is_err());
}

#[test]
fn serializes_as_hex() {
    let v = serde_json::to_value(Rgb8::new(0, 0, 0)).unwrap();
    assert_eq!(v, json!("#000000"));
}
