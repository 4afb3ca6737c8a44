use super::*;

#[test]
fn object_literal_parses_into_map() {
    let options = parse_options(Some(r#"{"autoplay": true, "delay": 4000, "labels": ["a", "b"]}"#));
    assert_eq!(options.get("autoplay"), Some(&serde_json::json!(true)));
    assert_eq!(options.get("delay"), Some(&serde_json::json!(4000)));
    assert_eq!(options.get("labels"), Some(&serde_json::json!(["a", "b"])));
}

#[test]
fn missing_or_blank_attribute_is_empty() {
    assert!(parse_options(None).is_empty());
    assert!(parse_options(Some("")).is_empty());
    assert!(parse_options(Some("   ")).is_empty());
}

#[test]
fn null_literal_is_empty() {
    assert!(parse_options(Some("null")).is_empty());
}

#[test]
fn malformed_text_is_empty() {
    assert!(parse_options(Some("{autoplay: true")).is_empty());
    assert!(parse_options(Some("alert('x')")).is_empty());
}

#[test]
fn non_object_values_are_empty() {
    assert!(parse_options(Some("42")).is_empty());
    assert!(parse_options(Some("[1, 2]")).is_empty());
    assert!(parse_options(Some(r#""text""#)).is_empty());
}
