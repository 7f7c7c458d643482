//! Unit tests for Value

use core_types::Value;

#[test]
fn default_value_is_undefined() {
    assert_eq!(Value::default(), Value::Undefined);
}

#[test]
fn zero_and_nan_are_falsy() {
    assert!(!Value::Smi(0).is_truthy());
    assert!(!Value::Double(0.0).is_truthy());
    assert!(!Value::Double(f64::NAN).is_truthy());
}

#[test]
fn non_empty_string_is_truthy() {
    assert!(Value::from("Start").is_truthy());
    assert!(!Value::from(String::new()).is_truthy());
}

#[test]
fn type_of_follows_javascript() {
    assert_eq!(Value::Null.type_of(), "object");
    assert_eq!(Value::Boolean(false).type_of(), "boolean");
    assert_eq!(Value::Double(1.5).type_of(), "number");
    assert_eq!(Value::Array(vec![]).type_of(), "object");
}

#[test]
fn double_display_handles_special_values() {
    assert_eq!(Value::Double(f64::INFINITY).to_string(), "Infinity");
    assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
    assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::Double(1.5).to_string(), "1.5");
}

#[test]
fn nested_array_display_flattens_with_commas() {
    let value = Value::from(vec![
        Value::Smi(1),
        Value::from(vec![Value::Smi(2), Value::Smi(3)]),
    ]);
    assert_eq!(value.to_string(), "1,2,3");
}

#[test]
fn accessors_return_payloads() {
    assert_eq!(Value::from("x").as_str(), Some("x"));
    assert_eq!(Value::Smi(4).as_number(), Some(4.0));
    assert_eq!(Value::Null.as_number(), None);
}
