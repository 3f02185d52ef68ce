//! DynValue coercion table tests

use dynval::*;

fn list(values: &[i64]) -> DynValue {
    DynValue::from(values.iter().copied().map(DynValue::from).collect::<DynArray>())
}

// ═══════════════════════════════════════════════════════════════════════
// to_boolean
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_boolean_examples() {
    assert!(!DynValue::Int(0).to_boolean());
    assert!(!DynValue::from("0").to_boolean());
    assert!(DynValue::from("0.0").to_boolean());
    assert!(DynValue::from(" ").to_boolean());
    assert!(!DynValue::empty_array().to_boolean());
    assert!(list(&[0]).to_boolean());
    assert!(DynValue::Resource(ResourceHandle::new("r", ())).to_boolean());
}

// ═══════════════════════════════════════════════════════════════════════
// to_int64 / to_double
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_int_examples() {
    assert_eq!(DynValue::from("abc").to_int64(), 0);
    assert_eq!(DynValue::from("42abc").to_int64(), 42);
    assert_eq!(DynValue::from("  -7").to_int64(), -7);
    assert_eq!(DynValue::from("1.9e2").to_int64(), 190);
    assert_eq!(DynValue::from("99999999999999999999").to_int64(), i64::MAX);
    assert_eq!(DynValue::Double(1e30).to_int64(), 0);
    assert_eq!(DynValue::Double(f64::NAN).to_int64(), 0);
}

#[test]
fn test_array_numeric_policy() {
    assert_eq!(DynValue::empty_array().to_int64(), 0);
    assert_eq!(list(&[5, 6, 7]).to_int64(), 1);
    assert_eq!(DynValue::empty_array().to_double(), 0.0);
    assert_eq!(list(&[5]).to_double(), 1.0);
}

#[test]
fn test_double_examples() {
    assert_eq!(DynValue::from(".5").to_double(), 0.5);
    assert_eq!(DynValue::from("1e").to_double(), 1.0);
    assert_eq!(DynValue::Null.to_double(), 0.0);
    assert_eq!(DynValue::Int(-2).to_double(), -2.0);
}

// ═══════════════════════════════════════════════════════════════════════
// to_dyn_string
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_string_examples() {
    assert_eq!(DynValue::Double(1.5).to_dyn_string(), "1.5");
    assert_eq!(DynValue::Double(1e20).to_dyn_string(), "1.0E+20");
    assert_eq!(DynValue::Double(1e-5).to_dyn_string(), "1.0E-5");
    assert_eq!(DynValue::Double(123456.0).to_dyn_string(), "123456");
    assert_eq!(DynValue::Double(0.1 + 0.2).to_dyn_string(), "0.3");
    assert_eq!(DynValue::Double(-0.0).to_dyn_string(), "-0");
    assert_eq!(
        DynValue::Double(std::f64::consts::PI).to_dyn_string(),
        "3.1415926535898"
    );
    assert_eq!(DynValue::Object(ObjectHandle::new("C")).to_dyn_string(), "Object");
}

#[test]
fn test_string_coercion_shares_existing_buffer() {
    let v = DynValue::from("shared");
    let s = v.to_dyn_string();
    assert!(v.as_dyn_string().is_some_and(|orig| orig.ptr_eq(&s)));
}

// ═══════════════════════════════════════════════════════════════════════
// Conversions never mutate
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_conversions_leave_receiver_unchanged() {
    let values = vec![
        DynValue::Null,
        DynValue::Bool(true),
        DynValue::Int(3),
        DynValue::Double(2.5),
        DynValue::from("12 monkeys"),
        list(&[1, 2]),
    ];
    for v in values {
        let before = format!("{:?}", v);
        let _ = v.to_boolean();
        let _ = v.to_int64();
        let _ = v.to_double();
        let _ = v.to_dyn_string();
        let _ = v.to_array();
        assert_eq!(format!("{:?}", v), before);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Handles and Equality
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_handle_targets_never_fabricated() {
    assert!(DynValue::from("x").to_resource().is_none());
    assert!(DynValue::Int(1).to_object().is_none());

    let res = ResourceHandle::new("file", String::from("/tmp/x"));
    let v = DynValue::from(res.clone());
    assert!(v.to_resource().is_some_and(|r| r.ptr_eq(&res)));
    assert_eq!(v.to_int64(), res.id() as i64);
}

#[test]
fn test_loose_vs_strict_equality() {
    let one = DynValue::Int(1);
    let one_str = DynValue::from("1");
    assert!(one.loose_eq(&one_str));
    assert_ne!(one, one_str);

    assert!(DynValue::from("abc").loose_eq(&DynValue::from("abc")));
    assert!(DynValue::from("1e3").loose_eq(&DynValue::from("1000")));
    assert!(!DynValue::from("abc").loose_eq(&DynValue::from("ABC")));
}

#[test]
fn test_data_type_and_type_name() {
    assert_eq!(DynValue::Double(1.0).data_type(), DataType::Float);
    assert_eq!(type_name(&DynValue::Null), "null");
    assert_eq!(type_name(&DynValue::Resource(ResourceHandle::new("r", ()))), "resource");
    assert_eq!(DataType::Mixed.to_string(), "mixed");
}
