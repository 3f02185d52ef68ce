//! DynArray tests

use dynval::*;
use pretty_assertions::assert_eq;

fn entries(a: &DynArray) -> Vec<(ArrayKey, DynValue)> {
    a.iter().map(|(k, v)| (k.clone(), v)).collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Map Behavior
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_absent_key_reads_null() {
    let a = DynArray::new();
    assert!(!a.exists("k"));
    assert_eq!(a.get("k"), DynValue::Null);
}

#[test]
fn test_set_then_get() {
    let mut a = DynArray::new();
    a.set("k", 3i64);
    assert!(a.exists("k"));
    assert_eq!(a.get("k"), DynValue::Int(3));
}

#[test]
fn test_strict_lookup_distinguishes_null_from_missing() {
    let mut a = DynArray::new();
    a.set("present", DynValue::Null);

    assert_eq!(a.get_strict("present"), Ok(DynValue::Null));
    let err = a.get_strict("absent").unwrap_err();
    assert_eq!(err.to_string(), "undefined array key \"absent\"");
}

#[test]
fn test_int_and_string_keys_do_not_collide() {
    let mut a = DynArray::new();
    a.set(1i64, "int");
    a.set("1", "string");
    assert_eq!(a.count(), 2);
    assert_eq!(a.get(1i64), DynValue::from("int"));
    assert_eq!(a.get("1"), DynValue::from("string"));
}

#[test]
fn test_overwrite_keeps_position() {
    let mut a = DynArray::new();
    a.set("a", 1i64);
    a.set("b", 2i64);
    a.set("a", 3i64);
    assert_eq!(
        entries(&a),
        vec![
            (ArrayKey::from("a"), DynValue::Int(3)),
            (ArrayKey::from("b"), DynValue::Int(2)),
        ]
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Vector Behavior
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_append_remove_scenario() {
    let mut a = DynArray::new();
    assert_eq!(a.append("x"), 0);
    assert_eq!(a.append("y"), 1);
    a.set("name", "z");
    assert_eq!(a.remove(0i64), Some(DynValue::from("x")));
    assert_eq!(a.append("w"), 2);

    assert_eq!(
        entries(&a),
        vec![
            (ArrayKey::Int(1), DynValue::from("y")),
            (ArrayKey::from("name"), DynValue::from("z")),
            (ArrayKey::Int(2), DynValue::from("w")),
        ]
    );
}

#[test]
fn test_append_after_gap_uses_max_plus_one() {
    let mut a = DynArray::new();
    a.set(7i64, "seven");
    a.set(2i64, "two");
    a.remove(2i64);
    assert_eq!(a.append("next"), 8);
}

#[test]
fn test_prepend_then_dequeue_is_identity() {
    let mut a: DynArray = (0..5i64).map(DynValue::from).collect();
    let before = a.clone();

    a.prepend("front");
    assert_eq!(a.get(0i64), DynValue::from("front"));
    assert_eq!(a.get(5i64), DynValue::Int(4));

    assert_eq!(a.dequeue(), Some(DynValue::from("front")));
    assert_eq!(a, before);
}

#[test]
fn test_prepend_refuses_to_shift_past_max_key() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let mut a = DynArray::new();
    a.set(i64::MAX, "top");

    let result = catch_unwind(AssertUnwindSafe(|| a.prepend("front")));
    assert!(result.is_err());
    assert_eq!(entries(&a), vec![(ArrayKey::Int(i64::MAX), DynValue::from("top"))]);
}

#[test]
fn test_prepend_with_negative_max_key() {
    let mut a = DynArray::new();
    a.set(i64::MIN, "bottom");
    a.prepend("front");
    assert_eq!(
        entries(&a),
        vec![
            (ArrayKey::Int(0), DynValue::from("front")),
            (ArrayKey::Int(i64::MIN), DynValue::from("bottom")),
        ]
    );
}

#[test]
fn test_drain_with_pop_tracks_next_key() {
    let mut a: DynArray = (0..100i64).map(DynValue::from).collect();
    for expected in (50..100i64).rev() {
        assert_eq!(a.pop(), Some(DynValue::Int(expected)));
    }
    assert_eq!(a.append("next"), 50);

    a.remove(25i64);
    while a.count() > 26 {
        a.pop();
    }
    // Keys 0..=24 and 26 remain; popping 26 must skip the gap at 25.
    assert_eq!(a.pop(), Some(DynValue::Int(26)));
    assert_eq!(a.append("after gap"), 25);
}

#[test]
fn test_pop_and_dequeue_ends() {
    let mut a: DynArray = vec![DynValue::from("first"), DynValue::from("last")]
        .into_iter()
        .collect();
    assert_eq!(a.pop(), Some(DynValue::from("last")));
    assert_eq!(a.dequeue(), Some(DynValue::from("first")));
    assert!(a.is_empty());
    assert_eq!(a.pop(), None);
}

// ═══════════════════════════════════════════════════════════════════════
// Set Behavior
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_as_set() {
    let mut seen = DynArray::new();
    for word in ["a", "b", "a", "c", "b"] {
        let v = DynValue::from(word);
        if !seen.contains(&v) {
            seen.append(v);
        }
    }
    assert_eq!(seen.count(), 3);
    assert_eq!(
        seen.values().collect::<Vec<_>>(),
        vec![DynValue::from("a"), DynValue::from("b"), DynValue::from("c")]
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Copy-on-write and Aliasing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_copy_on_write_isolation() {
    let mut a = DynArray::new();
    a.append(1i64);
    let mut b = a.clone();
    assert!(a.ptr_eq(&b));

    b.set("k", "v");
    assert!(!a.exists("k"));
    assert!(b.exists("k"));
    assert!(!a.ptr_eq(&b));
    assert_eq!(a.ref_count(), 1);
}

#[test]
fn test_nested_arrays_copy_independently() {
    let mut inner = DynArray::new();
    inner.append(1i64);
    let mut outer = DynArray::new();
    outer.set("inner", inner.clone());

    inner.append(2i64);
    assert_eq!(outer.get("inner").as_array().map(DynArray::count), Some(1));
}

#[test]
fn test_alias_sees_external_writes() {
    let x = ValueRef::new("before");
    let mut a = DynArray::new();
    a.set_ref("k", &x);

    x.set("after");
    assert_eq!(a.get("k"), DynValue::from("after"));

    a.set("k", "from array");
    assert_eq!(x.get(), DynValue::from("from array"));
}

#[test]
fn test_append_ref_between_two_arrays() {
    let cell = ValueRef::new(0i64);
    let mut a = DynArray::new();
    let mut b = DynArray::new();
    a.append_ref(&cell);
    b.append_ref(&cell);

    a.set(0i64, 10i64);
    assert_eq!(b.get(0i64), DynValue::Int(10));
    assert_eq!(cell.alias_count(), 3);
}

#[test]
fn test_debug_shows_aliases() {
    let cell = ValueRef::new(1i64);
    let mut a = DynArray::new();
    a.set_ref("r", &cell);
    assert_eq!(format!("{:?}", a), "array(1) { \"r\" => &int(1) }");
}
