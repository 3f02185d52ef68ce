//! DynString and SharedBuffer tests

use dynval::*;

// ═══════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_bytes_round_trip() {
    let raw = [0u8, 159, 146, 150, b'x'];
    let s = DynString::from_bytes(&raw);
    assert_eq!(s.as_bytes(), &raw);
    assert_eq!(s.len(), 5);
    assert_eq!(s.as_str(), None);
}

#[test]
fn test_from_numbers_uses_canonical_text() {
    assert_eq!(DynString::from(-42i64), "-42");
    assert_eq!(DynString::from(1.5f64), "1.5");
    assert_eq!(DynString::from(1e20f64), "1.0E+20");
    assert_eq!(DynString::from(0.1f64 + 0.2f64), "0.3");
    assert_eq!(DynString::from(-0.0f64), "-0");
    assert_eq!(DynString::from(f64::INFINITY), "INF");
}

#[test]
fn test_clone_shares_buffer() {
    let a = DynString::from("shared");
    let b = a.clone();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.ref_count(), 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Copy-on-write
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_append_to_shared_copies() {
    let a = DynString::from("base");
    let mut b = a.clone();
    b.append("+more");

    assert_eq!(a, "base");
    assert_eq!(b, "base+more");
    assert!(!a.ptr_eq(&b));
    assert_eq!(a.ref_count(), 1);
}

#[test]
fn test_append_to_static_detaches() {
    let mut s = DynString::from_static("lit");
    assert!(s.is_static());
    s += "eral";
    assert!(!s.is_static());
    assert_eq!(s, "literal");
}

#[test]
fn test_append_in_place_when_capacity_allows() {
    let mut s = DynString::with_capacity(16);
    s.append("abc");
    let capacity = s.capacity();
    s.append("def");
    assert_eq!(s, "abcdef");
    assert_eq!(s.capacity(), capacity);
}

#[test]
fn test_repeated_append_matches_prefilled_buffer() {
    let mut appended = DynString::new();
    for _ in 0..50 {
        appended += "xy";
    }

    let mut filled = DynString::with_capacity(100);
    for chunk in filled.mutable_data()[..100].chunks_exact_mut(2) {
        chunk.copy_from_slice(b"xy");
    }
    filled.set_size(100);

    assert_eq!(appended, filled);
}

// ═══════════════════════════════════════════════════════════════════════
// Fill-then-commit
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_thirty_byte_fill_committed_at_twenty_eight() {
    let mut s = DynString::with_capacity(30);
    {
        let buf = s.mutable_data();
        let mut at = 0;
        for digit in b'0'..=b'9' {
            buf[at] = digit;
            buf[at + 1] = b',';
            buf[at + 2] = b' ';
            at += 3;
        }
        assert_eq!(at, 30);
    }
    s.set_size(28);

    assert_eq!(s, "0, 1, 2, 3, 4, 5, 6, 7, 8, 9");
    assert_eq!(s.len(), 28);
}

#[test]
#[should_panic(expected = "exceeds buffer capacity")]
fn test_set_size_past_capacity_panics() {
    let mut s = DynString::with_capacity(4);
    let capacity = s.capacity();
    s.set_size(capacity + 1);
}

#[test]
fn test_fill_on_shared_string_leaves_other_holder_alone() {
    let mut a = DynString::from("keep");
    let b = a.clone();
    a.mutable_data()[0] = b'p';
    a.set_size(4);
    assert_eq!(a, "peep");
    assert_eq!(b, "keep");
}

// ═══════════════════════════════════════════════════════════════════════
// Classification and Access
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_numeric_classification() {
    assert!(DynString::from("42").is_integer());
    assert!(DynString::from(" -1.5e3 ").is_numeric());
    assert!(!DynString::from("1.5").is_integer());
    assert!(!DynString::from("12abc").is_numeric());
    assert!(!DynString::from("").is_numeric());
    assert!(DynString::from("0").is_zero());
    assert!(!DynString::from("0.0").is_zero());
}

#[test]
fn test_char_at() {
    let s = DynString::from("abc");
    assert_eq!(s.char_at(1), Ok(b'b'));
    assert_eq!(
        s.char_at(3),
        Err(ValueError::OutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn test_ordering_is_bytewise() {
    let mut words = vec![
        DynString::from("b"),
        DynString::from("a"),
        DynString::from("B"),
        DynString::from("ab"),
    ];
    words.sort();
    let sorted: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    assert_eq!(sorted, vec!["B", "a", "ab", "b"]);
}

// ═══════════════════════════════════════════════════════════════════════
// SharedBuffer
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_buffer_acquire_release_counts() {
    let buf = SharedBuffer::from_vec(b"data".to_vec());
    let other = buf.acquire();
    assert_eq!(buf.ref_count(), 2);
    assert!(!buf.is_exclusive());
    other.release();
    assert_eq!(buf.ref_count(), 1);
    assert!(buf.is_exclusive());
}

#[test]
fn test_buffer_make_mut_copies_when_shared() {
    let mut a = SharedBuffer::from_vec(b"one".to_vec());
    let b = a.acquire();
    a.make_mut().push(b'!');
    assert_eq!(a.as_bytes(), b"one!");
    assert_eq!(b.as_bytes(), b"one");
    assert!(!a.ptr_eq(&b));
}
