//! Copy-on-write byte strings

use std::borrow::Cow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::AddAssign;

use super::buffer::SharedBuffer;
use super::numeric::{self, Numeric};
use crate::error::ValueError;

#[derive(Clone)]
enum Repr {
    /// Context-local storage, shared until someone writes.
    Shared(SharedBuffer),
    /// Process-wide storage that is never freed or written.
    Static(&'static [u8]),
}

/// A reference-counted byte string.
///
/// Cloning shares the buffer. Every mutator checks for exclusive
/// ownership first and copies the buffer when it is shared, so a clone
/// never observes another holder's writes.
///
/// Contents are arbitrary bytes; [`as_str`](Self::as_str) succeeds only
/// for UTF-8 data.
///
/// # Filling a reserved buffer
///
/// ```
/// use dynval::DynString;
///
/// let mut s = DynString::with_capacity(8);
/// let buf = s.mutable_data();
/// buf[..5].copy_from_slice(b"hello");
/// s.set_size(5);
/// assert_eq!(s, "hello");
/// ```
///
/// Bytes past the committed size are garbage and must not be read.
#[derive(Clone)]
pub struct DynString {
    repr: Repr,
    len: usize,
}

impl DynString {
    /// The empty string.
    pub fn new() -> Self {
        Self::from_static("")
    }

    /// Copy `bytes` into a new buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            repr: Repr::Shared(SharedBuffer::from_vec(bytes)),
            len,
        }
    }

    /// Wrap process-lifetime text without copying.
    pub fn from_static(s: &'static str) -> Self {
        Self {
            repr: Repr::Static(s.as_bytes()),
            len: s.len(),
        }
    }

    /// An empty string whose buffer holds at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            repr: Repr::Shared(SharedBuffer::with_capacity(capacity)),
            len: 0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for the empty string.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Shared(buf) => buf.capacity(),
            Repr::Static(bytes) => bytes.len(),
        }
    }

    /// Whether this string lives in process-wide static storage.
    pub fn is_static(&self) -> bool {
        matches!(self.repr, Repr::Static(_))
    }

    /// Holders of the underlying buffer. Static strings report 1.
    pub fn ref_count(&self) -> usize {
        match &self.repr {
            Repr::Shared(buf) => buf.ref_count(),
            Repr::Static(_) => 1,
        }
    }

    /// Whether two strings share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Shared(a), Repr::Shared(b)) => a.ptr_eq(b),
            (Repr::Static(a), Repr::Static(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }

    /// The committed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Shared(buf) => &buf.as_bytes()[..self.len],
            Repr::Static(bytes) => &bytes[..self.len],
        }
    }

    /// The contents as `str`, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// The contents as text, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Copy the contents out.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Take the contents, copying only if the buffer is shared.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.repr {
            Repr::Shared(buf) => {
                let mut bytes = buf.into_vec();
                bytes.truncate(self.len);
                bytes
            }
            Repr::Static(bytes) => bytes[..self.len].to_vec(),
        }
    }

    /// Byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` when `index >= len()`.
    pub fn char_at(&self, index: usize) -> Result<u8, ValueError> {
        self.as_bytes()
            .get(index)
            .copied()
            .ok_or(ValueError::OutOfRange {
                index,
                len: self.len,
            })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Numeric Classification and Coercion
    // ═══════════════════════════════════════════════════════════════════

    /// Whole string is a number (integer or floating point).
    pub fn is_numeric(&self) -> bool {
        numeric::classify(self.as_bytes()).is_some()
    }

    /// Whole string is an integer that fits in 64 bits.
    pub fn is_integer(&self) -> bool {
        matches!(numeric::classify(self.as_bytes()), Some(Numeric::Int(_)))
    }

    /// Exactly `"0"`, the one non-empty string that is falsy.
    pub fn is_zero(&self) -> bool {
        self.as_bytes() == b"0"
    }

    /// Integer value of the leading numeric prefix; 0 if there is none.
    pub fn to_int64(&self) -> i64 {
        numeric::parse_prefix_int(self.as_bytes())
    }

    /// Double value of the leading numeric prefix; 0.0 if there is none.
    pub fn to_double(&self) -> f64 {
        numeric::parse_prefix_double(self.as_bytes())
    }

    /// Non-empty and not `"0"`.
    pub fn to_boolean(&self) -> bool {
        !self.is_empty() && !self.is_zero()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════

    /// Make the buffer private to this handle and return it.
    fn buffer_mut(&mut self) -> &mut Vec<u8> {
        if let Repr::Static(bytes) = self.repr {
            tracing::trace!(len = self.len, "copy-on-write: detaching static string");
            self.repr = Repr::Shared(SharedBuffer::from_vec(bytes[..self.len].to_vec()));
        }
        match &mut self.repr {
            Repr::Shared(buf) => buf.make_mut(),
            Repr::Static(_) => unreachable!("static storage was detached above"),
        }
    }

    /// Exclusive access to the whole buffer capacity for a manual fill.
    ///
    /// The committed length becomes meaningless until
    /// [`set_size`](Self::set_size) is called.
    pub fn mutable_data(&mut self) -> &mut [u8] {
        let buf = self.buffer_mut();
        let capacity = buf.capacity();
        buf.resize(capacity, 0);
        buf.as_mut_slice()
    }

    /// Commit the logical length after a manual fill.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the capacity of the buffer.
    pub fn set_size(&mut self, len: usize) {
        let buf = self.buffer_mut();
        assert!(
            len <= buf.capacity(),
            "set_size({len}) exceeds buffer capacity {}",
            buf.capacity()
        );
        if len > buf.len() {
            buf.resize(len, 0);
        } else {
            buf.truncate(len);
        }
        self.len = len;
    }

    /// Append bytes.
    ///
    /// Extends the buffer in place when it is exclusive and already large
    /// enough; otherwise moves to a new buffer sized for the result.
    pub fn append(&mut self, bytes: impl AsRef<[u8]>) {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return;
        }
        let new_len = self.len + bytes.len();
        let in_place = match &self.repr {
            Repr::Shared(buf) => buf.is_exclusive() && buf.capacity() >= new_len,
            Repr::Static(_) => false,
        };

        if in_place {
            let len = self.len;
            let buf = self.buffer_mut();
            buf.truncate(len);
            buf.extend_from_slice(bytes);
        } else {
            let mut fresh = Vec::with_capacity(new_len);
            fresh.extend_from_slice(self.as_bytes());
            fresh.extend_from_slice(bytes);
            self.repr = Repr::Shared(SharedBuffer::from_vec(fresh));
        }
        self.len = new_len;
    }
}

impl Default for DynString {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════

impl From<&str> for DynString {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl From<String> for DynString {
    fn from(s: String) -> Self {
        Self::from_vec(s.into_bytes())
    }
}

impl From<&[u8]> for DynString {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for DynString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl From<i64> for DynString {
    fn from(n: i64) -> Self {
        Self::from(n.to_string())
    }
}

impl From<f64> for DynString {
    fn from(d: f64) -> Self {
        Self::from(numeric::format_double(d))
    }
}

impl AsRef<[u8]> for DynString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AddAssign<&str> for DynString {
    fn add_assign(&mut self, rhs: &str) {
        self.append(rhs);
    }
}

impl AddAssign<&[u8]> for DynString {
    fn add_assign(&mut self, rhs: &[u8]) {
        self.append(rhs);
    }
}

impl AddAssign<&DynString> for DynString {
    fn add_assign(&mut self, rhs: &DynString) {
        self.append(rhs.as_bytes());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Comparison (byte-wise)
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for DynString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for DynString {}

impl PartialEq<str> for DynString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for DynString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for DynString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DynString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for DynString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl std::fmt::Display for DynString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl std::fmt::Debug for DynString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}
