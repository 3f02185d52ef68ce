//! Ordered, copy-on-write hybrid arrays

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{ArrayKey, DynValue, ValueRef};
use crate::error::ValueError;

/// One array entry: a plain value or an alias of some other storage.
#[derive(Clone)]
enum Slot {
    Value(DynValue),
    Ref(ValueRef),
}

impl Slot {
    fn value(&self) -> DynValue {
        match self {
            Slot::Value(v) => v.clone(),
            Slot::Ref(r) => r.get(),
        }
    }

    fn into_value(self) -> DynValue {
        match self {
            Slot::Value(v) => v,
            Slot::Ref(r) => r.get(),
        }
    }
}

#[derive(Clone, Default)]
struct ArrayData {
    /// Entries in insertion order.
    entries: IndexMap<ArrayKey, Slot>,

    /// Largest integer key present, if any.
    max_int: Option<i64>,
}

impl ArrayData {
    fn note_int_key(&mut self, n: i64) {
        if self.max_int.map_or(true, |max| n > max) {
            self.max_int = Some(n);
        }
    }

    fn forget_int_key(&mut self, n: i64) {
        if self.max_int != Some(n) {
            return;
        }
        // Dense vectors: the next key down is the new maximum.
        if let Some(below) = n.checked_sub(1) {
            if self.entries.contains_key(&ArrayKey::Int(below)) {
                self.max_int = Some(below);
                return;
            }
        }
        self.recompute_max_int();
    }

    fn recompute_max_int(&mut self) {
        self.max_int = self.entries.keys().filter_map(ArrayKey::as_int).max();
    }

    fn next_int_key(&self) -> i64 {
        match self.max_int {
            Some(max) => max
                .checked_add(1)
                .unwrap_or_else(|| panic!("next array key would overflow i64")),
            None => 0,
        }
    }

    /// Add `delta` to every integer key at or above `from`, keeping entry
    /// order.
    fn shift_int_keys(&mut self, from: i64, delta: i64) {
        tracing::trace!(entries = self.entries.len(), from, delta, "renumbering integer keys");
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(key, slot)| match key {
                ArrayKey::Int(n) if n >= from => {
                    let shifted = n
                        .checked_add(delta)
                        .unwrap_or_else(|| panic!("array key {} cannot be shifted by {}", n, delta));
                    (ArrayKey::Int(shifted), slot)
                }
                other => (other, slot),
            })
            .collect();
        self.recompute_max_int();
    }
}

/// An ordered map from integer or string keys to values.
///
/// The same array serves as a vector ([`append`](Self::append),
/// [`pop`](Self::pop), [`prepend`](Self::prepend),
/// [`dequeue`](Self::dequeue)), a map ([`set`](Self::set),
/// [`get`](Self::get), [`remove`](Self::remove)), or a set
/// ([`contains`](Self::contains)); how it is used decides which.
///
/// Iteration always follows insertion order.
///
/// # Sharing
///
/// `clone()` is O(1) and shares storage. The first mutation through a
/// handle whose storage is shared copies it, so clones behave as
/// independent values. Alias slots ([`set_ref`](Self::set_ref)) are the
/// exception: a copied array still aliases the same cells.
///
/// ```
/// use dynval::{DynArray, DynValue};
///
/// let mut a = DynArray::new();
/// a.append("x");
/// let mut b = a.clone();
/// b.set("k", 1i64);
/// assert!(!a.exists("k"));
/// assert_eq!(b.get("k"), DynValue::Int(1));
/// ```
#[derive(Clone, Default)]
pub struct DynArray {
    data: Rc<ArrayData>,
}

impl DynArray {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty array with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Rc::new(ArrayData {
                entries: IndexMap::with_capacity(capacity),
                max_int: None,
            }),
        }
    }

    /// Private storage for a mutation, copied first if shared.
    fn data_mut(&mut self) -> &mut ArrayData {
        if Rc::strong_count(&self.data) > 1 {
            tracing::trace!(
                entries = self.data.entries.len(),
                holders = Rc::strong_count(&self.data),
                "copy-on-write: cloning shared array"
            );
        }
        Rc::make_mut(&mut self.data)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.data.entries.len()
    }

    /// True if the array has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// Handles sharing this array's storage.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.data)
    }

    /// Whether two handles share storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Whether `key` is present (even if its value is null).
    pub fn exists(&self, key: impl Into<ArrayKey>) -> bool {
        self.data.entries.contains_key(&key.into())
    }

    /// Value at `key`, or `Null` if absent.
    pub fn get(&self, key: impl Into<ArrayKey>) -> DynValue {
        self.data
            .entries
            .get(&key.into())
            .map(Slot::value)
            .unwrap_or_default()
    }

    /// Value at `key`.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` if the key is absent, so a stored null can be
    /// told apart from a missing entry.
    pub fn get_strict(&self, key: impl Into<ArrayKey>) -> Result<DynValue, ValueError> {
        let key = key.into();
        match self.data.entries.get(&key) {
            Some(slot) => Ok(slot.value()),
            None => Err(ValueError::MissingKey {
                key: key.to_string(),
            }),
        }
    }

    /// Whether the slot at `key` is an alias.
    pub fn is_ref(&self, key: impl Into<ArrayKey>) -> bool {
        matches!(self.data.entries.get(&key.into()), Some(Slot::Ref(_)))
    }

    /// Set-style membership: any entry strictly equal to `value`.
    pub fn contains(&self, value: &DynValue) -> bool {
        self.data.entries.values().any(|slot| slot.value() == *value)
    }

    /// Entries in insertion order, aliases resolved to their current value.
    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, DynValue)> + '_ {
        self.data.entries.iter().map(|(k, slot)| (k, slot.value()))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> + '_ {
        self.data.entries.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = DynValue> + '_ {
        self.data.entries.values().map(Slot::value)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Map Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Insert or overwrite `key`.
    ///
    /// If `key` is bound to an alias, the write goes through the alias
    /// and the binding stays in place.
    pub fn set(&mut self, key: impl Into<ArrayKey>, value: impl Into<DynValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(Slot::Ref(r)) = self.data.entries.get(&key) {
            r.set(value);
            return;
        }
        let data = self.data_mut();
        if let ArrayKey::Int(n) = key {
            data.note_int_key(n);
        }
        data.entries.insert(key, Slot::Value(value));
    }

    /// Delete `key` and return its value. Integer keys are not
    /// renumbered, so the array may be left with a gap.
    pub fn remove(&mut self, key: impl Into<ArrayKey>) -> Option<DynValue> {
        let key = key.into();
        if !self.data.entries.contains_key(&key) {
            return None;
        }
        let data = self.data_mut();
        let slot = data.entries.shift_remove(&key)?;
        if let ArrayKey::Int(n) = key {
            data.forget_int_key(n);
        }
        Some(slot.into_value())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Vector Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Push `value` under the next integer key: one past the largest
    /// integer key present, or 0 if there is none. Returns that key.
    ///
    /// # Panics
    ///
    /// Panics if the largest integer key is `i64::MAX`.
    pub fn append(&mut self, value: impl Into<DynValue>) -> i64 {
        self.append_slot(Slot::Value(value.into()))
    }

    fn append_slot(&mut self, slot: Slot) -> i64 {
        let data = self.data_mut();
        let key = data.next_int_key();
        data.note_int_key(key);
        data.entries.insert(ArrayKey::Int(key), slot);
        key
    }

    /// Insert `value` first under key 0, shifting every non-negative
    /// integer key up by one. String keys and negative keys are left as
    /// they are. O(n).
    ///
    /// # Panics
    ///
    /// Panics if the array holds the key `i64::MAX`. The array is left
    /// unchanged.
    pub fn prepend(&mut self, value: impl Into<DynValue>) {
        if self.data.max_int == Some(i64::MAX) {
            panic!("prepend would shift array key {} past i64::MAX", i64::MAX);
        }
        let data = self.data_mut();
        if data.max_int.is_some_and(|max| max >= 0) {
            data.shift_int_keys(0, 1);
        }
        let rest = std::mem::take(&mut data.entries);
        data.entries = IndexMap::with_capacity(rest.len() + 1);
        data.entries.insert(ArrayKey::Int(0), Slot::Value(value.into()));
        data.entries.extend(rest);
        data.note_int_key(0);
    }

    /// Remove and return the last entry.
    pub fn pop(&mut self) -> Option<DynValue> {
        if self.is_empty() {
            return None;
        }
        let data = self.data_mut();
        let (key, slot) = data.entries.pop()?;
        if let ArrayKey::Int(n) = key {
            data.forget_int_key(n);
        }
        Some(slot.into_value())
    }

    /// Remove and return the first entry.
    ///
    /// If that entry had integer key `k`, every integer key above `k` is
    /// shifted down by one to close the gap, undoing a
    /// [`prepend`](Self::prepend).
    pub fn dequeue(&mut self) -> Option<DynValue> {
        if self.is_empty() {
            return None;
        }
        let data = self.data_mut();
        let (key, slot) = data.entries.shift_remove_index(0)?;
        if let ArrayKey::Int(removed) = key {
            if data.max_int.is_some_and(|max| max > removed) {
                data.shift_int_keys(removed + 1, -1);
            } else {
                data.forget_int_key(removed);
            }
        }
        Some(slot.into_value())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Aliasing
    // ═══════════════════════════════════════════════════════════════════

    /// Bind `key` to the cell behind `target`. Later writes through either
    /// side are visible through the other.
    pub fn set_ref(&mut self, key: impl Into<ArrayKey>, target: &ValueRef) {
        let key = key.into();
        let data = self.data_mut();
        if let ArrayKey::Int(n) = key {
            data.note_int_key(n);
        }
        data.entries.insert(key, Slot::Ref(target.clone()));
    }

    /// Push an alias of `target` under the next integer key.
    pub fn append_ref(&mut self, target: &ValueRef) -> i64 {
        self.append_slot(Slot::Ref(target.clone()))
    }

    /// Turn the slot at `key` into an alias and return its cell, creating
    /// a null entry if `key` is absent.
    pub fn bind_ref(&mut self, key: impl Into<ArrayKey>) -> ValueRef {
        let key = key.into();
        if let Some(Slot::Ref(r)) = self.data.entries.get(&key) {
            return r.clone();
        }
        let data = self.data_mut();
        if let ArrayKey::Int(n) = key {
            data.note_int_key(n);
        }
        let current = match data.entries.get(&key) {
            Some(slot) => slot.value(),
            None => DynValue::Null,
        };
        let cell = ValueRef::new(current);
        data.entries.insert(key, Slot::Ref(cell.clone()));
        cell
    }

    /// Detach an alias slot, keeping its current value as a plain copy.
    /// Returns false if `key` was not an alias.
    pub fn unbind(&mut self, key: impl Into<ArrayKey>) -> bool {
        let key = key.into();
        if !self.is_ref(&key) {
            return false;
        }
        let data = self.data_mut();
        if let Some(slot) = data.entries.get_mut(&key) {
            *slot = Slot::Value(slot.value());
        }
        true
    }
}

// ═══════════════════════════════════════════════════════════════════
// Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for DynArray {
    /// Same keys mapped to strictly equal values, in the same order.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.count() == other.count()
            && self
                .iter()
                .zip(other.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

impl FromIterator<DynValue> for DynArray {
    fn from_iter<I: IntoIterator<Item = DynValue>>(iter: I) -> Self {
        let mut array = DynArray::new();
        for value in iter {
            array.append(value);
        }
        array
    }
}

impl<K: Into<ArrayKey>, V: Into<DynValue>> FromIterator<(K, V)> for DynArray {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut array = DynArray::new();
        for (key, value) in iter {
            array.set(key, value);
        }
        array
    }
}

impl fmt::Debug for DynArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array({}) {{", self.count())?;
        for (i, (key, slot)) in self.data.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match slot {
                Slot::Value(v) => write!(f, " {} => {:?}", key, v)?,
                Slot::Ref(r) => write!(f, " {} => {:?}", key, r)?,
            }
        }
        if !self.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "}}")
    }
}
