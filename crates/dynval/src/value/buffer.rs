//! Reference-counted byte storage backing [`DynString`](super::DynString)

use std::rc::Rc;

/// A reference-counted, growable byte buffer.
///
/// Every handle to the same storage counts as one holder. Storage is only
/// written in place while exactly one holder exists; [`make_mut`] clones
/// it otherwise.
///
/// The count is not atomic. A buffer belongs to one execution context and
/// is never touched from another thread.
///
/// [`make_mut`]: SharedBuffer::make_mut
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Rc<Vec<u8>>,
}

impl SharedBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `bytes` as a fresh, exclusive buffer.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Rc::new(bytes),
        }
    }

    /// Allocate an empty buffer with room for at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    /// Share this buffer: one more holder.
    pub fn acquire(&self) -> Self {
        Self {
            bytes: Rc::clone(&self.bytes),
        }
    }

    /// Drop this holder; storage goes away with the last one.
    pub fn release(self) {
        drop(self);
    }

    /// Number of holders sharing the storage.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.bytes)
    }

    /// True when this handle is the only holder.
    pub fn is_exclusive(&self) -> bool {
        self.ref_count() == 1
    }

    /// Whether two handles share storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Bytes currently stored.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if no bytes are stored.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A new exclusive buffer holding the current bytes, sized for at
    /// least `capacity`.
    pub fn reserve(&self, capacity: usize) -> Self {
        let mut bytes = Vec::with_capacity(capacity.max(self.len()));
        bytes.extend_from_slice(&self.bytes);
        Self::from_vec(bytes)
    }

    /// Writable access to the storage, cloning it first if shared.
    ///
    /// A clone keeps the original capacity, so a reserved buffer stays
    /// reserved after the copy.
    pub fn make_mut(&mut self) -> &mut Vec<u8> {
        if !self.is_exclusive() {
            tracing::trace!(
                len = self.len(),
                capacity = self.capacity(),
                holders = self.ref_count(),
                "copy-on-write: cloning shared buffer"
            );
            *self = self.reserve(self.capacity());
        }
        Rc::make_mut(&mut self.bytes)
    }

    /// Unwrap into the bytes, copying only if other holders remain.
    pub fn into_vec(self) -> Vec<u8> {
        Rc::try_unwrap(self.bytes).unwrap_or_else(|shared| shared.as_ref().clone())
    }
}

impl std::fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("holders", &self.ref_count())
            .finish()
    }
}
