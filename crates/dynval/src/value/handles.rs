//! Opaque resource handles and object handles
//!
//! Both have reference semantics: cloning copies the handle, never the
//! thing it points at, and equality is identity.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ArrayKey, DynArray, DynString, DynValue};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

struct ResourceData {
    id: u64,
    kind: String,
    payload: RefCell<Box<dyn Any>>,
}

/// A handle to native state the script can hold but not inspect
/// (a file, a socket, a parser instance).
#[derive(Clone)]
pub struct ResourceHandle {
    inner: Rc<ResourceData>,
}

impl ResourceHandle {
    /// Wrap `payload` in a new resource of the given kind.
    pub fn new<T: Any>(kind: impl Into<String>, payload: T) -> Self {
        Self {
            inner: Rc::new(ResourceData {
                id: NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed),
                kind: kind.into(),
                payload: RefCell::new(Box::new(payload)),
            }),
        }
    }

    /// Process-unique resource number.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Resource kind, e.g. `"stream"`.
    pub fn kind(&self) -> &str {
        &self.inner.kind
    }

    /// Read the payload if it has type `T`.
    pub fn with_payload<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let payload = self.inner.payload.borrow();
        (**payload).downcast_ref::<T>().map(f)
    }

    /// Mutate the payload if it has type `T`.
    pub fn with_payload_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut payload = self.inner.payload.borrow_mut();
        (**payload).downcast_mut::<T>().map(f)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource({}) of type ({})", self.id(), self.kind())
    }
}

struct ObjectData {
    id: u64,
    class: DynString,
    props: RefCell<DynArray>,
}

/// A handle to a script object: a class name plus an ordered property
/// table.
///
/// Properties are shared by every clone of the handle.
#[derive(Clone)]
pub struct ObjectHandle {
    inner: Rc<ObjectData>,
}

impl ObjectHandle {
    /// Create an object of `class` with no properties.
    pub fn new(class: impl Into<DynString>) -> Self {
        Self {
            inner: Rc::new(ObjectData {
                id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
                class: class.into(),
                props: RefCell::new(DynArray::new()),
            }),
        }
    }

    /// Add a property (builder pattern)
    pub fn with_prop(self, name: &str, value: impl Into<DynValue>) -> Self {
        self.set_prop(name, value);
        self
    }

    /// Process-unique object number.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The object's class name.
    pub fn class_name(&self) -> &DynString {
        &self.inner.class
    }

    /// Property value, or `Null` if unset.
    pub fn get_prop(&self, name: &str) -> DynValue {
        self.inner.props.borrow().get(name)
    }

    /// Set a property; visible through every clone of the handle.
    pub fn set_prop(&self, name: &str, value: impl Into<DynValue>) {
        self.inner
            .props
            .borrow_mut()
            .set(ArrayKey::from(name), value.into());
    }

    /// Snapshot of the property table. Shares storage until either side
    /// writes.
    pub fn props(&self) -> DynArray {
        self.inner.props.borrow().clone()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object({})#{} ", self.class_name(), self.id())?;
        match self.inner.props.try_borrow() {
            Ok(props) => write!(f, "{:?}", *props),
            Err(_) => write!(f, "{{...}}"),
        }
    }
}
