//! DynValue constructors, predicates, extractors, coercions, From traits, PartialEq

use super::numeric::{self, Numeric};
use super::*;

impl DynValue {
    // ═══════════════════════════════════════════════════════════════════
    // Convenience Constructors
    // ═══════════════════════════════════════════════════════════════════

    /// Create a string value
    pub fn string(s: impl Into<DynString>) -> Self {
        DynValue::String(s.into())
    }

    /// Create a string value backed by static storage
    pub fn static_string(s: &'static str) -> Self {
        DynValue::String(DynString::from_static(s))
    }

    /// Create an empty array value
    pub fn empty_array() -> Self {
        DynValue::Array(DynArray::new())
    }

    /// Type tag of the active variant.
    pub fn data_type(&self) -> DataType {
        match self {
            DynValue::Null => DataType::Void,
            DynValue::Bool(_) => DataType::Bool,
            DynValue::Int(_) => DataType::Int,
            DynValue::Double(_) => DataType::Float,
            DynValue::String(_) => DataType::String,
            DynValue::Array(_) => DataType::Array,
            DynValue::Resource(_) => DataType::Resource,
            DynValue::Object(_) => DataType::Object,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DynValue::Null)
    }

    /// Check if value is boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, DynValue::Bool(_))
    }

    /// Check if value is an integer
    pub fn is_int(&self) -> bool {
        matches!(self, DynValue::Int(_))
    }

    /// Check if value is a double
    pub fn is_double(&self) -> bool {
        matches!(self, DynValue::Double(_))
    }

    /// Check if value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, DynValue::String(_))
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, DynValue::Array(_))
    }

    /// Check if value is a resource
    pub fn is_resource(&self) -> bool {
        matches!(self, DynValue::Resource(_))
    }

    /// Check if value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, DynValue::Object(_))
    }

    /// Null, bool, int, double, or string.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            DynValue::Null
                | DynValue::Bool(_)
                | DynValue::Int(_)
                | DynValue::Double(_)
                | DynValue::String(_)
        )
    }

    /// Integers and doubles; numeric-looking strings too when
    /// `allow_strings` is set.
    pub fn is_numeric(&self, allow_strings: bool) -> bool {
        match self {
            DynValue::Int(_) | DynValue::Double(_) => true,
            DynValue::String(s) => allow_strings && s.is_numeric(),
            _ => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (no coercion)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DynValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract double value
    pub fn as_double(&self) -> Option<f64> {
        match self {
            DynValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrow the string
    pub fn as_dyn_string(&self) -> Option<&DynString> {
        match self {
            DynValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the string as UTF-8 text
    pub fn as_str(&self) -> Option<&str> {
        self.as_dyn_string().and_then(DynString::as_str)
    }

    /// Borrow the array
    pub fn as_array(&self) -> Option<&DynArray> {
        match self {
            DynValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Mutably borrow the array; writes copy shared storage first
    pub fn as_array_mut(&mut self) -> Option<&mut DynArray> {
        match self {
            DynValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow the resource handle
    pub fn as_resource(&self) -> Option<&ResourceHandle> {
        match self {
            DynValue::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// Borrow the object handle
    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            DynValue::Object(o) => Some(o),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Coercions (total; never modify self)
    // ═══════════════════════════════════════════════════════════════════

    /// Truthiness.
    pub fn to_boolean(&self) -> bool {
        match self {
            DynValue::Null => false,
            DynValue::Bool(b) => *b,
            DynValue::Int(n) => *n != 0,
            DynValue::Double(d) => *d != 0.0,
            DynValue::String(s) => s.to_boolean(),
            DynValue::Array(a) => !a.is_empty(),
            DynValue::Resource(_) | DynValue::Object(_) => true,
        }
    }

    /// Integer value.
    ///
    /// Arrays have no natural numeric value; they convert to 1 when
    /// non-empty and 0 when empty.
    pub fn to_int64(&self) -> i64 {
        match self {
            DynValue::Null => 0,
            DynValue::Bool(b) => i64::from(*b),
            DynValue::Int(n) => *n,
            DynValue::Double(d) => numeric::double_to_int(*d),
            DynValue::String(s) => s.to_int64(),
            DynValue::Array(a) => i64::from(!a.is_empty()),
            DynValue::Resource(r) => r.id() as i64,
            DynValue::Object(_) => 1,
        }
    }

    /// Double value. Arrays follow the same emptiness rule as
    /// [`to_int64`](Self::to_int64).
    pub fn to_double(&self) -> f64 {
        match self {
            DynValue::Null => 0.0,
            DynValue::Bool(b) => f64::from(u8::from(*b)),
            DynValue::Int(n) => *n as f64,
            DynValue::Double(d) => *d,
            DynValue::String(s) => s.to_double(),
            DynValue::Array(a) => f64::from(u8::from(!a.is_empty())),
            DynValue::Resource(r) => r.id() as f64,
            DynValue::Object(_) => 1.0,
        }
    }

    /// String value.
    pub fn to_dyn_string(&self) -> DynString {
        match self {
            DynValue::Null | DynValue::Bool(false) => DynString::new(),
            DynValue::Bool(true) => DynString::from_static("1"),
            DynValue::Int(n) => DynString::from(*n),
            DynValue::Double(d) => DynString::from(*d),
            DynValue::String(s) => s.clone(),
            DynValue::Array(_) => DynString::from_static("Array"),
            DynValue::Resource(r) => DynString::from(format!("Resource id #{}", r.id())),
            DynValue::Object(_) => DynString::from_static("Object"),
        }
    }

    /// Array value. Null becomes an empty array, scalars and resources
    /// become a one-element list, objects expose their properties.
    pub fn to_array(&self) -> DynArray {
        match self {
            DynValue::Null => DynArray::new(),
            DynValue::Array(a) => a.clone(),
            DynValue::Object(o) => o.props(),
            other => std::iter::once(other.clone()).collect(),
        }
    }

    /// The resource handle, if this is one. Never fabricates a handle.
    pub fn to_resource(&self) -> Option<ResourceHandle> {
        self.as_resource().cloned()
    }

    /// The object handle, if this is one. Never fabricates a handle.
    pub fn to_object(&self) -> Option<ObjectHandle> {
        self.as_object().cloned()
    }

    /// A number for arithmetic-style comparison: ints stay ints, numeric
    /// strings become whatever they spell, everything else goes through
    /// `to_int64`.
    fn to_number(&self) -> Numeric {
        match self {
            DynValue::Double(d) => Numeric::Double(*d),
            DynValue::String(s) => match numeric::classify(s.as_bytes()) {
                Some(n) => n,
                None => Numeric::Double(s.to_double()),
            },
            other => Numeric::Int(other.to_int64()),
        }
    }

    /// Script-level `==`: compare after coercion.
    ///
    /// - Two strings compare numerically if both are numeric, byte-wise
    ///   otherwise.
    /// - Null or bool on either side compares by truthiness.
    /// - A number and a numeric string compare as numbers; a number and a
    ///   non-numeric string compare as strings.
    /// - Arrays compare entry by entry with `loose_eq`, ignoring order.
    /// - Handles compare by identity.
    pub fn loose_eq(&self, other: &DynValue) -> bool {
        use DynValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Null, String(s)) | (String(s), Null) => s.is_empty(),
            (Bool(_) | Null, _) | (_, Bool(_) | Null) => self.to_boolean() == other.to_boolean(),
            (String(a), String(b)) => {
                if a.is_numeric() && b.is_numeric() {
                    numbers_equal(self.to_number(), other.to_number())
                } else {
                    a == b
                }
            }
            (Int(_) | Double(_), String(s)) | (String(s), Int(_) | Double(_)) => {
                if s.is_numeric() {
                    numbers_equal(self.to_number(), other.to_number())
                } else {
                    self.to_dyn_string() == other.to_dyn_string()
                }
            }
            (Int(_) | Double(_), Int(_) | Double(_)) => {
                numbers_equal(self.to_number(), other.to_number())
            }
            (Array(a), Array(b)) => {
                a.count() == b.count()
                    && a.iter().all(|(k, v)| {
                        b.get_strict(k.clone())
                            .map(|w| v.loose_eq(&w))
                            .unwrap_or(false)
                    })
            }
            (Resource(a), Resource(b)) => a.ptr_eq(b),
            (Object(a), Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

fn numbers_equal(a: Numeric, b: Numeric) -> bool {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => x == y,
        (Numeric::Int(x), Numeric::Double(y)) | (Numeric::Double(y), Numeric::Int(x)) => {
            x as f64 == y
        }
        (Numeric::Double(x), Numeric::Double(y)) => x == y,
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation (strict)
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for DynValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DynValue::Null, DynValue::Null) => true,
            (DynValue::Bool(a), DynValue::Bool(b)) => a == b,
            (DynValue::Int(a), DynValue::Int(b)) => a == b,
            (DynValue::Double(a), DynValue::Double(b)) => a == b,
            (DynValue::String(a), DynValue::String(b)) => a == b,
            (DynValue::Array(a), DynValue::Array(b)) => a == b,

            // Handles are equal only if they are the same handle
            (DynValue::Resource(a), DynValue::Resource(b)) => a.ptr_eq(b),
            (DynValue::Object(a), DynValue::Object(b)) => a.ptr_eq(b),

            // Different types are never equal
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<()> for DynValue {
    fn from(_: ()) -> Self {
        DynValue::Null
    }
}

impl From<bool> for DynValue {
    fn from(b: bool) -> Self {
        DynValue::Bool(b)
    }
}

impl From<i64> for DynValue {
    fn from(n: i64) -> Self {
        DynValue::Int(n)
    }
}

impl From<f64> for DynValue {
    fn from(d: f64) -> Self {
        DynValue::Double(d)
    }
}

impl From<&str> for DynValue {
    fn from(s: &str) -> Self {
        DynValue::String(DynString::from(s))
    }
}

impl From<String> for DynValue {
    fn from(s: String) -> Self {
        DynValue::String(DynString::from(s))
    }
}

impl From<DynString> for DynValue {
    fn from(s: DynString) -> Self {
        DynValue::String(s)
    }
}

impl From<DynArray> for DynValue {
    fn from(a: DynArray) -> Self {
        DynValue::Array(a)
    }
}

impl From<ResourceHandle> for DynValue {
    fn from(r: ResourceHandle) -> Self {
        DynValue::Resource(r)
    }
}

impl From<ObjectHandle> for DynValue {
    fn from(o: ObjectHandle) -> Self {
        DynValue::Object(o)
    }
}

impl From<&ArrayKey> for DynValue {
    fn from(key: &ArrayKey) -> Self {
        match key {
            ArrayKey::Int(n) => DynValue::Int(*n),
            ArrayKey::Str(s) => DynValue::String(s.clone()),
        }
    }
}

impl<T: Into<DynValue>> From<Option<T>> for DynValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(DynValue::Null, Into::into)
    }
}
