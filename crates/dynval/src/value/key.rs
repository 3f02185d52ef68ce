//! Array keys: integers or byte strings

use std::fmt;

use super::DynString;

/// A [`DynArray`](super::DynArray) key.
///
/// Integer and string keys never collide: `Int(5)` and `Str("5")` are
/// different keys. Callers that want script-style normalization of
/// numeric strings do it before building the key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayKey {
    /// Integer key, the vector side of an array
    Int(i64),
    /// String key, the map side of an array
    Str(DynString),
}

impl ArrayKey {
    /// The integer, for integer keys.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArrayKey::Int(n) => Some(*n),
            ArrayKey::Str(_) => None,
        }
    }

    /// The string, for string keys.
    pub fn as_dyn_string(&self) -> Option<&DynString> {
        match self {
            ArrayKey::Int(_) => None,
            ArrayKey::Str(s) => Some(s),
        }
    }

    /// Check if this is an integer key
    pub fn is_int(&self) -> bool {
        matches!(self, ArrayKey::Int(_))
    }
}

impl From<i64> for ArrayKey {
    fn from(n: i64) -> Self {
        ArrayKey::Int(n)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey::Str(DynString::from(s))
    }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self {
        ArrayKey::Str(DynString::from(s))
    }
}

impl From<DynString> for ArrayKey {
    fn from(s: DynString) -> Self {
        ArrayKey::Str(s)
    }
}

impl From<&DynString> for ArrayKey {
    fn from(s: &DynString) -> Self {
        ArrayKey::Str(s.clone())
    }
}

impl From<&ArrayKey> for ArrayKey {
    fn from(key: &ArrayKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(n) => write!(f, "{}", n),
            ArrayKey::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Debug for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_int_and_string_keys_are_distinct() {
        let mut keys = HashSet::new();
        keys.insert(ArrayKey::from(5i64));
        keys.insert(ArrayKey::from("5"));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ArrayKey::from(7i64).as_int(), Some(7));
        assert!(ArrayKey::from(7i64).is_int());
        assert_eq!(ArrayKey::from("k").as_int(), None);
        assert_eq!(
            ArrayKey::from("k").as_dyn_string().map(|s| s.to_string()),
            Some("k".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ArrayKey::Int(-1).to_string(), "-1");
        assert_eq!(ArrayKey::from("name").to_string(), "\"name\"");
    }
}
