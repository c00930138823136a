//! Input bundles passed to render invocations.
//!
//! An [`InputBundle`] is an immutable mapping from string keys to
//! [`BundleValue`]s. Entries are kept in a `BTreeMap`, so two bundles holding
//! the same key/value pairs compare equal no matter in which order the pairs
//! were inserted. This is the equivalence the memoization layer relies on.
//!
//! # Construction
//!
//! ```rust
//! use rendercell::{InputBundle, bundle};
//!
//! let a = bundle! { "name" => "Macron", "title" => "President" };
//! let b = InputBundle::builder()
//!     .insert("title", "President")
//!     .insert("name", "Macron")
//!     .build();
//!
//! assert_eq!(a, b);
//! ```
//!
//! Bundles are never mutated in place: [`InputBundle::with`] and
//! [`InputBundle::merged_over`] return new bundles.
//!
//! # Opaque values
//!
//! Values with reference identity only (component handles, producers, open
//! resources) are carried as [`BundleValue::Opaque`]. They are usable on the
//! direct render path but cannot be turned into a cache key; see
//! [`crate::key::KeyDeriver`].

mod accessor;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::CellError;

/// A single value stored in an [`InputBundle`].
#[derive(Debug, Clone, PartialEq)]
pub enum BundleValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<BundleValue>),
    /// A nested bundle.
    Map(InputBundle),
    /// A value compared by identity only.
    Opaque(OpaqueValue),
}

impl BundleValue {
    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            BundleValue::Null => "null",
            BundleValue::Bool(_) => "a boolean",
            BundleValue::Int(_) => "an integer",
            BundleValue::Float(_) => "a float",
            BundleValue::Str(_) => "a string",
            BundleValue::List(_) => "a list",
            BundleValue::Map(_) => "a nested bundle",
            BundleValue::Opaque(_) => "an opaque value",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BundleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BundleValue::Null)
    }

    /// Convert to JSON for template contexts.
    ///
    /// Opaque values become their label string and non-finite floats become
    /// `null`; neither conversion is used for cache keys.
    pub fn to_json(&self) -> Value {
        match self {
            BundleValue::Null => Value::Null,
            BundleValue::Bool(b) => Value::Bool(*b),
            BundleValue::Int(i) => Value::from(*i),
            BundleValue::Float(f) => {
                serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
            }
            BundleValue::Str(s) => Value::String(s.clone()),
            BundleValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            BundleValue::Map(bundle) => bundle.to_json(),
            BundleValue::Opaque(opaque) => Value::String(format!("<{}>", opaque.label())),
        }
    }
}

impl From<&str> for BundleValue {
    fn from(value: &str) -> Self {
        BundleValue::Str(value.to_string())
    }
}

impl From<String> for BundleValue {
    fn from(value: String) -> Self {
        BundleValue::Str(value)
    }
}

impl From<&String> for BundleValue {
    fn from(value: &String) -> Self {
        BundleValue::Str(value.clone())
    }
}

impl From<bool> for BundleValue {
    fn from(value: bool) -> Self {
        BundleValue::Bool(value)
    }
}

impl From<i64> for BundleValue {
    fn from(value: i64) -> Self {
        BundleValue::Int(value)
    }
}

impl From<i32> for BundleValue {
    fn from(value: i32) -> Self {
        BundleValue::Int(i64::from(value))
    }
}

impl From<u32> for BundleValue {
    fn from(value: u32) -> Self {
        BundleValue::Int(i64::from(value))
    }
}

impl From<f64> for BundleValue {
    fn from(value: f64) -> Self {
        BundleValue::Float(value)
    }
}

impl From<InputBundle> for BundleValue {
    fn from(value: InputBundle) -> Self {
        BundleValue::Map(value)
    }
}

impl From<OpaqueValue> for BundleValue {
    fn from(value: OpaqueValue) -> Self {
        BundleValue::Opaque(value)
    }
}

impl<T: Into<BundleValue>> From<Vec<T>> for BundleValue {
    fn from(values: Vec<T>) -> Self {
        BundleValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<BundleValue>> From<Option<T>> for BundleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(BundleValue::Null, Into::into)
    }
}

impl TryFrom<Value> for BundleValue {
    type Error = CellError;

    /// Integers outside the `i64` range are rejected rather than rounded.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => BundleValue::Null,
            Value::Bool(b) => BundleValue::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => BundleValue::Int(i),
                (None, Some(f)) if n.is_f64() => BundleValue::Float(f),
                _ => {
                    return Err(CellError::InvalidBundle {
                        reason: format!("integer {n} is outside the 64-bit signed range"),
                    });
                }
            },
            Value::String(s) => BundleValue::Str(s),
            Value::Array(items) => BundleValue::List(
                items.into_iter().map(BundleValue::try_from).collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => BundleValue::Map(
                map.into_iter()
                    .map(|(k, v)| Ok::<_, CellError>((k, BundleValue::try_from(v)?)))
                    .collect::<Result<InputBundle, _>>()?,
            ),
        })
    }
}

/// A value with reference identity only.
///
/// Two opaque values are equal when they point at the same allocation.
#[derive(Clone)]
pub struct OpaqueValue {
    label: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(value),
        }
    }

    pub fn from_arc(label: impl Into<String>, inner: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            label: label.into(),
            inner,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueValue").field(&self.label).finish()
    }
}

/// Immutable keyed input to a render operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputBundle {
    entries: BTreeMap<String, BundleValue>,
}

impl InputBundle {
    /// The empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> InputBundleBuilder {
        InputBundleBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in canonical (sorted) order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in canonical (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BundleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a copy of this bundle with `key` set to `value`.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<BundleValue>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    /// Return a bundle holding `defaults` overlaid with this bundle's entries.
    ///
    /// Entries from `self` win over entries from `defaults`.
    #[must_use]
    pub fn merged_over(&self, defaults: &InputBundle) -> Self {
        let mut entries = defaults.entries.clone();
        entries.extend(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { entries }
    }

    /// Convert to a JSON object (keys sorted).
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

impl<K, V> FromIterator<(K, V)> for InputBundle
where
    K: Into<String>,
    V: Into<BundleValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl TryFrom<Value> for InputBundle {
    type Error = CellError;

    /// Only JSON objects convert into bundles.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match BundleValue::try_from(value)? {
            BundleValue::Map(bundle) => Ok(bundle),
            other => Err(CellError::InvalidBundle {
                reason: format!("expected a JSON object, found {}", other.kind()),
            }),
        }
    }
}

/// Builder for [`InputBundle`].
#[derive(Debug, Default)]
pub struct InputBundleBuilder {
    entries: BTreeMap<String, BundleValue>,
}

impl InputBundleBuilder {
    /// Insert an entry; a later insert of the same key replaces the earlier one.
    #[must_use]
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<BundleValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> InputBundle {
        InputBundle {
            entries: self.entries,
        }
    }
}

/// Build an [`InputBundle`] from `key => value` pairs.
///
/// ```rust
/// use rendercell::bundle;
///
/// let empty = bundle! {};
/// let greeting = bundle! { "name" => "Merkel", "title" => "Chancellor" };
/// assert!(empty.is_empty());
/// assert_eq!(greeting.len(), 2);
/// ```
#[macro_export]
macro_rules! bundle {
    () => {
        $crate::InputBundle::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::InputBundle::builder()$(.insert($key, $value))+.build()
    };
}
