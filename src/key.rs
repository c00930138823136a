//! Cache key derivation.
//!
//! A [`CacheKey`] is the SHA-256 digest of a canonical encoding of an
//! [`InputBundle`], written as `sha256:<hex>`.
//!
//! # Canonical form
//!
//! The bundle is encoded as JSON with object keys sorted (the bundle itself is
//! `BTreeMap`-backed, and `serde_json::Map` keeps keys sorted). Every value is
//! type-tagged so that different kinds never share an encoding:
//!
//! | value            | encoding             |
//! |------------------|----------------------|
//! | `Null`           | `null`               |
//! | `Bool(b)`        | `true` / `false`     |
//! | `Str(s)`         | `"s"`                |
//! | `Int(i)`         | `{"i": i}`           |
//! | `Float(f)`       | `{"f": f}`           |
//! | `List(items)`    | `[...]`              |
//! | `Map(bundle)`    | `{"m": {...}}`       |
//!
//! So `1`, `1.0` and `"1"` yield three different keys, and insertion order
//! never matters. `-0.0` is written as `0.0`, matching bundle equality. The
//! empty bundle has a fixed key.
//!
//! # Unkeyable values
//!
//! [`BundleValue::Opaque`] values (identity only) and non-finite floats have no
//! canonical encoding. They are rejected with [`CellError::UnkeyableInput`]
//! naming where in the bundle the value sits; they are never silently skipped.
//!
//! # Stability
//!
//! The encoding does not depend on the process, platform or call order, so keys
//! are comparable across runs.

use std::fmt;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::bundle::{BundleValue, InputBundle};
use crate::core::CellError;

/// Canonical, comparable key derived from an [`InputBundle`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest without the `sha256:` prefix.
    pub fn digest(&self) -> &str {
        self.0.strip_prefix("sha256:").unwrap_or(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives [`CacheKey`]s from bundles.
///
/// A namespaced deriver mixes a name (typically the component's) into every
/// key, so several components can share one cache without colliding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDeriver {
    namespace: Option<String>,
}

impl KeyDeriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn namespaced(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Derive the key for `bundle`.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::UnkeyableInput`] if the bundle (at any depth)
    /// contains an opaque value or a NaN/infinite float.
    pub fn derive_key(&self, bundle: &InputBundle) -> Result<CacheKey, CellError> {
        let canonical = canonical_bundle(bundle, "")?;
        let encoded = serde_json::to_string(&canonical).map_err(|e| CellError::UnkeyableInput {
            path: "<bundle>".to_string(),
            reason: e.to_string(),
        })?;

        let mut hasher = Sha256::new();
        if let Some(namespace) = &self.namespace {
            hasher.update(b"namespace:");
            hasher.update(namespace.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(encoded.as_bytes());

        let key = CacheKey(format!("sha256:{}", hex::encode(hasher.finalize())));
        tracing::trace!("Derived cache key {} from {} input(s)", key, bundle.len());
        Ok(key)
    }
}

fn canonical_bundle(bundle: &InputBundle, path: &str) -> Result<Value, CellError> {
    let mut map = Map::new();
    for (key, value) in bundle.iter() {
        let child_path = if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}.{key}")
        };
        map.insert(key.to_string(), canonical_value(value, &child_path)?);
    }
    Ok(Value::Object(map))
}

fn canonical_value(value: &BundleValue, path: &str) -> Result<Value, CellError> {
    let tagged = |tag: &str, inner: Value| {
        let mut map = Map::new();
        map.insert(tag.to_string(), inner);
        Value::Object(map)
    };

    Ok(match value {
        BundleValue::Null => Value::Null,
        BundleValue::Bool(b) => Value::Bool(*b),
        BundleValue::Str(s) => Value::String(s.clone()),
        BundleValue::Int(i) => tagged("i", Value::from(*i)),
        BundleValue::Float(f) => {
            // -0.0 == 0.0 for bundle equality, so both must encode the same.
            let f = if *f == 0.0 { 0.0 } else { *f };
            let number =
                serde_json::Number::from_f64(f).ok_or_else(|| CellError::UnkeyableInput {
                    path: path.to_string(),
                    reason: format!("float {f} has no canonical form"),
                })?;
            tagged("f", Value::Number(number))
        }
        BundleValue::List(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| canonical_value(item, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        BundleValue::Map(bundle) => tagged("m", canonical_bundle(bundle, path)?),
        BundleValue::Opaque(opaque) => {
            return Err(CellError::UnkeyableInput {
                path: path.to_string(),
                reason: format!("'{}' is compared by identity only", opaque.label()),
            });
        }
    })
}
