//! Composite keys for derived indexes.
//!
//! A composite key packs an object type (the index name) and an ordered list
//! of attributes into one state key:
//!
//! ```text
//! U+0000 <object type> U+0000 <attr 1> U+0000 ... <attr n> U+0000
//! ```
//!
//! `U+0000` is the smallest code point, so for a fixed object type the encoded
//! keys sort exactly like the attribute sequences themselves, and every key
//! sharing a partial attribute list is contiguous. That is what makes
//! partial-key (prefix) scans correct.
//!
//! ## Example
//!
//! ```rust
//! use picledger_state::{create_composite_key, split_composite_key};
//!
//! let key = create_composite_key("category~id", &["blue", "p1"]).unwrap();
//! let (index, parts) = split_composite_key(&key).unwrap();
//! assert_eq!(index, "category~id");
//! assert_eq!(parts, vec!["blue".to_string(), "p1".to_string()]);
//! ```

use crate::error::{StateError, StateResult};

/// Marker that opens every composite key.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';

/// Separator written after the object type and after every attribute.
pub const MIN_UNICODE_RUNE: char = '\u{0}';

/// Upper bound used to close a partial-key range.
pub const MAX_UNICODE_RUNE: char = char::MAX;

/// A decoded composite key.
///
/// Ordering is by object type, then lexicographically by attribute
/// sequence, which is the same order the encoded keys have in the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey {
    object_type: String,
    attributes: Vec<String>,
}

impl CompositeKey {
    /// Creates a composite key from an object type and its attributes.
    pub fn new<S: Into<String>>(object_type: impl Into<String>, attributes: Vec<S>) -> Self {
        Self {
            object_type: object_type.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the object type (index name).
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Returns the attributes in key order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Consumes the key, returning its attributes.
    pub fn into_attributes(self) -> Vec<String> {
        self.attributes
    }

    /// Encodes this key into its state-key form.
    pub fn encode(&self) -> StateResult<String> {
        create_composite_key(&self.object_type, &self.attributes)
    }

    /// Decodes a state key produced by [`CompositeKey::encode`].
    pub fn decode(key: &str) -> StateResult<Self> {
        let (object_type, attributes) = split_composite_key(key)?;
        Ok(Self {
            object_type,
            attributes,
        })
    }
}

/// Builds a composite key from an object type and attributes.
///
/// # Errors
///
/// Returns [`StateError::InvalidCompositeKey`] if the object type is empty or
/// if any component contains `U+0000` or `U+10FFFF`.
pub fn create_composite_key<S: AsRef<str>>(
    object_type: &str,
    attributes: &[S],
) -> StateResult<String> {
    if object_type.is_empty() {
        return Err(StateError::invalid_composite_key(
            "object type must be a non-empty string",
        ));
    }
    validate_component(object_type)?;

    let capacity = attributes
        .iter()
        .map(|a| a.as_ref().len() + 1)
        .sum::<usize>()
        + object_type.len()
        + 2;
    let mut key = String::with_capacity(capacity);
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(MIN_UNICODE_RUNE);

    for attribute in attributes {
        let attribute = attribute.as_ref();
        validate_component(attribute)?;
        key.push_str(attribute);
        key.push(MIN_UNICODE_RUNE);
    }

    Ok(key)
}

/// Splits a composite key into its object type and attributes.
///
/// # Errors
///
/// Returns [`StateError::InvalidCompositeKey`] if the key is not in the
/// composite namespace or is truncated.
pub fn split_composite_key(key: &str) -> StateResult<(String, Vec<String>)> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_NAMESPACE)
        .ok_or_else(|| StateError::invalid_composite_key("key is not a composite key"))?;
    let body = body
        .strip_suffix(MIN_UNICODE_RUNE)
        .ok_or_else(|| StateError::invalid_composite_key("composite key truncated"))?;

    let mut components = body.split(MIN_UNICODE_RUNE);
    let object_type = match components.next() {
        Some(object_type) if !object_type.is_empty() => object_type.to_string(),
        _ => {
            return Err(StateError::invalid_composite_key(
                "composite key has no object type",
            ))
        }
    };
    let attributes = components.map(str::to_string).collect();

    Ok((object_type, attributes))
}

/// Returns the half-open `[start, end)` key range covering every composite
/// key that begins with the given object type and partial attributes.
pub fn composite_key_range<S: AsRef<str>>(
    object_type: &str,
    partial: &[S],
) -> StateResult<(String, String)> {
    let start = create_composite_key(object_type, partial)?;
    let mut end = String::with_capacity(start.len() + MAX_UNICODE_RUNE.len_utf8());
    end.push_str(&start);
    end.push(MAX_UNICODE_RUNE);
    Ok((start, end))
}

/// Returns true if the key lives in the composite namespace.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_NAMESPACE)
}

fn validate_component(component: &str) -> StateResult<()> {
    if component.contains(MIN_UNICODE_RUNE) || component.contains(MAX_UNICODE_RUNE) {
        return Err(StateError::invalid_composite_key(format!(
            "component {component:?} contains a reserved code point (U+0000 or U+10FFFF)"
        )));
    }
    Ok(())
}
