//! Key/value diagnostic entries.

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

/// A key/value diagnostic entry attached to a [`TracedError`].
///
/// Entries are append-only and order-preserving: the order in which they
/// are attached is the order in which they serialize, including across
/// merges. Multiple entries may share a key; nothing is deduplicated.
///
/// Each entry serializes as its own single-key object, so a list of entries
/// becomes `[{"a": 1}, {"a": 2}, {"b": …}]`.
///
/// The [`kv!`] macro is shorthand for [`Entry::new`].
///
/// [`TracedError`]: crate::TracedError
/// [`kv!`]: crate::kv
#[derive(Clone, Debug)]
pub struct Entry {
    key: String,
    value: Value,
}

impl Entry {
    /// Creates an entry from a key and any serializable value.
    ///
    /// A value that cannot be represented as structured data (for example a
    /// map with non-string keys) degrades to `null`; attaching diagnostics
    /// never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use errtrace::Entry;
    ///
    /// let entry = Entry::new("port", 8080);
    /// assert_eq!(entry.key(), "port");
    /// assert_eq!(entry.value(), &serde_json::json!(8080));
    /// ```
    pub fn new(key: impl Into<String>, value: impl Serialize) -> Entry {
        Entry {
            key: key.into(),
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        }
    }

    /// Returns the entry key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the entry value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Serialize for Entry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}
