//! Path-addressed document store abstraction.
//!
//! The repositories talk to the hosted database exclusively through
//! [`DocumentStore`]. Every method maps to one request against the backend;
//! there is no caching, batching or retrying at this layer. The only
//! exception is an equality query on a database without an index for the
//! queried field, which falls back to reading the whole collection.

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::types::is_valid_key;

pub mod firebase;
pub mod memory;
pub mod push_id;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

/// Errors surfaced by document store backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend rejected the credentials or rules denied access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Any other non-success response.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// A response body or stored node could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// A path segment is not a valid store key.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

/// Convenient alias for results returned from store backends.
pub type StoreResult<T> = Result<T, StoreError>;

/// Slash-delimited location of a node, e.g. `listings/-Nx3...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Path of a top-level collection.
    pub fn collection(name: &str) -> StoreResult<Self> {
        Self::root().child(name)
    }

    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a slash-delimited path; leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> StoreResult<Self> {
        path.trim_matches('/')
            .split('/')
            .try_fold(Self::root(), |acc, segment| acc.child(segment))
    }

    /// Append one segment.
    pub fn child(mut self, segment: &str) -> StoreResult<Self> {
        if !is_valid_key(segment) {
            return Err(StoreError::InvalidPath(format!("{self}/{segment}")));
        }
        self.segments.push(segment.to_string());
        Ok(self)
    }

    /// Individual segments from the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Display for StorePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Backend of the hosted real-time document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short tag used in log lines.
    fn backend_tag(&self) -> &'static str;

    /// Read the node at `path`; `None` when nothing is stored there.
    async fn get(&self, path: &StorePath) -> StoreResult<Option<Value>>;

    /// Read every child of the collection at `path`, ordered by key.
    async fn children(&self, path: &StorePath) -> StoreResult<Vec<(String, Value)>>;

    /// Overwrite the node at `path` with `value`.
    async fn set(&self, path: &StorePath, value: Value) -> StoreResult<()>;

    /// Store `value` under a freshly generated key below `path` and return
    /// the key.
    async fn push(&self, path: &StorePath, value: Value) -> StoreResult<String>;

    /// Delete the node at `path`. Deleting an absent node succeeds.
    async fn remove(&self, path: &StorePath) -> StoreResult<()>;

    /// Children of the collection at `path` whose `child` field equals
    /// `value`.
    async fn query_equal(
        &self,
        path: &StorePath,
        child: &str,
        value: &Value,
    ) -> StoreResult<Vec<(String, Value)>>;
}

/// Flatten an object node into key-ordered `(key, value)` pairs. Anything
/// other than an object (including `null`) has no children.
pub(crate) fn object_children(node: Option<Value>) -> Vec<(String, Value)> {
    let mut children: Vec<(String, Value)> = match node {
        Some(Value::Object(map)) => map.into_iter().collect(),
        _ => Vec::new(),
    };
    children.sort_by(|a, b| a.0.cmp(&b.0));
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_and_displays_paths() {
        let path = StorePath::parse("/listings/abc/").unwrap();
        assert_eq!(path.segments(), ["listings", "abc"]);
        assert_eq!(path.to_string(), "listings/abc");
    }

    #[test]
    fn rejects_invalid_segments() {
        assert!(StorePath::parse("listings//abc").is_err());
        assert!(StorePath::collection("listings").unwrap().child("a.b").is_err());
    }

    #[test]
    fn object_children_are_key_ordered() {
        let children = object_children(Some(json!({"b": 2, "a": 1})));
        let keys: Vec<_> = children.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert!(object_children(Some(Value::Null)).is_empty());
        assert!(object_children(None).is_empty());
    }
}
