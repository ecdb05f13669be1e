//! Type-erased inter-node values and the read-only view a node body sees
//! over its parents' results.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DagError, DagResult};
use crate::node::NodeId;

/// A node's produced output, type-erased so that sibling nodes in the same
/// graph can produce different concrete Rust types.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wrap a concrete value as a [`Value`].
pub fn value_of<T: Any + Send + Sync>(v: T) -> Value {
    Arc::new(v)
}

/// Read-only projection of a node's parents' results, passed to processors,
/// edge predicates and (empty) fallbacks.
#[derive(Clone, Default)]
pub struct UpstreamInputView {
    entries: HashMap<NodeId, Value>,
}

impl UpstreamInputView {
    pub fn new(entries: HashMap<NodeId, Value>) -> Self {
        Self { entries }
    }

    /// An upstream view with no entries, used for fallback invocations per
    /// the fallback-input contract: fallbacks never see partial parent data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Untyped accessor. Returns `None` when the parent is absent (never
    /// ran, was skipped, or succeeded with no value).
    pub fn get(&self, node: &str) -> Option<Value> {
        self.entries.get(node).cloned()
    }

    /// Typed accessor. `Ok(None)` when absent, `Err(TypeMismatch)` when
    /// present but the concrete type does not match `T`.
    pub fn get_as<T: Any + Clone + Send + Sync>(&self, node: &str) -> DagResult<Option<T>> {
        match self.entries.get(node) {
            None => Ok(None),
            Some(v) => match v.downcast_ref::<T>() {
                Some(t) => Ok(Some(t.clone())),
                None => Err(DagError::type_mismatch(
                    node.to_string(),
                    std::any::type_name::<T>(),
                    "<erased>",
                )),
            },
        }
    }

    pub fn contains(&self, node: &str) -> bool {
        self.entries.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_get_round_trips() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), value_of(4usize));
        let view = UpstreamInputView::new(map);
        assert_eq!(view.get_as::<usize>("a").unwrap(), Some(4));
        assert_eq!(view.get_as::<usize>("missing").unwrap(), None);
    }

    #[test]
    fn typed_get_reports_mismatch() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), value_of("hello".to_string()));
        let view = UpstreamInputView::new(map);
        assert!(view.get_as::<usize>("a").is_err());
    }

    #[test]
    fn empty_view_has_no_entries() {
        let view = UpstreamInputView::empty();
        assert!(view.is_empty());
        assert!(view.get("anything").is_none());
    }
}
