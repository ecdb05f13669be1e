//! Directed edges between nodes, each optionally gated by a predicate.

use std::sync::Arc;

use crate::node::NodeId;
use crate::traits::EdgePredicate;

/// A directed dependency from `from` to `to`, with an optional predicate
/// deciding at runtime whether the dependency is actually traversed.
pub struct Edge<Req> {
    pub from: NodeId,
    pub to: NodeId,
    pub predicate: Option<Arc<dyn EdgePredicate<Req>>>,
}

impl<Req> Edge<Req> {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            predicate: None,
        }
    }

    pub fn with_predicate(mut self, predicate: Arc<dyn EdgePredicate<Req>>) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

/// The key edge predicates are stored under: `"from->to"`. When the same
/// pair is registered more than once, the predicate map collapses to the
/// most recently registered predicate for that key, while the adjacency
/// list (built separately by the compiler) still lists the pair once per
/// registration.
pub fn edge_key(from: &str, to: &str) -> String {
    format!("{from}->{to}")
}
