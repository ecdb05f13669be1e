//! Node identity and registration.

use std::sync::Arc;

use crate::governance::Governance;
use crate::traits::Processor;

/// Stable identifier for a node, unique within a graph.
pub type NodeId = String;

/// A registered node: its unit of work plus optional resilience
/// configuration. Immutable once the owning [`crate::graph::GraphConfig`]
/// compiles.
pub struct NodeEntryDef<Req> {
    pub id: NodeId,
    pub processor: Arc<dyn Processor<Req>>,
    pub governance: Option<Governance<Req>>,
}

impl<Req> NodeEntryDef<Req> {
    pub fn new(id: impl Into<NodeId>, processor: Arc<dyn Processor<Req>>) -> Self {
        Self {
            id: id.into(),
            processor,
            governance: None,
        }
    }

    pub fn with_governance(mut self, governance: Governance<Req>) -> Self {
        self.governance = Some(governance);
        self
    }
}

/// Outcome of running (or skipping) a node during a single invocation.
///
/// `Skipped` carries no value and is distinct from failure: it propagates on
/// the value channel, short-circuiting descendants silently, whereas a
/// failure propagates on the task's error channel and is eligible for
/// fallback recovery.
#[derive(Clone)]
pub enum NodeEntry {
    Success(Option<crate::value::Value>),
    Skipped,
}

impl NodeEntry {
    pub fn success(value: crate::value::Value) -> Self {
        NodeEntry::Success(Some(value))
    }

    pub fn success_empty() -> Self {
        NodeEntry::Success(None)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, NodeEntry::Skipped)
    }
}
