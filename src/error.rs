//! Error taxonomy for graph compilation and execution.

use std::sync::Arc;

use crate::node::NodeId;

/// Convenience alias for results produced throughout the crate.
pub type DagResult<T> = Result<T, DagError>;

/// A boxed, thread-safe `std::error::Error`, used for opaque `source` causes
/// coming from user-supplied processors, predicates and fallbacks.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong compiling a [`crate::graph::GraphConfig`] or
/// executing a compiled [`crate::plan::ExecutionPlan`].
///
/// `DagError` is `Clone` so it can be stored in the memoized per-invocation
/// task table (`Shared` futures require their output to be `Clone`) without
/// re-wrapping every propagation site in an `Arc`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DagError {
    /// The graph failed to compile: a cycle, an unreachable requirement, or
    /// a structurally invalid configuration (missing worker pool / terminal
    /// strategy).
    #[error("graph did not compile: {reason}")]
    CompileError { reason: String },

    /// A node's processor raised while executing.
    #[error("node '{node}' failed: {source}")]
    NodeExecutionError { node: NodeId, source: BoxError },

    /// A node exceeded its per-node governance timeout.
    #[error("node '{node}' timed out after {millis}ms")]
    NodeTimeoutError { node: NodeId, millis: u64 },

    /// An edge predicate raised while deciding whether to traverse an edge.
    #[error("edge condition '{from}->{to}' failed: {source}")]
    EdgeConditionError {
        from: NodeId,
        to: NodeId,
        source: BoxError,
    },

    /// A configured fallback itself raised.
    #[error("fallback for node '{node}' failed: {source}")]
    FallbackFailed { node: NodeId, source: BoxError },

    /// The invocation as a whole exceeded its global deadline.
    #[error("invocation exceeded global timeout of {millis}ms")]
    DagTimeout { millis: u64 },

    /// A node was never run because an ancestor failed.
    #[error("node '{node}' was not run: ancestor '{ancestor}' failed")]
    CascadedFailure {
        node: NodeId,
        ancestor: NodeId,
        cause: Arc<DagError>,
    },

    /// The typed upstream accessor found a value whose concrete type did not
    /// match the requested type.
    #[error("upstream value for '{node}' is not the requested type (expected {expected}, found {actual})")]
    TypeMismatch {
        node: NodeId,
        expected: &'static str,
        actual: &'static str,
    },

    /// The worker pool refused to accept a submitted unit of work.
    #[error("worker pool rejected submission for node '{node}': {reason}")]
    WorkerPoolRejected { node: NodeId, reason: String },
}

impl DagError {
    pub fn compile(reason: impl Into<String>) -> Self {
        DagError::CompileError {
            reason: reason.into(),
        }
    }

    pub fn node_execution(node: impl Into<NodeId>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        DagError::NodeExecutionError {
            node: node.into(),
            source: Arc::new(source),
        }
    }

    pub fn node_timeout(node: impl Into<NodeId>, millis: u64) -> Self {
        DagError::NodeTimeoutError {
            node: node.into(),
            millis,
        }
    }

    pub fn edge_condition(
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DagError::EdgeConditionError {
            from: from.into(),
            to: to.into(),
            source: Arc::new(source),
        }
    }

    pub fn fallback_failed(node: impl Into<NodeId>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        DagError::FallbackFailed {
            node: node.into(),
            source: Arc::new(source),
        }
    }

    pub fn cascaded(node: impl Into<NodeId>, ancestor: impl Into<NodeId>, cause: DagError) -> Self {
        DagError::CascadedFailure {
            node: node.into(),
            ancestor: ancestor.into(),
            cause: Arc::new(cause),
        }
    }

    pub fn type_mismatch(node: impl Into<NodeId>, expected: &'static str, actual: &'static str) -> Self {
        DagError::TypeMismatch {
            node: node.into(),
            expected,
            actual,
        }
    }

    /// Whether retrying the same operation might plausibly succeed.
    ///
    /// Used by callers deciding whether to surface a "try again" affordance;
    /// the engine itself never retries beyond what governance configures.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DagError::NodeExecutionError { .. }
                | DagError::NodeTimeoutError { .. }
                | DagError::WorkerPoolRejected { .. }
        )
    }

    /// A coarse category name, stable across variant field changes, suitable
    /// for log fields or metrics labels.
    pub fn category(&self) -> &'static str {
        match self {
            DagError::CompileError { .. } => "compile",
            DagError::NodeExecutionError { .. } => "node_execution",
            DagError::NodeTimeoutError { .. } => "node_timeout",
            DagError::EdgeConditionError { .. } => "edge_condition",
            DagError::FallbackFailed { .. } => "fallback_failed",
            DagError::DagTimeout { .. } => "dag_timeout",
            DagError::CascadedFailure { .. } => "cascaded_failure",
            DagError::TypeMismatch { .. } => "type_mismatch",
            DagError::WorkerPoolRejected { .. } => "worker_pool_rejected",
        }
    }

    /// Walk a `CascadedFailure` chain down to the first non-cascaded cause.
    pub fn root_cause(&self) -> &DagError {
        match self {
            DagError::CascadedFailure { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_stable_per_variant() {
        let err = DagError::node_timeout("n1", 100);
        assert_eq!(err.category(), "node_timeout");
        assert!(err.is_recoverable());
    }

    #[test]
    fn root_cause_unwraps_cascade_chain() {
        let leaf = DagError::node_timeout("a", 50);
        let mid = DagError::cascaded("b", "a", leaf.clone());
        let top = DagError::cascaded("c", "b", mid);
        match top.root_cause() {
            DagError::NodeTimeoutError { node, .. } => assert_eq!(node, "a"),
            other => panic!("expected NodeTimeoutError, got {other:?}"),
        }
    }
}
