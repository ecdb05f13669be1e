//! Per-invocation executor: builds a memoized task graph over an
//! [`ExecutionPlan`], drives parent-awaiting, skip propagation, edge
//! predicates, per-node governance, and the global deadline.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;
use tracing::{debug, error, instrument};

use crate::error::{DagError, DagResult};
use crate::node::{NodeEntry, NodeId};
use crate::plan::ExecutionPlan;
use crate::pool::BoxFuture as PoolFuture;
use crate::value::{UpstreamInputView, Value};

type SharedTask = Shared<BoxFuture<'static, DagResult<NodeEntry>>>;

/// Drives a single [`crate::engine::Engine::apply`] call against a shared,
/// immutable execution plan.
pub struct Scheduler<Req, Res> {
    plan: Arc<ExecutionPlan<Req, Res>>,
}

impl<Req, Res> Scheduler<Req, Res>
where
    Req: Send + Sync + 'static,
    Res: Send + Sync + 'static,
{
    pub fn new(plan: Arc<ExecutionPlan<Req, Res>>) -> Self {
        Self { plan }
    }

    #[instrument(skip_all)]
    pub async fn run(&self, request: Arc<Req>) -> DagResult<Res> {
        let tasks: Arc<DashMap<NodeId, SharedTask>> = Arc::new(DashMap::new());
        let handles: Arc<parking_lot::Mutex<Vec<crate::pool::TaskHandle>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));

        for node in self.plan.nodes() {
            Self::get_or_create_task(&self.plan, &tasks, &handles, request.clone(), node);
        }

        let all_futures: Vec<(NodeId, SharedTask)> = self
            .plan
            .nodes()
            .iter()
            .map(|id| (id.clone(), tasks.get(id).expect("just created").clone()))
            .collect();

        // Race every node's task concurrently rather than awaiting them one
        // at a time in iteration order (which is the arbitrary order of a
        // HashSet-derived node list, unrelated to topology or completion
        // time). A sequential await would let an unrelated, still-running
        // node block the scheduler from ever observing an earlier, faster
        // failure elsewhere in the graph.
        let per_node = all_futures.into_iter().map(|(id, fut)| async move {
            let entry = fut.await?;
            Ok::<(NodeId, NodeEntry), DagError>((id, entry))
        });

        let barrier = async {
            let entries = futures::future::try_join_all(per_node).await?;
            let mut results = HashMap::new();
            for (id, entry) in entries {
                match entry {
                    NodeEntry::Success(Some(v)) => {
                        results.insert(id, v);
                    }
                    NodeEntry::Success(None) | NodeEntry::Skipped => {}
                }
            }
            Ok(results)
        };

        let outcome = match tokio::time::timeout(self.plan.global_timeout, barrier).await {
            Ok(Ok(results)) => Ok(results),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DagError::DagTimeout {
                millis: self.plan.global_timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(results) => self.plan.terminal_strategy.finish(&request, &results).await,
            Err(e) => {
                for handle in handles.lock().iter() {
                    handle.abort();
                }
                // Strip engine-internal cascade wrappers before surfacing to
                // the caller, per the propagation rule: report the original
                // cause, not the wrapper that merely recorded which
                // descendant observed it.
                let root = e.root_cause().clone();
                error!(error = %root, "invocation failed, cancelling outstanding tasks");
                Err(root)
            }
        }
    }

    /// Recursively build (and memoize) the task for `node_id`, awaiting and
    /// composing its parents' tasks first.
    fn get_or_create_task(
        plan: &Arc<ExecutionPlan<Req, Res>>,
        tasks: &Arc<DashMap<NodeId, SharedTask>>,
        handles: &Arc<parking_lot::Mutex<Vec<crate::pool::TaskHandle>>>,
        request: Arc<Req>,
        node_id: &str,
    ) -> SharedTask {
        if let Some(existing) = tasks.get(node_id) {
            return existing.clone();
        }

        let parent_ids = plan.parents_of(node_id).to_vec();
        let parent_tasks: Vec<(NodeId, SharedTask)> = parent_ids
            .iter()
            .map(|pid| {
                let task = Self::get_or_create_task(plan, tasks, handles, request.clone(), pid);
                (pid.clone(), task)
            })
            .collect();

        let plan_for_body = plan.clone();
        let node_id_owned: NodeId = node_id.to_string();
        let request_for_body = request.clone();

        let inner = async move {
            Self::compose_after_parents(plan_for_body, node_id_owned, request_for_body, parent_tasks).await
        };

        let (tx, rx) = oneshot::channel();
        let pool_future: PoolFuture = Box::pin(async move {
            let result = inner.await;
            let _ = tx.send(result);
        });

        let submission = plan.worker_pool.spawn(pool_future);
        let node_id_for_err: NodeId = node_id.to_string();

        let task_future: BoxFuture<'static, DagResult<NodeEntry>> = match submission {
            Ok(handle) => {
                handles.lock().push(handle);
                async move {
                    rx.await.unwrap_or_else(|_| {
                        Err(DagError::WorkerPoolRejected {
                            node: node_id_for_err.clone(),
                            reason: "worker task dropped without completing".to_string(),
                        })
                    })
                }
                .boxed()
            }
            Err(e) => async move { Err(e) }.boxed(),
        };

        let governed = Self::apply_governance(plan.clone(), node_id.to_string(), request, task_future);
        let shared = governed.shared();
        tasks.insert(node_id.to_string(), shared.clone());
        shared
    }

    /// Awaits all parents, applies cascade-skip and edge-predicate logic,
    /// and on success runs the node's (possibly retry-wrapped) processor.
    /// This entire function's body is what actually executes on the worker
    /// pool, not the caller's await point.
    #[instrument(skip_all, fields(node = %node_id))]
    async fn compose_after_parents(
        plan: Arc<ExecutionPlan<Req, Res>>,
        node_id: NodeId,
        request: Arc<Req>,
        parent_tasks: Vec<(NodeId, SharedTask)>,
    ) -> DagResult<NodeEntry> {
        let mut parent_results: HashMap<NodeId, Value> = HashMap::new();

        for (parent_id, task) in &parent_tasks {
            match task.clone().await {
                Ok(NodeEntry::Skipped) => {
                    debug!(parent = %parent_id, "parent skipped, short-circuiting");
                    return Ok(NodeEntry::Skipped);
                }
                Ok(NodeEntry::Success(Some(v))) => {
                    parent_results.insert(parent_id.clone(), v);
                }
                Ok(NodeEntry::Success(None)) => {}
                Err(e) => {
                    return Err(DagError::cascaded(node_id.clone(), parent_id.clone(), e));
                }
            }
        }

        let upstream = UpstreamInputView::new(parent_results);

        for (parent_id, _) in &parent_tasks {
            if let Some(predicate) = plan.predicate_for(parent_id, &node_id) {
                match predicate.evaluate(&request, &upstream).await {
                    Ok(true) => continue,
                    Ok(false) => {
                        debug!(parent = %parent_id, "edge predicate false, skipping");
                        return Ok(NodeEntry::Skipped);
                    }
                    Err(e) => {
                        return Err(DagError::edge_condition(
                            parent_id.clone(),
                            node_id.clone(),
                            EdgeConditionCause(e.to_string()),
                        ));
                    }
                }
            }
        }

        let processor = plan
            .processor_for(&node_id)
            .expect("every node has a processor")
            .clone();

        match processor.process(&request, &upstream).await {
            Ok(v) => Ok(NodeEntry::success(v)),
            Err(e) => {
                error!(error = %e, "node body failed");
                Err(e)
            }
        }
    }

    /// Wraps the inner (parent-await + node-body) future with per-node
    /// timeout, then fallback, in that order.
    fn apply_governance(
        plan: Arc<ExecutionPlan<Req, Res>>,
        node_id: NodeId,
        request: Arc<Req>,
        inner: BoxFuture<'static, DagResult<NodeEntry>>,
    ) -> BoxFuture<'static, DagResult<NodeEntry>> {
        let governance = match plan.governance_for(&node_id) {
            Some(g) => g.clone(),
            None => return inner,
        };

        let timeout = governance.timeout;
        let fallback = governance.fallback.clone();
        let node_id_for_timeout = node_id.clone();

        async move {
            let timed = async move {
                match timeout {
                    Some(d) => match tokio::time::timeout(d, inner).await {
                        Ok(result) => result,
                        Err(_) => Err(DagError::node_timeout(node_id_for_timeout.clone(), d.as_millis() as u64)),
                    },
                    None => inner.await,
                }
            };

            match timed.await {
                Ok(entry) => Ok(entry),
                Err(e) => match fallback {
                    Some(fb) => match fb.recover(&request, &UpstreamInputView::empty(), &e).await {
                        Ok(v) => Ok(NodeEntry::success(v)),
                        Err(fb_err) => Err(DagError::fallback_failed(node_id.clone(), FallbackCause(fb_err.to_string()))),
                    },
                    None => Err(e),
                },
            }
        }
        .boxed()
    }
}

#[derive(Debug)]
struct EdgeConditionCause(String);
impl std::fmt::Display for EdgeConditionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for EdgeConditionCause {}

#[derive(Debug)]
struct FallbackCause(String);
impl std::fmt::Display for FallbackCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for FallbackCause {}
