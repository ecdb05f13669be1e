//! Compiles a [`crate::graph::GraphConfig`] into an immutable [`ExecutionPlan`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::edge::edge_key;
use crate::error::{DagError, DagResult};
use crate::governance::Governance;
use crate::graph::GraphConfig;
use crate::node::NodeId;
use crate::plan::ExecutionPlan;
use crate::resilient::ResilientProcessor;
use crate::traits::Processor;

pub struct Compiler;

impl Compiler {
    /// Validate, topologically check, and freeze a configuration.
    ///
    /// Uses Kahn's algorithm: a config whose drained-node count falls short
    /// of its total node count contains a cycle. Edges whose endpoints were
    /// never registered are silently dropped before the in-degree pass.
    pub fn compile<Req, Res>(config: GraphConfig<Req, Res>) -> DagResult<ExecutionPlan<Req, Res>>
    where
        Req: Send + Sync + 'static,
        Res: Send + Sync + 'static,
    {
        config.validate_structure()?;

        let all_node_ids: HashSet<NodeId> = config.nodes.iter().map(|n| n.id.clone()).collect();

        let mut in_degree: HashMap<NodeId, usize> = all_node_ids.iter().cloned().map(|id| (id, 0)).collect();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut parents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut edge_predicates = HashMap::new();

        for edge in &config.edges {
            if !all_node_ids.contains(&edge.from) || !all_node_ids.contains(&edge.to) {
                continue;
            }
            *in_degree.get_mut(&edge.to).expect("validated above") += 1;
            children.entry(edge.from.clone()).or_default().push(edge.to.clone());
            parents.entry(edge.to.clone()).or_default().push(edge.from.clone());
            if let Some(pred) = &edge.predicate {
                edge_predicates.insert(edge_key(&edge.from, &edge.to), pred.clone());
            }
        }

        let mut queue: VecDeque<NodeId> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(id, _)| id.clone())
            .collect();
        let mut drained = Vec::new();
        while let Some(id) = queue.pop_front() {
            drained.push(id.clone());
            if let Some(kids) = children.get(&id) {
                for child in kids {
                    let deg = in_degree.get_mut(child).expect("known node");
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(child.clone());
                    }
                }
            }
        }

        if drained.len() < all_node_ids.len() {
            return Err(DagError::compile("graph contains a cycle"));
        }

        let mut processors: HashMap<NodeId, Arc<dyn Processor<Req>>> = HashMap::new();
        let mut governance_table: HashMap<NodeId, Governance<Req>> = HashMap::new();

        for node in config.nodes {
            let governance = node.governance.or_else(|| config.default_governance.clone());

            let processor = match &governance {
                Some(g) if g.max_retries > 0 => Arc::new(ResilientProcessor::new(
                    node.id.clone(),
                    node.processor,
                    g.max_retries,
                    g.retry_backoff,
                )) as Arc<dyn Processor<Req>>,
                _ => node.processor,
            };

            processors.insert(node.id.clone(), processor);
            // A later duplicate registration with no governance (and no
            // default to fall back on) must overwrite an earlier duplicate's
            // governance too, not just its processor, so "last registration
            // wins" holds for the whole node, not only half of it.
            match governance {
                Some(g) => {
                    governance_table.insert(node.id.clone(), g);
                }
                None => {
                    governance_table.remove(&node.id);
                }
            }
        }

        Ok(ExecutionPlan {
            all_nodes: all_node_ids.into_iter().collect(),
            parents,
            processors,
            governance: governance_table,
            edge_predicates,
            global_timeout: config.global_timeout,
            terminal_strategy: config.terminal_strategy.expect("validated above"),
            worker_pool: config.worker_pool.expect("validated above"),
        })
    }
}
