//! # dagflow
//!
//! A DAG execution engine for orchestrating dependency-linked asynchronous
//! compute units: declare nodes and directed edges once, compile, and apply
//! the compiled plan to any number of requests concurrently.
//!
//! ## Features
//!
//! - **Compile-once, execute-many**: a [`graph::GraphConfig`] compiles into
//!   an immutable [`plan::ExecutionPlan`] shared across every [`engine::Engine::apply`] call.
//! - **Typed upstream view**: each node sees a read-only, typed projection
//!   of its parents' results, not a shared mutable blob.
//! - **Cascade skip and cascade failure**: edge predicates can short-circuit
//!   a branch without it counting as an error; upstream failures propagate
//!   distinctly and are eligible for fallback recovery.
//! - **Per-node governance**: timeout, bounded synchronous retry, and
//!   fallback, composed in a fixed, documented order.
//! - **Caller-owned concurrency**: node work runs on a [`pool::WorkerPool`]
//!   the engine never owns or shuts down.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use dagflow::{Engine, GraphConfig, TokioWorkerPool};
//! use dagflow::traits::{Processor, TerminalStrategy, ProcessorFn, TerminalFn};
//! use dagflow::value::{value_of, UpstreamInputView};
//! use dagflow::error::DagResult;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() -> DagResult<()> {
//! type NodeFuture = std::pin::Pin<Box<dyn std::future::Future<Output = DagResult<dagflow::value::Value>> + Send>>;
//! type TermFuture = std::pin::Pin<Box<dyn std::future::Future<Output = DagResult<i64>> + Send>>;
//!
//! let double: Arc<dyn Processor<i64>> = Arc::new(ProcessorFn::new(
//!     |req: &i64, _up: &UpstreamInputView| -> NodeFuture {
//!         let req = *req;
//!         Box::pin(async move { Ok(value_of(req * 2)) })
//!     },
//! ));
//!
//! let sum_results: Arc<dyn TerminalStrategy<i64, i64>> = Arc::new(TerminalFn::new(
//!     |_req: &i64, results: &HashMap<String, dagflow::value::Value>| -> TermFuture {
//!         let total: i64 = results.values().filter_map(|v| v.downcast_ref::<i64>()).sum();
//!         Box::pin(async move { Ok(total) })
//!     },
//! ));
//!
//! let config = GraphConfig::new()
//!     .add_node("double", double)
//!     .worker_pool(Arc::new(TokioWorkerPool::new(4)))
//!     .terminal_strategy(sum_results);
//!
//! let engine: Engine<i64, i64> = Engine::new(config)?;
//! let result = engine.apply(21).await?;
//! assert_eq!(result, 42);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod compiler;
pub mod edge;
pub mod engine;
pub mod error;
pub mod governance;
pub mod graph;
pub mod node;
pub mod plan;
pub mod pool;
pub mod resilient;
pub mod scheduler;
pub mod traits;
pub mod value;

pub use edge::Edge;
pub use engine::Engine;
pub use error::{DagError, DagResult};
pub use governance::Governance;
pub use graph::GraphConfig;
pub use node::NodeId;
pub use plan::ExecutionPlan;
pub use pool::{TokioWorkerPool, WorkerPool};

/// Crate version, for log correlation and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configure `tracing_subscriber` from `RUST_LOG`. Optional convenience for
/// binaries embedding this crate; the engine itself only ever emits
/// `tracing` events and never initializes a subscriber on its own.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
