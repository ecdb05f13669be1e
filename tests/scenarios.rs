//! End-to-end scenarios exercising compile, cascade skip, cascade failure,
//! retry, timeout and fallback together through the public `Engine` surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use dagflow::error::{DagError, DagResult};
use dagflow::governance::Governance;
use dagflow::pool::TokioWorkerPool;
use dagflow::traits::{EdgePredicate, FallbackStrategy, Processor, TerminalStrategy};
use dagflow::value::{value_of, UpstreamInputView, Value};
use dagflow::{Engine, GraphConfig, NodeId};

/// Returns a fixed string, ignoring upstream and request.
struct ConstString(&'static str);

#[async_trait]
impl Processor<()> for ConstString {
    async fn process(&self, _request: &(), _upstream: &UpstreamInputView) -> DagResult<Value> {
        Ok(value_of(self.0.to_string()))
    }
}

/// Reads a `String` from one named parent and reports its length.
struct LengthOf(&'static str);

#[async_trait]
impl Processor<()> for LengthOf {
    async fn process(&self, _request: &(), upstream: &UpstreamInputView) -> DagResult<Value> {
        let parent: String = upstream.get_as::<String>(self.0)?.expect("parent present");
        Ok(value_of(parent.len()))
    }
}

/// Reads a `String` from one named parent and appends a suffix.
struct AppendSuffix(&'static str, &'static str);

#[async_trait]
impl Processor<()> for AppendSuffix {
    async fn process(&self, _request: &(), upstream: &UpstreamInputView) -> DagResult<Value> {
        let parent: String = upstream.get_as::<String>(self.0)?.expect("parent present");
        Ok(value_of(format!("{parent}{}", self.1)))
    }
}

/// Joins a `String` parent and a `usize` parent as `"{string}:{len}"`.
struct JoinStringAndLen {
    string_parent: &'static str,
    len_parent: &'static str,
}

#[async_trait]
impl Processor<()> for JoinStringAndLen {
    async fn process(&self, _request: &(), upstream: &UpstreamInputView) -> DagResult<Value> {
        let s: String = upstream.get_as::<String>(self.string_parent)?.expect("present");
        let n: usize = upstream.get_as::<usize>(self.len_parent)?.expect("present");
        Ok(value_of(format!("{s}:{n}")))
    }
}

/// Sleeps for a fixed duration, then returns a fixed string. Records its own
/// completion time so tests can assert on independent node timing without
/// waiting on the whole invocation.
struct SleepThen {
    duration: Duration,
    value: &'static str,
    completed_at: Arc<std::sync::Mutex<Option<Instant>>>,
    start: Instant,
}

#[async_trait]
impl Processor<()> for SleepThen {
    async fn process(&self, _request: &(), _upstream: &UpstreamInputView) -> DagResult<Value> {
        tokio::time::sleep(self.duration).await;
        *self.completed_at.lock().unwrap() = Some(Instant::now());
        Ok(value_of(self.value.to_string()))
    }
}

/// Fails until the `fail_until`th attempt, then succeeds, counting attempts.
struct FlakyThenSucceeds {
    calls: AtomicU32,
    fail_until: u32,
}

#[derive(Debug)]
struct FlakyError;
impl std::fmt::Display for FlakyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flaky failure")
    }
}
impl std::error::Error for FlakyError {}

#[async_trait]
impl Processor<()> for FlakyThenSucceeds {
    async fn process(&self, _request: &(), _upstream: &UpstreamInputView) -> DagResult<Value> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt < self.fail_until {
            Err(DagError::node_execution("flaky", FlakyError))
        } else {
            Ok(value_of("SuccessData".to_string()))
        }
    }
}

/// A predicate backed by a fixed boolean.
struct FixedPredicate(bool);

#[async_trait]
impl EdgePredicate<()> for FixedPredicate {
    async fn evaluate(&self, _request: &(), _upstream: &UpstreamInputView) -> DagResult<bool> {
        Ok(self.0)
    }
}

/// A fallback that always returns a fixed string.
struct FixedFallback(&'static str);

#[async_trait]
impl FallbackStrategy<()> for FixedFallback {
    async fn recover(&self, _request: &(), _upstream: &UpstreamInputView, _cause: &DagError) -> DagResult<Value> {
        Ok(value_of(self.0.to_string()))
    }
}

/// Returns the `String` value of one named node from the result map.
struct ReadNodeAsString(&'static str);

#[async_trait]
impl TerminalStrategy<(), String> for ReadNodeAsString {
    async fn finish(&self, _request: &(), results: &HashMap<NodeId, Value>) -> DagResult<String> {
        Ok(results
            .get(self.0)
            .and_then(|v| v.downcast_ref::<String>())
            .cloned()
            .unwrap_or_default())
    }
}

/// Returns the sorted set of node ids present in the result map, so tests
/// can assert on exactly which nodes ran vs. were skipped.
struct ResultKeys;

#[async_trait]
impl TerminalStrategy<(), Vec<String>> for ResultKeys {
    async fn finish(&self, _request: &(), results: &HashMap<NodeId, Value>) -> DagResult<Vec<String>> {
        let mut keys: Vec<String> = results.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

fn pool() -> Arc<TokioWorkerPool> {
    Arc::new(TokioWorkerPool::new(8))
}

#[tokio::test]
async fn diamond_fan_out_fan_in() {
    let config = GraphConfig::new()
        .add_node("A", Arc::new(ConstString("Base")))
        .add_node("B", Arc::new(LengthOf("A")))
        .add_node("C", Arc::new(AppendSuffix("A", "Copy")))
        .add_node(
            "D",
            Arc::new(JoinStringAndLen {
                string_parent: "C",
                len_parent: "B",
            }),
        )
        .add_route("A", "B")
        .add_route("A", "C")
        .add_route("B", "D")
        .add_route("C", "D")
        .worker_pool(pool())
        .terminal_strategy(Arc::new(ReadNodeAsString("D")));

    let engine: Engine<(), String> = Engine::new(config).unwrap();
    let result = engine.apply(()).await.unwrap();
    assert_eq!(result, "BaseCopy:4");
}

#[tokio::test]
async fn straggler_does_not_block_its_own_branch_timing() {
    let a_completed = Arc::new(std::sync::Mutex::new(None));
    let b_completed = Arc::new(std::sync::Mutex::new(None));
    let start = Instant::now();

    let config = GraphConfig::new()
        .add_node(
            "A",
            Arc::new(SleepThen {
                duration: Duration::from_millis(50),
                value: "fast",
                completed_at: a_completed.clone(),
                start,
            }),
        )
        .add_node(
            "B",
            Arc::new(SleepThen {
                duration: Duration::from_millis(1000),
                value: "slow",
                completed_at: b_completed.clone(),
                start,
            }),
        )
        .add_node("C", Arc::new(AppendSuffix("A", "-done")))
        .add_node("D", Arc::new(AppendSuffix("B", "-done")))
        .add_route("A", "C")
        .add_route("B", "D")
        .worker_pool(pool())
        .terminal_strategy(Arc::new(ResultKeys));

    let engine: Engine<(), Vec<String>> = Engine::new(config).unwrap();
    let keys = engine.apply(()).await.unwrap();
    assert_eq!(keys, vec!["A", "B", "C", "D"]);

    let a_elapsed = a_completed.lock().unwrap().unwrap().duration_since(start);
    assert!(a_elapsed < Duration::from_millis(500), "A should finish well before B");
}

#[tokio::test]
async fn false_predicate_cascades_skip_to_descendants() {
    let config = GraphConfig::new()
        .add_node("A", Arc::new(ConstString("value")))
        .add_node("B", Arc::new(ConstString("unreachable")))
        .add_node("C", Arc::new(ConstString("also-unreachable")))
        .add_route_with_predicate("A", "B", Arc::new(FixedPredicate(false)))
        .add_route("B", "C")
        .worker_pool(pool())
        .terminal_strategy(Arc::new(ResultKeys));

    let engine: Engine<(), Vec<String>> = Engine::new(config).unwrap();
    let keys = engine.apply(()).await.unwrap();
    assert_eq!(keys, vec!["A"]);
}

#[tokio::test]
async fn diamond_with_one_false_branch_skips_only_that_branch() {
    let config = GraphConfig::new()
        .add_node("A", Arc::new(ConstString("Base")))
        .add_node("B", Arc::new(ConstString("b-value")))
        .add_node("C", Arc::new(ConstString("c-value")))
        .add_node("D", Arc::new(ConstString("d-value")))
        .add_route_with_predicate("A", "B", Arc::new(FixedPredicate(true)))
        .add_route_with_predicate("A", "C", Arc::new(FixedPredicate(false)))
        .add_route("B", "D")
        .add_route("C", "D")
        .worker_pool(pool())
        .terminal_strategy(Arc::new(ResultKeys));

    let engine: Engine<(), Vec<String>> = Engine::new(config).unwrap();
    let keys = engine.apply(()).await.unwrap();
    assert_eq!(keys, vec!["A", "B"]);
}

#[tokio::test]
async fn retry_succeeds_on_third_attempt_and_stops() {
    let config = GraphConfig::new().add_node_with_governance(
        "flaky",
        Arc::new(FlakyThenSucceeds {
            calls: AtomicU32::new(0),
            fail_until: 3,
        }),
        Governance::new()
            .with_max_retries(3)
            .with_retry_backoff(Duration::from_millis(20)),
    );
    let config = config
        .worker_pool(pool())
        .terminal_strategy(Arc::new(ReadNodeAsString("flaky")));

    let engine: Engine<(), String> = Engine::new(config).unwrap();
    let result = engine.apply(()).await.unwrap();
    assert_eq!(result, "SuccessData");
}

#[tokio::test]
async fn timeout_is_caught_by_fallback() {
    let start = Instant::now();
    let completed = Arc::new(std::sync::Mutex::new(None));

    let config = GraphConfig::new()
        .add_node_with_governance(
            "slow",
            Arc::new(SleepThen {
                duration: Duration::from_millis(1000),
                value: "too-slow",
                completed_at: completed,
                start,
            }),
            Governance::new()
                .with_timeout(Duration::from_millis(200))
                .with_fallback(Arc::new(FixedFallback("TimeoutFallback"))),
        )
        .worker_pool(pool())
        .terminal_strategy(Arc::new(ReadNodeAsString("slow")));

    let engine: Engine<(), String> = Engine::new(config).unwrap();
    let result = engine.apply(()).await.unwrap();
    assert_eq!(result, "TimeoutFallback");
    assert!(start.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn default_governance_timeout_without_fallback_surfaces_error() {
    let start = Instant::now();
    let completed = Arc::new(std::sync::Mutex::new(None));

    let config = GraphConfig::new()
        .add_node(
            "slow",
            Arc::new(SleepThen {
                duration: Duration::from_millis(500),
                value: "too-slow",
                completed_at: completed,
                start,
            }),
        )
        .default_governance(Governance::new().with_timeout(Duration::from_millis(200)))
        .worker_pool(pool())
        .terminal_strategy(Arc::new(ReadNodeAsString("slow")));

    let engine: Engine<(), String> = Engine::new(config).unwrap();
    let result = engine.apply(()).await;
    assert!(result.is_err());
    assert!(matches!(result.unwrap_err(), DagError::NodeTimeoutError { .. }));
    assert!(start.elapsed() < Duration::from_millis(450));
}
