//! Dependency Tracker
//!
//! Records which render path depends on which nodes or connections. The
//! tracker is a pass-through: it returns the tracked result unchanged so
//! call sites can wrap expressions inline.
//!
//! Recording is fire-and-forget. Sinks take records synchronously and have
//! no way to fail the read that produced them. Deduplication is the sink
//! consumer's job.

use crate::models::{DependencyRecord, Node, PageDependency, QueryResult};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

/// Capacity of the channel behind [`BroadcastSink::new`]
pub const DEPENDENCY_CHANNEL_CAPACITY: usize = 1024;

/// Receiver of dependency facts
pub trait DependencySink: Send + Sync {
    fn record(&self, record: DependencyRecord);
}

/// Sink that keeps every record in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DependencyRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records so far
    pub fn records(&self) -> Vec<DependencyRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded facts
    pub fn take(&self) -> Vec<DependencyRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DependencySink for MemorySink {
    fn record(&self, record: DependencyRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Sink that forwards records to broadcast subscribers
///
/// Records sent while nobody is subscribed are dropped. The channel keeps
/// at most `capacity` records per subscriber: a subscriber that falls
/// further behind loses the oldest ones and its next `recv` returns
/// `RecvError::Lagged(n)` with the number lost. Consumers that need every
/// fact must treat `Lagged` as "dependencies unknown" and invalidate
/// accordingly.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<DependencyRecord>,
    capacity: usize,
}

impl BroadcastSink {
    pub fn new() -> Self {
        Self::with_capacity(DEPENDENCY_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DependencyRecord> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencySink for BroadcastSink {
    fn record(&self, record: DependencyRecord) {
        match self.tx.send(record) {
            Err(_) => tracing::trace!("No dependency subscribers, record dropped"),
            Ok(_) if self.tx.len() >= self.capacity => tracing::debug!(
                capacity = self.capacity,
                "Dependency channel full, lagging subscribers lose the oldest records"
            ),
            Ok(_) => {}
        }
    }
}

/// Results whose nodes can be tracked
pub trait TrackedNodes {
    /// Node ids in result order, absent entries skipped
    fn node_ids(&self) -> Vec<&str>;
}

impl TrackedNodes for Node {
    fn node_ids(&self) -> Vec<&str> {
        vec![self.id.as_str()]
    }
}

impl TrackedNodes for Option<Node> {
    fn node_ids(&self) -> Vec<&str> {
        self.iter().map(|n| n.id.as_str()).collect()
    }
}

impl TrackedNodes for Vec<Node> {
    fn node_ids(&self) -> Vec<&str> {
        self.iter().map(|n| n.id.as_str()).collect()
    }
}

impl TrackedNodes for Vec<Option<Node>> {
    fn node_ids(&self) -> Vec<&str> {
        self.iter().flatten().map(|n| n.id.as_str()).collect()
    }
}

impl TrackedNodes for QueryResult {
    fn node_ids(&self) -> Vec<&str> {
        match self {
            QueryResult::None => Vec::new(),
            QueryResult::One(node) => vec![node.id.as_str()],
            QueryResult::Many(nodes) => nodes.node_ids(),
        }
    }
}

/// Emits dependency records for results on behalf of one render path
#[derive(Clone)]
pub struct DependencyTracker {
    sink: Arc<dyn DependencySink>,
    path: Option<String>,
}

impl DependencyTracker {
    pub fn new(sink: Arc<dyn DependencySink>, path: Option<String>) -> Self {
        Self { sink, path }
    }

    /// The path records default to
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Same sink, different default path
    pub fn with_path(&self, path: Option<String>) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            path,
        }
    }

    /// Record the dependency of `deps` (over the bound path) on `result`.
    ///
    /// - Without an effective non-empty path nothing is recorded.
    /// - With a `connection_type`, exactly one connection record is emitted
    ///   and individual nodes are not recorded.
    /// - Otherwise one node record per present node, in result order.
    pub fn track<T: TrackedNodes>(&self, result: T, deps: Option<&PageDependency>) -> T {
        let effective = match deps {
            Some(deps) => deps.resolve(self.path()),
            None => PageDependency::default().resolve(self.path()),
        };
        let path = match effective.path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => return result,
        };

        if let Some(connection) = effective.connection_type {
            tracing::trace!(%path, %connection, "Recording connection dependency");
            self.sink
                .record(DependencyRecord::connection(path, connection));
            return result;
        }

        let ids = result.node_ids();
        tracing::trace!(%path, count = ids.len(), "Recording node dependencies");
        for id in ids {
            self.sink.record(DependencyRecord::node(path, id));
        }
        result
    }
}
