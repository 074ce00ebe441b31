//! Remote collections with a local mirror
//!
//! A [`RemoteResource`] wraps one backend collection (`/api/sleep`, ...) and
//! keeps an ordered in-memory copy of it, the mirror, so list views render
//! without refetching after every change.
//!
//! # Rules
//!
//! - The mirror changes only after the backend call succeeds: create appends,
//!   update replaces by id, remove drops by id, list replaces everything.
//! - A failed call leaves the mirror untouched and is never retried.
//! - Each logical action moves `Idle -> InFlight -> Success | Failed`, so a
//!   view can disable the control that triggered it while it is in flight.
//! - Independent calls resolve independently. With the default
//!   [`ReconcilePolicy::LastResolvedWins`] two overlapping updates of the same
//!   record end with whichever response arrived last.
//!   [`ReconcilePolicy::LatestIssuedWins`] numbers updates as they are issued
//!   and drops a response older than one already applied.
//! - Per-record bookkeeping (action states, update sequence numbers) lives
//!   only as long as the record is in the mirror. Once a record is removed,
//!   or a fresh list no longer has it, its settled actions read `Idle` again.
//! - After [`RemoteResource::detach`] (the owning view went away) late
//!   results are handed back to the caller but no longer touch the mirror.
//!
//! The mirror lock is never held across an await.

use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::client::ApiClient;
use crate::types::{ErrorKind, Result};

/// A backend-owned record with a server-assigned id.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Clone + Eq + Hash + Display + Debug + Send + Sync + 'static;
    /// Body sent to create a record
    type Draft: Serialize + Send + Sync;
    /// Body sent to update a record
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> &Self::Id;
}

/// Transport for one collection
#[async_trait]
pub trait RecordBackend<T: Record>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>>;
    async fn create(&self, draft: &T::Draft) -> Result<T>;
    async fn update(&self, id: &T::Id, patch: &T::Patch) -> Result<T>;
    async fn remove(&self, id: &T::Id) -> Result<()>;
}

/// REST collection at `base_path`: `GET/POST base`, `PATCH/DELETE base/:id`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ApiClient,
    base_path: String,
}

impl HttpBackend {
    pub fn new(client: ApiClient, base_path: impl Into<String>) -> Self {
        Self {
            client,
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn item_path(&self, id: &impl Display) -> String {
        format!("{}/{}", self.base_path, id)
    }
}

#[async_trait]
impl<T: Record> RecordBackend<T> for HttpBackend {
    async fn list(&self) -> Result<Vec<T>> {
        self.client.get_json(&self.base_path).await
    }

    async fn create(&self, draft: &T::Draft) -> Result<T> {
        self.client.post_json(&self.base_path, draft).await
    }

    async fn update(&self, id: &T::Id, patch: &T::Patch) -> Result<T> {
        self.client.patch_json(&self.item_path(id), patch).await
    }

    async fn remove(&self, id: &T::Id) -> Result<()> {
        self.client.delete(&self.item_path(id)).await
    }
}

/// One logical action a view can trigger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action<Id> {
    List,
    Create,
    Update(Id),
    Remove(Id),
}

impl<Id> Action<Id> {
    /// Record the action targets, if any
    pub fn record_id(&self) -> Option<&Id> {
        match self {
            Action::Update(id) | Action::Remove(id) => Some(id),
            Action::List | Action::Create => None,
        }
    }
}

/// Lifecycle of an action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpState {
    #[default]
    Idle,
    InFlight,
    Success,
    Failed(ErrorKind),
}

/// How overlapping updates of one record are reconciled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Apply every successful response as it arrives
    #[default]
    LastResolvedWins,
    /// Drop a response issued before one that was already applied
    LatestIssuedWins,
}

#[derive(Debug, Default)]
struct OpEntry {
    pending: usize,
    last: OpState,
}

struct Mirror<T: Record> {
    records: Vec<T>,
    ops: HashMap<Action<T::Id>, OpEntry>,
    applied_seq: HashMap<T::Id, u64>,
}

impl<T: Record> Mirror<T> {
    fn position(&self, id: &T::Id) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Drop settled bookkeeping for records no longer in the mirror.
    fn forget_missing(&mut self) {
        let present: HashSet<&T::Id> = self.records.iter().map(Record::id).collect();
        self.ops.retain(|action, entry| {
            entry.pending > 0 || action.record_id().map_or(true, |id| present.contains(id))
        });
        self.applied_seq.retain(|id, _| present.contains(id));
    }
}

pub struct RemoteResource<T: Record, B: RecordBackend<T> = HttpBackend> {
    backend: B,
    mirror: Mutex<Mirror<T>>,
    policy: ReconcilePolicy,
    detached: AtomicBool,
    next_seq: AtomicU64,
}

impl<T: Record> RemoteResource<T, HttpBackend> {
    /// Collection at `base_path` on the client's backend
    pub fn http(client: ApiClient, base_path: impl Into<String>) -> Self {
        Self::new(HttpBackend::new(client, base_path))
    }
}

impl<T: Record, B: RecordBackend<T>> RemoteResource<T, B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mirror: Mutex::new(Mirror {
                records: Vec::new(),
                ops: HashMap::new(),
                applied_seq: HashMap::new(),
            }),
            policy: ReconcilePolicy::default(),
            detached: AtomicBool::new(false),
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seed the mirror, e.g. from a previous screen
    pub fn with_records(self, records: Vec<T>) -> Self {
        self.mirror.lock().records = records;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Snapshot of the mirror in display order
    pub fn records(&self) -> Vec<T> {
        self.mirror.lock().records.clone()
    }

    pub fn get(&self, id: &T::Id) -> Option<T> {
        let mirror = self.mirror.lock();
        mirror.position(id).map(|i| mirror.records[i].clone())
    }

    pub fn len(&self) -> usize {
        self.mirror.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self, action: &Action<T::Id>) -> OpState {
        match self.mirror.lock().ops.get(action) {
            Some(entry) if entry.pending > 0 => OpState::InFlight,
            Some(entry) => entry.last,
            None => OpState::Idle,
        }
    }

    /// True while the control for `action` should stay disabled
    pub fn is_busy(&self, action: &Action<T::Id>) -> bool {
        self.state(action) == OpState::InFlight
    }

    /// The owning view is gone; stop applying results to the mirror.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    /// Fetch the collection and replace the mirror with it.
    pub async fn list(&self) -> Result<Vec<T>> {
        let op = self.begin(Action::List);
        let result = self.backend.list().await;
        self.finish(op, &result);

        let records = result?;
        self.apply(|mirror| {
            mirror.records = records.clone();
            mirror.forget_missing();
        });
        Ok(records)
    }

    /// Create on the backend, then append the returned record.
    pub async fn create(&self, draft: &T::Draft) -> Result<T> {
        let op = self.begin(Action::Create);
        let result = self.backend.create(draft).await;
        self.finish(op, &result);

        let record = result?;
        self.apply(|mirror| mirror.records.push(record.clone()));
        Ok(record)
    }

    /// Update on the backend, then replace the matching record.
    pub async fn update(&self, id: &T::Id, patch: &T::Patch) -> Result<T> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let op = self.begin(Action::Update(id.clone()));
        let result = self.backend.update(id, patch).await;
        self.finish(op, &result);

        let record = result?;
        let policy = self.policy;
        self.apply(|mirror| {
            let Some(i) = mirror.position(id) else {
                return;
            };
            if policy == ReconcilePolicy::LatestIssuedWins {
                let applied = mirror.applied_seq.get(id).copied().unwrap_or(0);
                if seq < applied {
                    debug!(%id, seq, applied, "Dropping stale update response");
                    return;
                }
                mirror.applied_seq.insert(id.clone(), seq);
            }
            mirror.records[i] = record.clone();
        });
        Ok(record)
    }

    /// Delete on the backend, then drop the matching record.
    pub async fn remove(&self, id: &T::Id) -> Result<()> {
        let op = self.begin(Action::Remove(id.clone()));
        let result = self.backend.remove(id).await;
        self.finish(op, &result);

        result?;
        self.apply(|mirror| {
            mirror.records.retain(|r| r.id() != id);
            mirror.forget_missing();
        });
        Ok(())
    }

    fn begin(&self, action: Action<T::Id>) -> InFlight<'_, T, B> {
        self.mirror.lock().ops.entry(action.clone()).or_default().pending += 1;
        InFlight {
            resource: self,
            action: Some(action),
        }
    }

    fn finish<R>(&self, mut op: InFlight<'_, T, B>, result: &Result<R>) {
        let Some(action) = op.action.take() else {
            return;
        };
        let outcome = match result {
            Ok(_) => OpState::Success,
            Err(e) => {
                warn!(?action, kind = %e.kind(), "Remote operation failed: {}", e);
                OpState::Failed(e.kind())
            }
        };

        let mut mirror = self.mirror.lock();
        let entry = mirror.ops.entry(action).or_default();
        entry.pending = entry.pending.saturating_sub(1);
        entry.last = outcome;
    }

    fn apply(&self, change: impl FnOnce(&mut Mirror<T>)) {
        if self.is_detached() {
            debug!("Resource detached; discarding late result");
            return;
        }
        change(&mut *self.mirror.lock());
    }
}

/// Pending-count guard. Dropping it without `finish` (the calling future was
/// dropped mid-request) releases the count and leaves the last state as is.
struct InFlight<'a, T: Record, B: RecordBackend<T>> {
    resource: &'a RemoteResource<T, B>,
    action: Option<Action<T::Id>>,
}

impl<T: Record, B: RecordBackend<T>> Drop for InFlight<'_, T, B> {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            let mut mirror = self.resource.mirror.lock();
            if let Some(entry) = mirror.ops.get_mut(&action) {
                entry.pending = entry.pending.saturating_sub(1);
            }
        }
    }
}
