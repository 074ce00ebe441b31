//! Mock backends for testing.
//!
//! [`GatedBackend`] is an in-memory sleep collection whose updates can be
//! held open until the test releases them, so response ordering is under
//! the test's control.

use async_trait::async_trait;
use neonest::api::RecordBackend;
use neonest::sleep::{NewSleepEntry, SleepEntry, SleepPatch, SleepType};
use neonest::types::{AppError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

/// A nap entry with the given id, date and time.
pub fn entry(id: &str, date: &str, time: &str) -> SleepEntry {
    SleepEntry {
        id: id.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        kind: SleepType::Nap,
        duration: "1 hr".to_string(),
        mood: None,
        notes: String::new(),
        baby_name: "YourBaby".to_string(),
    }
}

/// Patch that only sets `notes`; the notes double as the gate key.
pub fn notes_patch(notes: &str) -> SleepPatch {
    SleepPatch {
        notes: Some(notes.to_string()),
        ..SleepPatch::default()
    }
}

/// In-memory backend with per-update gates and one-shot failures.
pub struct GatedBackend {
    records: Mutex<Vec<SleepEntry>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    failure: Mutex<Option<AppError>>,
    update_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl GatedBackend {
    pub fn new(records: Vec<SleepEntry>) -> Self {
        Self {
            records: Mutex::new(records),
            gates: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            update_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(100),
        }
    }

    /// Hold updates whose patch notes equal `key` until the sender fires.
    pub fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(key.to_string(), rx);
        tx
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: AppError) {
        *self.failure.lock() = Some(err);
    }

    /// Updates that have reached the backend so far
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<SleepEntry> {
        self.records.lock().clone()
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordBackend<SleepEntry> for GatedBackend {
    async fn list(&self) -> Result<Vec<SleepEntry>> {
        self.check_failure()?;
        Ok(self.stored())
    }

    async fn create(&self, draft: &NewSleepEntry) -> Result<SleepEntry> {
        self.check_failure()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let record = SleepEntry {
            id,
            date: draft.date.clone(),
            time: draft.time.clone(),
            kind: draft.kind,
            duration: draft.duration.clone(),
            mood: draft.mood,
            notes: draft.notes.clone(),
            baby_name: draft.baby_name.clone(),
        };
        self.records.lock().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &String, patch: &SleepPatch) -> Result<SleepEntry> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let gate = patch
            .notes
            .as_ref()
            .and_then(|key| self.gates.lock().remove(key));
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        self.check_failure()?;

        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| AppError::from_status(404, Some("Sleep entry not found".to_string())))?;
        if let Some(time) = &patch.time {
            record.time = time.clone();
        }
        if let Some(kind) = patch.kind {
            record.kind = kind;
        }
        if let Some(duration) = &patch.duration {
            record.duration = duration.clone();
        }
        if let Some(mood) = patch.mood {
            record.mood = mood.0;
        }
        if let Some(notes) = &patch.notes {
            record.notes = notes.clone();
        }
        Ok(record.clone())
    }

    async fn remove(&self, id: &String) -> Result<()> {
        self.check_failure()?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(AppError::from_status(404, Some("Sleep entry not found".to_string())));
        }
        Ok(())
    }
}
