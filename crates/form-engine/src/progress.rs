//! Saving and restoring in-progress form answers.
//!
//! Progress is stored as JSON `{form_id, data, saved_at}` under the key
//! `form_progress_{form_id}`. Loading never fails: missing, unreadable or
//! malformed entries all mean "no saved progress".

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;
use crate::field::FormData;
use crate::store::KeyValueStore;

/// A checkpoint of one form's answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub form_id: String,
    pub data: FormData,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub saved_at: String,
}

/// Progress checkpoints for one session, backed by a key-value store.
#[derive(Debug, Clone, Default)]
pub struct ProgressPersistence<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Persist the current answers, replacing any earlier checkpoint.
    ///
    /// # Errors
    /// Returns a `StoreError` if the entry cannot be serialized or written.
    pub fn save(&mut self, form_id: &str, data: &FormData) -> Result<SavedProgress, StoreError> {
        let saved = SavedProgress {
            form_id: form_id.to_string(),
            data: data.clone(),
            saved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.store
            .set(&progress_key(form_id), serde_json::to_string(&saved)?)?;
        Ok(saved)
    }

    /// The last checkpoint for a form, if there is a readable one.
    pub fn load(&self, form_id: &str) -> Option<SavedProgress> {
        let raw = match self.store.get(&progress_key(form_id)) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(form_id, error = %err, "failed to read saved progress");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(saved) => Some(saved),
            Err(err) => {
                warn!(form_id, error = %err, "discarding malformed saved progress");
                None
            }
        }
    }

    /// Drop the checkpoint for a form.
    ///
    /// # Errors
    /// Returns a `StoreError` if the store fails to remove the entry.
    pub fn clear(&mut self, form_id: &str) -> Result<(), StoreError> {
        self.store.remove(&progress_key(form_id))
    }
}

fn progress_key(form_id: &str) -> String {
    format!("form_progress_{}", form_id)
}
