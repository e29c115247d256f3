//! Per-session case context store.
//!
//! Holds one [`CaseContext`] per session id and decides when a
//! re-extraction is worth an oracle round-trip.
//!
//! Key properties:
//! - `ensure` re-extracts only while the context is incomplete and a
//!   transcript is available; a complete context is returned as-is
//! - Merges only ever add information — an empty field in a newer
//!   extraction never erases a stored value
//! - The read-merge-write sequence runs under a per-session mutex, so
//!   two concurrent `ensure` calls for one session cannot interleave
//!   and cannot trigger a second oracle call
//! - Sessions are evicted only on request (`remove`, `evict_idle`)

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, TryLockError};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::models::{CaseContext, CaseContextPatch};
use crate::numeric::is_positive_finite;
use crate::oracle::OracleClient;
use crate::pipeline::context::ContextExtractor;

// ═══════════════════════════════════════════════════════════
// SessionSlot — one session's context plus activity time
// ═══════════════════════════════════════════════════════════

struct SessionSlot {
    context: CaseContext,
    updated_at: DateTime<Utc>,
}

impl SessionSlot {
    fn empty() -> Self {
        Self {
            context: CaseContext::default(),
            updated_at: Utc::now(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// SessionContextStore — all sessions
// ═══════════════════════════════════════════════════════════

/// Shared store of per-session case contexts.
///
/// The map lock is held only to look slots up; all context work happens
/// under the slot's own mutex, so sessions never block each other.
pub struct SessionContextStore {
    extractor: ContextExtractor,
    suggestion_cap: usize,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionSlot>>>>,
}

impl SessionContextStore {
    pub fn new(extractor: ContextExtractor, suggestion_cap: usize) -> Self {
        Self {
            extractor,
            suggestion_cap,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(client: Arc<dyn OracleClient>, config: &PipelineConfig) -> Self {
        Self::new(
            ContextExtractor::from_config(client, config),
            config.suggestion_cap,
        )
    }

    /// Mint a fresh session id. The session itself materializes on first
    /// use.
    pub fn create_session(&self) -> String {
        Uuid::new_v4().to_string()
    }

    // ── Context operations ───────────────────────────────

    /// Current context for a session, without creating one.
    pub fn get(&self, session_id: &str) -> Result<Option<CaseContext>, SessionStoreError> {
        let slot = {
            let sessions = self
                .sessions
                .read()
                .map_err(|_| SessionStoreError::LockPoisoned)?;
            sessions.get(session_id).cloned()
        };
        match slot {
            Some(slot) => {
                let slot = slot.lock().map_err(|_| SessionStoreError::LockPoisoned)?;
                Ok(Some(slot.context.clone()))
            }
            None => Ok(None),
        }
    }

    /// Return the session's context, re-extracting first if it is still
    /// incomplete and a transcript is available (passed in, or stored
    /// from an earlier call). A complete context comes back unchanged
    /// with no oracle traffic.
    pub fn ensure(
        &self,
        session_id: &str,
        transcript: Option<&str>,
    ) -> Result<CaseContext, SessionStoreError> {
        let slot = self.slot(session_id)?;
        let mut slot = slot.lock().map_err(|_| SessionStoreError::LockPoisoned)?;

        if !slot.context.is_complete() {
            let provided = transcript.map(str::trim).filter(|t| !t.is_empty());
            let source = provided
                .map(str::to_string)
                .or_else(|| slot.context.transcript.clone());
            if let Some(text) = source {
                // the oracle round-trip stays under the slot lock; the
                // read-merge-write sequence is atomic per session
                let extraction = self.extractor.extract(&text);
                slot.context.merge_from(&extraction);
            }
        }

        slot.updated_at = Utc::now();
        Ok(slot.context.clone())
    }

    /// Apply a caller-supplied partial update. Fields follow the same
    /// non-empty-overwrites rule as extraction merges.
    pub fn set(
        &self,
        session_id: &str,
        patch: &CaseContextPatch,
    ) -> Result<CaseContext, SessionStoreError> {
        validate_patch(patch)?;
        let slot = self.slot(session_id)?;
        let mut slot = slot.lock().map_err(|_| SessionStoreError::LockPoisoned)?;
        patch.apply_to(&mut slot.context);
        slot.updated_at = Utc::now();
        Ok(slot.context.clone())
    }

    /// Fold fresh drug suggestions into the session: fresh names first,
    /// stored ones after, de-duplicated and capped. Returns the merged
    /// list.
    pub fn absorb_suggestions(
        &self,
        session_id: &str,
        fresh: &[String],
    ) -> Result<Vec<String>, SessionStoreError> {
        let slot = self.slot(session_id)?;
        let mut slot = slot.lock().map_err(|_| SessionStoreError::LockPoisoned)?;
        slot.context.merge_suggestions(fresh, self.suggestion_cap);
        slot.updated_at = Utc::now();
        Ok(slot.context.drug_suggestions.clone())
    }

    // ── Lifecycle ────────────────────────────────────────

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, session_id: &str) -> Result<bool, SessionStoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(sessions.remove(session_id).is_some())
    }

    /// Drop every session idle for `max_age` or longer. Slots busy in
    /// another thread count as active; poisoned slots are dropped.
    /// Returns the eviction count.
    pub fn evict_idle(&self, max_age: Duration) -> Result<usize, SessionStoreError> {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        let before = sessions.len();
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(slot) => now.signed_duration_since(slot.updated_at) < max_age,
            Err(TryLockError::WouldBlock) => true,
            Err(TryLockError::Poisoned(_)) => false,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "evicted idle sessions");
        }
        Ok(evicted)
    }

    /// Number of materialized sessions.
    pub fn len(&self) -> Result<usize, SessionStoreError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(sessions.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionStoreError> {
        Ok(self.len()? == 0)
    }

    /// Fetch the slot for a session, creating an empty placeholder on
    /// first contact.
    fn slot(&self, session_id: &str) -> Result<Arc<Mutex<SessionSlot>>, SessionStoreError> {
        {
            let sessions = self
                .sessions
                .read()
                .map_err(|_| SessionStoreError::LockPoisoned)?;
            if let Some(slot) = sessions.get(session_id) {
                return Ok(slot.clone());
            }
        }
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionSlot::empty())))
            .clone())
    }
}

fn validate_patch(patch: &CaseContextPatch) -> Result<(), SessionStoreError> {
    for (field, value) in [("age_years", patch.age_years), ("weight_kg", patch.weight_kg)] {
        if let Some(value) = value {
            if !is_positive_finite(value) {
                return Err(SessionStoreError::InvalidField {
                    field,
                    reason: "must be a positive number",
                });
            }
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store lock poisoned")]
    LockPoisoned,
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
