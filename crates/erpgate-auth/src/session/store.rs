//! In-memory session store with sliding idle expiry.
//!
//! Each identifier maps to its own slot behind an async mutex, so
//! operations on one session are serialized while different sessions
//! proceed independently. The map's shard locks are only ever held for
//! the duration of a lookup, never across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use erpgate_core::config::SessionConfig;
use erpgate_core::error::AppError;
use erpgate_core::result::AppResult;
use erpgate_odoo::ErpSession;

use super::id::SessionId;

/// A store entry. `session` is `None` once the entry has been
/// invalidated or expired, which is what a task still holding the slot
/// after removal observes.
#[derive(Debug)]
struct Slot {
    session: Option<ErpSession>,
    last_seen: Instant,
}

impl Slot {
    fn is_idle(&self, idle_timeout: Duration) -> bool {
        self.last_seen.elapsed() >= idle_timeout
    }
}

type SharedSlot = Arc<Mutex<Slot>>;

/// Maps gateway session identifiers to authenticated ERP sessions.
pub struct SessionStore {
    entries: DashMap<SessionId, SharedSlot>,
    idle_timeout: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("entries", &self.entries.len())
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl SessionStore {
    /// Creates an empty store whose sessions expire after `idle_timeout`
    /// without a touch.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            idle_timeout,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.idle_timeout())
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Stores `session` under a freshly generated identifier.
    ///
    /// The entry becomes visible in a single map insertion; an identifier
    /// that is already taken is never overwritten.
    pub fn create(&self, session: ErpSession) -> SessionId {
        let slot = Arc::new(Mutex::new(Slot {
            session: Some(session),
            last_seen: Instant::now(),
        }));

        loop {
            match self.entries.entry(SessionId::generate()) {
                Entry::Vacant(vacant) => {
                    let id = vacant.key().clone();
                    vacant.insert(slot);
                    return id;
                }
                Entry::Occupied(occupied) => {
                    warn!(
                        session = %occupied.key().short(),
                        "Generated session identifier collided, regenerating"
                    );
                }
            }
        }
    }

    /// Returns a copy of the live session for `id`.
    ///
    /// Does not extend the idle window. An idle session is removed and
    /// reported as not found.
    pub async fn get(&self, id: &SessionId) -> AppResult<ErpSession> {
        let slot = self.slot(id).ok_or_else(Self::not_found)?;
        let mut guard = slot.lock().await;
        self.live(id, &slot, &mut guard).map(|session| session.clone())
    }

    /// Marks the session as used now, restarting its idle window.
    pub async fn touch(&self, id: &SessionId) -> AppResult<()> {
        let slot = self.slot(id).ok_or_else(Self::not_found)?;
        let mut guard = slot.lock().await;
        self.live(id, &slot, &mut guard)?.last_used = Utc::now();
        guard.last_seen = Instant::now();
        Ok(())
    }

    /// Removes the entry for `id` and returns the session it held.
    ///
    /// Idle sessions are returned as well so the caller can still end
    /// them remotely.
    pub async fn take(&self, id: &SessionId) -> Option<ErpSession> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock().await;
        let session = guard.session.take();
        self.evict(id, &slot);
        session
    }

    /// Removes the entry for `id`. Returns whether one existed.
    pub async fn invalidate(&self, id: &SessionId) -> bool {
        self.take(id).await.is_some()
    }

    /// Removes every idle entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let candidates: Vec<(SessionId, SharedSlot)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut purged = 0;
        for (id, slot) in candidates {
            let mut guard = slot.lock().await;
            if guard.session.is_some() && !guard.is_idle(self.idle_timeout) {
                continue;
            }
            guard.session = None;
            self.evict(&id, &slot);
            purged += 1;
        }
        purged
    }

    /// Number of entries, including idle ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn not_found() -> AppError {
        AppError::not_found("Session not found")
    }

    fn slot(&self, id: &SessionId) -> Option<SharedSlot> {
        self.entries.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Removes `id` only if it still maps to `slot`.
    fn evict(&self, id: &SessionId, slot: &SharedSlot) {
        self.entries
            .remove_if(id, |_, current| Arc::ptr_eq(current, slot));
    }

    /// The live session in a locked slot, expiring it first if idle.
    fn live<'a>(
        &self,
        id: &SessionId,
        slot: &SharedSlot,
        guard: &'a mut Slot,
    ) -> Result<&'a mut ErpSession, AppError> {
        if guard.session.is_some() && guard.is_idle(self.idle_timeout) {
            guard.session = None;
            self.evict(id, slot);
            debug!(session = %id.short(), "Session expired after inactivity");
        }
        guard.session.as_mut().ok_or_else(Self::not_found)
    }
}
