//! Per-transfer session state and the arena that owns it.
//!
//! Multi-transfer engines identify a transfer back to their embedder with an
//! opaque per-transfer context. Instead of a raw pointer, the context here is
//! a [`SessionToken`]: a slab index paired with a generation counter. A token
//! that outlives its session (engine bug, duplicated completion) fails the
//! generation check and is rejected instead of touching reused memory.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use slab::Slab;

use crate::client::Shared;
use crate::codec::ResponseCollector;
use crate::protocol::Callback;
use crate::transfer::TransferId;

/// Opaque per-transfer context handed to the transfer engine.
///
/// Valid only while the session it was minted for is alive, stale tokens
/// are rejected by [`SessionTable`] lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken {
    index: usize,
    generation: u64,
}

/// State of one in-flight request, owned by the reactor side from
/// submission until its callback is dispatched.
///
/// The outgoing body lives here for the whole transfer because the engine
/// may reference it for as long as the transfer runs. The shared-state guard
/// keeps the client's shared state alive while any session is in flight and
/// is released exactly once, when the session is destroyed after callback
/// handoff.
pub(crate) struct TransferSession {
    pub(crate) url: String,
    pub(crate) body: Bytes,
    pub(crate) collector: ResponseCollector,
    callback: Callback,
    pub(crate) transfer: Option<TransferId>,
    _keep_alive: Arc<Shared>,
}

impl TransferSession {
    pub(crate) fn new(url: String, body: Bytes, callback: Callback, keep_alive: Arc<Shared>) -> Self {
        Self { url, body, collector: ResponseCollector::new(), callback, transfer: None, _keep_alive: keep_alive }
    }

    /// Splits the session into the pieces completion dispatch needs,
    /// releasing everything else.
    pub(crate) fn into_parts(self) -> (String, ResponseCollector, Callback) {
        (self.url, self.collector, self.callback)
    }
}

impl fmt::Debug for TransferSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferSession")
            .field("url", &self.url)
            .field("body_len", &self.body.len())
            .field("transfer", &self.transfer)
            .finish_non_exhaustive()
    }
}

struct Entry {
    generation: u64,
    session: TransferSession,
}

/// Arena of in-flight sessions addressed by generation-checked tokens.
///
/// Confined to the reactor thread, exactly one session exists per in-flight
/// transfer and each is removed exactly once.
#[derive(Default)]
pub(crate) struct SessionTable {
    slots: Slab<Entry>,
    generation: u64,
}

impl SessionTable {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn insert(&mut self, session: TransferSession) -> SessionToken {
        self.generation += 1;
        let generation = self.generation;
        let index = self.slots.insert(Entry { generation, session });
        SessionToken { index, generation }
    }

    pub(crate) fn get_mut(&mut self, token: SessionToken) -> Option<&mut TransferSession> {
        self.slots
            .get_mut(token.index)
            .filter(|entry| entry.generation == token.generation)
            .map(|entry| &mut entry.session)
    }

    pub(crate) fn remove(&mut self, token: SessionToken) -> Option<TransferSession> {
        let live = self.slots.get(token.index).is_some_and(|entry| entry.generation == token.generation);
        if !live {
            return None;
        }
        self.slots.try_remove(token.index).map(|entry| entry.session)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

impl fmt::Debug for SessionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTable").field("len", &self.slots.len()).field("generation", &self.generation).finish()
    }
}
