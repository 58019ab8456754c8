//! Glue between the transfer engine's registration requests and the reactor.
//!
//! The engine declares what it wants watched ("socket 7, read and write",
//! "wake me in 120ms") without knowing anything about the reactor behind it.
//! [`ReactorBridge`] owns that translation plus the table of live
//! [`SocketWatch`]es. It lives on the reactor thread only, the table needs no
//! locking because nothing else can reach it.

use std::io;
use std::time::Duration;

use slab::Slab;
use tracing::{error, warn};

use crate::reactor::{Interest, Reactor, ReactorEvent, SocketFd};
use crate::transfer::WatchKey;

/// One socket the transfer engine currently cares about.
///
/// The reactor registration is always consistent with the last-declared
/// directions: `io` is `Some` exactly while a non-empty interest is armed.
#[derive(Debug)]
struct SocketWatch<Io> {
    fd: SocketFd,
    interest: Interest,
    io: Option<Io>,
}

/// Owns the reactor handle, the socket-watch table and the single shared
/// timeout on behalf of the event loop.
pub(crate) struct ReactorBridge<R: Reactor> {
    reactor: R,
    watches: Slab<SocketWatch<R::Io>>,
}

impl<R: Reactor> ReactorBridge<R> {
    pub(crate) fn new(reactor: R) -> Self {
        Self { reactor, watches: Slab::new() }
    }

    /// Creates or updates the watch for `fd`, keeping the reactor
    /// registration in step with the requested directions.
    ///
    /// A direction change modifies the existing registration in place, the
    /// transition never leaves a stale registration armed. An unknown
    /// `existing` key (already dropped) is treated as a fresh watch.
    pub(crate) fn want_socket(&mut self, fd: SocketFd, interest: Interest, existing: Option<WatchKey>) -> WatchKey {
        let key = match existing {
            Some(key) if self.watches.contains(key.0) => key,
            Some(key) => {
                warn!(fd, key = key.0, "direction change for unknown watch, registering fresh");
                self.insert_watch(fd)
            }
            None => self.insert_watch(fd),
        };
        self.update_watch(key, fd, interest);
        key
    }

    /// Unregisters and releases a watch. Absent or already-removed keys are
    /// a no-op.
    pub(crate) fn drop_socket(&mut self, watch: Option<WatchKey>) {
        let Some(key) = watch else {
            return;
        };
        let Some(mut watch) = self.watches.try_remove(key.0) else {
            return;
        };
        if let Some(io) = watch.io.take() {
            self.reactor.unregister_io(io);
        }
    }

    /// Replaces the shared timeout: disarm unconditionally, then arm the new
    /// deadline if one was given.
    pub(crate) fn want_timeout(&mut self, timeout: Option<Duration>) {
        self.reactor.disarm_timer();
        if let Some(after) = timeout {
            self.reactor.arm_timer(after);
        }
    }

    pub(crate) fn disarm_timer(&mut self) {
        self.reactor.disarm_timer();
    }

    pub(crate) fn wait(&mut self, max_wait: Duration, events: &mut Vec<ReactorEvent>) -> io::Result<()> {
        self.reactor.wait(max_wait, events)
    }

    fn insert_watch(&mut self, fd: SocketFd) -> WatchKey {
        WatchKey(self.watches.insert(SocketWatch { fd, interest: Interest::NONE, io: None }))
    }

    fn update_watch(&mut self, key: WatchKey, fd: SocketFd, interest: Interest) {
        let Some(watch) = self.watches.get_mut(key.0) else {
            return;
        };
        watch.fd = fd;
        watch.interest = interest;

        if interest.is_empty() {
            if let Some(io) = watch.io.take() {
                self.reactor.unregister_io(io);
            }
        } else if let Some(io) = watch.io.as_mut() {
            if let Err(e) = self.reactor.modify_io(io, interest) {
                error!(fd, cause = %e, "failed to update socket watch");
            }
        } else {
            match self.reactor.register_io(fd, interest) {
                Ok(io) => watch.io = Some(io),
                Err(e) => error!(fd, cause = %e, "failed to register socket watch"),
            }
        }
    }

    #[cfg(test)]
    fn watch_count(&self) -> usize {
        self.watches.len()
    }
}
