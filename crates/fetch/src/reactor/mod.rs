//! The reactor capability contract.
//!
//! A reactor delivers two kinds of wakeups to the event loop: socket
//! readiness and expiry of a single one-shot timer. The client core never
//! polls sockets itself, it registers interest through this trait and reacts
//! to the events handed back from [`Reactor::wait`].
//!
//! Implementations are driven from exactly one thread, the client's reactor
//! thread, so they need not be thread-safe.

use std::io;
use std::time::Duration;

/// Raw socket descriptor as reported by the transfer engine.
pub type SocketFd = i32;

/// Readiness directions of interest for a socket, or reported by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interest {
    read: bool,
    write: bool,
}

impl Interest {
    pub const NONE: Interest = Interest { read: false, write: false };
    pub const READ: Interest = Interest { read: true, write: false };
    pub const WRITE: Interest = Interest { read: false, write: true };
    pub const BOTH: Interest = Interest { read: true, write: true };

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.read
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.write
    }

    /// True when no direction is set, a disarmed registration.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.read && !self.write
    }
}

/// A wakeup delivered by [`Reactor::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactorEvent {
    /// A watched socket became ready in the given directions.
    Io { fd: SocketFd, readiness: Interest },
    /// The shared one-shot timer elapsed.
    TimerExpired,
}

/// Socket-readiness and timer notification source.
///
/// The timer is a single shared resource: arming it replaces any pending
/// deadline, so at most one deadline is outstanding at a time.
pub trait Reactor {
    /// Live registration handle for one socket.
    type Io;

    /// Starts watching `fd` for the given directions.
    fn register_io(&mut self, fd: SocketFd, interest: Interest) -> io::Result<Self::Io>;

    /// Replaces the watched directions of an existing registration.
    fn modify_io(&mut self, io: &mut Self::Io, interest: Interest) -> io::Result<()>;

    /// Stops watching and releases the registration.
    fn unregister_io(&mut self, io: Self::Io);

    /// Arms the one-shot timer to fire after `after`, replacing any pending
    /// deadline.
    fn arm_timer(&mut self, after: Duration);

    /// Cancels the pending deadline, if any.
    fn disarm_timer(&mut self);

    /// Blocks until a socket is ready, the timer expires, or `max_wait`
    /// elapses, whichever comes first, and appends the resulting events.
    ///
    /// Returning with no events after `max_wait` is how the event loop gets
    /// its chance to poll the stop flag and pick up new submissions.
    fn wait(&mut self, max_wait: Duration, events: &mut Vec<ReactorEvent>) -> io::Result<()>;
}
