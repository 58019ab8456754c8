//! The executor capability contract.
//!
//! User callbacks never run on the reactor thread. The completion drain
//! packages each finished transfer's callback and outcome into one unit of
//! work and submits it here, the executor runs it exactly once on one of its
//! worker threads, with no ordering guarantee between units.

/// A packaged callback invocation, ready to run anywhere.
pub type UnitOfWork = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool that runs submitted units of work asynchronously.
///
/// Shared between the client handle and the reactor thread, so
/// implementations must be `Send + Sync`. The pool's internal queueing and
/// synchronization are its own concern.
pub trait Executor: Send + Sync {
    /// Submits a unit of work to be run exactly once, asynchronously, on an
    /// unspecified worker thread.
    fn submit(&self, work: UnitOfWork);
}
