//! Harvesting of finished transfers.
//!
//! Runs after every engine progress call. Each finished transfer is
//! unregistered from the engine, its session is removed from the table
//! synchronously on the reactor thread (no further progress call can reach
//! it), and the callback plus the extracted outcome are handed to the
//! executor as one unit of work. The session's remaining resources are
//! released here, before the callback necessarily runs, which is safe
//! because the callback only ever sees the finalized response or error
//! value.

use tracing::{debug, warn};

use crate::client::bridge::ReactorBridge;
use crate::client::event_loop::LoopHooks;
use crate::executor::Executor;
use crate::protocol::TransferError;
use crate::reactor::Reactor;
use crate::transfer::{Finished, SessionTable, TransferEngine, TransferOutcome};

/// Polls the engine for finished transfers until none remain and dispatches
/// each callback exactly once.
pub(crate) fn drain_completions<E: TransferEngine, R: Reactor>(
    engine: &mut E,
    bridge: &mut ReactorBridge<R>,
    sessions: &mut SessionTable,
    executor: &dyn Executor,
) {
    while let Some(Finished { id, token, outcome }) = engine.poll_finished() {
        {
            let mut hooks = LoopHooks { bridge: &mut *bridge, sessions: &mut *sessions };
            engine.remove_transfer(id, &mut hooks);
        }

        let Some(session) = sessions.remove(token) else {
            warn!(id = id.0, "finished transfer has no live session, dropping");
            continue;
        };
        let (url, mut collector, callback) = session.into_parts();

        match outcome {
            TransferOutcome::Success { status } => {
                collector.set_status(status);
                let response = collector.finalize();
                debug!(url = %url, status = %status, "transfer finished");
                executor.submit(Box::new(move || callback(Ok(response))));
            }
            TransferOutcome::Failed { message } => {
                warn!(url = %url, cause = %message, "transfer failed");
                executor.submit(Box::new(move || callback(Err(TransferError::new(message)))));
            }
        }
    }
}
