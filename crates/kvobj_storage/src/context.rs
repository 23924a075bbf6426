//! Engine context traits.

use crate::input::ArgSlice;
use crate::output::ObjectOutput;
use crate::status::EngineStatus;

/// A session-bound handle to the object store.
///
/// Contexts are the engine's side of every object command. Each context is
/// driven by one logical thread at a time; the engine provides its own
/// concurrency control across contexts.
///
/// # Invariants
///
/// - `rmw` and `read` may return a pending outcome; the output capsule is
///   only meaningful once the outcome is terminal
/// - A callback that finds a value of the wrong type leaves the capsule
///   with zero content length and reports the record as found
/// - Read callbacks never set record flags
pub trait ObjectContext {
    /// Returns true if a live session is attached.
    ///
    /// A context without a session belongs to a server started with the
    /// object store disabled.
    fn has_session(&self) -> bool;

    /// Runs a read-modify-write against `key`.
    fn rmw(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        output: &mut ObjectOutput<'_>,
    ) -> EngineStatus;

    /// Runs a read against `key`.
    fn read(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        output: &mut ObjectOutput<'_>,
    ) -> EngineStatus;
}

/// Completes pending operations for a context.
///
/// The resolver blocks until the engine has finished the outstanding
/// operation, then writes the terminal outcome into `status` and the reply
/// into `output`. Retry policy and I/O ordering belong to the implementor.
pub trait PendingResolver<C: ?Sized> {
    /// Waits for the pending operation and stores its terminal outcome.
    fn complete_pending(
        &mut self,
        ctx: &mut C,
        status: &mut EngineStatus,
        output: &mut ObjectOutput<'_>,
    );
}
