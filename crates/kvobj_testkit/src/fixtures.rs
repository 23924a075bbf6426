//! Scripted engine doubles.
//!
//! [`ScriptedContext`] plays the engine: each call pops the next
//! [`ScriptedReply`], records what it was asked, and writes the scripted
//! body into the output capsule. Replies marked deferred come back pending
//! and are finished by [`ScriptedResolver`].

use kvobj_storage::{
    ArgSlice, EngineStatus, MemoryPool, ObjectContext, ObjectOutput, ObjectOutputHeader,
    PendingResolver,
};
use std::collections::VecDeque;
use tracing::trace;

/// Which engine operation was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// `ObjectContext::rmw`.
    Rmw,
    /// `ObjectContext::read`.
    Read,
}

/// One engine call seen by a [`ScriptedContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Operation kind.
    pub kind: CallKind,
    /// Key bytes.
    pub key: Vec<u8>,
    /// Input payload bytes.
    pub input: Vec<u8>,
}

/// What a scripted callback writes into the capsule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    /// Leave the capsule as the caller built it.
    Untouched,
    /// Replace the content with these bytes.
    Bytes(Vec<u8>),
    /// Write a fixed header.
    Header(ObjectOutputHeader),
    /// Clear the content, as a failed type check does.
    WrongType,
}

/// A canned engine reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedReply {
    /// Terminal outcome reported for the call.
    pub status: EngineStatus,
    /// Capsule body written by the callback.
    pub body: ReplyBody,
    /// Report pending first and deliver on completion.
    pub deferred: bool,
}

impl ScriptedReply {
    /// A reply with the given outcome that leaves the capsule untouched.
    pub fn new(status: EngineStatus) -> Self {
        Self {
            status,
            body: ReplyBody::Untouched,
            deferred: false,
        }
    }

    /// A found record whose type check failed.
    pub fn wrong_type() -> Self {
        Self::new(EngineStatus::found()).with_body(ReplyBody::WrongType)
    }

    /// Sets the capsule body.
    pub fn with_body(mut self, body: ReplyBody) -> Self {
        self.body = body;
        self
    }

    /// Writes `bytes` into the capsule.
    pub fn with_bytes(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_body(ReplyBody::Bytes(bytes.into()))
    }

    /// Writes a header carrying `result`.
    pub fn with_header(self, result: i32) -> Self {
        self.with_body(ReplyBody::Header(ObjectOutputHeader::new(result)))
    }

    /// Defers the reply behind a pending outcome.
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    fn apply(&self, pool: &MemoryPool, output: &mut ObjectOutput<'_>) -> EngineStatus {
        match &self.body {
            ReplyBody::Untouched => {}
            ReplyBody::Bytes(bytes) => output.write(pool, bytes),
            ReplyBody::Header(header) => output.write_header(pool, *header),
            ReplyBody::WrongType => output.mark_wrong_type(),
        }
        self.status
    }
}

/// A programmable [`ObjectContext`].
///
/// With no scripted replies left, calls report a missing key and leave the
/// capsule untouched.
#[derive(Debug)]
pub struct ScriptedContext {
    session: bool,
    pool: MemoryPool,
    replies: VecDeque<ScriptedReply>,
    parked: Option<ScriptedReply>,
    calls: Vec<RecordedCall>,
}

impl Default for ScriptedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedContext {
    /// A context with a live session and its own pool.
    pub fn new() -> Self {
        Self {
            session: true,
            pool: MemoryPool::new(),
            replies: VecDeque::new(),
            parked: None,
            calls: Vec::new(),
        }
    }

    /// A context of a server started with the object store disabled.
    pub fn without_session() -> Self {
        Self {
            session: false,
            ..Self::new()
        }
    }

    /// Uses `pool` for rented output.
    pub fn with_pool(mut self, pool: MemoryPool) -> Self {
        self.pool = pool;
        self
    }

    /// Queues a reply.
    pub fn reply(mut self, reply: ScriptedReply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Queues a reply.
    pub fn push_reply(&mut self, reply: ScriptedReply) {
        self.replies.push_back(reply);
    }

    /// The pool callbacks rent from.
    pub fn pool(&self) -> &MemoryPool {
        &self.pool
    }

    /// Calls made so far.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Returns true while a deferred reply waits for completion.
    pub fn has_parked(&self) -> bool {
        self.parked.is_some()
    }

    /// Delivers the parked reply. Returns false when nothing was parked.
    pub fn complete_parked(
        &mut self,
        status: &mut EngineStatus,
        output: &mut ObjectOutput<'_>,
    ) -> bool {
        match self.parked.take() {
            Some(reply) => {
                *status = reply.apply(&self.pool, output);
                true
            }
            None => false,
        }
    }

    fn dispatch(
        &mut self,
        kind: CallKind,
        key: &[u8],
        input: ArgSlice<'_>,
        output: &mut ObjectOutput<'_>,
    ) -> EngineStatus {
        self.calls.push(RecordedCall {
            kind,
            key: key.to_vec(),
            input: input.as_bytes().to_vec(),
        });

        let reply = self
            .replies
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::new(EngineStatus::not_found()));
        if reply.deferred {
            trace!(?kind, "parking deferred reply");
            self.parked = Some(reply);
            return EngineStatus::pending();
        }
        reply.apply(&self.pool, output)
    }
}

impl ObjectContext for ScriptedContext {
    fn has_session(&self) -> bool {
        self.session
    }

    fn rmw(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        output: &mut ObjectOutput<'_>,
    ) -> EngineStatus {
        self.dispatch(CallKind::Rmw, key, input, output)
    }

    fn read(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        output: &mut ObjectOutput<'_>,
    ) -> EngineStatus {
        self.dispatch(CallKind::Read, key, input, output)
    }
}

/// Completes deferred replies of a [`ScriptedContext`] and counts how often
/// it was asked to.
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    completions: usize,
}

impl ScriptedResolver {
    /// Creates a resolver with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `complete_pending` calls.
    pub fn completions(&self) -> usize {
        self.completions
    }
}

impl PendingResolver<ScriptedContext> for ScriptedResolver {
    fn complete_pending(
        &mut self,
        ctx: &mut ScriptedContext,
        status: &mut EngineStatus,
        output: &mut ObjectOutput<'_>,
    ) {
        self.completions += 1;
        if !ctx.complete_parked(status, output) {
            trace!("no parked reply; completing as not found");
            *status = EngineStatus::not_found();
        }
    }
}
