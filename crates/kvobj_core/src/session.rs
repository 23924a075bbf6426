//! Object-store operation dispatch.
//!
//! A [`StorageSession`] forwards object commands to the engine through an
//! [`ObjectContext`], waits out pending operations with its
//! [`PendingResolver`] and maps the terminal outcome to an [`ObjectStatus`].
//!
//! The session is the hot path of every object command: it never logs,
//! never retries beyond the single pending completion and holds no
//! reference past the call.

use crate::config::SessionConfig;
use crate::error::{CoreError, CoreResult};
use crate::output::FooterBuffer;
use crate::status::{translate, ObjectStatus, OperationPath};
use kvobj_storage::{
    ArgSlice, EngineStatus, ObjectContext, ObjectOutput, ObjectOutputHeader, PendingResolver,
    OBJECT_OUTPUT_HEADER_SIZE,
};

/// Dispatches object-store operations for one logical client.
///
/// # Example
///
/// ```rust,ignore
/// let mut session = StorageSession::new(SessionConfig::default(), resolver)?;
/// let (status, header) = session.rmw_object_store_operation(b"key", input, &mut ctx)?;
/// ```
#[derive(Debug)]
pub struct StorageSession<P> {
    config: SessionConfig,
    resolver: P,
}

impl<P> StorageSession<P> {
    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: SessionConfig, resolver: P) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config, resolver })
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The pending resolver.
    pub fn resolver(&self) -> &P {
        &self.resolver
    }

    /// The pending resolver, mutably.
    pub fn resolver_mut(&mut self) -> &mut P {
        &mut self.resolver
    }

    /// A footer buffer sized for this session.
    pub fn footer_buffer(&self) -> FooterBuffer {
        FooterBuffer::new(&self.config)
    }

    /// Read-modify-write with a fixed header reply.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ObjectStoreDisabled`] if `ctx` has no session.
    pub fn rmw_object_store_operation<C>(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        ctx: &mut C,
    ) -> CoreResult<(ObjectStatus, ObjectOutputHeader)>
    where
        C: ObjectContext + ?Sized,
        P: PendingResolver<C>,
    {
        ensure_session(ctx)?;

        let mut header = [0u8; OBJECT_OUTPUT_HEADER_SIZE];
        let mut output = ObjectOutput::header(&mut header);
        let mut status = ctx.rmw(key, input, &mut output);
        self.complete_if_pending(ctx, &mut status, &mut output);

        Ok(header_reply(&status, &output, OperationPath::Rmw))
    }

    /// Read-modify-write whose reply is written into `output`.
    ///
    /// The reply stays in `output` for the caller to decode.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ObjectStoreDisabled`] if `ctx` has no session.
    pub fn rmw_object_store_operation_with_output<C>(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        ctx: &mut C,
        output: &mut ObjectOutput<'_>,
    ) -> CoreResult<ObjectStatus>
    where
        C: ObjectContext + ?Sized,
        P: PendingResolver<C>,
    {
        ensure_session(ctx)?;

        let mut status = ctx.rmw(key, input, output);
        self.complete_if_pending(ctx, &mut status, output);

        Ok(translate(&status, output.len(), OperationPath::Rmw))
    }

    /// Read whose reply is written into `output`.
    ///
    /// An empty reply is reported as [`ObjectStatus::WrongType`] even when
    /// the key is missing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ObjectStoreDisabled`] if `ctx` has no session.
    pub fn read_object_store_operation_with_output<C>(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        ctx: &mut C,
        output: &mut ObjectOutput<'_>,
    ) -> CoreResult<ObjectStatus>
    where
        C: ObjectContext + ?Sized,
        P: PendingResolver<C>,
    {
        ensure_session(ctx)?;

        let mut status = ctx.read(key, input, output);
        self.complete_if_pending(ctx, &mut status, output);

        Ok(translate(
            &status,
            output.len(),
            OperationPath::ReadWithOutput,
        ))
    }

    /// Read with a fixed header reply.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ObjectStoreDisabled`] if `ctx` has no session.
    pub fn read_object_store_operation<C>(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        ctx: &mut C,
    ) -> CoreResult<(ObjectStatus, ObjectOutputHeader)>
    where
        C: ObjectContext + ?Sized,
        P: PendingResolver<C>,
    {
        ensure_session(ctx)?;

        let mut header = [0u8; OBJECT_OUTPUT_HEADER_SIZE];
        let mut output = ObjectOutput::header(&mut header);
        let mut status = ctx.read(key, input, &mut output);
        self.complete_if_pending(ctx, &mut status, &mut output);

        Ok(header_reply(&status, &output, OperationPath::Read))
    }

    /// Iterates an object's members; the scan reply lands in `output`.
    ///
    /// Same contract as [`Self::read_object_store_operation_with_output`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ObjectStoreDisabled`] if `ctx` has no session.
    pub fn object_scan<C>(
        &mut self,
        key: &[u8],
        input: ArgSlice<'_>,
        ctx: &mut C,
        output: &mut ObjectOutput<'_>,
    ) -> CoreResult<ObjectStatus>
    where
        C: ObjectContext + ?Sized,
        P: PendingResolver<C>,
    {
        self.read_object_store_operation_with_output(key, input, ctx, output)
    }

    fn complete_if_pending<C>(
        &mut self,
        ctx: &mut C,
        status: &mut EngineStatus,
        output: &mut ObjectOutput<'_>,
    ) where
        C: ?Sized,
        P: PendingResolver<C>,
    {
        if status.is_pending() {
            self.resolver.complete_pending(ctx, status, output);
            debug_assert!(!status.is_pending(), "resolver left the operation pending");
        }
    }
}

fn header_reply(
    status: &EngineStatus,
    output: &ObjectOutput<'_>,
    path: OperationPath,
) -> (ObjectStatus, ObjectOutputHeader) {
    let result = translate(status, output.len(), path);
    debug_assert!(
        result == ObjectStatus::WrongType || output.is_inline(),
        "fixed header reply must stay inline"
    );
    (result, ObjectOutputHeader::from_output(output))
}

#[inline]
fn ensure_session<C: ObjectContext + ?Sized>(ctx: &C) -> CoreResult<()> {
    if !ctx.has_session() {
        return Err(object_store_disabled());
    }
    Ok(())
}

#[cold]
#[inline(never)]
fn object_store_disabled() -> CoreError {
    CoreError::ObjectStoreDisabled
}
