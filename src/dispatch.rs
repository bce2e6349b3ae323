//! Routing of received envelopes to typed handlers
//!
//! A [`Dispatcher`] owns a fixed-capacity table mapping type ids to
//! [`Route`]s. It is filled once at start-up and only read afterwards, so a
//! shared reference can be used from several threads.
//!
//! Cursor movement is the same whatever happens to the message:
//!
//! - header or payload not fully present: the cursor is left untouched
//! - version byte mismatch: the cursor moves one byte forward
//! - header read: the cursor moves past header and payload, even when the
//!   type id is unknown, the payload is malformed or no handler is set
//!
//! A [`Receiver`] that lands on a version byte while seeking treats it as a
//! guess. If the envelope there cannot be read, it steps over that byte and
//! keeps seeking.

use core::fmt;
use core::marker::PhantomData;

use tracing::{debug, warn};

use crate::cursor::ReadCursor;
use crate::envelope::{Envelope, EnvelopeConfig};
use crate::error::{Error, Result};
use crate::message;
use crate::schema::MessageType;

/// A destination for one message type
pub trait Route<C>: Sync {
    /// Envelope type id served by this route
    fn type_id(&self) -> u16;

    /// Message name, for diagnostics
    fn name(&self) -> &'static str;

    /// Decode `payload` and hand the message to the handler, if any
    ///
    /// Returns whether a handler ran.
    fn deliver(&self, payload: &[u8], ctx: &mut C) -> Result<bool>;
}

/// Route that decodes into `T` and calls an optional function
pub struct Handler<T, C> {
    callback: Option<fn(&T, &mut C)>,
    _message: PhantomData<fn() -> T>,
}

impl<T: MessageType, C> Handler<T, C> {
    /// Route `T` messages to `callback`
    #[inline]
    pub const fn new(callback: fn(&T, &mut C)) -> Self {
        Self {
            callback: Some(callback),
            _message: PhantomData,
        }
    }

    /// Accept and decode `T` messages without acting on them
    #[inline]
    pub const fn discard() -> Self {
        Self {
            callback: None,
            _message: PhantomData,
        }
    }

    /// Whether a callback is set
    #[inline]
    pub const fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl<T, C> fmt::Debug for Handler<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("message", &core::any::type_name::<T>())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl<T: MessageType, C> Route<C> for Handler<T, C> {
    #[inline]
    fn type_id(&self) -> u16 {
        T::DESCRIPTOR.type_id
    }

    #[inline]
    fn name(&self) -> &'static str {
        T::DESCRIPTOR.name
    }

    fn deliver(&self, payload: &[u8], ctx: &mut C) -> Result<bool> {
        let mut msg = T::default();
        message::decode_payload(&mut msg, &mut ReadCursor::new(payload))?;
        match self.callback {
            Some(callback) => {
                callback(&msg, ctx);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Outcome of one successful dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// Envelope type id
    pub type_id: u16,
    /// Message name
    pub name: &'static str,
    /// Whether a handler ran
    pub handled: bool,
    /// Bytes consumed from the stream, header included
    pub consumed: usize,
}

/// Fixed-capacity type id to route table
pub struct Dispatcher<'r, C, const N: usize> {
    config: EnvelopeConfig,
    routes: [Option<&'r dyn Route<C>>; N],
    len: usize,
}

impl<'r, C, const N: usize> Dispatcher<'r, C, N> {
    /// Create an empty table for the given header layout
    pub const fn new(config: EnvelopeConfig) -> Self {
        Self {
            config,
            routes: [None; N],
            len: 0,
        }
    }

    /// Header layout in use
    #[inline]
    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Number of registered routes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no route is registered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a route
    ///
    /// A second route for the same type id is `Error::InvalidId`; a full
    /// table is `Error::ArraySizeExceeded`.
    pub fn register(&mut self, route: &'r dyn Route<C>) -> Result<()> {
        if self.lookup(route.type_id()).is_some() {
            return Err(Error::InvalidId);
        }
        let slot = self
            .routes
            .get_mut(self.len)
            .ok_or(Error::ArraySizeExceeded)?;
        *slot = Some(route);
        self.len += 1;
        Ok(())
    }

    /// Route registered for `type_id`
    pub fn lookup(&self, type_id: u16) -> Option<&'r dyn Route<C>> {
        self.routes[..self.len]
            .iter()
            .flatten()
            .copied()
            .find(|route| route.type_id() == type_id)
    }

    /// Decode the envelope at the cursor and deliver it
    pub fn dispatch(&self, r: &mut ReadCursor<'_>, ctx: &mut C) -> Result<Dispatched> {
        let start = r.position();
        let envelope = match Envelope::decode(&self.config, r) {
            Ok(envelope) => envelope,
            Err(Error::InvalidProtocolVersion) => {
                let found = r.peek_u8().unwrap_or_default();
                warn!(
                    expected = self.config.version,
                    found,
                    offset = start,
                    "protocol version mismatch, skipping one byte"
                );
                r.skip(1)?;
                return Err(Error::InvalidProtocolVersion);
            }
            Err(e) => return Err(e),
        };
        let type_id = envelope.header.type_id;
        let consumed = r.position() - start;

        let Some(route) = self.lookup(type_id) else {
            warn!(type_id, consumed, "no route for message type id");
            return Err(Error::UnknownMessageId);
        };

        let handled = route.deliver(envelope.payload, ctx)?;
        debug!(type_id, name = route.name(), consumed, handled, "dispatched envelope");

        Ok(Dispatched {
            type_id,
            name: route.name(),
            handled,
            consumed,
        })
    }

    /// Skip forward to the next byte equal to the protocol version
    ///
    /// Returns the number of bytes skipped.
    pub fn resync(&self, r: &mut ReadCursor<'_>) -> usize {
        let offset = r.position();
        let skipped = r.skip_until(self.config.version);
        if skipped > 0 {
            warn!(skipped, offset, "resynchronising stream");
        }
        skipped
    }

    /// Dispatch every envelope in the buffer, returning how many were delivered
    ///
    /// Unknown type ids are passed over; any other failure stops the loop.
    pub fn dispatch_all(&self, r: &mut ReadCursor<'_>, ctx: &mut C) -> Result<usize> {
        let mut delivered = 0;
        while !r.is_empty() {
            match self.dispatch(r, ctx) {
                Ok(_) => delivered += 1,
                Err(Error::UnknownMessageId) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(delivered)
    }
}

impl<C, const N: usize> fmt::Debug for Dispatcher<'_, C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for route in self.routes[..self.len].iter().flatten() {
            list.entry(&(route.type_id(), route.name()));
        }
        list.finish()
    }
}

/// Where a [`Receiver`] stands in the byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Looking for a byte that can start an envelope
    Seeking,
    /// Positioned at an envelope boundary
    Processing,
}

/// Stream front end that resynchronises after a bad version byte
#[derive(Debug)]
pub struct Receiver<'d, 'r, C, const N: usize> {
    dispatcher: &'d Dispatcher<'r, C, N>,
    state: DispatchState,
}

impl<'d, 'r, C, const N: usize> Receiver<'d, 'r, C, N> {
    /// Start at an envelope boundary
    #[inline]
    pub fn new(dispatcher: &'d Dispatcher<'r, C, N>) -> Self {
        Self {
            dispatcher,
            state: DispatchState::Processing,
        }
    }

    /// Current state
    #[inline]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Process the next envelope, if any
    ///
    /// Returns `Ok(None)` when the cursor is exhausted, including after
    /// skipping garbage while seeking. An envelope that cannot be read at a
    /// boundary found while seeking costs one byte and the receiver keeps
    /// seeking.
    pub fn receive(
        &mut self,
        r: &mut ReadCursor<'_>,
        ctx: &mut C,
    ) -> Result<Option<Dispatched>> {
        let guessed = self.state == DispatchState::Seeking;
        if guessed {
            self.dispatcher.resync(r);
            if r.is_empty() {
                return Ok(None);
            }
            self.state = DispatchState::Processing;
        }
        if r.is_empty() {
            return Ok(None);
        }

        let start = r.position();
        match self.dispatcher.dispatch(r, ctx) {
            Ok(dispatched) => Ok(Some(dispatched)),
            Err(Error::InvalidProtocolVersion) => {
                self.state = DispatchState::Seeking;
                Err(Error::InvalidProtocolVersion)
            }
            Err(e) if guessed && r.position() == start => {
                warn!(offset = start, error = e.description(), "false envelope boundary");
                r.skip(1)?;
                self.state = DispatchState::Seeking;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
