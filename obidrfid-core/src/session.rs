//! Session management for the reader protocol
//!
//! A session represents one reader binding and tracks:
//! - Connection handle (transport stream)
//! - Reader handle (logical reader on that stream)
//! - Negotiation state
//!
//! Both handles must be positive before any command is issued.

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Handle of an open transport stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(i32);

impl ConnectionHandle {
    /// Wrap a raw handle; `0` and negative values are failure codes
    pub fn from_raw(raw: i32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Handle of a logical reader bound to a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderHandle(i32);

impl ReaderHandle {
    /// Wrap a raw handle; `0` and negative values are failure codes
    pub fn from_raw(raw: i32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ReaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reader#{}", self.0)
    }
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No handles held
    Disconnected,

    /// Handles bound, parameter negotiation not (yet) successful
    Connected,

    /// Handles bound and frame format negotiated
    Ready,
}

/// Session manager
///
/// Clones observe the same session (Arc internally), so a status display can
/// watch the state while the owning reader drives commands.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Raw connection handle (0 when disconnected)
    connection: AtomicI32,

    /// Raw reader handle (0 when disconnected)
    reader: AtomicI32,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                connection: AtomicI32::new(0),
                reader: AtomicI32::new(0),
                state: parking_lot::RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if handles are bound (Connected or Ready)
    pub fn is_connected(&self) -> bool {
        !matches!(self.state(), SessionState::Disconnected)
    }

    /// Check if negotiation succeeded
    pub fn is_ready(&self) -> bool {
        matches!(self.state(), SessionState::Ready)
    }

    /// Bound connection handle
    pub fn connection_handle(&self) -> Option<ConnectionHandle> {
        ConnectionHandle::from_raw(self.inner.connection.load(Ordering::Acquire))
    }

    /// Bound reader handle
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotInitialized`] while disconnected.
    pub fn reader_handle(&self) -> Result<ReaderHandle> {
        let state = self.inner.state.read();
        if *state == SessionState::Disconnected {
            return Err(Error::SessionNotInitialized);
        }

        ReaderHandle::from_raw(self.inner.reader.load(Ordering::Acquire))
            .ok_or(Error::SessionNotInitialized)
    }

    /// Bind both handles (Disconnected → Connected)
    pub fn bind(&self, connection: ConnectionHandle, reader: ReaderHandle) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Disconnected {
            return Err(Error::InvalidSessionState(
                format!("Cannot bind from state: {:?}", *state)
            ));
        }

        self.inner.connection.store(connection.raw(), Ordering::Release);
        self.inner.reader.store(reader.raw(), Ordering::Release);
        *state = SessionState::Connected;

        Ok(())
    }

    /// Record successful parameter negotiation (Connected → Ready)
    pub fn mark_ready(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Connected {
            return Err(Error::InvalidSessionState(
                format!("Cannot mark ready from state: {:?}", *state)
            ));
        }

        *state = SessionState::Ready;
        Ok(())
    }

    /// Close session, returning the handles that were bound
    pub fn close(&self) -> Option<(ConnectionHandle, ReaderHandle)> {
        let mut state = self.inner.state.write();

        let connection =
            ConnectionHandle::from_raw(self.inner.connection.swap(0, Ordering::AcqRel));
        let reader = ReaderHandle::from_raw(self.inner.reader.swap(0, Ordering::AcqRel));
        *state = SessionState::Disconnected;

        connection.zip(reader)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
