//! Error taxonomy for both roles. Setup failures (bind/connect) are resolved
//! into categorized, user-facing messages; transport failures are fatal to
//! the active session and unwind it without crashing the process.

use crate::session::Phase;
use std::io;
use thiserror::Error;

/// Failure to start hosting. Recoverable by retrying with new parameters.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid listen address: {0}")]
    InvalidAddr(String),
    #[error("port {0} is already in use")]
    AddrInUse(u16),
    #[error("failed to bind listener: {0}")]
    Io(#[from] io::Error),
}

/// Failure to join a host. Each cause is reported distinctly.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid server address: {0}")]
    InvalidAddr(String),
    #[error("connection timed out: the server is not responding")]
    Timeout,
    #[error("the server refused the connection")]
    Refused,
    #[error("failed to connect: {0}")]
    Io(#[from] io::Error),
}

/// Fatal failure of an active session. Protocol violations are transport
/// errors: the connection is dropped, never repaired.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed by peer")]
    PeerClosed,
    #[error("frame length {0} outside protocol limits")]
    OversizedFrame(u64),
    #[error("malformed message on the wire")]
    Malformed,
    #[error("server did not respond to the restart request")]
    AckTimeout,
    #[error("transport failure: {0}")]
    Io(#[from] io::Error),
}

/// Attempted lifecycle transition the session state machine does not allow.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("illegal session transition from {from:?} to {to:?}")]
    InvalidTransition { from: Phase, to: Phase },
}

/// Unrecognized direction word from the input layer.
#[derive(Debug, Error)]
#[error("unrecognized direction {0:?}")]
pub struct ParseDirectionError(pub String);
