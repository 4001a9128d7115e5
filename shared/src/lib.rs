//! # Shared Match Protocol
//!
//! Common ground between the host and guest halves of a two-player snake
//! match: the grid rules engine, the authoritative match state, the framed
//! wire codec, the session lifecycle, and the error taxonomy.
//!
//! The host owns the only mutable [`state::MatchState`]; the guest holds
//! whatever copy arrived in the latest [`wire::Packet::Snapshot`] and never
//! simulates on its own. Everything in this crate is transport-agnostic
//! except [`wire`], which frames packets for a byte-stream connection.

use std::time::Duration;

pub mod error;
pub mod rules;
pub mod session;
pub mod state;
pub mod wire;

pub use error::{BindError, ConnectError, ParseDirectionError, SessionError, TransportError};
pub use rules::{advance, collided, spawn_food, spawn_position, Direction, Position, Snake};
pub use session::{Phase, Role, Session};
pub use state::{MatchState, StepOutcome, Winner, GUEST_START_DIRECTION, HOST_START_DIRECTION};
pub use wire::{read_packet, write_packet, Packet, MAX_FRAME_LEN};

/// Movement step and cell size; every coordinate is a multiple of it.
pub const GRID_STEP: i32 = 32;
/// Board width in pixels, grid-aligned.
pub const BOARD_WIDTH: i32 = 1280;
/// Board height in pixels, grid-aligned, score panel included.
pub const BOARD_HEIGHT: i32 = 832;
/// Reserved score-panel band at the top; movement above it is out of bounds.
pub const PANEL_HEIGHT: i32 = 64;

/// Reference simulation rate: 10 ticks per second.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Steps in the pre-match countdown.
pub const COUNTDOWN_STEPS: u32 = 3;
/// Reference duration of one countdown step.
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
/// Bounded wait for an outbound connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Per-iteration accept poll on the host, short enough to service local input.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Bounded wait for the restart acknowledgment on the guest.
pub const RESTART_ACK_TIMEOUT: Duration = Duration::from_secs(5);
