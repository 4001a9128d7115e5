//! # Match Host Library
//!
//! The authoritative side of a two-player snake match. The host is the sole
//! writer of the match state: it accepts exactly one inbound connection,
//! advances the simulation on a fixed tick, and broadcasts a full snapshot
//! every tick. The guest only renders what it receives.
//!
//! ## Architecture
//!
//! The session runs on two tasks. The tick loop owns the simulation and the
//! write half of the connection; a background receive task owns the read
//! half and performs every blocking network read. The two meet only through
//! single-slot, last-write-wins mailboxes (the latest remote direction, the
//! restart flag, the running flag) — there is no other cross-task shared
//! state, and stale reads are expected since only the latest value matters.
//!
//! Failures follow one policy: setup errors ([`shared::BindError`]) are
//! categorized and reported without crashing; anything that breaks the
//! active connection ends the match loop and unwinds to the caller, and the
//! receive task reports its own death only as "session no longer running".
//!
//! ## Module Organization
//!
//! - [`game`] — the simulation driver: headings, the reversal guard, and
//!   per-tick stepping of the shared rules engine.
//! - [`network`] — the session driver: bind, accept polling, the receive
//!   task, the tick/broadcast loop, and the restart handshake.
//! - [`scores`] — the append-only outcome log behind the leaderboard.

pub mod game;
pub mod network;
pub mod scores;
