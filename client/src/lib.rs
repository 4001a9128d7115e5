//! # Match Guest Library
//!
//! The rendering side of a two-player snake match. The guest never
//! simulates: it sends its own heading when it changes, applies every
//! received snapshot verbatim, and drives the restart handshake after game
//! over. Perceived latency is one round trip by design — there is no
//! client-side prediction.
//!
//! A background receive task performs all blocking network reads and hands
//! the latest snapshot to the caller through a single-slot, last-write-wins
//! mailbox; receive failures surface only as "session no longer running".

pub mod network;
