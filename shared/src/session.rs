//! Session lifecycle shared by both roles.
//!
//! The state machine has one shape for host and guest; only the events that
//! drive it differ (loop ticks and an inbound restart request on the host,
//! received snapshots and a local restart request on the guest).

use crate::error::SessionError;
use log::{debug, error, info};
use std::time::Duration;
use tokio::time::sleep;

/// Which side of the match this session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Drives the simulation and broadcasts snapshots.
    Host,
    /// Consumes snapshots and sends its own direction.
    Guest,
}

/// Lifecycle phase of a match session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Countdown,
    Active,
    Over,
    RestartPending,
    Closed,
}

/// Role-tagged lifecycle tracker. Transitions outside the table are refused.
#[derive(Debug)]
pub struct Session {
    role: Role,
    phase: Phase,
}

impl Session {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            phase: Phase::Connecting,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves to `next` if the lifecycle allows it.
    pub fn transition(&mut self, next: Phase) -> Result<(), SessionError> {
        if Self::allowed(self.phase, next) {
            self.phase = next;
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.phase,
                to: next,
            })
        }
    }

    /// `transition` with logging instead of propagation; an illegal move is
    /// a bug in the driving role, surfaced loudly but not fatal.
    pub fn enter(&mut self, next: Phase) {
        match self.transition(next) {
            Ok(()) => debug!("{:?} session entered {:?}", self.role, next),
            Err(e) => error!("{}", e),
        }
    }

    fn allowed(from: Phase, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (from, to),
            (Connecting, Countdown)
                | (Countdown, Active)
                | (Active, Over)
                | (Over, RestartPending)
                | (RestartPending, Countdown)
                | (_, Closed)
        )
    }
}

/// Fixed pre-match countdown, identical on both roles. Gameplay never runs
/// during it; the display layer mirrors these log lines on screen.
pub async fn run_countdown(steps: u32, step: Duration) {
    for remaining in (1..=steps).rev() {
        info!("match starts in {}", remaining);
        sleep(step).await;
    }
}
