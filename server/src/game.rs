use rand::Rng;
use shared::{Direction, MatchState, StepOutcome, Winner, GUEST_START_DIRECTION, HOST_START_DIRECTION};

/// Authoritative simulation driver: the match state plus both current
/// headings. Steering passes the reversal guard here, so at most one legal
/// heading per player is applied per tick.
#[derive(Debug)]
pub struct MatchSim {
    state: MatchState,
    dir1: Direction,
    dir2: Direction,
}

impl MatchSim {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            state: MatchState::new(rng),
            dir1: HOST_START_DIRECTION,
            dir2: GUEST_START_DIRECTION,
        }
    }

    /// Fresh positions, food, and scores; both headings back to their
    /// starting values.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.state.reset(rng);
        self.dir1 = HOST_START_DIRECTION;
        self.dir2 = GUEST_START_DIRECTION;
    }

    /// Updates the local player's heading unless it reverses the current
    /// one. Returns whether the update was accepted.
    pub fn steer_local(&mut self, direction: Direction) -> bool {
        if direction == self.dir1.opposite() {
            return false;
        }
        self.dir1 = direction;
        true
    }

    /// Same guard for the remote player's heading.
    pub fn steer_remote(&mut self, direction: Direction) -> bool {
        if direction == self.dir2.opposite() {
            return false;
        }
        self.dir2 = direction;
        true
    }

    /// One simulation tick under the current headings.
    pub fn tick(&mut self, rng: &mut impl Rng) -> StepOutcome {
        self.state.step(self.dir1, self.dir2, rng)
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// The final (winner, score) pair once the match is over. The recorded
    /// score is the higher of the two, matching the leaderboard format.
    pub fn outcome(&self) -> Option<(Winner, u32)> {
        self.state
            .winner
            .map(|winner| (winner, self.state.score1.max(self.state.score2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn reversal_is_rejected_and_keeps_the_heading() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = MatchSim::new(&mut rng);

        // Host starts heading right; left is the exact inverse
        assert!(!sim.steer_local(Direction::Left));
        assert!(sim.steer_local(Direction::Up));
        assert!(!sim.steer_local(Direction::Down));

        // Guest starts heading left
        assert!(!sim.steer_remote(Direction::Right));
        assert!(sim.steer_remote(Direction::Down));
    }

    #[test]
    fn reset_restores_headings_and_clears_scores() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sim = MatchSim::new(&mut rng);

        sim.steer_local(Direction::Up);
        sim.steer_remote(Direction::Down);
        sim.reset(&mut rng);

        assert!(!sim.steer_local(Direction::Left));
        assert!(!sim.steer_remote(Direction::Right));
        assert_eq!(sim.state().score1, 0);
        assert_eq!(sim.state().score2, 0);
        assert!(!sim.state().game_over);
    }

    #[test]
    fn no_outcome_before_game_over() {
        let mut rng = StdRng::seed_from_u64(3);
        let sim = MatchSim::new(&mut rng);
        assert_eq!(sim.outcome(), None);
    }

    #[test]
    fn ticking_until_a_wall_produces_an_outcome() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut sim = MatchSim::new(&mut rng);

        // Both snakes hold their starting headings; the board is finite, so
        // somebody reaches a wall within one board-width of ticks.
        let max_ticks = (shared::BOARD_WIDTH / shared::GRID_STEP) as usize + 1;
        let mut finished = false;
        for _ in 0..max_ticks {
            if sim.tick(&mut rng).finished {
                finished = true;
                break;
            }
        }

        assert!(finished);
        let (_winner, score) = sim.outcome().expect("game over must name an outcome");
        assert_eq!(score, sim.state().score1.max(sim.state().score2));
    }
}
