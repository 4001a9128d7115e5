//! Authoritative match state and the per-tick step semantics. Owned and
//! mutated by the host only; the guest renders received copies verbatim.

use crate::rules::{self, Direction, Position, Snake};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading of the host-controlled snake at match start.
pub const HOST_START_DIRECTION: Direction = Direction::Right;
/// Heading of the guest-controlled snake at match start. Both ends assume
/// the same value, so the guest only sends a direction once it changes.
pub const GUEST_START_DIRECTION: Direction = Direction::Left;

/// Match outcome label; `Display` gives the string written to the outcome log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    PlayerOne,
    PlayerTwo,
    Draw,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::PlayerOne => write!(f, "Player 1"),
            Winner::PlayerTwo => write!(f, "Player 2"),
            Winner::Draw => write!(f, "Draw"),
        }
    }
}

/// Everything a tick broadcasts: both snakes, the food, both scores, and the
/// outcome flags. This is the full per-tick snapshot payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub snake1: Snake,
    pub snake2: Snake,
    pub food: Position,
    pub score1: u32,
    pub score2: u32,
    pub winner: Option<Winner>,
    pub game_over: bool,
}

/// What a single simulation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub fed1: bool,
    pub fed2: bool,
    pub finished: bool,
}

impl MatchState {
    /// Fresh match: two random single-segment snakes, food on a free cell,
    /// zero scores, no outcome.
    pub fn new(rng: &mut impl Rng) -> Self {
        let snake1 = Snake::new(rules::spawn_position(rng));
        let snake2 = Snake::new(rules::spawn_position(rng));
        let food = rules::spawn_food(rng, &[snake1.segments(), snake2.segments()])
            .unwrap_or(Position::new(0, crate::PANEL_HEIGHT));
        Self {
            snake1,
            snake2,
            food,
            score1: 0,
            score2: 0,
            winner: None,
            game_over: false,
        }
    }

    pub fn reset(&mut self, rng: &mut impl Rng) {
        *self = Self::new(rng);
    }

    /// Advances one simulation tick: moves both snakes along their headings,
    /// credits feedings and respawns food, then evaluates both collisions
    /// against the pre-move opponent. A mutual collision, including both
    /// heads landing on the same cell, is a draw; a single collision makes
    /// the other player the winner.
    pub fn step(&mut self, dir1: Direction, dir2: Direction, rng: &mut impl Rng) -> StepOutcome {
        let pre1: Vec<Position> = self.snake1.segments().to_vec();
        let pre2: Vec<Position> = self.snake2.segments().to_vec();

        let fed1 = rules::advance(&mut self.snake1, dir1, self.food);
        if fed1 {
            self.score1 += 1;
            self.respawn_food(rng);
        }
        let fed2 = rules::advance(&mut self.snake2, dir2, self.food);
        if fed2 {
            self.score2 += 1;
            self.respawn_food(rng);
        }

        let head_on = match (self.snake1.head(), self.snake2.head()) {
            (Some(h1), Some(h2)) => h1 == h2,
            _ => false,
        };
        let hit1 = head_on || rules::collided(&self.snake1, &pre2);
        let hit2 = head_on || rules::collided(&self.snake2, &pre1);

        if hit1 && hit2 {
            self.game_over = true;
            self.winner = Some(Winner::Draw);
        } else if hit1 {
            self.game_over = true;
            self.winner = Some(Winner::PlayerTwo);
        } else if hit2 {
            self.game_over = true;
            self.winner = Some(Winner::PlayerOne);
        }

        StepOutcome {
            fed1,
            fed2,
            finished: self.game_over,
        }
    }

    fn respawn_food(&mut self, rng: &mut impl Rng) {
        if let Some(food) = rules::spawn_food(rng, &[self.snake1.segments(), self.snake2.segments()])
        {
            self.food = food;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BOARD_WIDTH, GRID_STEP, PANEL_HEIGHT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cell(col: i32, row: i32) -> Position {
        Position::new(col * GRID_STEP, PANEL_HEIGHT + row * GRID_STEP)
    }

    fn fixed_state(snake1: Snake, snake2: Snake, food: Position) -> MatchState {
        MatchState {
            snake1,
            snake2,
            food,
            score1: 0,
            score2: 0,
            winner: None,
            game_over: false,
        }
    }

    #[test]
    fn fresh_match_has_no_outcome_and_legal_food() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let state = MatchState::new(&mut rng);
            assert_eq!(state.score1, 0);
            assert_eq!(state.score2, 0);
            assert_eq!(state.winner, None);
            assert!(!state.game_over);
            assert!(state.food.in_bounds());
            assert!(!state.snake1.segments().contains(&state.food));
            assert!(!state.snake2.segments().contains(&state.food));
        }
    }

    #[test]
    fn head_to_head_at_distance_one_is_a_draw() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = fixed_state(
            Snake::new(cell(10, 5)),
            Snake::new(cell(11, 5)),
            cell(30, 20),
        );

        let outcome = state.step(Direction::Right, Direction::Left, &mut rng);

        assert!(outcome.finished);
        assert!(state.game_over);
        assert_eq!(state.winner, Some(Winner::Draw));
    }

    #[test]
    fn heads_meeting_on_the_same_cell_is_a_draw() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = fixed_state(
            Snake::new(cell(10, 5)),
            Snake::new(cell(12, 5)),
            cell(30, 20),
        );

        let outcome = state.step(Direction::Right, Direction::Left, &mut rng);

        assert!(outcome.finished);
        assert_eq!(state.winner, Some(Winner::Draw));
    }

    #[test]
    fn wall_hit_makes_the_other_player_the_winner() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = fixed_state(
            Snake::new(cell(0, 5)),
            Snake::new(cell(20, 10)),
            cell(30, 20),
        );

        let outcome = state.step(Direction::Left, Direction::Down, &mut rng);

        assert!(outcome.finished);
        assert_eq!(state.winner, Some(Winner::PlayerTwo));
    }

    #[test]
    fn east_wall_is_exact() {
        let mut rng = StdRng::seed_from_u64(5);
        let last_col = BOARD_WIDTH / GRID_STEP - 1;
        let mut state = fixed_state(
            Snake::new(cell(last_col, 5)),
            Snake::new(cell(20, 10)),
            cell(30, 20),
        );

        state.step(Direction::Right, Direction::Down, &mut rng);
        assert_eq!(state.winner, Some(Winner::PlayerTwo));
    }

    #[test]
    fn running_into_the_opponent_loses() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut state = fixed_state(
            Snake::new(cell(20, 10)),
            Snake::from_segments(vec![cell(21, 11), cell(21, 10)]),
            cell(30, 20),
        );

        let outcome = state.step(Direction::Right, Direction::Up, &mut rng);

        assert!(outcome.finished);
        assert_eq!(state.winner, Some(Winner::PlayerOne));
    }

    #[test]
    fn feeding_increments_exactly_one_score_and_grows() {
        let mut rng = StdRng::seed_from_u64(7);
        let food = cell(11, 5);
        let mut state = fixed_state(Snake::new(cell(10, 5)), Snake::new(cell(20, 20)), food);

        let outcome = state.step(Direction::Right, Direction::Left, &mut rng);

        assert!(outcome.fed1);
        assert!(!outcome.fed2);
        assert!(!outcome.finished);
        assert_eq!(state.score1, 1);
        assert_eq!(state.score2, 0);
        assert_eq!(state.snake1.len(), 2);
        assert_eq!(state.snake2.len(), 1);
        // Food moved off the eaten cell
        assert_ne!(state.food, food);
    }

    #[test]
    fn plain_movement_keeps_scores_and_lengths() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut state = fixed_state(
            Snake::new(cell(10, 5)),
            Snake::new(cell(20, 20)),
            cell(30, 2),
        );

        let outcome = state.step(Direction::Right, Direction::Left, &mut rng);

        assert!(!outcome.fed1);
        assert!(!outcome.fed2);
        assert!(!outcome.finished);
        assert_eq!(state.score1, 0);
        assert_eq!(state.score2, 0);
        assert_eq!(state.snake1.len(), 1);
        assert_eq!(state.snake2.len(), 1);
        assert_eq!(state.winner, None);
    }
}
