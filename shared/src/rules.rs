//! Grid geometry and movement rules. Pure functions over snakes on the
//! board; randomized spawns take the caller's RNG and perform no other I/O.

use crate::error::ParseDirectionError;
use crate::{BOARD_HEIGHT, BOARD_WIDTH, GRID_STEP, PANEL_HEIGHT};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A grid-aligned point on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring cell one movement step away.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Whether the point lies inside the playable area. The score panel band
    /// at the top is not playable.
    pub fn in_bounds(self) -> bool {
        self.x >= 0 && self.x < BOARD_WIDTH && self.y >= PANEL_HEIGHT && self.y < BOARD_HEIGHT
    }
}

/// One of the four headings, scaled by the movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -GRID_STEP),
            Direction::Down => (0, GRID_STEP),
            Direction::Left => (-GRID_STEP, 0),
            Direction::Right => (GRID_STEP, 0),
        }
    }

    /// The exact inverse heading; steering into it is rejected upstream so a
    /// snake can never fold back into its own neck within one tick.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// An ordered segment sequence, tail-first, head-last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    segments: Vec<Position>,
}

impl Snake {
    /// A fresh single-segment snake.
    pub fn new(head: Position) -> Self {
        Self {
            segments: vec![head],
        }
    }

    pub fn from_segments(segments: Vec<Position>) -> Self {
        Self { segments }
    }

    pub fn head(&self) -> Option<Position> {
        self.segments.last().copied()
    }

    pub fn segments(&self) -> &[Position] {
        &self.segments
    }

    /// All segments except the head.
    pub fn body(&self) -> &[Position] {
        match self.segments.len() {
            0 => &[],
            n => &self.segments[..n - 1],
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Moves the snake one step along `direction`. Landing on `food` grows the
/// snake (the tail stays) and returns `true`; otherwise the tail is dropped
/// and the length is unchanged.
pub fn advance(snake: &mut Snake, direction: Direction, food: Position) -> bool {
    let Some(head) = snake.head() else {
        return false;
    };
    let new_head = head.offset(direction);
    snake.segments.push(new_head);
    if new_head == food {
        true
    } else {
        snake.segments.remove(0);
        false
    }
}

/// Whether the snake's head left the playable bounds, ran into its own body,
/// or ran into any of the opponent cells. Callers pass the opponent's
/// pre-move segments so both snakes of a tick are judged simultaneously.
pub fn collided(snake: &Snake, opponent: &[Position]) -> bool {
    let Some(head) = snake.head() else {
        return false;
    };
    if !head.in_bounds() {
        return true;
    }
    if snake.body().contains(&head) {
        return true;
    }
    opponent.contains(&head)
}

/// Uniform-random grid cell in the playable area.
pub fn spawn_position(rng: &mut impl Rng) -> Position {
    let cols = BOARD_WIDTH / GRID_STEP;
    let rows = (BOARD_HEIGHT - PANEL_HEIGHT) / GRID_STEP;
    Position::new(
        rng.gen_range(0..cols) * GRID_STEP,
        PANEL_HEIGHT + rng.gen_range(0..rows) * GRID_STEP,
    )
}

/// Uniform-random free cell, excluding every occupied one. `None` only when
/// the board is fully occupied; the caller then leaves the previous food in
/// place, which pauses scoring.
pub fn spawn_food(rng: &mut impl Rng, occupied: &[&[Position]]) -> Option<Position> {
    let cols = BOARD_WIDTH / GRID_STEP;
    let rows = (BOARD_HEIGHT - PANEL_HEIGHT) / GRID_STEP;

    let mut free = Vec::new();
    for col in 0..cols {
        for row in 0..rows {
            let cell = Position::new(col * GRID_STEP, PANEL_HEIGHT + row * GRID_STEP);
            if !occupied.iter().any(|cells| cells.contains(&cell)) {
                free.push(cell);
            }
        }
    }

    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}
