use super::{Board, GameKind, Minigame, Turn};
use crate::model::Rules;
use rand::{Rng, RngCore};
use std::collections::VecDeque;

pub(crate) const GRID: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Point {
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn offset(self, d: Point) -> Point {
        Point::new(self.x + d.x, self.y + d.y)
    }

    fn in_bounds(self) -> bool {
        (0..GRID).contains(&self.x) && (0..GRID).contains(&self.y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Snake {
    /// Head first.
    pub(crate) body: VecDeque<Point>,
    pub(crate) food: Point,
    pub(crate) heading: Point,
    score: u32,
    over: bool,
    step_ms: u64,
}

impl Snake {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            body: VecDeque::from([Point::new(8, 8), Point::new(7, 8)]),
            food: Point::new(12, 8),
            heading: Point::new(1, 0),
            score: 0,
            over: false,
            step_ms: rules.snake_step_ms,
        }
    }

    pub(crate) fn head(&self) -> Option<Point> {
        self.body.front().copied()
    }

    // Not checked against the body; food can land under the snake.
    fn place_food(&mut self, rng: &mut dyn RngCore) {
        self.food = Point::new(rng.gen_range(1..GRID - 1), rng.gen_range(1..GRID - 1));
    }
}

impl Minigame for Snake {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn tick(&mut self, rng: &mut dyn RngCore) {
        if self.over {
            return;
        }
        let Some(head) = self.head() else {
            self.over = true;
            return;
        };

        let next = head.offset(self.heading);
        if !next.in_bounds() || self.body.contains(&next) {
            self.over = true;
            return;
        }

        self.body.push_front(next);
        if next == self.food {
            self.score += 1;
            self.place_food(rng);
        } else {
            self.body.pop_back();
        }
    }

    fn steer(&mut self, turn: Turn) {
        let Point { x, y } = self.heading;
        self.heading = match turn {
            Turn::Left => Point::new(y, -x),
            Turn::Right => Point::new(-y, x),
        };
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn step_ms(&self) -> u64 {
        self.step_ms
    }

    fn board(&self) -> Board {
        Board::Snake(self.clone())
    }
}
