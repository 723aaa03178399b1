mod dodge;
mod snake;

pub(crate) use dodge::{Asteroid, Dodge, LANES, ROCKET_ROW};
pub(crate) use snake::{Point, Snake, GRID};

use crate::model::Rules;
use rand::RngCore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GameKind {
    Snake,
    Dodge,
}

impl GameKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            GameKind::Snake => "Snake",
            GameKind::Dodge => "Dodge",
        }
    }

    fn spawn(self, rules: &Rules) -> Box<dyn Minigame> {
        match self {
            GameKind::Snake => Box::new(Snake::new(rules)),
            GameKind::Dodge => Box::new(Dodge::new(rules)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Turn {
    Left,
    Right,
}

/// Read-only copy of a board for rendering.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Board {
    Snake(Snake),
    Dodge(Dodge),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GameView {
    pub(crate) kind: GameKind,
    pub(crate) score: u32,
    pub(crate) over: bool,
    pub(crate) board: Board,
}

/// One minigame variant. Each variant owns its own board and rules; the
/// engine never looks inside.
pub(crate) trait Minigame {
    fn kind(&self) -> GameKind;
    /// Advance one step. Must be a no-op once the game is over.
    fn tick(&mut self, rng: &mut dyn RngCore);
    fn steer(&mut self, turn: Turn);
    fn score(&self) -> u32;
    fn is_over(&self) -> bool;
    /// Delay until the next tick, which may depend on progress.
    fn step_ms(&self) -> u64;
    fn board(&self) -> Board;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    NotStarted,
    Active,
    GameOver,
}

/// Holds at most one running session.
#[derive(Default)]
pub(crate) struct Engine {
    session: Option<Box<dyn Minigame>>,
}

impl Engine {
    pub(crate) fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::NotStarted,
            Some(g) if g.is_over() => Phase::GameOver,
            Some(_) => Phase::Active,
        }
    }

    pub(crate) fn start(&mut self, kind: GameKind, rules: &Rules) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(kind.spawn(rules));
        true
    }

    /// Returns true when this tick ended the game.
    pub(crate) fn tick(&mut self, rng: &mut dyn RngCore) -> bool {
        match self.session.as_mut() {
            Some(g) if !g.is_over() => {
                g.tick(rng);
                g.is_over()
            }
            _ => false,
        }
    }

    pub(crate) fn steer(&mut self, turn: Turn) -> bool {
        match self.session.as_mut() {
            Some(g) if !g.is_over() => {
                g.steer(turn);
                true
            }
            _ => false,
        }
    }

    /// Dismisses a finished session and hands back its score. A session still
    /// in play cannot be stopped.
    pub(crate) fn stop(&mut self) -> Option<(GameKind, u32)> {
        if self.phase() != Phase::GameOver {
            return None;
        }
        self.session.take().map(|g| (g.kind(), g.score()))
    }

    pub(crate) fn step_ms(&self) -> Option<u64> {
        match &self.session {
            Some(g) if !g.is_over() => Some(g.step_ms()),
            _ => None,
        }
    }

    pub(crate) fn view(&self) -> Option<GameView> {
        self.session.as_ref().map(|g| GameView {
            kind: g.kind(),
            score: g.score(),
            over: g.is_over(),
            board: g.board(),
        })
    }

    #[cfg(test)]
    pub(crate) fn swap_game(&mut self, game: Box<dyn Minigame>) {
        self.session = Some(game);
    }
}
