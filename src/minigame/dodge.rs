use super::{Board, GameKind, Minigame, Turn};
use crate::model::Rules;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

pub(crate) const LANES: u8 = 3;
/// Asteroids below this row have left the field.
pub(crate) const FIELD_BOTTOM: i32 = 20;
pub(crate) const ROCKET_ROW: i32 = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Asteroid {
    pub(crate) lane: u8,
    pub(crate) y: i32,
}

#[derive(Clone, Debug, PartialEq)]
struct Pace {
    base_ms: u64,
    ms_per_level: u64,
    min_ms: u64,
    points_per_level: u32,
    spawn_base: f64,
    spawn_per_level: f64,
    spawn_max: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Dodge {
    pub(crate) rocket_lane: u8,
    pub(crate) asteroids: Vec<Asteroid>,
    score: u32,
    over: bool,
    pace: Pace,
}

impl Dodge {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            rocket_lane: 1,
            asteroids: Vec::new(),
            score: 0,
            over: false,
            pace: Pace {
                base_ms: rules.dodge_base_step_ms,
                ms_per_level: rules.dodge_step_ms_per_level,
                min_ms: rules.dodge_min_step_ms,
                points_per_level: rules.dodge_points_per_level.max(1),
                spawn_base: rules.dodge_spawn_base,
                spawn_per_level: rules.dodge_spawn_per_level,
                spawn_max: rules.dodge_spawn_max,
            },
        }
    }

    pub(crate) fn level(&self) -> u32 {
        self.score / self.pace.points_per_level
    }

    fn spawn_chance(&self, level: u32) -> f64 {
        let p = self.pace.spawn_base + self.pace.spawn_per_level * level as f64;
        p.min(self.pace.spawn_max).clamp(0.0, 1.0)
    }

    fn free_lanes(&self) -> Vec<u8> {
        (0..LANES)
            .filter(|lane| !self.asteroids.iter().any(|a| a.lane == *lane))
            .collect()
    }
}

impl Minigame for Dodge {
    fn kind(&self) -> GameKind {
        GameKind::Dodge
    }

    fn tick(&mut self, rng: &mut dyn RngCore) {
        if self.over {
            return;
        }
        let level = self.level();

        for a in &mut self.asteroids {
            a.y += 1;
        }

        let lane = self.rocket_lane;
        if self
            .asteroids
            .iter()
            .any(|a| a.y == ROCKET_ROW && a.lane == lane)
        {
            self.over = true;
            return;
        }

        let before = self.asteroids.len();
        self.asteroids.retain(|a| a.y <= FIELD_BOTTOM);
        self.score += (before - self.asteroids.len()) as u32;

        // one asteroid per lane, and never two in the top row at once
        let top_clear = !self.asteroids.iter().any(|a| a.y == 0);
        let free = self.free_lanes();
        if top_clear && !free.is_empty() && rng.gen_bool(self.spawn_chance(level)) {
            if let Some(&lane) = free.choose(rng) {
                self.asteroids.push(Asteroid { lane, y: 0 });
            }
        }
    }

    fn steer(&mut self, turn: Turn) {
        self.rocket_lane = match turn {
            Turn::Left => self.rocket_lane.saturating_sub(1),
            Turn::Right => (self.rocket_lane + 1).min(LANES - 1),
        };
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn step_ms(&self) -> u64 {
        let slowdown = self.pace.ms_per_level * self.level() as u64;
        self.pace
            .base_ms
            .saturating_sub(slowdown)
            .max(self.pace.min_ms)
    }

    fn board(&self) -> Board {
        Board::Dodge(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn dodge_with(lane: u8, rocks: &[(u8, i32)]) -> Dodge {
        let mut d = Dodge::new(&Rules::default());
        d.rocket_lane = lane;
        d.asteroids = rocks.iter().map(|&(lane, y)| Asteroid { lane, y }).collect();
        d
    }

    #[test]
    fn asteroid_leaving_the_field_scores() {
        let mut d = dodge_with(1, &[(0, 20)]);
        d.tick(&mut never());
        assert!(d.asteroids.is_empty());
        assert_eq!(d.score(), 1);
        assert!(!d.is_over());
    }

    #[test]
    fn asteroid_reaching_rocket_row_in_rocket_lane_crashes() {
        let mut d = dodge_with(2, &[(2, 17), (0, 5)]);
        d.tick(&mut never());
        assert!(d.is_over());
        assert_eq!(
            d.asteroids,
            vec![Asteroid { lane: 2, y: 18 }, Asteroid { lane: 0, y: 6 }]
        );
    }

    #[test]
    fn asteroid_in_other_lane_passes_rocket_row() {
        let mut d = dodge_with(0, &[(1, 17)]);
        d.tick(&mut never());
        assert!(!d.is_over());
        assert_eq!(d.asteroids[0].y, 18);
    }

    #[test]
    fn spawns_only_into_free_lanes() {
        // zeros: spawn roll succeeds and the first free lane is chosen
        let mut d = dodge_with(1, &[(0, 4)]);
        d.tick(&mut StepRng::new(0, 0));
        assert_eq!(d.asteroids.len(), 2);
        assert_eq!(d.asteroids[1], Asteroid { lane: 1, y: 0 });

        let mut full = dodge_with(1, &[(0, 3), (1, 8), (2, 12)]);
        full.tick(&mut StepRng::new(0, 0));
        assert_eq!(full.asteroids.len(), 3);
    }

    #[test]
    fn no_spawn_while_top_row_is_taken() {
        let mut d = dodge_with(1, &[(0, -1)]);
        d.tick(&mut StepRng::new(0, 0));
        assert_eq!(d.asteroids, vec![Asteroid { lane: 0, y: 0 }]);
    }

    #[test]
    fn crash_tick_leaves_exiting_rock_unscored() {
        let mut d = dodge_with(2, &[(2, 17), (0, 20)]);
        d.tick(&mut StepRng::new(0, 0));
        assert!(d.is_over());
        assert_eq!(d.score, 0);
        assert_eq!(
            d.asteroids,
            vec![Asteroid { lane: 2, y: 18 }, Asteroid { lane: 0, y: 21 }]
        );
    }

    #[test]
    fn rocket_lane_clamps() {
        let mut d = dodge_with(1, &[]);
        d.steer(Turn::Left);
        d.steer(Turn::Left);
        assert_eq!(d.rocket_lane, 0);
        d.steer(Turn::Right);
        d.steer(Turn::Right);
        d.steer(Turn::Right);
        assert_eq!(d.rocket_lane, 2);
    }

    #[test]
    fn pace_ramps_with_level_down_to_floor() {
        let mut d = dodge_with(1, &[]);
        assert_eq!(d.step_ms(), 200);
        assert!((d.spawn_chance(d.level()) - 0.08).abs() < 1e-9);

        d.score = 5;
        assert_eq!(d.step_ms(), 185);
        d.score = 24;
        assert_eq!(d.level(), 4);
        assert_eq!(d.step_ms(), 140);
        d.score = 1_000;
        assert_eq!(d.step_ms(), 80);
        assert!((d.spawn_chance(d.level()) - 0.25).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_asteroid_per_lane(
            seed in any::<u64>(),
            moves in proptest::collection::vec(0..3u8, 1..300),
        ) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut d = Dodge::new(&Rules::default());
            for m in moves {
                match m {
                    0 => d.steer(Turn::Left),
                    1 => d.steer(Turn::Right),
                    _ => {}
                }
                d.tick(&mut rng);
                for lane in 0..LANES {
                    let n = d.asteroids.iter().filter(|a| a.lane == lane).count();
                    prop_assert!(n <= 1);
                }
                prop_assert!(d.rocket_lane < LANES);
                // the crash tick stops before rocks that left the field are cleared
                let bottom = if d.is_over() { FIELD_BOTTOM + 1 } else { FIELD_BOTTOM };
                for a in &d.asteroids {
                    prop_assert!(a.lane < LANES);
                    prop_assert!((0..=bottom).contains(&a.y));
                }
                if d.is_over() {
                    break;
                }
            }
        }
    }
}
