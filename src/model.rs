use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const METER_MAX: f32 = 100.0;
/// Hard ceiling on droppings, whatever the tuning says.
pub(crate) const POOP_CAP: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Stage {
    Egg,
    Baby,
    Child,
    Teen,
    Adult,
    Senior,
    Ghost,
}

impl Stage {
    /// Egg and Ghost are the two pseudo-stages that only the hatch command leaves.
    pub(crate) fn is_alive(self) -> bool {
        !matches!(self, Stage::Egg | Stage::Ghost)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Character {
    Unknown,
    Cat,
    AngelCat,
    DevilCat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActionState {
    Idle,
    Eating,
    Bathing,
    PlayingGame,
    Sleeping,
}

/// What the pet "feels like" right now, in priority order. Drives the chat
/// line pools and the sprite face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mood {
    Sick,
    Sleeping,
    Playing,
    Dirty,
    Hungry,
    Happy,
    Normal,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Pet {
    pub(crate) stage: Stage,
    pub(crate) character: Character,
    pub(crate) age: f32,
    pub(crate) weight: f32,
    pub(crate) hunger: f32,
    pub(crate) happiness: f32,
    pub(crate) health: f32,
    pub(crate) poop_count: u8,
    pub(crate) is_sick: bool,
    pub(crate) action_state: ActionState,
    pub(crate) birth_time: DateTime<Utc>,
}

impl Pet {
    pub(crate) fn new_egg(birth_time: DateTime<Utc>) -> Self {
        Self {
            stage: Stage::Egg,
            character: Character::Unknown,
            age: 0.0,
            weight: 5.0,
            hunger: 80.0,
            happiness: 80.0,
            health: 100.0,
            poop_count: 0,
            is_sick: false,
            action_state: ActionState::Idle,
            birth_time,
        }
    }

    pub(crate) fn add_hunger(&mut self, delta: f32) {
        self.hunger = clamp_meter(self.hunger + delta);
    }

    pub(crate) fn add_happiness(&mut self, delta: f32) {
        self.happiness = clamp_meter(self.happiness + delta);
    }

    pub(crate) fn add_health(&mut self, delta: f32) {
        self.health = clamp_meter(self.health + delta);
    }

    pub(crate) fn add_poop(&mut self, n: u8, cap: u8) {
        self.poop_count = self.poop_count.saturating_add(n).min(cap.min(POOP_CAP));
    }

    pub(crate) fn mood(&self, rules: &Rules) -> Mood {
        if self.is_sick {
            return Mood::Sick;
        }
        match self.action_state {
            ActionState::Sleeping => return Mood::Sleeping,
            ActionState::PlayingGame => return Mood::Playing,
            _ => {}
        }
        if self.poop_count > rules.dirty_above {
            return Mood::Dirty;
        }
        if self.hunger < rules.hungry_below {
            return Mood::Hungry;
        }
        if self.happiness > rules.happy_above {
            return Mood::Happy;
        }
        Mood::Normal
    }
}

fn clamp_meter(v: f32) -> f32 {
    v.clamp(0.0, METER_MAX)
}

fn clamp_probability(name: &str, p: f64, fallback: f64) -> f64 {
    let fixed = if p.is_nan() { fallback } else { p.clamp(0.0, 1.0) };
    if fixed != p {
        log::warn!("rules: {name} = {p} is not a probability, using {fixed}");
    }
    fixed
}

fn cap_poop(name: &str, n: u8) -> u8 {
    if n > POOP_CAP {
        log::warn!("rules: {name} = {n} exceeds {POOP_CAP}, capping");
    }
    n.min(POOP_CAP)
}

/// Every tuning knob of the simulation. Loaded from the settings file so
/// balancing never needs a code change; missing keys fall back to defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Rules {
    // metabolism
    pub(crate) metabolism_step_ms: u64,
    pub(crate) decay_awake: f32,
    pub(crate) decay_asleep: f32,
    pub(crate) poop_chance: f64,
    pub(crate) poop_max: u8,
    pub(crate) dirty_above: u8,
    pub(crate) sick_chance: f64,
    pub(crate) neglect_below: f32,
    pub(crate) sick_drain: f32,
    pub(crate) age_per_tick: f32,
    pub(crate) child_age: f32,

    // interactions
    pub(crate) feed_default: f32,
    pub(crate) feed_weight: f32,
    pub(crate) feed_happiness: f32,
    pub(crate) bathe_happiness: f32,
    pub(crate) medicine_health: f32,
    pub(crate) action_duration_ms: u64,
    pub(crate) hatch_hunger: f32,
    pub(crate) hatch_happiness: f32,
    pub(crate) boost_happiness: f32,
    pub(crate) boost_hunger: f32,

    // minigames
    pub(crate) game_reward_per_point: f32,
    pub(crate) game_hunger_cost: f32,
    pub(crate) snake_step_ms: u64,
    pub(crate) dodge_base_step_ms: u64,
    pub(crate) dodge_step_ms_per_level: u64,
    pub(crate) dodge_min_step_ms: u64,
    pub(crate) dodge_points_per_level: u32,
    pub(crate) dodge_spawn_base: f64,
    pub(crate) dodge_spawn_per_level: f64,
    pub(crate) dodge_spawn_max: f64,

    // chat
    pub(crate) hungry_below: f32,
    pub(crate) happy_above: f32,
    pub(crate) chat_latency_ms: u64,
    pub(crate) chat_display_ms: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            metabolism_step_ms: 15_000,
            decay_awake: 0.5,
            decay_asleep: 0.2,
            poop_chance: 0.02,
            poop_max: 4,
            dirty_above: 3,
            sick_chance: 0.1,
            neglect_below: 10.0,
            sick_drain: 1.0,
            age_per_tick: 0.005,
            child_age: 0.1,

            feed_default: 20.0,
            feed_weight: 1.0,
            feed_happiness: 2.0,
            bathe_happiness: 5.0,
            medicine_health: 20.0,
            action_duration_ms: 2_000,
            hatch_hunger: 80.0,
            hatch_happiness: 80.0,
            boost_happiness: 15.0,
            boost_hunger: 5.0,

            game_reward_per_point: 2.0,
            game_hunger_cost: 5.0,
            snake_step_ms: 200,
            dodge_base_step_ms: 200,
            dodge_step_ms_per_level: 15,
            dodge_min_step_ms: 80,
            dodge_points_per_level: 5,
            dodge_spawn_base: 0.08,
            dodge_spawn_per_level: 0.01,
            dodge_spawn_max: 0.25,

            hungry_below: 30.0,
            happy_above: 80.0,
            chat_latency_ms: 100,
            chat_display_ms: 4_000,
        }
    }
}

impl Rules {
    /// Pulls hand-edited values back into the range the simulation relies on.
    pub(crate) fn sanitized(self) -> Self {
        let d = Rules::default();
        Self {
            poop_chance: clamp_probability("poop_chance", self.poop_chance, d.poop_chance),
            sick_chance: clamp_probability("sick_chance", self.sick_chance, d.sick_chance),
            dodge_spawn_base: clamp_probability(
                "dodge_spawn_base",
                self.dodge_spawn_base,
                d.dodge_spawn_base,
            ),
            dodge_spawn_max: clamp_probability(
                "dodge_spawn_max",
                self.dodge_spawn_max,
                d.dodge_spawn_max,
            ),
            poop_max: cap_poop("poop_max", self.poop_max),
            dirty_above: cap_poop("dirty_above", self.dirty_above),
            ..self
        }
    }
}
