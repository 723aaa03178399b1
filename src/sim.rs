use crate::model::{ActionState, Character, Pet, Rules, Stage};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Skipped,
    Ticked,
    Evolved(Stage),
    Died,
}

/// Fixed-period needs decay. The period timer lives with the caller and keeps
/// firing while paused; a paused tick does no work.
#[derive(Clone, Debug, Default)]
pub(crate) struct Metabolism {
    paused: bool,
}

impl Metabolism {
    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn tick<R: Rng + ?Sized>(
        &self,
        pet: &mut Pet,
        rules: &Rules,
        rng: &mut R,
    ) -> TickOutcome {
        if self.paused || !pet.metabolizes() {
            return TickOutcome::Skipped;
        }

        let next = pet.metabolize(rules, rng);
        let outcome = if next.stage == Stage::Ghost {
            TickOutcome::Died
        } else if next.stage != pet.stage {
            TickOutcome::Evolved(next.stage)
        } else {
            TickOutcome::Ticked
        };
        *pet = next;
        outcome
    }
}

impl Pet {
    pub(crate) fn metabolizes(&self) -> bool {
        self.stage.is_alive() && self.action_state != ActionState::PlayingGame
    }

    /// Next state computed from `self` alone; nothing is written until the
    /// caller swaps the result in.
    pub(crate) fn metabolize<R: Rng + ?Sized>(&self, rules: &Rules, rng: &mut R) -> Pet {
        let mut next = self.clone();
        let asleep = self.action_state == ActionState::Sleeping;

        let decay = if asleep {
            rules.decay_asleep
        } else {
            rules.decay_awake
        };
        next.add_hunger(-decay);
        next.add_happiness(-decay);

        if !asleep && rng.gen_bool(rules.poop_chance) {
            next.add_poop(1, rules.poop_max);
        }

        let neglected = self.poop_count > rules.dirty_above
            || next.hunger < rules.neglect_below
            || next.happiness < rules.neglect_below;
        if neglected && rng.gen_bool(rules.sick_chance) {
            next.is_sick = true;
        }
        if next.is_sick {
            next.add_health(-rules.sick_drain);
            next.add_happiness(-rules.sick_drain);
        }

        next.age += rules.age_per_tick;

        if self.stage == Stage::Baby && next.age > rules.child_age {
            next.stage = Stage::Child;
            next.character = Character::Cat;
        }

        // death wins over a same-tick evolution
        if next.health <= 0.0 {
            next.stage = Stage::Ghost;
        }

        next
    }
}

/// Reward hook for outside collaborators (e.g. a finished focus session).
pub(crate) fn boost_happiness(pet: &mut Pet, rules: &Rules) {
    pet.add_happiness(rules.boost_happiness);
    pet.add_hunger(rules.boost_hunger);
}
