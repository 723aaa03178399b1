use crate::model::{ActionState, Character, Pet, Rules, Stage};
use chrono::{DateTime, Utc};

/// Events that move the pet between action states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Trigger {
    Feed,
    Bathe,
    SleepToggle,
    StartGame,
    EndGame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) to: ActionState,
    /// Transient states fall back to Idle on their own after this many ms.
    pub(crate) revert_after_ms: Option<u64>,
}

/// The whole action-state machine. Anything not listed is rejected, which is
/// what makes Eating/Bathing/PlayingGame a busy-lock. A sleeping pet can be
/// woken or woken into a game; a finished game always lands on Idle.
pub(crate) fn transition(from: ActionState, trigger: Trigger, rules: &Rules) -> Option<Transition> {
    use ActionState::*;

    let transient = Some(rules.action_duration_ms);
    let (to, revert_after_ms) = match (from, trigger) {
        (Idle, Trigger::Feed) => (Eating, transient),
        (Idle, Trigger::Bathe) => (Bathing, transient),
        (Idle, Trigger::SleepToggle) => (Sleeping, None),
        (Sleeping, Trigger::SleepToggle) => (Idle, None),
        (Idle | Sleeping, Trigger::StartGame) => (PlayingGame, None),
        (PlayingGame, Trigger::EndGame) => (Idle, None),
        _ => return None,
    };
    Some(Transition {
        to,
        revert_after_ms,
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Interaction {
    /// Food value; `None` uses the default portion.
    Feed(Option<f32>),
    SleepToggle,
    Play,
    Bathe,
    Medicate,
    Stats,
    Chat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rejection {
    NotHatched(Stage),
    Busy(ActionState),
    Sick,
    NotSick,
    Alive(Stage),
}

/// A self-clear timer armed by a transient action. It only fires back to Idle
/// if nothing else happened to the action state in the meantime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingRevert {
    pub(crate) from: ActionState,
    pub(crate) after_ms: u64,
    epoch: u64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Controller {
    epoch: u64,
}

impl Controller {
    pub(crate) fn interact(
        &mut self,
        pet: &mut Pet,
        action: Interaction,
        rules: &Rules,
    ) -> Result<Option<PendingRevert>, Rejection> {
        if !pet.stage.is_alive() {
            return Err(Rejection::NotHatched(pet.stage));
        }
        if !matches!(
            pet.action_state,
            ActionState::Idle | ActionState::Sleeping
        ) {
            return Err(Rejection::Busy(pet.action_state));
        }

        match action {
            Interaction::Feed(amount) => {
                if pet.is_sick {
                    return Err(Rejection::Sick);
                }
                let pending = self.fire(pet, Trigger::Feed, rules)?;
                pet.add_hunger(amount.unwrap_or(rules.feed_default));
                pet.weight += rules.feed_weight;
                pet.add_happiness(rules.feed_happiness);
                Ok(pending)
            }
            Interaction::SleepToggle => self.fire(pet, Trigger::SleepToggle, rules),
            Interaction::Bathe => {
                let pending = self.fire(pet, Trigger::Bathe, rules)?;
                pet.poop_count = 0;
                pet.add_happiness(rules.bathe_happiness);
                Ok(pending)
            }
            Interaction::Medicate => {
                if !pet.is_sick {
                    return Err(Rejection::NotSick);
                }
                pet.is_sick = false;
                pet.add_health(rules.medicine_health);
                Ok(None)
            }
            Interaction::Play | Interaction::Stats | Interaction::Chat => Ok(None),
        }
    }

    pub(crate) fn hatch(
        &mut self,
        pet: &mut Pet,
        rules: &Rules,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        match pet.stage {
            Stage::Egg => {
                pet.stage = Stage::Baby;
                pet.character = Character::Cat;
                pet.hunger = rules.hatch_hunger;
                pet.happiness = rules.hatch_happiness;
                Ok(())
            }
            Stage::Ghost => {
                *pet = Pet::new_egg(now);
                self.epoch += 1;
                Ok(())
            }
            other => Err(Rejection::Alive(other)),
        }
    }

    pub(crate) fn begin_game(&mut self, pet: &mut Pet, rules: &Rules) -> Result<(), Rejection> {
        if !pet.stage.is_alive() {
            return Err(Rejection::NotHatched(pet.stage));
        }
        self.fire(pet, Trigger::StartGame, rules).map(|_| ())
    }

    pub(crate) fn end_game(&mut self, pet: &mut Pet, rules: &Rules) -> Result<(), Rejection> {
        self.fire(pet, Trigger::EndGame, rules).map(|_| ())
    }

    /// Called when a self-clear timer fires. Returns whether it took effect.
    pub(crate) fn expire(&mut self, pet: &mut Pet, pending: PendingRevert) -> bool {
        if pending.epoch != self.epoch || pet.action_state != pending.from {
            return false;
        }
        pet.action_state = ActionState::Idle;
        self.epoch += 1;
        true
    }

    fn fire(
        &mut self,
        pet: &mut Pet,
        trigger: Trigger,
        rules: &Rules,
    ) -> Result<Option<PendingRevert>, Rejection> {
        let t = transition(pet.action_state, trigger, rules)
            .ok_or(Rejection::Busy(pet.action_state))?;
        pet.action_state = t.to;
        self.epoch += 1;
        Ok(t.revert_after_ms.map(|after_ms| PendingRevert {
            from: t.to,
            after_ms,
            epoch: self.epoch,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baby() -> Pet {
        Pet {
            stage: Stage::Baby,
            character: Character::Cat,
            ..Pet::new_egg(Utc::now())
        }
    }

    #[test]
    fn transition_table_only_allows_listed_moves() {
        use ActionState::*;
        let rules = Rules::default();
        let all = [Idle, Eating, Bathing, PlayingGame, Sleeping];
        let triggers = [
            Trigger::Feed,
            Trigger::Bathe,
            Trigger::SleepToggle,
            Trigger::StartGame,
            Trigger::EndGame,
        ];

        let mut allowed = 0;
        for from in all {
            for trig in triggers {
                if let Some(t) = transition(from, trig, &rules) {
                    allowed += 1;
                    assert!(matches!(from, Idle | Sleeping | PlayingGame));
                    assert_eq!(
                        t.revert_after_ms.is_some(),
                        matches!(t.to, Eating | Bathing)
                    );
                }
            }
        }
        assert_eq!(allowed, 7);
        assert!(transition(Sleeping, Trigger::Feed, &rules).is_none());
        assert!(transition(Eating, Trigger::SleepToggle, &rules).is_none());
    }

    #[test]
    fn feed_applies_food_and_arms_revert() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        pet.hunger = 50.0;
        pet.happiness = 60.0;

        let pending = c
            .interact(&mut pet, Interaction::Feed(Some(30.0)), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(pet.hunger, 80.0);
        assert_eq!(pet.weight, 6.0);
        assert_eq!(pet.happiness, 62.0);
        assert_eq!(pet.action_state, ActionState::Eating);
        assert_eq!(pending.after_ms, 2_000);

        assert!(c.expire(&mut pet, pending));
        assert_eq!(pet.action_state, ActionState::Idle);
    }

    #[test]
    fn feed_defaults_and_clamps() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        pet.hunger = 90.0;
        c.interact(&mut pet, Interaction::Feed(None), &rules).unwrap();
        assert_eq!(pet.hunger, 100.0);
    }

    #[test]
    fn busy_pet_rejects_everything_but_timers() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        c.interact(&mut pet, Interaction::Bathe, &rules).unwrap();

        for action in [
            Interaction::Feed(None),
            Interaction::SleepToggle,
            Interaction::Bathe,
            Interaction::Medicate,
            Interaction::Chat,
        ] {
            let before = pet.clone();
            assert_eq!(
                c.interact(&mut pet, action, &rules),
                Err(Rejection::Busy(ActionState::Bathing))
            );
            assert_eq!(pet, before);
        }
    }

    #[test]
    fn sleeping_pet_can_be_woken_and_medicated_but_not_fed() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        pet.is_sick = true;
        pet.health = 50.0;
        c.interact(&mut pet, Interaction::SleepToggle, &rules).unwrap();
        assert_eq!(pet.action_state, ActionState::Sleeping);

        assert_eq!(
            c.interact(&mut pet, Interaction::Feed(None), &rules),
            Err(Rejection::Sick)
        );
        c.interact(&mut pet, Interaction::Medicate, &rules).unwrap();
        assert!(!pet.is_sick);
        assert_eq!(pet.health, 70.0);

        assert_eq!(
            c.interact(&mut pet, Interaction::Feed(None), &rules),
            Err(Rejection::Busy(ActionState::Sleeping))
        );
        assert_eq!(
            c.interact(&mut pet, Interaction::Bathe, &rules),
            Err(Rejection::Busy(ActionState::Sleeping))
        );

        c.interact(&mut pet, Interaction::SleepToggle, &rules).unwrap();
        assert_eq!(pet.action_state, ActionState::Idle);
    }

    #[test]
    fn sick_pet_refuses_food_and_medicine_needs_sickness() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        assert_eq!(
            c.interact(&mut pet, Interaction::Medicate, &rules),
            Err(Rejection::NotSick)
        );
        pet.is_sick = true;
        pet.health = 95.0;
        assert_eq!(
            c.interact(&mut pet, Interaction::Feed(Some(10.0)), &rules),
            Err(Rejection::Sick)
        );
        c.interact(&mut pet, Interaction::Medicate, &rules).unwrap();
        assert_eq!(pet.health, 100.0);
    }

    #[test]
    fn bathe_cleans_up() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        pet.poop_count = 4;
        pet.happiness = 50.0;
        let pending = c.interact(&mut pet, Interaction::Bathe, &rules).unwrap();
        assert!(pending.is_some());
        assert_eq!(pet.poop_count, 0);
        assert_eq!(pet.happiness, 55.0);
        assert_eq!(pet.action_state, ActionState::Bathing);
    }

    #[test]
    fn egg_and_ghost_ignore_interactions() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut egg = Pet::new_egg(Utc::now());
        let before = egg.clone();
        assert_eq!(
            c.interact(&mut egg, Interaction::Feed(None), &rules),
            Err(Rejection::NotHatched(Stage::Egg))
        );
        assert_eq!(egg, before);

        let mut ghost = baby();
        ghost.stage = Stage::Ghost;
        assert!(c.interact(&mut ghost, Interaction::SleepToggle, &rules).is_err());
        assert!(c.begin_game(&mut ghost, &rules).is_err());
    }

    #[test]
    fn hatch_from_any_egg_gives_fresh_baby_cat() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut egg = Pet::new_egg(Utc::now());
        egg.hunger = 3.0;
        egg.happiness = 99.0;
        egg.character = Character::DevilCat;

        c.hatch(&mut egg, &rules, Utc::now()).unwrap();
        assert_eq!(egg.stage, Stage::Baby);
        assert_eq!(egg.character, Character::Cat);
        assert_eq!(egg.hunger, 80.0);
        assert_eq!(egg.happiness, 80.0);

        assert_eq!(
            c.hatch(&mut egg, &rules, Utc::now()),
            Err(Rejection::Alive(Stage::Baby))
        );
    }

    #[test]
    fn hatch_resets_a_ghost_to_initial_egg() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        pet.stage = Stage::Ghost;
        pet.health = 0.0;
        pet.weight = 42.0;
        pet.age = 3.0;

        let now = Utc::now();
        c.hatch(&mut pet, &rules, now).unwrap();
        assert_eq!(pet, Pet::new_egg(now));
    }

    #[test]
    fn stale_revert_never_overwrites_a_newer_state() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();

        let eat = c
            .interact(&mut pet, Interaction::Feed(None), &rules)
            .unwrap()
            .unwrap();
        assert!(c.expire(&mut pet, eat));

        let bath = c.interact(&mut pet, Interaction::Bathe, &rules).unwrap().unwrap();
        // the eating timer firing twice must not cut the bath short
        assert!(!c.expire(&mut pet, eat));
        assert_eq!(pet.action_state, ActionState::Bathing);
        assert!(c.expire(&mut pet, bath));

        // a revert armed before a ghost reset is dead too
        let eat = c
            .interact(&mut pet, Interaction::Feed(None), &rules)
            .unwrap()
            .unwrap();
        pet.stage = Stage::Ghost;
        c.hatch(&mut pet, &rules, Utc::now()).unwrap();
        pet.action_state = ActionState::Eating;
        assert!(!c.expire(&mut pet, eat));
    }

    #[test]
    fn game_round_trip_through_fsm() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        c.begin_game(&mut pet, &rules).unwrap();
        assert_eq!(pet.action_state, ActionState::PlayingGame);
        assert!(c.begin_game(&mut pet, &rules).is_err());
        c.end_game(&mut pet, &rules).unwrap();
        assert_eq!(pet.action_state, ActionState::Idle);
        assert!(c.end_game(&mut pet, &rules).is_err());
    }

    #[test]
    fn sleeping_pet_wakes_into_a_game_and_ends_idle() {
        let rules = Rules::default();
        let mut c = Controller::default();
        let mut pet = baby();
        c.interact(&mut pet, Interaction::SleepToggle, &rules).unwrap();
        assert_eq!(pet.action_state, ActionState::Sleeping);

        c.begin_game(&mut pet, &rules).unwrap();
        assert_eq!(pet.action_state, ActionState::PlayingGame);
        c.end_game(&mut pet, &rules).unwrap();
        assert_eq!(pet.action_state, ActionState::Idle);
    }
}
