use crate::action::{Controller, Interaction, PendingRevert};
use crate::chat::{compose_or_fallback, CannedChat, ChatProvider};
use crate::minigame::{Engine, GameKind, GameView, Phase, Turn};
use crate::model::{Pet, Rules};
use crate::sim::{self, Metabolism, TickOutcome};
use crate::timers::{Deferred, Ticker};
use chrono::Utc;
use rand::RngCore;
use std::time::Duration;

/// Placeholder bubble while the chat provider is "thinking".
const CHAT_PENDING: &str = "...";

/// Everything the outside world can ask of the pet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Command {
    Feed(Option<f32>),
    SleepToggle,
    SelectPlay,
    Bathe,
    Medicate,
    OpenStats,
    Chat,
    Hatch,
    StartGame(GameKind),
    GameInput(Turn),
    StopGame,
    DismissChat,
}

/// Read-only view handed to the renderer.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub(crate) pet: Pet,
    pub(crate) game: Option<GameView>,
    pub(crate) chat: Option<String>,
    pub(crate) show_stats: bool,
    pub(crate) paused: bool,
}

enum Timed {
    Revert(PendingRevert),
    DeliverChat { request: u64, pet: Pet },
    ClearChat { request: u64 },
}

/// Owns the pet, the action controller and the minigame engine, and is the
/// only thing that mutates them. All timers run on its clock, so every
/// mutation is serialised through `dispatch` and `advance`.
pub(crate) struct Orchestrator {
    rules: Rules,
    pet: Pet,
    metabolism: Metabolism,
    controller: Controller,
    engine: Engine,
    chat: Box<dyn ChatProvider>,
    chat_line: Option<String>,
    chat_request: u64,
    show_stats: bool,
    pet_clock: Ticker,
    game_clock: Ticker,
    timers: Deferred<Timed>,
}

impl Orchestrator {
    pub(crate) fn new(rules: Rules) -> Self {
        let chat = Box::new(CannedChat::new(&rules));
        Self::with_chat(rules, chat)
    }

    pub(crate) fn with_chat(rules: Rules, chat: Box<dyn ChatProvider>) -> Self {
        let pet_period = Duration::from_millis(rules.metabolism_step_ms);
        let game_period = Duration::from_millis(rules.snake_step_ms);
        Self {
            pet: Pet::new_egg(Utc::now()),
            metabolism: Metabolism::default(),
            controller: Controller::default(),
            engine: Engine::default(),
            chat,
            chat_line: None,
            chat_request: 0,
            show_stats: false,
            pet_clock: Ticker::new(pet_period),
            game_clock: Ticker::new(game_period),
            timers: Deferred::default(),
            rules,
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            pet: self.pet.clone(),
            game: self.engine.view(),
            chat: self.chat_line.clone(),
            show_stats: self.show_stats,
            paused: self.metabolism.is_paused(),
        }
    }

    pub(crate) fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Outside pause switch (e.g. a focus timer). The metabolism clock keeps
    /// running; its ticks just do nothing.
    pub(crate) fn set_paused(&mut self, paused: bool) {
        if paused != self.metabolism.is_paused() {
            log::info!("metabolism {}", if paused { "paused" } else { "resumed" });
        }
        self.metabolism.set_paused(paused);
    }

    pub(crate) fn boost_happiness(&mut self) {
        sim::boost_happiness(&mut self.pet, &self.rules);
        log::debug!("happiness boost -> {:.1}", self.pet.happiness);
    }

    pub(crate) fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::Feed(value) => {
                self.interact(Interaction::Feed(value));
            }
            Command::SleepToggle => {
                self.interact(Interaction::SleepToggle);
            }
            Command::SelectPlay => {
                self.interact(Interaction::Play);
            }
            Command::Bathe => {
                self.interact(Interaction::Bathe);
            }
            Command::Medicate => {
                self.interact(Interaction::Medicate);
            }
            Command::OpenStats => {
                if self.interact(Interaction::Stats) {
                    self.show_stats = !self.show_stats;
                }
            }
            Command::Chat => {
                if self.interact(Interaction::Chat) {
                    self.request_chat();
                }
            }
            Command::Hatch => self.hatch(),
            Command::StartGame(kind) => self.start_game(kind),
            Command::GameInput(turn) => {
                if !self.engine.steer(turn) {
                    log::debug!("ignored {turn:?}: no game in play");
                }
            }
            Command::StopGame => self.stop_game(),
            Command::DismissChat => self.dismiss_chat(),
        }
    }

    /// Runs every timer forward by `dt`: one-shots first, then the metabolism
    /// tick, then the minigame tick.
    pub(crate) fn advance(&mut self, dt: Duration, rng: &mut dyn RngCore) {
        for event in self.timers.advance(dt) {
            self.fire(event, rng);
        }

        self.pet_clock.feed(dt);
        while self.pet_clock.try_fire() {
            match self.metabolism.tick(&mut self.pet, &self.rules, rng) {
                TickOutcome::Evolved(stage) => log::info!("pet evolved into {stage:?}"),
                TickOutcome::Died => log::info!("pet died at age {:.3}", self.pet.age),
                TickOutcome::Ticked | TickOutcome::Skipped => {}
            }
        }

        if self.engine.step_ms().is_none() {
            self.game_clock.reset();
            return;
        }
        self.game_clock.feed(dt);
        while let Some(ms) = self.engine.step_ms() {
            self.game_clock.set_period(Duration::from_millis(ms));
            if !self.game_clock.try_fire() {
                break;
            }
            if self.engine.tick(rng) {
                if let Some(view) = self.engine.view() {
                    log::info!("{} over with score {}", view.kind.label(), view.score);
                }
            }
        }
    }

    fn interact(&mut self, action: Interaction) -> bool {
        match self.controller.interact(&mut self.pet, action, &self.rules) {
            Ok(pending) => {
                if let Some(p) = pending {
                    self.timers
                        .schedule(Duration::from_millis(p.after_ms), Timed::Revert(p));
                }
                log::debug!("{action:?} -> {:?}", self.pet.action_state);
                true
            }
            Err(why) => {
                log::debug!("ignored {action:?}: {why:?}");
                false
            }
        }
    }

    fn hatch(&mut self) {
        let was = self.pet.stage;
        match self.controller.hatch(&mut self.pet, &self.rules, Utc::now()) {
            Ok(()) => {
                log::info!("hatch: {was:?} -> {:?}", self.pet.stage);
                self.show_stats = false;
                self.dismiss_chat();
            }
            Err(why) => log::debug!("ignored hatch: {why:?}"),
        }
    }

    fn start_game(&mut self, kind: GameKind) {
        if self.engine.phase() != Phase::NotStarted {
            log::debug!("ignored start of {kind:?}: a session already exists");
            return;
        }
        if let Err(why) = self.controller.begin_game(&mut self.pet, &self.rules) {
            log::debug!("ignored start of {kind:?}: {why:?}");
            return;
        }
        self.engine.start(kind, &self.rules);
        self.game_clock.reset();
        self.show_stats = false;
        log::info!("{} started", kind.label());
    }

    fn stop_game(&mut self) {
        let Some((kind, score)) = self.engine.stop() else {
            log::debug!("ignored stop: no finished game");
            return;
        };
        if let Err(why) = self.controller.end_game(&mut self.pet, &self.rules) {
            log::warn!("game ended but action state did not: {why:?}");
        }
        self.pet
            .add_happiness(score as f32 * self.rules.game_reward_per_point);
        self.pet.add_hunger(-self.rules.game_hunger_cost);
        log::info!(
            "{} dismissed, score {score}: happiness {:.1}, hunger {:.1}",
            kind.label(),
            self.pet.happiness,
            self.pet.hunger
        );
    }

    fn request_chat(&mut self) {
        self.chat_request += 1;
        self.chat_line = Some(CHAT_PENDING.to_string());
        self.timers.schedule(
            Duration::from_millis(self.rules.chat_latency_ms),
            Timed::DeliverChat {
                request: self.chat_request,
                pet: self.pet.clone(),
            },
        );
    }

    fn dismiss_chat(&mut self) {
        // bumping the request id orphans any delivery still in flight
        self.chat_request += 1;
        self.chat_line = None;
    }

    fn fire(&mut self, event: Timed, rng: &mut dyn RngCore) {
        match event {
            Timed::Revert(pending) => {
                if self.controller.expire(&mut self.pet, pending) {
                    log::debug!("{:?} finished", pending.from);
                }
            }
            Timed::DeliverChat { request, pet } if request == self.chat_request => {
                let line = compose_or_fallback(self.chat.as_mut(), &pet, rng);
                self.chat_line = Some(line);
                self.timers.schedule(
                    Duration::from_millis(self.rules.chat_display_ms),
                    Timed::ClearChat { request },
                );
            }
            Timed::ClearChat { request } if request == self.chat_request => {
                self.chat_line = None;
            }
            Timed::DeliverChat { .. } | Timed::ClearChat { .. } => {}
        }
    }
}
