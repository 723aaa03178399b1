use crate::minigame::{GameKind, Turn};
use crate::orchestrator::{Command, Snapshot};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// The device's three physical buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Button {
    A,
    B,
    C,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Key {
    Press(Button),
    TogglePause,
    /// A focus session finished outside the game.
    FocusDone,
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Key>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(key) = map_key(k.code, k.modifiers) {
                out.push(key);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

fn map_key(code: KeyCode, mods: KeyModifiers) -> Option<Key> {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Some(Key::Quit);
    }
    match code {
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Key::Press(Button::A)),
        KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Enter | KeyCode::Char(' ') => {
            Some(Key::Press(Button::B))
        }
        KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Right | KeyCode::Esc => {
            Some(Key::Press(Button::C))
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Key::TogglePause),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Key::FocusDone),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Key::Quit),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Icon {
    Feed,
    Light,
    Play,
    Medicine,
    Bath,
    Stats,
    Chat,
}

impl Icon {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Icon::Feed => "Feed",
            Icon::Light => "Light",
            Icon::Play => "Play",
            Icon::Medicine => "Meds",
            Icon::Bath => "Bath",
            Icon::Stats => "Stats",
            Icon::Chat => "Chat",
        }
    }
}

pub(crate) const ICONS: [Icon; 7] = [
    Icon::Feed,
    Icon::Light,
    Icon::Play,
    Icon::Medicine,
    Icon::Bath,
    Icon::Stats,
    Icon::Chat,
];

pub(crate) struct Food {
    pub(crate) name: &'static str,
    pub(crate) value: f32,
}

pub(crate) const FOODS: [Food; 4] = [
    Food {
        name: "Fish",
        value: 30.0,
    },
    Food {
        name: "Milk",
        value: 15.0,
    },
    Food {
        name: "Drumstick",
        value: 40.0,
    },
    Food {
        name: "Cookie",
        value: 10.0,
    },
];

pub(crate) const GAMES: [GameKind; 2] = [GameKind::Snake, GameKind::Dodge];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Overlay {
    None,
    Food(usize),
    Game(usize),
}

/// Icon cursor and pick-lists. Pure presentation: only the final choice
/// leaves here, as a `Command`.
#[derive(Clone, Debug)]
pub(crate) struct Menu {
    pub(crate) icon: usize,
    pub(crate) overlay: Overlay,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            icon: 0,
            overlay: Overlay::None,
        }
    }
}

impl Menu {
    pub(crate) fn selected(&self) -> Icon {
        ICONS[self.icon % ICONS.len()]
    }

    /// A cycles, B confirms, C cancels. While a game is on screen A/C steer
    /// and B only dismisses a finished game.
    pub(crate) fn press(&mut self, button: Button, snap: &Snapshot) -> Option<Command> {
        if let Some(game) = &snap.game {
            return match (button, game.over) {
                (Button::A, false) => Some(Command::GameInput(Turn::Left)),
                (Button::C, false) => Some(Command::GameInput(Turn::Right)),
                (Button::B, true) => Some(Command::StopGame),
                _ => None,
            };
        }

        match self.overlay {
            Overlay::Food(i) => {
                return match button {
                    Button::A => {
                        self.overlay = Overlay::Food((i + 1) % FOODS.len());
                        None
                    }
                    Button::B => {
                        self.overlay = Overlay::None;
                        Some(Command::Feed(Some(FOODS[i].value)))
                    }
                    Button::C => {
                        self.overlay = Overlay::None;
                        None
                    }
                };
            }
            Overlay::Game(i) => {
                return match button {
                    Button::A => {
                        self.overlay = Overlay::Game((i + 1) % GAMES.len());
                        None
                    }
                    Button::B => {
                        self.overlay = Overlay::None;
                        Some(Command::StartGame(GAMES[i]))
                    }
                    Button::C => {
                        self.overlay = Overlay::None;
                        None
                    }
                };
            }
            Overlay::None => {}
        }

        match button {
            Button::A => {
                self.icon = (self.icon + 1) % ICONS.len();
                None
            }
            Button::B if !snap.pet.stage.is_alive() => Some(Command::Hatch),
            Button::B => match self.selected() {
                Icon::Feed => {
                    self.overlay = Overlay::Food(0);
                    None
                }
                Icon::Play => {
                    self.overlay = Overlay::Game(0);
                    Some(Command::SelectPlay)
                }
                Icon::Light => Some(Command::SleepToggle),
                Icon::Medicine => Some(Command::Medicate),
                Icon::Bath => Some(Command::Bathe),
                Icon::Stats => Some(Command::OpenStats),
                Icon::Chat => Some(Command::Chat),
            },
            Button::C if snap.chat.is_some() => Some(Command::DismissChat),
            Button::C if snap.show_stats => Some(Command::OpenStats),
            Button::C => None,
        }
    }
}
