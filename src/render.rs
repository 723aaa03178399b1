use crate::input::{Menu, Overlay, FOODS, GAMES, ICONS};
use crate::minigame::{Asteroid, Board, GameView, Point, GRID, LANES, ROCKET_ROW};
use crate::model::{ActionState, Mood, Pet, Rules, Stage};
use crate::orchestrator::Snapshot;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                bg,
                ..Cell::default()
            };
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Palette
------------------------------ */

#[derive(Clone, Copy)]
pub(crate) struct Palette {
    color: bool,
}

impl Palette {
    pub(crate) fn new(color: bool) -> Self {
        Self { color }
    }

    fn pick(self, c: Color) -> Color {
        if self.color {
            c
        } else {
            Color::White
        }
    }

    fn text(self) -> Color {
        Color::White
    }
    fn accent(self) -> Color {
        self.pick(Color::Yellow)
    }
    fn dim(self) -> Color {
        self.pick(Color::DarkGrey)
    }
    fn pet(self, mood: Mood) -> Color {
        self.pick(match mood {
            Mood::Sick => Color::Green,
            Mood::Sleeping => Color::Blue,
            Mood::Playing | Mood::Happy => Color::Magenta,
            Mood::Dirty => Color::DarkYellow,
            Mood::Hungry => Color::Red,
            Mood::Normal => Color::Cyan,
        })
    }
    fn danger(self) -> Color {
        self.pick(Color::Red)
    }
    fn good(self) -> Color {
        self.pick(Color::Green)
    }
}

const BG: Color = Color::Black;

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg: BG });
    }
}

fn bar(value01: f32, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

/* -----------------------------
   Screen
------------------------------ */

pub(crate) fn draw_frame(
    buf: &mut CellBuffer,
    snap: &Snapshot,
    menu: &Menu,
    rules: &Rules,
    pal: Palette,
) {
    buf.clear(BG);

    let mood = snap.pet.mood(rules);
    let mut title = format!(
        "PocketPet  |  {:?}  |  {:?}",
        snap.pet.stage, snap.pet.action_state
    );
    if snap.paused {
        title.push_str("  |  paused");
    }
    draw_text(buf, 1, 0, &title, pal.text());

    draw_icon_bar(buf, menu, snap.game.is_some(), pal);

    let stage_top = 3;
    if let Some(game) = &snap.game {
        draw_game(buf, game, 2, stage_top, pal);
    } else if snap.show_stats {
        draw_stats(buf, &snap.pet, 2, stage_top, pal);
    } else {
        draw_pet(buf, &snap.pet, mood, 4, stage_top + 1, pal);
        match menu.overlay {
            Overlay::Food(i) => {
                let items: Vec<String> = FOODS
                    .iter()
                    .map(|f| format!("{} (+{})", f.name, f.value))
                    .collect();
                draw_pick_list(buf, "Food", &items, i, 30, stage_top, pal);
            }
            Overlay::Game(i) => {
                let items: Vec<String> = GAMES.iter().map(|g| g.label().to_string()).collect();
                draw_pick_list(buf, "Game", &items, i, 30, stage_top, pal);
            }
            Overlay::None => {}
        }
    }

    if let Some(line) = &snap.chat {
        if snap.game.is_none() {
            draw_bubble(buf, line, 18, stage_top + 2, pal);
        }
    }

    let help = match (&snap.game, snap.pet.stage) {
        (Some(g), _) if g.over => "Game over: B leave | q quit",
        (Some(_), _) => "A/← left | C/→ right | q quit",
        (None, Stage::Egg) => "B hatch the egg | q quit",
        (None, Stage::Ghost) => "Your pet has passed on. B for a new egg | q quit",
        _ => "A next | B select | C cancel | p pause | f focus done | q quit",
    };
    let footer = buf.h.saturating_sub(1);
    draw_text(buf, 1, footer, help, pal.dim());
}

fn draw_icon_bar(buf: &mut CellBuffer, menu: &Menu, in_game: bool, pal: Palette) {
    let mut x = 1u16;
    for (i, icon) in ICONS.iter().enumerate() {
        let selected = !in_game && menu.overlay == Overlay::None && i == menu.icon;
        let label = if selected {
            format!("[{}]", icon.label())
        } else {
            format!(" {} ", icon.label())
        };
        let fg = if selected { pal.accent() } else { pal.dim() };
        draw_text(buf, x, 1, &label, fg);
        x = x.saturating_add(label.chars().count() as u16 + 1);
    }
}

fn sprite(pet: &Pet, mood: Mood) -> [&'static str; 5] {
    match pet.stage {
        Stage::Egg => [
            "   ____   ",
            "  /    \\  ",
            " | .  . | ",
            "  \\____/  ",
            "          ",
        ],
        Stage::Ghost => [
            "   .--.   ",
            "  ( x x)  ",
            "  |  o |  ",
            "  |/\\/\\|  ",
            "          ",
        ],
        _ => {
            let face = match (pet.action_state, mood) {
                (ActionState::Sleeping, _) => " ( -.- )z ",
                (ActionState::Eating, _) => " ( o.O )~ ",
                (ActionState::Bathing, _) => " ( ^.^ )° ",
                (_, Mood::Sick) => " ( @.@ )  ",
                (_, Mood::Happy) => " ( ^.^ )  ",
                (_, Mood::Hungry | Mood::Dirty) => " ( T.T )  ",
                _ => " ( o.o )  ",
            };
            let small = matches!(pet.stage, Stage::Baby);
            [
                if small { "          " } else { "  /\\_/\\   " },
                if small { "  /\\_/\\   " } else { face },
                if small { face } else { "  > ^ <   " },
                if small { "  (   )   " } else { "  /   \\   " },
                if small { "          " } else { " (_____)  " },
            ]
        }
    }
}

fn draw_pet(buf: &mut CellBuffer, pet: &Pet, mood: Mood, x: u16, y: u16, pal: Palette) {
    let fg = if pet.stage.is_alive() {
        pal.pet(mood)
    } else {
        pal.text()
    };
    for (i, line) in sprite(pet, mood).iter().enumerate() {
        draw_text(buf, x, y + i as u16, line, fg);
    }
    if pet.stage.is_alive() {
        let poop = "@ ".repeat(pet.poop_count as usize);
        draw_text(buf, x + 12, y + 4, &poop, pal.pick(Color::DarkYellow));
        if pet.is_sick {
            draw_text(buf, x + 12, y, "+", pal.danger());
        }
    }
}

fn draw_stats(buf: &mut CellBuffer, pet: &Pet, x: u16, y: u16, pal: Palette) {
    let meters = [
        ("Hunger", pet.hunger),
        ("Happy ", pet.happiness),
        ("Health", pet.health),
    ];
    for (i, (name, val)) in meters.iter().enumerate() {
        let fg = if *val < 30.0 { pal.danger() } else { pal.good() };
        let line = format!("{name}: {} {:>5.1}", bar(*val / 100.0, 14), val);
        draw_text(buf, x, y + i as u16, &line, fg);
    }
    let rest = [
        format!("Age   : {:.0} days", pet.age.floor()),
        format!("Weight: {:.0} g", pet.weight),
        format!("Poop  : {}", pet.poop_count),
        format!("Sick  : {}", if pet.is_sick { "yes" } else { "no" }),
        format!("Born  : {}", pet.birth_time.format("%Y-%m-%d %H:%M")),
    ];
    for (i, line) in rest.iter().enumerate() {
        draw_text(buf, x, y + 4 + i as u16, line, pal.text());
    }
}

fn draw_pick_list(
    buf: &mut CellBuffer,
    title: &str,
    items: &[String],
    selected: usize,
    x: u16,
    y: u16,
    pal: Palette,
) {
    draw_text(buf, x, y, title, pal.text());
    for (i, item) in items.iter().enumerate() {
        let (marker, fg) = if i == selected {
            (">", pal.accent())
        } else {
            (" ", pal.text())
        };
        draw_text(buf, x, y + 1 + i as u16, &format!("{marker} {item}"), fg);
    }
}

fn draw_bubble(buf: &mut CellBuffer, line: &str, x: u16, y: u16, pal: Palette) {
    let w = line.chars().count() as u16 + 2;
    let edge: String = "─".repeat(w as usize);
    draw_text(buf, x, y.saturating_sub(1), &format!("┌{edge}┐"), pal.text());
    draw_text(buf, x, y, &format!("│ {line} │"), pal.text());
    draw_text(buf, x, y + 1, &format!("└{edge}┘"), pal.text());
}

fn draw_game(buf: &mut CellBuffer, game: &GameView, x: u16, y: u16, pal: Palette) {
    let status = if game.over {
        format!("{}  score {}  GAME OVER", game.kind.label(), game.score)
    } else {
        format!("{}  score {}", game.kind.label(), game.score)
    };
    draw_text(buf, x, y, &status, if game.over { pal.danger() } else { pal.accent() });

    match &game.board {
        Board::Snake(s) => {
            let top = y + 1;
            let edge = "#".repeat(GRID as usize * 2 + 2);
            draw_text(buf, x, top, &edge, pal.dim());
            for row in 0..GRID {
                let mut line = String::from("#");
                for col in 0..GRID {
                    let p = Point::new(col, row);
                    let glyph = if s.head() == Some(p) {
                        "@ "
                    } else if s.body.contains(&p) {
                        "o "
                    } else if s.food == p {
                        "* "
                    } else {
                        "  "
                    };
                    line.push_str(glyph);
                }
                line.push('#');
                draw_text(buf, x, top + 1 + row as u16, &line, pal.good());
            }
            draw_text(buf, x, top + 1 + GRID as u16, &edge, pal.dim());
        }
        Board::Dodge(d) => {
            let top = y + 1;
            let lane_w = 4usize;
            for row in 0..=ROCKET_ROW + 2 {
                let mut line = String::from("|");
                for lane in 0..LANES {
                    let cell = if row == ROCKET_ROW && lane == d.rocket_lane {
                        " /\\ "
                    } else if d.asteroids.contains(&Asteroid { lane, y: row }) {
                        " () "
                    } else {
                        "    "
                    };
                    line.push_str(&cell[..lane_w]);
                    line.push('|');
                }
                draw_text(buf, x, top + row as u16, &line, pal.text());
            }
        }
    }
}
