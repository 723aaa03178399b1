use crate::config::{load_settings, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, Key, Menu};
use crate::orchestrator::Orchestrator;
use crate::render::{draw_frame, Palette, Terminal};
use crate::Args;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    orch: Orchestrator,
    menu: Menu,
    rng: SmallRng,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init(args: &Args, paths: Paths) -> anyhow::Result<Self> {
        let mut settings = load_settings(&paths.settings_path);
        if let Some(fps) = args.fps {
            settings.fps_cap = fps;
        }
        if args.mono {
            settings.enable_color = false;
        }

        let seed = args.seed.unwrap_or(settings.seed);
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        log::info!(
            "starting: fps {} seed {}",
            settings.fps_cap,
            if seed == 0 { "entropy".to_string() } else { seed.to_string() }
        );

        let orch = Orchestrator::new(settings.rules.clone());
        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            paths,
            orch,
            menu: Menu::default(),
            rng,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let palette = Palette::new(self.settings.enable_color);

        let mut last_frame = Instant::now();

        while !self.should_quit {
            self.term.resize_if_needed()?;

            for key in collect_input_nonblocking(frame_dt)? {
                match key {
                    Key::Quit => {
                        self.should_quit = true;
                        break;
                    }
                    Key::TogglePause => {
                        let paused = self.orch.snapshot().paused;
                        self.orch.set_paused(!paused);
                    }
                    Key::FocusDone => self.orch.boost_happiness(),
                    Key::Press(button) => {
                        let snap = self.orch.snapshot();
                        if let Some(cmd) = self.menu.press(button, &snap) {
                            self.orch.dispatch(cmd);
                        }
                    }
                }
            }

            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            self.orch.advance(real_dt, &mut self.rng);

            let snap = self.orch.snapshot();
            draw_frame(
                &mut self.term.cur,
                &snap,
                &self.menu,
                self.orch.rules(),
                palette,
            );
            self.term.present()?;

            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        log::info!("bye");
        Ok(())
    }
}

pub(crate) fn run(args: &Args, paths: Paths) -> anyhow::Result<()> {
    let mut app = App::init(args, paths)?;
    let result = app.run();
    if result.is_err() {
        // leave the terminal usable even when the loop bailed out
        let _ = app.term.end();
    }
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
