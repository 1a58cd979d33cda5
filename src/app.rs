//! App: terminal init, main loop, tick pacing and key handling.

use crate::game::{Command, RoundController};
use crate::input::key_to_command;
use crate::theme::Theme;
use crate::{Args, GameConfig, highscores};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Tick rate while the game-over summary is on screen.
const OVER_TICK_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    round: RoundController,
    screen: Screen,
    last_tick: Instant,
    best_score: u32,
    new_best: bool,
    /// TachyonFX fade-in for the game-over summary.
    over_effect: Option<Effect>,
    over_effect_time: Option<Instant>,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let round = RoundController::new(config.width, config.height, config.seed);
        let best_score = highscores::load_best_score();
        Ok(Self {
            args,
            config,
            theme,
            round,
            screen: Screen::Playing,
            last_tick: Instant::now(),
            best_score,
            new_best: false,
            over_effect: None,
            over_effect_time: None,
        })
    }

    /// Fresh round. An explicit --seed replays the same shape sequence;
    /// otherwise a new seed is taken from the clock.
    fn reset_round(&mut self) {
        let seed = self.args.seed.unwrap_or_else(crate::seed_from_time);
        self.round = RoundController::new(self.config.width, self.config.height, seed);
        self.screen = Screen::Playing;
        self.last_tick = Instant::now();
        self.new_best = false;
        self.over_effect = None;
        self.over_effect_time = None;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        // The command consumed by the next tick; the latest press before the
        // tick boundary wins.
        let mut pending = Command::None;
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.round,
                    &self.theme,
                    self.best_score,
                    self.new_best,
                    f.area(),
                    &mut self.over_effect,
                    &mut self.over_effect_time,
                    now,
                )
            })?;

            let rate = match self.screen {
                Screen::Playing => self.config.tick_rate,
                Screen::GameOver => OVER_TICK_RATE,
            };
            let tick_interval = Duration::from_secs_f64(1.0 / rate);

            // Block until the next tick boundary, decoding any keys that
            // arrive in the meantime.
            loop {
                let timeout = tick_interval.saturating_sub(self.last_tick.elapsed());
                if timeout.is_zero() || !event::poll(timeout)? {
                    break;
                }
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.screen {
                        Screen::Playing => {
                            let cmd = key_to_command(key);
                            if cmd == Command::Quit {
                                return Ok(());
                            }
                            if cmd != Command::None {
                                pending = cmd;
                            }
                        }
                        Screen::GameOver => {
                            if key_to_command(key) == Command::Quit {
                                return Ok(());
                            }
                            if matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')) {
                                self.reset_round();
                                break;
                            }
                        }
                    }
                }
            }
            self.last_tick = Instant::now();

            if self.screen == Screen::Playing {
                self.round.step(std::mem::take(&mut pending));
                if self.round.is_over() {
                    self.new_best = self.round.score() > self.best_score;
                    if self.new_best {
                        self.best_score = self.round.score();
                        let _ = highscores::save_best_score(self.best_score);
                    }
                    self.screen = Screen::GameOver;
                    self.over_effect = None;
                    self.over_effect_time = None;
                }
            }
        }
    }
}
