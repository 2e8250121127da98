//! The runtime: owns the terminal, the state, and the event loop, and
//! executes effects by spawning handler tasks.
//!
//! The loop is synchronous. Spawned tasks report back through an
//! unbounded inbox channel and their results are folded into state on
//! the next iteration.

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use notex_core::catalog::{Catalog, NotesBackend};
use notex_core::config::{Config, GeneratorConfig};
use notex_core::hierarchy::Level;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::render;
use crate::state::AppState;
use crate::terminal::{install_panic_hook, restore_terminal, setup_terminal};
use crate::update;
use inbox::{UiEventReceiver, UiEventSender};

/// Tick interval while something animates or input just arrived.
const FRAME_DURATION: Duration = Duration::from_millis(16);
/// Tick interval when the screen is at rest.
const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);
/// How long after a key press polling stays at frame rate.
const INPUT_ACTIVITY_WINDOW: Duration = Duration::from_millis(500);

pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    catalog: Catalog,
    notes: NotesBackend,
    generator: GeneratorConfig,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    pub fn new(config: Config, catalog: Catalog, notes: NotesBackend) -> Result<Self> {
        install_panic_hook();
        let terminal = setup_terminal()?;
        let generator = config.generator.clone();
        let state = AppState::new(config);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal,
            state,
            catalog,
            notes,
            generator,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
            last_terminal_event: Instant::now(),
        })
    }

    /// Runs until quit. The root catalog load is kicked off first so the
    /// exam list is already on its way when the first frame draws.
    pub fn run(&mut self) -> Result<()> {
        let request = self.state.tui.controller.start();
        self.execute_effect(UiEffect::LoadLevel { request });
        self.event_loop()
    }

    fn event_loop(&mut self) -> Result<()> {
        while !self.state.tui.should_quit {
            let mut events = self.collect_events()?;
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            let mut dirty = false;
            for event in events {
                if matches!(event, UiEvent::Tick) {
                    dirty = true;
                }
                for effect in update::update(&mut self.state, event) {
                    self.execute_effect(effect);
                }
            }

            if dirty {
                self.terminal
                    .draw(|frame| render::render(&self.state, frame))?;
            }
        }
        Ok(())
    }

    /// Waits for the next batch of events: inbox results first, then
    /// terminal input, then a tick once the interval has elapsed.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let tick_interval = if self.needs_fast_poll() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        let mut events = Vec::new();
        while let Ok(event) = self.inbox_rx.try_recv() {
            events.push(event);
        }

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };
        if event::poll(poll_duration)? {
            self.last_terminal_event = Instant::now();
            events.push(UiEvent::Terminal(event::read()?));
            // Drain whatever else is already buffered so a paste lands in
            // one batch.
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            self.last_tick = Instant::now();
            events.push(UiEvent::Tick);
        }
        Ok(events)
    }

    fn needs_fast_poll(&self) -> bool {
        let tui = &self.state.tui;
        tui.notes.generation.is_running()
            || tui.notes.save.is_saving()
            || tui.notes.loading
            || Level::all()
                .iter()
                .any(|level| tui.controller.store().is_loading(*level))
            || self.last_terminal_event.elapsed() < INPUT_ACTIVITY_WINDOW
    }

    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => self.state.tui.should_quit = true,
            UiEffect::LoadLevel { request } => {
                let catalog = self.catalog.clone();
                self.spawn_effect(move || handlers::load_level(catalog, request));
            }
            UiEffect::LoadNotes { topic_id, exam_id } => {
                let notes = self.notes.clone();
                self.spawn_effect(move || handlers::load_notes(notes, topic_id, exam_id));
            }
            UiEffect::LoadQuestions { topic_id } => {
                let catalog = self.catalog.clone();
                self.spawn_effect(move || handlers::load_questions(catalog, topic_id));
            }
            UiEffect::Generate { topic_id, request } => {
                let generator = self.generator.clone();
                self.spawn_effect(move || handlers::generate_notes(generator, topic_id, request));
            }
            UiEffect::SaveNotes {
                topic_id,
                exam_id,
                text,
            } => {
                let notes = self.notes.clone();
                self.spawn_effect(move || handlers::save_notes(notes, topic_id, exam_id, text));
            }
            UiEffect::PersistViewMode { mode } => {
                let _ = Config::save_view_mode(mode);
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}
