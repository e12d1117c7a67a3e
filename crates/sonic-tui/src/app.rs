//! Terminal setup and the event loop.
//!
//! Everything that mutates the player state runs on this loop: key events,
//! player exit reports and the periodic tick that samples elapsed time.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use ratatui::crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};

use sonic_core::config::UiConfig;
use sonic_core::{Action, CatalogService, Dispatcher, Flow, Key, PlayerExit, PlayerProcess};

use crate::input;
use crate::ui;
use crate::widgets::toast::ToastManager;

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub struct App<S, P> {
    dispatcher: Dispatcher<S, P>,
    toasts: ToastManager,
    tick: Duration,
    bottom_space: u16,
}

impl<S: CatalogService, P: PlayerProcess> App<S, P> {
    pub fn new(dispatcher: Dispatcher<S, P>, ui: &UiConfig) -> Self {
        Self {
            dispatcher,
            toasts: ToastManager::new(),
            tick: Duration::from_millis(ui.tick_ms.max(50)),
            bottom_space: ui.bottom_space,
        }
    }

    /// Run until quit. The terminal is restored on every exit path.
    pub async fn run(mut self, mut exits: mpsc::UnboundedReceiver<PlayerExit>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("run(): terminal ready, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, &mut exits).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("sksonic exiting");
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Tui,
        exits: &mut mpsc::UnboundedReceiver<PlayerExit>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        // ── Background task: keyboard events ──────────────────────────────────
        // Polls so the thread notices the loop has gone away.
        tokio::task::spawn_blocking(move || loop {
            if tx.is_closed() {
                break;
            }
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.blocking_send(ev).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                Ok(false) => {}
                Err(_) => break,
            }
        });

        let mut tick = tokio::time::interval(self.tick);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        loop {
            for notice in self.dispatcher.take_notices() {
                self.toasts.notice(notice);
            }
            terminal.draw(|f| ui::draw(f, &self.dispatcher, &self.toasts, self.bottom_space))?;

            tokio::select! {
                Some(ev) = rx.recv() => {
                    if self.handle_event(ev).await? == Flow::Quit {
                        break;
                    }
                }
                Some(exit) = exits.recv() => {
                    debug!("player exit: {:?}", exit);
                    self.dispatcher.player_exited(exit, Instant::now());
                }
                _ = tick.tick() => {
                    self.toasts.tick();
                }
            }

            self.dispatcher.tick(Instant::now());
        }
        Ok(())
    }

    async fn handle_event(&mut self, ev: Event) -> anyhow::Result<Flow> {
        let now = Instant::now();
        let flow = match ev {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    return Ok(Flow::Continue);
                }
                if input::is_interrupt(&key) {
                    self.dispatcher.dispatch(Action::Quit, now).await?
                } else if let Some(k) = input::translate(key) {
                    self.dispatcher.handle_key(k, now).await?
                } else {
                    Flow::Continue
                }
            }
            Event::Resize(_, _) => self.dispatcher.handle_key(Key::Resize, now).await?,
            _ => Flow::Continue,
        };
        Ok(flow)
    }
}
