//! App: terminal init, main loop, key handling and ticket settling.

use crate::Args;
use crate::animation::TerminalPresenter;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use hexstack::{Axial, Session, Slot};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct App {
    session: Session,
    presenter: TerminalPresenter,
    theme: Theme,
    cursor: Axial,
    /// Index into the options tray.
    selected: usize,
    /// Last rejection, shown until the next successful action.
    message: Option<String>,
    frame_interval: Duration,
}

impl App {
    pub fn new(args: &Args, session: Session, theme: Theme) -> Self {
        let rate = if args.frame_rate.is_finite() && args.frame_rate > 0.0 {
            args.frame_rate
        } else {
            30.0
        };
        Self {
            session,
            presenter: TerminalPresenter::new(!args.no_animation),
            theme,
            cursor: Axial::ORIGIN,
            selected: 0,
            message: None,
            frame_interval: Duration::from_secs_f64(1.0 / rate),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                let view = View {
                    session: &self.session,
                    theme: &self.theme,
                    cursor: self.cursor,
                    selected: self.selected,
                    message: self.message.as_deref(),
                };
                ui::draw(f, &view, &mut self.presenter, now);
            })?;

            // Effects that finished this frame hand their tickets back.
            self.presenter.settle(&mut self.session);

            let timeout = self.frame_interval.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.apply_action(key_to_action(key)) == Flow::Quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn apply_action(&mut self, action: Action) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::Left => self.move_cursor(Axial::new(-1, 0)),
            Action::Right => self.move_cursor(Axial::new(1, 0)),
            Action::Up => self.move_cursor(Axial::new(0, -1)),
            Action::Down => self.move_cursor(Axial::new(0, 1)),
            Action::Slot(i) if i < self.session.slots().len() => self.selected = i,
            Action::Slot(_) => {}
            Action::NextSlot => self.select_next_ready(),
            Action::Place => self.place(),
            Action::NextLevel => match self.session.advance_level(&mut self.presenter) {
                Ok(()) => {
                    self.presenter.level_complete = None;
                    self.message = None;
                }
                Err(err) => self.message = Some(err.to_string()),
            },
            Action::None => {}
        }
        Flow::Continue
    }

    fn move_cursor(&mut self, step: Axial) {
        let next = self.cursor + step;
        if self.session.board().contains(next) {
            self.cursor = next;
        }
    }

    fn place(&mut self) {
        match self.session.place(self.selected, self.cursor, &mut self.presenter) {
            Ok(ticket) => {
                debug!(%ticket, at = %self.cursor, slot = self.selected, "placed from tray");
                self.message = None;
                self.select_next_ready();
            }
            Err(err) => {
                debug!(%err, at = %self.cursor, "placement rejected");
                self.message = Some(err.to_string());
            }
        }
    }

    /// Move the selection to the next ready slot after the current one, if any.
    fn select_next_ready(&mut self) {
        let slots = self.session.slots();
        let n = slots.len();
        if let Some(i) = (1..=n)
            .map(|k| (self.selected + k) % n)
            .find(|&i| matches!(slots[i], Slot::Ready(_)))
        {
            self.selected = i;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use hexstack::SessionConfig;

    fn app(extra: &[&str]) -> App {
        let args = Args::parse_from(std::iter::once("hexstack").chain(extra.iter().copied()));
        let session = Session::new(SessionConfig::default().with_seed(21)).unwrap();
        App::new(&args, session, Theme::default())
    }

    #[test]
    fn cursor_stays_on_the_board() {
        let mut app = app(&[]);
        for _ in 0..5 {
            app.apply_action(Action::Right);
        }
        assert_eq!(app.cursor, Axial::new(2, 0));
        app.apply_action(Action::Up);
        assert_eq!(app.cursor, Axial::new(2, -1));
        app.apply_action(Action::Up);
        assert_eq!(app.cursor, Axial::new(2, -2));
        app.apply_action(Action::Up);
        assert_eq!(app.cursor, Axial::new(2, -2));
    }

    #[test]
    fn placing_advances_selection_and_reports_rejections() {
        let mut app = app(&["--no-animation"]);
        app.apply_action(Action::Slot(1));
        app.apply_action(Action::Place);
        assert_eq!(app.selected, 2);
        assert!(app.message.is_none());

        app.apply_action(Action::Place);
        assert!(app.message.is_some(), "origin is taken or pending");
        assert_eq!(app.apply_action(Action::Quit), Flow::Quit);
    }

    #[test]
    fn next_level_before_completion_is_refused() {
        let mut app = app(&[]);
        app.apply_action(Action::NextLevel);
        assert!(app.message.is_some());
        assert_eq!(app.session.progress().level, 1);
    }
}
