//! TUI module - schedule builder and workout list with ratatui

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};
use tokio::sync::watch;
use tracing::{error, info};

use crate::db::{Database, Session, WorkoutTemplate};
use crate::onboarding::Onboarding;
use crate::schedule::{ScheduleBuilder, Weekday};
use crate::session::{Gate, GateState, SessionProvider};
use crate::store::WorkoutStore;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App {
    db: Database,
    sessions: SessionProvider,
    session_changes: watch::Receiver<Option<Session>>,
    gate: Gate,
    builder: ScheduleBuilder,
    workouts: Vec<WorkoutTemplate>,
    selected: usize,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(db: Database) -> Result<Self> {
        let sessions = SessionProvider::load(&db)?;
        let session_changes = sessions.subscribe();
        let mut app = Self {
            db,
            sessions,
            session_changes,
            gate: Gate::new(),
            builder: ScheduleBuilder::new(),
            workouts: Vec::new(),
            selected: 0,
            status: None,
            should_quit: false,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Re-resolve the route and reload what the current view shows
    fn refresh(&mut self) -> Result<()> {
        let session = self.sessions.current();
        let state = self.gate.refresh(session.as_ref(), &self.db)?;
        self.workouts = match (state, session) {
            (GateState::Ready, Some(session)) => self.db.list_workouts(session.user_id)?,
            _ => Vec::new(),
        };
        self.selected = self.selected.min(self.row_count().saturating_sub(1));
        Ok(())
    }

    fn row_count(&self) -> usize {
        match self.gate.state() {
            GateState::OnboardingRequired => Weekday::all().len(),
            GateState::Ready => self.workouts.len(),
            _ => 0,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            // Re-route whenever the session changes (sign-out from the list view)
            if self.session_changes.has_changed().unwrap_or(false) {
                self.session_changes.borrow_and_update();
                self.refresh()?;
            }
            terminal.draw(|frame| self.render(frame))?;
            if let Err(e) = self.handle_events() {
                error!("TUI action failed: {:#}", e);
                self.status = Some(format!("Error: {}", e));
            }
        }

        restore_terminal()?;
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let title = match self.gate.state() {
            GateState::OnboardingRequired => format!(
                "weeksplit - Pick your week ({} training days)",
                self.builder.active_days_count()
            ),
            _ => "weeksplit - Weekly Split".to_string(),
        };
        let header = Paragraph::new(title)
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        match self.gate.state() {
            GateState::Loading | GateState::Unauthenticated => {
                let text = Paragraph::new("Not signed in. Run `weeksplit login <email>` first.")
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(text, chunks[1]);
            }
            GateState::OnboardingRequired => self.render_builder(frame, chunks[1]),
            GateState::Ready => self.render_workouts(frame, chunks[1]),
        }

        // Footer
        let help = match self.gate.state() {
            GateState::OnboardingRequired => "q: quit | ↑↓: day | ←→: workout | enter: save",
            GateState::Ready => "q: quit | ↑↓: select | d: done | x: sign out | r: refresh",
            _ => "q: quit | r: refresh",
        };
        let footer_text = match &self.status {
            Some(status) => format!("{}  |  {}", status, help),
            None => help.to_string(),
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn render_builder(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = Weekday::all()
            .iter()
            .enumerate()
            .map(|(i, day)| {
                let workout = self.builder.workout_at(i).unwrap_or_default();
                let row = Row::new(vec![
                    Cell::from(day.name()),
                    Cell::from(format!("{} {}", workout.emoji(), workout.label())),
                ]);
                if i == self.selected {
                    row.style(Style::default().reversed())
                } else {
                    row
                }
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(20)])
            .header(Row::new(vec!["Day", "Workout"]).style(Style::default().bold()))
            .block(Block::default().borders(Borders::ALL).title("Schedule"));
        frame.render_widget(table, area);
    }

    fn render_workouts(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .workouts
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let row = Row::new(vec![
                    Cell::from(w.weekday.short()),
                    Cell::from(w.title.clone()),
                    Cell::from(w.exercises.len().to_string()),
                    Cell::from(if w.done { "✓" } else { "" }),
                ]);
                if i == self.selected {
                    row.style(Style::default().reversed())
                } else {
                    row
                }
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(16),
                Constraint::Length(10),
                Constraint::Min(4),
            ],
        )
        .header(Row::new(vec!["Day", "Workout", "Exercises", "Done"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Workouts"));
        frame.render_widget(table, area);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('r') => self.refresh()?,
                KeyCode::Up => self.selected = self.selected.saturating_sub(1),
                KeyCode::Down => {
                    if self.selected + 1 < self.row_count() {
                        self.selected += 1;
                    }
                }
                code => match self.gate.state() {
                    GateState::OnboardingRequired => self.handle_builder_key(code)?,
                    GateState::Ready => self.handle_workouts_key(code)?,
                    _ => {}
                },
            }
        }
        Ok(())
    }

    fn handle_builder_key(&mut self, code: KeyCode) -> Result<()> {
        let current = self.builder.workout_at(self.selected).unwrap_or_default();
        match code {
            KeyCode::Right => self.builder.set_day_workout(self.selected, current.next()),
            KeyCode::Left => self.builder.set_day_workout(self.selected, current.prev()),
            KeyCode::Enter => {
                let schedule = self.builder.finish();
                let result = Onboarding::with_database(&self.db).complete_schedule(&schedule);
                match result {
                    Ok(report) => {
                        self.status = Some(format!(
                            "Saved: {} workouts created",
                            report.templates_created
                        ));
                        self.selected = 0;
                        self.refresh()?;
                    }
                    Err(e) => {
                        error!("Schedule not saved: {}", e);
                        self.status = Some(e.user_message().to_string());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_workouts_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('d') => {
                if let Some(workout) = self.workouts.get(self.selected) {
                    self.db.mark_done(workout.owner_id, workout.id)?;
                    self.status = Some(format!("{} marked done", workout.title));
                    self.refresh()?;
                }
            }
            KeyCode::Char('x') => {
                self.sessions.sign_out(&self.db)?;
                info!("Signed out from TUI");
                self.status = Some("Signed out".to_string());
            }
            _ => {}
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
