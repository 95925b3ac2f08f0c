use crate::agenda::{
  date_key, AgendaFetcher, Appointment, AppointmentStatus, LoadCoordinator, RenderSink, ViewKind,
};
use crate::api::ApiClient;
use crate::cache::{AgendaCache, KvStore, NoopKv, SqliteKv};
use crate::commands::{self, AppCommand, Command};
use crate::config::Config;
use crate::event::{self, AgendaEvent, Event};
use crate::ui;
use chrono::NaiveDate;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

/// The agenda viewport: one view kind, one reference date, one listing.
#[derive(Debug)]
pub struct AgendaView {
  pub kind: ViewKind,
  pub reference: NaiveDate,
  pub items: Vec<Appointment>,
  pub selected: usize,
  /// Blocking load with nothing usable on screen
  pub loading: bool,
  /// Background revalidation over already-rendered data
  pub updating: bool,
  pub error: Option<String>,
}

/// Mutations the agenda view can apply to the selected appointment.
#[derive(Debug, Clone, Copy)]
enum Mutation {
  Cancel,
  Confirm,
}

impl Mutation {
  fn label(&self) -> &'static str {
    match self {
      Mutation::Cancel => "Cancel",
      Mutation::Confirm => "Confirm",
    }
  }
}

/// Feeds coordinator render hooks into the app's event channel.
struct ChannelSink {
  tx: mpsc::UnboundedSender<Event>,
}

impl RenderSink for ChannelSink {
  fn show_loading(&self) {
    let _ = self.tx.send(Event::Agenda(AgendaEvent::Loading));
  }

  fn show_updating(&self) {
    let _ = self.tx.send(Event::Agenda(AgendaEvent::Updating));
  }

  fn render_items(&self, kind: ViewKind, date_key: &str, items: Vec<Appointment>) {
    let _ = self.tx.send(Event::Agenda(AgendaEvent::Rendered {
      kind,
      date_key: date_key.to_string(),
      items,
    }));
  }

  fn show_error(&self, message: String) {
    let _ = self.tx.send(Event::Agenda(AgendaEvent::LoadFailed(message)));
  }

  fn hide_indicators(&self) {
    let _ = self.tx.send(Event::Agenda(AgendaEvent::IndicatorsCleared));
  }
}

/// Main application state
pub struct App {
  /// The single agenda viewport
  view: AgendaView,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Transient status-bar message (command errors, mutation failures)
  notice: Option<String>,

  /// API client for mutations
  api: ApiClient,

  /// Range fetcher the load closures delegate to
  fetcher: AgendaFetcher,

  /// Cache + sequence guard orchestration
  coordinator: Arc<LoadCoordinator>,

  /// Event channel shared with the input pump and background tasks
  event_tx: mpsc::UnboundedSender<Event>,
  event_rx: mpsc::UnboundedReceiver<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, date: Option<NaiveDate>, week: bool) -> Result<Self> {
    let api = ApiClient::new(&config)?;
    let fetcher = AgendaFetcher::new(api.clone());
    let (tx, rx) = mpsc::unbounded_channel();

    let kv: Arc<dyn KvStore> = if config.cache.enabled {
      Arc::new(SqliteKv::open()?)
    } else {
      Arc::new(NoopKv)
    };
    let cache = AgendaCache::new(kv)
      .with_max_age(chrono::Duration::seconds(config.cache.max_age_secs as i64));
    let sink = Arc::new(ChannelSink { tx: tx.clone() });
    let coordinator = Arc::new(LoadCoordinator::new(cache, sink));

    let kind = if week || config.agenda.week_view {
      ViewKind::Week
    } else {
      ViewKind::Day
    };
    let reference = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(Self {
      view: AgendaView {
        kind,
        reference,
        items: Vec::new(),
        selected: 0,
        loading: true,
        updating: false,
        error: None,
      },
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      notice: None,
      api,
      fetcher,
      coordinator,
      event_tx: tx,
      event_rx: rx,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    event::spawn_input_pump(Duration::from_millis(250), self.event_tx.clone());

    // Initial data load
    self.reload();

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match self.event_rx.recv().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  /// Kick off a stale-while-revalidate load for the current view.
  fn reload(&self) {
    let coordinator = self.coordinator.clone();
    let fetcher = self.fetcher.clone();
    let kind = self.view.kind;
    let reference = self.view.reference;

    tokio::spawn(async move {
      coordinator
        .load(kind, reference, move || async move {
          fetcher.fetch_range(kind, reference).await
        })
        .await;
    });
  }

  /// Drop the current view's cache entry, then reload from the network.
  fn refresh(&self) {
    match self.view.kind {
      ViewKind::Day => self.coordinator.invalidate_for_date(self.view.reference),
      ViewKind::Week => self
        .coordinator
        .invalidate_for_week_containing(self.view.reference),
    }
    self.reload();
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::Agenda(agenda_event) => self.handle_agenda_event(agenda_event),
      Event::Error(message) => self.notice = Some(message),
    }
  }

  fn handle_agenda_event(&mut self, event: AgendaEvent) {
    match event {
      AgendaEvent::Loading => {
        self.view.loading = true;
        self.view.error = None;
      }
      AgendaEvent::Updating => self.view.updating = true,
      AgendaEvent::Rendered {
        kind,
        date_key: key,
        items,
      } => {
        // Ignore renders for a view the user has already left; the
        // sequence guard only orders loads within one view kind.
        if self.is_current_target(kind, &key) {
          self.view.items = items;
          self.view.loading = false;
          self.view.error = None;
          if self.view.selected >= self.view.items.len() {
            self.view.selected = self.view.items.len().saturating_sub(1);
          }
        }
      }
      AgendaEvent::LoadFailed(message) => {
        self.view.loading = false;
        self.view.updating = false;
        self.view.error = Some(message);
      }
      AgendaEvent::IndicatorsCleared => {
        self.view.loading = false;
        self.view.updating = false;
      }
      AgendaEvent::MutationApplied => self.reload(),
    }
  }

  fn is_current_target(&self, kind: ViewKind, key: &str) -> bool {
    kind == self.view.kind && key == date_key(self.view.kind.anchor(self.view.reference))
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      // Quit
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Selection
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),

      // Date navigation
      KeyCode::Left | KeyCode::Char('h') => self.step(-1),
      KeyCode::Right | KeyCode::Char('l') => self.step(1),
      KeyCode::Char('t') => self.navigate(chrono::Local::now().date_naive()),

      // View kind
      KeyCode::Char('d') => self.set_kind(ViewKind::Day),
      KeyCode::Char('w') => self.set_kind(ViewKind::Week),

      // Data
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('x') => self.mutate_selected(Mutation::Cancel),
      KeyCode::Char('c') => self.mutate_selected(Mutation::Confirm),

      // Mode switches
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Esc => self.notice = None,

      _ => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0; // Reset selection on input change
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0; // Reset selection on input change
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    let input = self.command_input.trim().to_string();
    self.command_input.clear();
    if input.is_empty() {
      return;
    }

    // A bare command word takes the highlighted suggestion; a line that
    // already carries an argument is parsed as typed.
    let line = if input.contains(char::is_whitespace) {
      input
    } else {
      let suggestions = commands::get_suggestions(&input);
      match suggestions.get(self.selected_suggestion) {
        Some(cmd) => cmd.name.to_string(),
        None => input,
      }
    };

    match commands::parse(&line) {
      Ok(AppCommand::Day) => self.set_kind(ViewKind::Day),
      Ok(AppCommand::Week) => self.set_kind(ViewKind::Week),
      Ok(AppCommand::Today) => self.navigate(chrono::Local::now().date_naive()),
      Ok(AppCommand::Goto(date)) => self.navigate(date),
      Ok(AppCommand::Refresh) => self.refresh(),
      Ok(AppCommand::Purge) => {
        self.coordinator.invalidate_all();
        self.reload();
      }
      Ok(AppCommand::Quit) => self.should_quit = true,
      Err(message) => self.notice = Some(message),
    }
  }

  /// Move to a new reference date and load it.
  fn navigate(&mut self, reference: NaiveDate) {
    self.view.reference = reference;
    self.view.items.clear();
    self.view.selected = 0;
    self.view.loading = true;
    self.view.error = None;
    self.notice = None;
    self.reload();
  }

  fn set_kind(&mut self, kind: ViewKind) {
    if kind == self.view.kind {
      return;
    }
    self.view.kind = kind;
    self.navigate(self.view.reference);
  }

  /// Step one period: a day in day view, a week in week view.
  fn step(&mut self, delta: i64) {
    let days = match self.view.kind {
      ViewKind::Day => delta,
      ViewKind::Week => delta * 7,
    };
    self.navigate(self.view.reference + chrono::Duration::days(days));
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.view.items.len();
    if len > 0 {
      self.view.selected = (self.view.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  fn mutate_selected(&mut self, mutation: Mutation) {
    let Some(item) = self.view.items.get(self.view.selected) else {
      return;
    };
    if item.status == AppointmentStatus::Cancelled {
      self.notice = Some(format!("{} is already cancelled", item.patient));
      return;
    }

    let api = self.api.clone();
    let coordinator = self.coordinator.clone();
    let tx = self.event_tx.clone();
    let id = item.id.clone();
    let date = item.date;

    tokio::spawn(async move {
      let result = match mutation {
        Mutation::Cancel => api.cancel_appointment(&id).await,
        Mutation::Confirm => api.confirm_appointment(&id).await,
      };
      match result {
        Ok(()) => {
          // Day and week caches are separate namespaces with no
          // cross-invalidation; a mutation must clear both.
          coordinator.invalidate_for_date(date);
          coordinator.invalidate_for_week_containing(date);
          let _ = tx.send(Event::Agenda(AgendaEvent::MutationApplied));
        }
        Err(err) => {
          let _ = tx.send(Event::Error(format!("{} failed: {}", mutation.label(), err)));
        }
      }
    });
  }

  // Accessors for UI rendering
  pub fn view(&self) -> &AgendaView {
    &self.view
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn notice(&self) -> Option<&str> {
    self.notice.as_deref()
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
