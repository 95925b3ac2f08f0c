mod components;
mod views;

use crate::agenda::ViewKind;
use crate::app::{App, Mode};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let view = app.view();
  if view.items.is_empty() && view.error.is_some() {
    // A load failed with nothing cached to show in its place.
    components::banner::draw_error(frame, chunks[0], view.error.as_deref().unwrap_or_default());
  } else {
    match view.kind {
      ViewKind::Day => views::day::draw(frame, chunks[0], view),
      ViewKind::Week => views::week::draw(frame, chunks[0], view),
    }
  }

  draw_status_bar(frame, chunks[1], app);

  if *app.mode() == Mode::Command {
    components::command_bar::draw_suggestions(frame, chunks[0], app);
  }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      if let Some(notice) = app.notice() {
        (notice.to_string(), Style::default().fg(Color::Yellow))
      } else {
        let hint =
          " :command  j/k:select  h/l:prev/next  d/w:view  t:today  r:refresh  c:confirm  x:cancel  q:quit";
        (hint.to_string(), Style::default().fg(Color::DarkGray))
      }
    }
    Mode::Command => {
      let cmd = format!(":{}", app.command_input());
      (cmd, Style::default().fg(Color::Yellow))
    }
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}
