use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::app::App;

/// How many suggestions the overlay shows at most.
const MAX_VISIBLE: usize = 6;

/// Autocomplete overlay anchored to the bottom of the main area while in
/// command mode. The input line itself lives in the status bar.
pub fn draw_suggestions(frame: &mut Frame, area: Rect, app: &App) {
  let suggestions = app.autocomplete_suggestions();
  if suggestions.is_empty() {
    return;
  }

  let count = suggestions.len().min(MAX_VISIBLE);
  let height = count as u16;
  let overlay = Rect {
    x: area.x + 1,
    y: area.bottom().saturating_sub(height + 1),
    width: area.width.saturating_sub(2),
    height,
  };

  let lines: Vec<Line> = suggestions
    .iter()
    .take(MAX_VISIBLE)
    .enumerate()
    .map(|(index, cmd)| {
      let style = if index == app.selected_suggestion() {
        Style::default()
          .fg(Color::Black)
          .bg(Color::Yellow)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
      };
      Line::from(Span::styled(
        format!(" {:<18} {}", cmd.usage, cmd.description),
        style,
      ))
    })
    .collect();

  frame.render_widget(Clear, overlay);
  frame.render_widget(Paragraph::new(lines), overlay);
}
