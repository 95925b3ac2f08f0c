use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Full-pane error shown when a load fails with nothing cached to show
/// in its place.
pub fn draw_error(frame: &mut Frame, area: Rect, message: &str) {
  let block = Block::default()
    .title(" Agenda ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));

  let paragraph = Paragraph::new(message.to_string())
    .block(block)
    .style(Style::default().fg(Color::Red))
    .wrap(Wrap { trim: true });

  frame.render_widget(paragraph, area);
}
