use chrono::Days;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::agenda::{week_monday, week_sunday};
use crate::app::AgendaView;

use super::day::appointment_row;

pub fn draw(frame: &mut Frame, area: Rect, view: &AgendaView) {
  let monday = week_monday(view.reference);
  let block = Block::default()
    .title(title(view))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if view.items.is_empty() {
    let content = if view.loading {
      "Loading agenda..."
    } else {
      "No appointments this week."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  // One section per day that has appointments; rows keep the listing's
  // order so selection indexes stay aligned with view.items.
  let mut rows: Vec<ListItem> = Vec::new();
  let mut selected_row = None;

  for offset in 0..7 {
    let day = monday + Days::new(offset);
    let day_items: Vec<(usize, _)> = view
      .items
      .iter()
      .enumerate()
      .filter(|(_, a)| a.date == day)
      .collect();
    if day_items.is_empty() {
      continue;
    }

    rows.push(ListItem::new(Line::from(Span::styled(
      day.format("%A %d/%m").to_string(),
      Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD),
    ))));

    for (index, appointment) in day_items {
      if index == view.selected {
        selected_row = Some(rows.len());
      }
      rows.push(appointment_row(appointment));
    }
  }

  let list = List::new(rows)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(selected_row);

  frame.render_stateful_widget(list, area, &mut state);
}

fn title(view: &AgendaView) -> String {
  let span = format!(
    "{} - {}",
    week_monday(view.reference).format("%Y-%m-%d"),
    week_sunday(view.reference).format("%Y-%m-%d")
  );
  if view.loading {
    format!(" Week {} (loading...) ", span)
  } else if view.updating {
    format!(" Week {} (updating...) ", span)
  } else {
    format!(" Week {} ({}) ", span, view.items.len())
  }
}
