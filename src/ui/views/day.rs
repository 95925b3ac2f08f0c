use crate::agenda::AppointmentStatus;
use crate::app::AgendaView;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::super::components::utils::{time_span, truncate};

pub fn draw(frame: &mut Frame, area: Rect, view: &AgendaView) {
  let block = Block::default()
    .title(title(view))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if view.items.is_empty() {
    let content = if view.loading {
      "Loading agenda..."
    } else {
      "No appointments for this day."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = view.items.iter().map(appointment_row).collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(view.selected));

  frame.render_stateful_widget(list, area, &mut state);
}

fn title(view: &AgendaView) -> String {
  let day = view.reference.format("%a %Y-%m-%d");
  if view.loading {
    format!(" Agenda {} (loading...) ", day)
  } else if view.updating {
    format!(" Agenda {} (updating...) ", day)
  } else {
    format!(" Agenda {} ({}) ", day, view.items.len())
  }
}

pub(super) fn appointment_row(appointment: &crate::agenda::Appointment) -> ListItem<'static> {
  let status_color = match appointment.status {
    AppointmentStatus::Confirmed => Color::Green,
    AppointmentStatus::Done => Color::Blue,
    AppointmentStatus::Cancelled => Color::DarkGray,
    AppointmentStatus::Scheduled => Color::White,
  };

  let line = Line::from(vec![
    Span::styled(
      format!(
        "{:<12}",
        time_span(&appointment.start, appointment.duration_min)
      ),
      Style::default().fg(Color::Cyan),
    ),
    Span::raw(" "),
    Span::raw(format!("{:<28}", truncate(&appointment.patient, 28))),
    Span::raw(" "),
    Span::styled(
      format!(
        "{:<20}",
        truncate(appointment.procedure.as_deref().unwrap_or("-"), 20)
      ),
      Style::default().fg(Color::Gray),
    ),
    Span::raw(" "),
    Span::styled(
      appointment.status.label(),
      Style::default().fg(status_color),
    ),
  ]);
  ListItem::new(line)
}
