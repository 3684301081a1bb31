//! Contact list pane.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::App;

/// Render the contact list into `area`. An unfocused list is drawn dimmed
/// and without the cursor.
pub fn draw<L>(f: &mut Frame, area: Rect, app: &App<L>, focused: bool) {
  let border = if focused { Color::Gray } else { Color::DarkGray };
  let block = Block::default()
    .title(format!(" Contacts ({}) ", app.records.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let dim = Style::default().fg(Color::DarkGray);
  let items: Vec<ListItem> = app
    .records
    .iter()
    .map(|record| {
      let fields = &record.fields;
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:>4} ", record.id), dim),
        Span::styled(
          format!("[{}] ", fields.kind.code()),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw(fields.legal_name.clone()),
        Span::styled(
          format!("  {}  {}", fields.document_number, fields.city),
          dim,
        ),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((focused && !app.records.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}
