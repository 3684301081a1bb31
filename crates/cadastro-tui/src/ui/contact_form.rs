//! Add / edit form pane.

use cadastro_core::{form::FormMode, validate::Field};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::FormState;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the open form into `area`.
pub fn draw(f: &mut Frame, area: Rect, state: &FormState) {
  let title = match state.form.mode() {
    FormMode::Create => " New contact ".to_string(),
    FormMode::Edit { id } => format!(" Edit contact {id} "),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));

  let lines: Vec<Line> = state
    .visible_fields()
    .into_iter()
    .map(|field| field_line(state, field))
    .collect();

  f.render_widget(Paragraph::new(lines).block(block), area);
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn field_line(state: &FormState, field: Field) -> Line<'static> {
  let form = &state.form;
  let focused = state.focus == field;

  let label_style = if focused {
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };
  let marker = if focused { "› " } else { "  " };

  let mut spans = vec![
    Span::styled(marker, label_style),
    Span::styled(format!("{:<12}", field.label()), label_style),
  ];

  let value = form.value(field);
  match field {
    Field::Kind => {
      let shown = form
        .kind()
        .map_or_else(|| value.to_string(), |kind| format!("{kind} ({})", kind.code()));
      spans.push(Span::raw(format!("‹ {shown} ›")));
    }
    // Show the expected layout while the document is still empty.
    Field::DocumentNumber if value.is_empty() => {
      let mask = form.document_rule().mask().unwrap_or_default();
      spans.push(Span::styled(mask, Style::default().fg(Color::DarkGray)));
    }
    _ => spans.push(Span::raw(value.to_string())),
  }

  if focused && field != Field::Kind {
    spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
  }

  if form.is_invalid(field)
    && let Some(error) = form.error(field)
  {
    spans.push(Span::styled(
      format!("  {error}"),
      Style::default().fg(Color::Red),
    ));
  }

  Line::from(spans)
}
