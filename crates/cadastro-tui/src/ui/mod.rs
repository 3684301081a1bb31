//! TUI rendering — orchestrates all panes.

pub mod contact_form;
pub mod contact_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen, Status};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<L>(f: &mut Frame, app: &App<L>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0]);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%d/%m/%Y").to_string();

  let left = Span::styled(
    " cadastro",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<L>(f: &mut Frame, area: Rect, app: &App<L>) {
  match &app.screen {
    Screen::ContactList => contact_list::draw(f, area, app, true),
    Screen::ContactForm(state) => {
      let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
      contact_list::draw(f, cols[0], app, false);
      contact_form::draw(f, cols[1], state);
    }
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<L>(f: &mut Frame, area: Rect, app: &App<L>) {
  let hints = match &app.screen {
    Screen::ContactList => "↑↓/jk navigate  a add  e/Enter edit  d delete  q quit",
    Screen::ContactForm(_) => "Tab/⇧Tab field  ←→ kind  Enter save  Esc cancel",
  };

  let (text, style) = match &app.status {
    Status::Empty => (hints.to_string(), Style::default().fg(Color::DarkGray)),
    Status::Info(msg) => (msg.clone(), Style::default().fg(Color::Green)),
    Status::Alert(msg) => (
      msg.clone(),
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ),
  };

  let mode_span = Span::styled(
    format!(" {} ", app.screen.label()),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let line = Line::from(vec![mode_span, Span::styled(format!("  {text}"), style)]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
