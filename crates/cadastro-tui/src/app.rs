//! Application state machine and event dispatcher.

use std::sync::Arc;

use cadastro_core::{
  form::{ContactForm, FormMode, LookupRequest, LookupTicket, Submission},
  handoff::{EditHandoff, begin_edit},
  lookup::{AddressInfo, AddressLookup, LookupPolicy, resolve_address},
  record::{ContactRecord, RecordKind},
  store::{ContactStore, MemoryStore},
  validate::Field,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use strum::IntoEnumIterator;
use tokio::sync::mpsc;
use tracing::{debug, info};

// ─── Screen ───────────────────────────────────────────────────────────────────

/// An open add or edit form plus the field holding keyboard focus.
pub struct FormState {
  pub form:  ContactForm,
  pub focus: Field,
}

impl FormState {
  fn new(form: ContactForm) -> Self {
    Self {
      form,
      focus: Field::Kind,
    }
  }

  /// Fields reachable with Tab. The trade name is hidden for individuals.
  pub fn visible_fields(&self) -> Vec<Field> {
    let individual = self.form.kind() == Some(RecordKind::Individual);
    Field::iter()
      .filter(|f| !(individual && *f == Field::TradeName))
      .collect()
  }

  fn move_focus(&mut self, forward: bool) {
    let fields = self.visible_fields();
    let len = fields.len();
    let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
    let next = if forward { pos + 1 } else { pos + len - 1 };
    self.focus = fields[next % len];
  }
}

pub enum Screen {
  /// The dashboard: every stored contact.
  ContactList,
  /// The add view or the edit view, depending on the form's mode.
  ContactForm(FormState),
}

impl Screen {
  pub fn label(&self) -> &'static str {
    match self {
      Screen::ContactList => "LIST",
      Screen::ContactForm(state) => match state.form.mode() {
        FormMode::Create => "ADD",
        FormMode::Edit { .. } => "EDIT",
      },
    }
  }
}

/// The one-line message under the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
  #[default]
  Empty,
  Info(String),
  /// Shown highlighted until the next message replaces it.
  Alert(String),
}

struct LookupDone {
  ticket:  LookupTicket,
  address: Option<AddressInfo>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<L> {
  pub screen: Screen,

  /// Snapshot of the store, refreshed whenever the list is shown.
  pub records: Vec<ContactRecord>,

  /// Cursor position within `records`.
  pub list_cursor: usize,

  pub status: Status,

  store:   MemoryStore,
  lookup:  Arc<L>,
  policy:  LookupPolicy,
  handoff: EditHandoff,

  /// Session id handed to the next form opened.
  next_session: u64,

  lookups_tx: mpsc::UnboundedSender<LookupDone>,
  lookups_rx: mpsc::UnboundedReceiver<LookupDone>,
}

impl<L> App<L>
where
  L: AddressLookup + 'static,
{
  pub fn new(store: MemoryStore, lookup: L, policy: LookupPolicy) -> Self {
    let (lookups_tx, lookups_rx) = mpsc::unbounded_channel();
    Self {
      screen: Screen::ContactList,
      records: Vec::new(),
      list_cursor: 0,
      status: Status::Empty,
      store,
      lookup: Arc::new(lookup),
      policy,
      handoff: EditHandoff::new(),
      next_session: 1,
      lookups_tx,
      lookups_rx,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Re-read the store into `self.records`, keeping the cursor in range.
  pub async fn refresh(&mut self) -> anyhow::Result<()> {
    self.records = self.store.list().await?;
    self.list_cursor = self.list_cursor.min(self.records.len().saturating_sub(1));
    Ok(())
  }

  /// The record under the list cursor, if any.
  pub fn cursor_record(&self) -> Option<&ContactRecord> {
    self.records.get(self.list_cursor)
  }

  // ── Address lookups ───────────────────────────────────────────────────────

  fn spawn_lookup(&self, request: LookupRequest) {
    let lookup = Arc::clone(&self.lookup);
    let tx = self.lookups_tx.clone();
    tokio::spawn(async move {
      let address = resolve_address(lookup.as_ref(), &request.postal_code).await;
      // The receiver lives as long as the app; a failed send means shutdown.
      let _ = tx.send(LookupDone {
        ticket: request.ticket,
        address,
      });
    });
  }

  /// Apply every finished lookup. Results for a closed form, or for a postal
  /// code that has since changed, are dropped. Returns whether the open form
  /// was patched.
  pub fn drain_lookups(&mut self) -> bool {
    let mut patched = false;
    while let Ok(done) = self.lookups_rx.try_recv() {
      if let Screen::ContactForm(state) = &mut self.screen
        && state.form.apply_lookup(done.ticket, done.address)
      {
        patched = true;
      }
    }
    if patched {
      self.status = Status::Info("address filled in from the CEP".into());
    }
    patched
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.screen {
      Screen::ContactList => self.handle_list_key(key).await,
      Screen::ContactForm(_) => {
        self.handle_form_key(key).await?;
        Ok(true)
      }
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.records.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('a') => self.open_add(),
      KeyCode::Enter | KeyCode::Char('e') => {
        if let Some(id) = self.cursor_record().map(|r| r.id) {
          self.handoff.offer(id);
        }
        self.open_edit().await;
      }
      KeyCode::Char('d') => self.delete_selected().await?,

      _ => {}
    }
    Ok(true)
  }

  async fn handle_form_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
    let Screen::ContactForm(state) = &mut self.screen else {
      return Ok(());
    };

    match key.code {
      KeyCode::Esc => {
        self.status = Status::Empty;
        self.back_to_list().await?;
      }
      KeyCode::Enter => self.submit().await?,

      KeyCode::Tab | KeyCode::Down => state.move_focus(true),
      KeyCode::BackTab | KeyCode::Up => state.move_focus(false),

      KeyCode::Left | KeyCode::Right if state.focus == Field::Kind => {
        let kind = state
          .form
          .kind()
          .map_or(RecordKind::Individual, RecordKind::other);
        state.form.set_kind(kind);
      }
      KeyCode::Char(c) if state.focus == Field::Kind => {
        if let Ok(kind) = c.to_string().parse::<RecordKind>() {
          state.form.set_kind(kind);
        }
      }

      KeyCode::Backspace => self.edit_focused(|value| {
        value.pop();
      }),
      KeyCode::Char(c) => self.edit_focused(|value| value.push(c)),

      _ => {}
    }
    Ok(())
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  fn take_session(&mut self) -> u64 {
    let session = self.next_session;
    self.next_session += 1;
    session
  }

  fn open_add(&mut self) {
    let session = self.take_session();
    self.screen = Screen::ContactForm(FormState::new(ContactForm::create(session, self.policy)));
    self.status = Status::Empty;
  }

  /// Enter the edit view through the hand-off key. Without a key, or when
  /// the record is gone, stay on the list with an alert.
  async fn open_edit(&mut self) {
    match begin_edit(&self.handoff, &self.store).await {
      Ok(record) => {
        let session = self.take_session();
        let form = ContactForm::edit(session, &record, self.policy);
        self.screen = Screen::ContactForm(FormState::new(form));
        self.status = Status::Empty;
      }
      Err(e) => {
        debug!(error = %e, "edit refused");
        self.status = Status::Alert(e.to_string());
      }
    }
  }

  async fn back_to_list(&mut self) -> anyhow::Result<()> {
    self.screen = Screen::ContactList;
    self.refresh().await
  }

  async fn delete_selected(&mut self) -> anyhow::Result<()> {
    let Some(id) = self.cursor_record().map(|r| r.id) else {
      return Ok(());
    };
    if self.store.delete(id).await?.is_some() {
      info!(id, "contact deleted");
      self.status = Status::Info(format!("contact {id} deleted"));
    }
    self.refresh().await
  }

  /// Apply `change` to the focused field's text and start a lookup if the
  /// form asks for one.
  fn edit_focused(&mut self, change: impl FnOnce(&mut String)) {
    let request = {
      let Screen::ContactForm(state) = &mut self.screen else {
        return;
      };
      let mut value = state.form.value(state.focus).to_string();
      change(&mut value);
      state.form.set(state.focus, value)
    };
    if let Some(request) = request {
      self.spawn_lookup(request);
    }
  }

  async fn submit(&mut self) -> anyhow::Result<()> {
    let Screen::ContactForm(state) = &mut self.screen else {
      return Ok(());
    };

    match state.form.submit() {
      Ok(Submission::Create(fields)) => {
        let record = self.store.create(fields).await?;
        self.status = Status::Info(format!("contact {} saved", record.id));
      }
      Ok(Submission::Update(record)) => {
        let id = record.id;
        self.status = match self.store.update(record).await? {
          Some(_) => Status::Info(format!("contact {id} saved")),
          None => Status::Alert(format!("contact {id} no longer exists")),
        };
      }
      Err(violations) => {
        self.status = Status::Alert(violations.to_string());
        return Ok(());
      }
    }
    self.back_to_list().await
  }
}
