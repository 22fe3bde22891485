use alloy::primitives::utils::parse_ether;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;
use thiserror::Error;

use crate::components::Component;
use crate::components::connect::{self, Access};
use crate::components::input::{InputResult, TextInput};
use crate::data::tx::{PendingAction, TxAction, TxPhase};
use crate::data::types::EventDraft;
use crate::events::{AppEvent, View};
use crate::theme::THEME;
use crate::utils;

pub const TRANSFER_CHOICES: [u64; 4] = [1, 2, 3, 5];
const DEFAULT_TRANSFER_CHOICE: usize = 2;

const FIELD_COUNT: usize = 5;
const TRANSFERS_FIELD: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("max tickets must be a whole number")]
    InvalidTickets,
    #[error("price must be an ETH amount like 0.05")]
    InvalidPrice,
    #[error("date must look like YYYY-MM-DD HH:MM (UTC)")]
    InvalidDate,
}

fn transfer_label(choice: u64) -> String {
    match choice {
        1 => "1 (No resale)".to_string(),
        n => format!("{n} transfers"),
    }
}

pub struct CreateEvent {
    pub access: Access,
    name: TextInput,
    max_tickets: TextInput,
    price: TextInput,
    date: TextInput,
    transfer_choice: usize,
    focus: usize,
    error: Option<FormError>,
    pending: Option<PendingAction>,
    /// Name of the draft in flight, shown once it confirms.
    submitted: Option<String>,
    created: Option<String>,
}

impl CreateEvent {
    pub fn new() -> Self {
        Self {
            access: Access::Disconnected,
            name: TextInput::new(),
            max_tickets: TextInput::new(),
            price: TextInput::new(),
            date: TextInput::new(),
            transfer_choice: DEFAULT_TRANSFER_CHOICE,
            focus: 0,
            error: None,
            pending: None,
            submitted: None,
            created: None,
        }
    }

    fn can_sign(&self) -> bool {
        self.access == Access::Signer
    }

    pub fn max_transfers(&self) -> u64 {
        TRANSFER_CHOICES[self.transfer_choice]
    }

    /// True when typed characters belong to a text field.
    pub fn capturing_input(&self) -> bool {
        self.can_sign()
            && self.created.is_none()
            && !self.submitting()
            && self.focus < TRANSFERS_FIELD
    }

    fn submitting(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| p.phase.is_pending())
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut TextInput> {
        match index {
            0 => Some(&mut self.name),
            1 => Some(&mut self.max_tickets),
            2 => Some(&mut self.price),
            3 => Some(&mut self.date),
            _ => None,
        }
    }

    /// Shape-check the fields and build the `createEvent` arguments.
    pub fn build_draft(&self) -> Result<EventDraft, FormError> {
        let name = self.name.value.trim();
        if name.is_empty() {
            return Err(FormError::Missing("event name"));
        }
        let tickets = self.max_tickets.value.trim();
        if tickets.is_empty() {
            return Err(FormError::Missing("max tickets"));
        }
        let max_tickets = tickets
            .parse::<u64>()
            .map_err(|_| FormError::InvalidTickets)?;
        let price = self.price.value.trim();
        if price.is_empty() {
            return Err(FormError::Missing("price"));
        }
        let price = parse_ether(price).map_err(|_| FormError::InvalidPrice)?;
        let date = self.date.value.trim();
        if date.is_empty() {
            return Err(FormError::Missing("event date"));
        }
        let event_date = utils::parse_event_date(date).ok_or(FormError::InvalidDate)?;

        Ok(EventDraft {
            name: name.to_string(),
            max_tickets,
            price,
            event_date,
            max_transfers: self.max_transfers(),
        })
    }

    fn submit(&mut self) -> Option<AppEvent> {
        if self.submitting() {
            return None;
        }
        match self.build_draft() {
            Ok(draft) => {
                self.error = None;
                self.pending = Some(PendingAction::new(TxAction::CreateEvent));
                self.submitted = Some(draft.name.clone());
                Some(AppEvent::CreateRequested(draft))
            }
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }

    fn reset(&mut self) {
        self.name.clear();
        self.max_tickets.clear();
        self.price.clear();
        self.date.clear();
        self.transfer_choice = DEFAULT_TRANSFER_CHOICE;
        self.focus = 0;
        self.error = None;
    }

    /// Apply a lifecycle update for an event creation. Returns true on
    /// confirmation.
    pub fn apply_tx(&mut self, action: &TxAction, phase: &TxPhase) -> bool {
        if action != &TxAction::CreateEvent {
            return false;
        }
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        if !pending.advance(phase.clone()) {
            return false;
        }
        if matches!(phase, TxPhase::Confirmed(_)) {
            self.created = self.submitted.take();
            self.reset();
            return true;
        }
        false
    }

    fn render_success(&self, frame: &mut Frame, area: Rect, name: &str) {
        let block = Block::default()
            .title(" Create Event ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(THEME.success));
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Event created successfully!",
                THEME.success_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(name.to_string(), Style::default().fg(THEME.text))),
        ];
        if let Some(hash) = self.pending.as_ref().and_then(|p| p.phase.hash()) {
            lines.push(Line::from(Span::styled(
                utils::truncate_hash(&hash),
                THEME.hash_style(),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" n ", THEME.button_style()),
            Span::raw(" Create another   "),
            Span::styled(" v ", THEME.button_style()),
            Span::raw(" View events"),
        ]));
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
    }

    fn render_transfers(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == TRANSFERS_FIELD;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                THEME.border_focused_style()
            } else {
                THEME.border_style()
            })
            .title(" Max transfers per ticket ");
        let spans: Vec<Span> = TRANSFER_CHOICES
            .iter()
            .enumerate()
            .flat_map(|(i, choice)| {
                let style = if i == self.transfer_choice {
                    THEME.selected_style()
                } else {
                    THEME.muted_style()
                };
                [Span::styled(format!(" {} ", transfer_label(*choice)), style), Span::raw(" ")]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}

impl Component for CreateEvent {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if !self.can_sign() {
            return None;
        }

        if self.created.is_some() {
            return match key.code {
                KeyCode::Char('n') => {
                    self.created = None;
                    self.pending = None;
                    None
                }
                KeyCode::Char('v') => {
                    self.created = None;
                    self.pending = None;
                    Some(AppEvent::Navigate(View::Events))
                }
                _ => None,
            };
        }

        // fields stay frozen until the submitted draft settles
        if self.submitting() {
            return (key.code == KeyCode::Esc).then_some(AppEvent::Back);
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % FIELD_COUNT;
                return None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
                return None;
            }
            _ => {}
        }

        if self.focus == TRANSFERS_FIELD {
            return match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.transfer_choice = self.transfer_choice.saturating_sub(1);
                    None
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    if self.transfer_choice + 1 < TRANSFER_CHOICES.len() {
                        self.transfer_choice += 1;
                    }
                    None
                }
                KeyCode::Enter => self.submit(),
                KeyCode::Esc => Some(AppEvent::Back),
                _ => None,
            };
        }

        let focus = self.focus;
        let result = self.field_mut(focus).map(|field| field.handle_key(key))?;
        match result {
            InputResult::Submit => {
                self.focus += 1;
                None
            }
            InputResult::Cancel => Some(AppEvent::Back),
            InputResult::Changed => {
                self.error = None;
                None
            }
            InputResult::Ignored => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self.access {
            Access::Disconnected => {
                connect::render_connect_prompt(frame, area, "create events");
                return;
            }
            Access::WatchOnly => {
                connect::render_watch_only(frame, area, "create events");
                return;
            }
            Access::Signer => {}
        }
        if let Some(name) = self.created.clone() {
            self.render_success(frame, area, &name);
            return;
        }

        let outer = Block::default()
            .title(" Create Event ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let fields: [(&TextInput, &str, &str); 4] = [
            (&self.name, "Event name", "e.g. Web3 Conference 2025"),
            (&self.max_tickets, "Max tickets", "100"),
            (&self.price, "Price (ETH)", "0.01"),
            (&self.date, "Date & time (UTC)", "2025-06-01 18:00"),
        ];
        for (i, (input, label, placeholder)) in fields.iter().enumerate() {
            input.render(frame, rows[i], label, placeholder, self.focus == i);
        }
        self.render_transfers(frame, rows[TRANSFERS_FIELD]);

        let status = match (&self.error, &self.pending) {
            (Some(err), _) => Line::from(Span::styled(format!("Error: {err}"), THEME.error_style())),
            (None, Some(p)) if p.phase.is_pending() => {
                Line::from(Span::styled(p.phase.to_string(), THEME.warning_style()))
            }
            (None, Some(PendingAction {
                phase: TxPhase::Failed(reason),
                ..
            })) => Line::from(Span::styled(format!("Failed: {reason}"), THEME.error_style())),
            _ => Line::from(Span::styled(
                "Tab: next field   \u{2190}/\u{2192}: transfers   Enter on transfers: create",
                THEME.muted_style(),
            )),
        };
        frame.render_widget(Paragraph::new(status), rows[5]);
    }
}
