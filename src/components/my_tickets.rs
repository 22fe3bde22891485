use std::collections::HashMap;

use alloy::primitives::Address;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::components::connect;
use crate::components::input::{InputResult, TextInput};
use crate::data::tx::{PendingAction, TxAction, TxPhase};
use crate::data::types::OwnedTicket;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

enum Mode {
    Browse,
    Recipient {
        token_id: u64,
        input: TextInput,
        error: Option<String>,
    },
    ConfirmValidate {
        token_id: u64,
    },
}

pub struct MyTickets {
    pub tickets: Vec<OwnedTicket>,
    pub loading: bool,
    pub account: Option<Address>,
    pub can_sign: bool,
    generation: u64,
    mode: Mode,
    pending: HashMap<u64, PendingAction>,
    table_state: TableState,
    scroll_state: ScrollbarState,
}

fn token_of(action: &TxAction) -> Option<u64> {
    match action {
        TxAction::Transfer { token_id, .. } | TxAction::Validate { token_id } => Some(*token_id),
        _ => None,
    }
}

impl MyTickets {
    pub fn new() -> Self {
        Self {
            tickets: Vec::new(),
            loading: false,
            account: None,
            can_sign: false,
            generation: 0,
            mode: Mode::Browse,
            pending: HashMap::new(),
            table_state: TableState::default(),
            scroll_state: ScrollbarState::default(),
        }
    }

    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.tickets.clear();
        self.loading = true;
        self.table_state.select(None);
        self.generation
    }

    pub fn insert_ticket(&mut self, generation: u64, ticket: OwnedTicket) {
        if generation != self.generation {
            return;
        }
        match self
            .tickets
            .binary_search_by_key(&ticket.token_id, |t| t.token_id)
        {
            Ok(pos) => self.tickets[pos] = ticket,
            Err(pos) => self.tickets.insert(pos, ticket),
        }
        if self.table_state.selected().is_none() {
            self.table_state.select(Some(0));
        }
    }

    /// Returns false for a stale generation, which leaves loading alone.
    pub fn on_scan_complete(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }

    /// True while a prompt is open and wants every key.
    pub fn capturing_input(&self) -> bool {
        !matches!(self.mode, Mode::Browse)
    }

    pub fn pending_for(&self, token_id: u64) -> Option<&PendingAction> {
        self.pending.get(&token_id)
    }

    fn busy(&self, token_id: u64) -> bool {
        !self.can_sign
            || self
                .pending_for(token_id)
                .is_some_and(|pending| pending.phase.is_pending())
    }

    /// Apply a lifecycle update for a transfer or validation started here.
    /// Returns true when it confirmed and the list should be re-read.
    pub fn apply_tx(&mut self, action: &TxAction, phase: &TxPhase) -> bool {
        let Some(token_id) = token_of(action) else {
            return false;
        };
        let Some(pending) = self.pending.get_mut(&token_id) else {
            return false;
        };
        if &pending.action != action || !pending.advance(phase.clone()) {
            return false;
        }
        matches!(pending.phase, TxPhase::Confirmed(_))
    }

    pub fn selected_ticket(&self) -> Option<&OwnedTicket> {
        self.table_state.selected().and_then(|i| self.tickets.get(i))
    }

    fn start(&mut self, action: TxAction) {
        if let Some(token_id) = token_of(&action) {
            self.pending.insert(token_id, PendingAction::new(action));
        }
    }

    fn select_next(&mut self) {
        let len = self.tickets.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if current + 1 >= len { current } else { current + 1 };
        self.table_state.select(Some(next));
        self.scroll_state = self.scroll_state.position(next);
    }

    fn select_prev(&mut self) {
        if self.tickets.is_empty() {
            return;
        }
        let prev = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(prev));
        self.scroll_state = self.scroll_state.position(prev);
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('t') => {
                let token_id = self.selected_ticket()?.token_id;
                if !self.busy(token_id) {
                    self.mode = Mode::Recipient {
                        token_id,
                        input: TextInput::new(),
                        error: None,
                    };
                }
                None
            }
            KeyCode::Char('v') => {
                let token_id = self.selected_ticket()?.token_id;
                if !self.busy(token_id) {
                    self.mode = Mode::ConfirmValidate { token_id };
                }
                None
            }
            KeyCode::Char('r') => Some(AppEvent::RefreshRequested),
            KeyCode::Char('e') => Some(AppEvent::ExportRequested),
            _ => None,
        }
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, ticket: &OwnedTicket) {
        let block = Block::default()
            .title(format!(" Ticket #{} ", ticket.token_id))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        let transfers = match (ticket.transfer_count, ticket.transfers_left()) {
            (Some(used), Some(left)) => format!(
                "{used}/{} used, {left} left",
                ticket.event.max_transfers
            ),
            _ => format!("Max {} transfers", ticket.event.max_transfers),
        };

        let mut lines = vec![
            Line::from(Span::styled(
                ticket.event.name.clone(),
                Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Date       ", THEME.muted_style()),
                Span::raw(utils::format_event_date(ticket.event.event_date)),
            ]),
            Line::from(vec![
                Span::styled("Transfers  ", THEME.muted_style()),
                Span::raw(transfers),
            ]),
            Line::from(vec![
                Span::styled("Metadata   ", THEME.muted_style()),
                Span::styled(
                    ticket.token_uri.clone().unwrap_or_else(|| "-".to_string()),
                    THEME.hash_style(),
                ),
            ]),
            Line::from(""),
        ];

        if let Some(pending) = self.pending_for(ticket.token_id) {
            let style = match pending.phase {
                TxPhase::Submitted => THEME.info_style(),
                TxPhase::Confirming(_) => THEME.warning_style(),
                TxPhase::Confirmed(_) => THEME.success_style(),
                TxPhase::Failed(_) => THEME.error_style(),
                TxPhase::Idle => THEME.muted_style(),
            };
            lines.push(Line::from(Span::styled(
                format!("{}: {}", pending.action, pending.phase),
                style,
            )));
            if let Some(hash) = pending.phase.hash() {
                lines.push(Line::from(Span::styled(
                    utils::truncate_hash(&hash),
                    THEME.hash_style(),
                )));
            }
        } else if self.can_sign {
            lines.push(Line::from(Span::styled(
                "t: Transfer ticket   v: Validate at entry",
                THEME.muted_style(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Watch-only account: transfers and validation need a signing key",
                THEME.warning_style(),
            )));
        }

        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(64);
        let x = area.x + area.width.saturating_sub(width) / 2;
        match &self.mode {
            Mode::Browse => {}
            Mode::Recipient {
                token_id,
                input,
                error,
            } => {
                let popup = Rect::new(x, area.y + area.height / 3, width, 3);
                frame.render_widget(Clear, popup);
                let label = match error {
                    Some(err) => format!("Transfer #{token_id} - {err}"),
                    None => format!("Transfer #{token_id} to"),
                };
                input.render(frame, popup, &label, "Recipient address (0x...)", true);
            }
            Mode::ConfirmValidate { token_id } => {
                let popup = Rect::new(x, area.y + area.height / 3, width, 4);
                frame.render_widget(Clear, popup);
                let block = Block::default()
                    .title(" Validate ticket ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(THEME.warning))
                    .style(Style::default().bg(THEME.surface));
                let text = vec![
                    Line::from(format!(
                        "Validate ticket #{token_id}? This action cannot be undone."
                    )),
                    Line::from(Span::styled("y: confirm   n: cancel", THEME.muted_style())),
                ];
                frame.render_widget(Paragraph::new(text).block(block), popup);
            }
        }
    }
}

fn build_rows(view: &MyTickets) -> Vec<Row<'static>> {
    view.tickets
        .iter()
        .map(|t| {
            let transfers = match t.transfer_count {
                Some(used) => format!("{used}/{}", t.event.max_transfers),
                None => format!("-/{}", t.event.max_transfers),
            };
            let (status, style) = match view.pending_for(t.token_id) {
                Some(p) if p.phase.is_pending() => ("Processing...", THEME.warning_style()),
                Some(PendingAction {
                    phase: TxPhase::Failed(_),
                    ..
                }) => ("Failed", THEME.error_style()),
                _ if t.attended == Some(true) => ("Validated", THEME.muted_style()),
                _ => ("Active", THEME.success_style()),
            };
            Row::new(vec![
                Cell::from(format!("#{}", t.token_id)).style(THEME.accent_style()),
                Cell::from(t.event.name.clone()),
                Cell::from(utils::format_event_date(t.event.event_date)).style(THEME.muted_style()),
                Cell::from(transfers),
                Cell::from(status).style(style),
            ])
        })
        .collect()
}

impl Component for MyTickets {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Recipient {
                token_id,
                mut input,
                error,
            } => match input.handle_key(key) {
                InputResult::Cancel => None,
                InputResult::Submit => match utils::parse_address(&input.value) {
                    Some(to) => {
                        self.start(TxAction::Transfer { token_id, to });
                        Some(AppEvent::TransferRequested { token_id, to })
                    }
                    None => {
                        self.mode = Mode::Recipient {
                            token_id,
                            input,
                            error: Some("enter a valid recipient address".to_string()),
                        };
                        None
                    }
                },
                InputResult::Changed => {
                    self.mode = Mode::Recipient {
                        token_id,
                        input,
                        error: None,
                    };
                    None
                }
                InputResult::Ignored => {
                    self.mode = Mode::Recipient {
                        token_id,
                        input,
                        error,
                    };
                    None
                }
            },
            Mode::ConfirmValidate { token_id } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.start(TxAction::Validate { token_id });
                    Some(AppEvent::ValidateRequested { token_id })
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => None,
                _ => {
                    self.mode = Mode::ConfirmValidate { token_id };
                    None
                }
            },
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.account.is_none() {
            connect::render_connect_prompt(frame, area, "view your tickets");
            return;
        }

        let title = if self.loading {
            " My Tickets (loading...) ".to_string()
        } else {
            format!(" My Tickets ({}) ", self.tickets.len())
        };
        let outer_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        if self.tickets.is_empty() {
            let msg = if self.loading {
                "Checking ticket ownership..."
            } else {
                "You don't own any tickets yet"
            };
            let text = Paragraph::new(msg)
                .style(THEME.muted_style())
                .alignment(Alignment::Center)
                .block(outer_block);
            frame.render_widget(text, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(10)])
            .split(area);

        let header = Row::new(vec![
            Cell::from("Ticket"),
            Cell::from("Event"),
            Cell::from("Date"),
            Cell::from("Transfers"),
            Cell::from("Status"),
        ])
        .style(THEME.table_header_style());

        let widths = [
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(26),
            Constraint::Length(10),
            Constraint::Length(14),
        ];

        self.scroll_state = self.scroll_state.content_length(self.tickets.len());

        let table = Table::new(build_rows(self), widths)
            .header(header)
            .block(outer_block)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");
        frame.render_stateful_widget(table, chunks[0], &mut self.table_state);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let scrollbar_area = Rect {
            x: chunks[0].x + chunks[0].width.saturating_sub(1),
            y: chunks[0].y + 1,
            width: 1,
            height: chunks[0].height.saturating_sub(2),
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut self.scroll_state);

        if let Some(ticket) = self.selected_ticket() {
            self.render_detail(frame, chunks[1], ticket);
        }

        self.render_prompt(frame, area);
    }
}
