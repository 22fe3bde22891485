use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::tx::{PendingAction, TxAction, TxPhase};
use crate::data::types::EventInfo;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

/// What the buy button of an event shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintState {
    Available,
    SoldOut,
    Processing,
    Minted,
}

impl MintState {
    pub fn label(&self) -> &'static str {
        match self {
            MintState::Available => "Buy Ticket",
            MintState::SoldOut => "Sold Out",
            MintState::Processing => "Processing...",
            MintState::Minted => "Ticket minted",
        }
    }
}

pub struct EventList {
    pub events: Vec<EventInfo>,
    pub loading: bool,
    pub page: usize,
    pub has_next: bool,
    generation: u64,
    pending: Option<PendingAction>,
    /// Event of the last confirmed mint. Cleared by the next buy and by any
    /// fresh listing, kept across the re-read that follows the mint.
    minted: Option<u64>,
    table_state: TableState,
    scroll_state: ScrollbarState,
}

impl EventList {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            loading: false,
            page: 0,
            has_next: false,
            generation: 0,
            pending: None,
            minted: None,
            table_state: TableState::default(),
            scroll_state: ScrollbarState::default(),
        }
    }

    /// Start a fresh listing of `page`. Results tagged with an older
    /// generation are dropped from then on.
    pub fn begin_load(&mut self, page: usize) -> u64 {
        self.minted = None;
        self.start(page)
    }

    /// Re-read the current page after a confirmed mint, keeping the
    /// success badge.
    pub fn reload(&mut self) -> u64 {
        self.start(self.page)
    }

    fn start(&mut self, page: usize) -> u64 {
        self.generation += 1;
        self.page = page;
        self.events.clear();
        self.loading = true;
        self.table_state.select(None);
        self.generation
    }

    pub fn on_page_started(&mut self, generation: u64, page: usize, has_next: bool) {
        if generation == self.generation {
            self.page = page;
            self.has_next = has_next;
        }
    }

    /// Insert a listed event, keeping id order whatever order reads finish in.
    pub fn insert_event(&mut self, generation: u64, event: EventInfo) {
        if generation != self.generation {
            return;
        }
        match self.events.binary_search_by_key(&event.id, |e| e.id) {
            Ok(pos) => self.events[pos] = event,
            Err(pos) => self.events.insert(pos, event),
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

    pub fn mint_state(&self, event: &EventInfo) -> MintState {
        if self.minted == Some(event.id) {
            return MintState::Minted;
        }
        if let Some(pending) = &self.pending {
            if pending.phase.is_pending()
                && matches!(pending.action, TxAction::Mint { event_id, .. } if event_id == event.id)
            {
                return MintState::Processing;
            }
        }
        if event.sold_out() {
            MintState::SoldOut
        } else {
            MintState::Available
        }
    }

    fn mint_in_flight(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.phase.is_pending())
    }

    /// Apply a lifecycle update for a mint started here. Returns true when
    /// the mint confirmed and the listing should be re-read.
    pub fn apply_tx(&mut self, action: &TxAction, phase: &TxPhase) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        if &pending.action != action || !pending.advance(phase.clone()) {
            return false;
        }
        match (&pending.action, &pending.phase) {
            (TxAction::Mint { event_id, .. }, TxPhase::Confirmed(_)) => {
                self.minted = Some(*event_id);
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn selected_event(&self) -> Option<&EventInfo> {
        self.table_state.selected().and_then(|i| self.events.get(i))
    }

    fn request_mint(&mut self) -> Option<AppEvent> {
        if self.mint_in_flight() {
            return None;
        }
        let event = self.selected_event()?;
        if self.mint_state(event) != MintState::Available {
            return None;
        }
        let action = TxAction::Mint {
            event_id: event.id,
            price: event.price,
        };
        let request = AppEvent::MintRequested {
            event_id: event.id,
            price: event.price,
        };
        self.pending = Some(PendingAction::new(action));
        self.minted = None;
        Some(request)
    }

    fn select_next(&mut self) {
        let len = self.events.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if current + 1 >= len { current } else { current + 1 };
        self.table_state.select(Some(next));
        self.scroll_state = self.scroll_state.position(next);
    }

    fn select_prev(&mut self) {
        if self.events.is_empty() {
            return;
        }
        let prev = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(prev));
        self.scroll_state = self.scroll_state.position(prev);
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, event: &EventInfo) {
        let state = self.mint_state(event);
        let block = Block::default()
            .title(format!(" Event {:02} ", event.id))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        let button_style = match state {
            MintState::Available => THEME.button_style(),
            MintState::Minted => THEME.success_style().add_modifier(Modifier::BOLD),
            MintState::SoldOut => THEME.error_style(),
            MintState::Processing => THEME.warning_style(),
        };

        let mut lines = vec![
            Line::from(Span::styled(
                event.name.clone(),
                Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Date       ", THEME.muted_style()),
                Span::raw(utils::format_event_date(event.event_date)),
            ]),
            Line::from(vec![
                Span::styled("Tickets    ", THEME.muted_style()),
                Span::raw(format!("{} tickets sold", sold_label(event))),
                Span::styled(format!("  ({} remaining)", event.remaining()), THEME.muted_style()),
            ]),
            Line::from(vec![
                Span::styled("Transfers  ", THEME.muted_style()),
                Span::raw(format!("Max {} transfers", event.max_transfers)),
            ]),
            Line::from(vec![
                Span::styled("Organizer  ", THEME.muted_style()),
                Span::styled(utils::truncate_address(&event.organizer), THEME.address_style()),
            ]),
            Line::from(vec![
                Span::styled("Price      ", THEME.muted_style()),
                Span::styled(utils::format_eth(event.price), THEME.eth_style()),
            ]),
            Line::from(""),
            Line::from(Span::styled(format!("[ {} ]", state.label()), button_style)),
        ];

        if let Some(PendingAction {
            phase: TxPhase::Failed(reason),
            action: TxAction::Mint { event_id, .. },
        }) = &self.pending
        {
            if *event_id == event.id {
                lines.push(Line::from(Span::styled(
                    format!("Mint failed: {reason}"),
                    THEME.error_style(),
                )));
            }
        }

        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
    }
}

/// "sold/capacity", e.g. "10/100"
pub fn sold_label(event: &EventInfo) -> String {
    format!("{}/{}", event.tickets_sold, event.max_tickets)
}

fn build_rows(list: &EventList) -> Vec<Row<'static>> {
    list.events
        .iter()
        .map(|e| {
            let state = list.mint_state(e);
            let state_style = match state {
                MintState::SoldOut => THEME.error_style(),
                MintState::Minted => THEME.success_style(),
                MintState::Processing => THEME.warning_style(),
                MintState::Available => THEME.muted_style(),
            };
            Row::new(vec![
                Cell::from(format!("{:02}", e.id)).style(THEME.accent_style()),
                Cell::from(e.name.clone()),
                Cell::from(utils::format_event_date(e.event_date)).style(THEME.muted_style()),
                Cell::from(format!("{} sold", sold_label(e))),
                Cell::from(utils::format_eth(e.price)).style(THEME.eth_style()),
                Cell::from(format!("{}", e.max_transfers)),
                Cell::from(state.label()).style(state_style),
            ])
        })
        .collect()
}

impl Component for EventList {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('g') => {
                if !self.events.is_empty() {
                    self.table_state.select(Some(0));
                    self.scroll_state = self.scroll_state.position(0);
                }
                None
            }
            KeyCode::Char('G') => {
                if !self.events.is_empty() {
                    let last = self.events.len() - 1;
                    self.table_state.select(Some(last));
                    self.scroll_state = self.scroll_state.position(last);
                }
                None
            }
            KeyCode::Enter | KeyCode::Char('b') => self.request_mint(),
            KeyCode::Char('n') if self.has_next => Some(AppEvent::PageRequested(self.page + 1)),
            KeyCode::Char('p') if self.page > 0 => Some(AppEvent::PageRequested(self.page - 1)),
            KeyCode::Char('r') => Some(AppEvent::RefreshRequested),
            KeyCode::Char('e') => Some(AppEvent::ExportRequested),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.loading {
            format!(" Events - page {} (loading...) ", self.page + 1)
        } else {
            format!(" Events - page {} ", self.page + 1)
        };
        let outer_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        if self.events.is_empty() {
            let msg = if self.loading {
                "Loading events..."
            } else {
                "No active events on this page"
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
            .constraints([Constraint::Min(6), Constraint::Length(11)])
            .split(area);

        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from("Name"),
            Cell::from("Date"),
            Cell::from("Tickets"),
            Cell::from("Price"),
            Cell::from("Max Xfers"),
            Cell::from("Status"),
        ])
        .style(THEME.table_header_style());

        let rows = build_rows(self);
        let widths = [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(26),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(14),
        ];

        self.scroll_state = self.scroll_state.content_length(self.events.len());

        let table = Table::new(rows, widths)
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

        if let Some(event) = self.selected_event().cloned() {
            self.render_card(frame, chunks[1], &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::sample_event;
    use alloy::primitives::{B256, U256};
    use crossterm::event::KeyModifiers;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn loaded(events: Vec<EventInfo>) -> EventList {
        let mut list = EventList::new();
        let generation = list.begin_load(0);
        for event in events {
            list.insert_event(generation, event);
        }
        list.on_scan_complete(generation);
        list
    }

    #[test]
    fn test_conf_card() {
        let event = sample_event(1, "Conf", 100, 10, true);
        let list = loaded(vec![event.clone()]);
        assert_eq!(utils::format_eth(event.price), "0.1 ETH");
        assert_eq!(format!("{} sold", sold_label(&event)), "10/100 sold");
        assert_eq!(list.mint_state(&event), MintState::Available);
    }

    #[test]
    fn test_insert_keeps_id_order() {
        let list = loaded(vec![
            sample_event(7, "G", 10, 0, true),
            sample_event(2, "B", 10, 0, true),
            sample_event(4, "D", 10, 0, true),
        ]);
        let ids: Vec<u64> = list.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 4, 7]);
    }

    #[test]
    fn test_stale_generation_dropped() {
        let mut list = EventList::new();
        let old = list.begin_load(0);
        let current = list.begin_load(1);
        list.insert_event(old, sample_event(1, "Old", 10, 0, true));
        assert!(list.events.is_empty());
        list.insert_event(current, sample_event(11, "New", 10, 0, true));
        assert_eq!(list.events.len(), 1);
        assert!(!list.on_scan_complete(old));
        assert!(list.loading);
        assert!(list.on_scan_complete(current));
        assert!(!list.loading);
    }

    #[test]
    fn test_buy_requests_mint_with_price() {
        let mut list = loaded(vec![sample_event(1, "Conf", 100, 10, true)]);
        match list.handle_key(key('b')) {
            Some(AppEvent::MintRequested { event_id, price }) => {
                assert_eq!(event_id, 1);
                assert_eq!(price, U256::from(100_000_000_000_000_000u64));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sold_out_disables_mint() {
        let mut list = loaded(vec![sample_event(3, "Full", 10, 10, true)]);
        let event = list.events[0].clone();
        assert_eq!(list.mint_state(&event), MintState::SoldOut);
        assert!(list.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn test_mint_lifecycle_shows_success() {
        let mut list = loaded(vec![sample_event(1, "Conf", 100, 10, true)]);
        list.handle_key(key('b'));
        let action = list.pending().unwrap().action.clone();
        let event = list.events[0].clone();
        let hash = B256::repeat_byte(1);

        assert!(!list.apply_tx(&action, &TxPhase::Submitted));
        assert_eq!(list.mint_state(&event), MintState::Processing);
        // second buy is blocked while the first is in flight
        assert!(list.handle_key(key('b')).is_none());

        assert!(!list.apply_tx(&action, &TxPhase::Confirming(hash)));
        assert_eq!(list.mint_state(&event), MintState::Processing);

        assert!(list.apply_tx(&action, &TxPhase::Confirmed(hash)));
        assert_eq!(list.pending().unwrap().phase, TxPhase::Confirmed(hash));
        assert_eq!(list.mint_state(&event), MintState::Minted);
    }

    fn mint_selected(list: &mut EventList, hash: B256) {
        list.handle_key(key('b'));
        let action = list.pending().unwrap().action.clone();
        list.apply_tx(&action, &TxPhase::Submitted);
        list.apply_tx(&action, &TxPhase::Confirming(hash));
        list.apply_tx(&action, &TxPhase::Confirmed(hash));
    }

    #[test]
    fn test_minted_kept_across_post_mint_reload() {
        let mut list = loaded(vec![sample_event(1, "Conf", 100, 10, true)]);
        mint_selected(&mut list, B256::repeat_byte(2));

        let generation = list.reload();
        list.insert_event(generation, sample_event(1, "Conf", 100, 11, true));
        let event = list.events[0].clone();
        assert_eq!(list.mint_state(&event), MintState::Minted);
    }

    #[test]
    fn test_fresh_listing_allows_buying_again() {
        let mut list = loaded(vec![sample_event(1, "Conf", 100, 10, true)]);
        mint_selected(&mut list, B256::repeat_byte(2));

        let generation = list.begin_load(0);
        list.insert_event(generation, sample_event(1, "Conf", 100, 11, true));
        let event = list.events[0].clone();
        assert_eq!(list.mint_state(&event), MintState::Available);
        assert!(matches!(
            list.handle_key(key('b')),
            Some(AppEvent::MintRequested { event_id: 1, .. })
        ));
    }

    #[test]
    fn test_only_last_mint_shows_success() {
        let mut list = loaded(vec![
            sample_event(1, "Conf", 100, 10, true),
            sample_event(2, "Meetup", 50, 5, true),
        ]);
        mint_selected(&mut list, B256::repeat_byte(2));
        let first = list.events[0].clone();
        assert_eq!(list.mint_state(&first), MintState::Minted);

        list.handle_key(key('j'));
        assert!(list.handle_key(key('b')).is_some());
        assert_eq!(list.mint_state(&first), MintState::Available);
    }

    #[test]
    fn test_failed_mint_allows_retry() {
        let mut list = loaded(vec![sample_event(1, "Conf", 100, 10, true)]);
        list.handle_key(key('b'));
        let action = list.pending().unwrap().action.clone();
        list.apply_tx(&action, &TxPhase::Submitted);
        list.apply_tx(&action, &TxPhase::Failed("user rejected".into()));
        let event = list.events[0].clone();
        assert_eq!(list.mint_state(&event), MintState::Available);
        assert!(list.handle_key(key('b')).is_some());
    }

    #[test]
    fn test_unrelated_tx_ignored() {
        let mut list = loaded(vec![sample_event(1, "Conf", 100, 10, true)]);
        assert!(!list.apply_tx(&TxAction::CreateEvent, &TxPhase::Submitted));
        assert!(list.pending().is_none());
    }

    #[test]
    fn test_paging_keys() {
        let mut list = loaded(vec![sample_event(1, "Conf", 100, 10, true)]);
        assert!(list.handle_key(key('n')).is_none());
        assert!(list.handle_key(key('p')).is_none());

        let generation = list.begin_load(1);
        list.on_page_started(generation, 1, true);
        assert!(matches!(list.handle_key(key('n')), Some(AppEvent::PageRequested(2))));
        assert!(matches!(list.handle_key(key('p')), Some(AppEvent::PageRequested(0))));
    }
}
