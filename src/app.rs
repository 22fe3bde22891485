use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::components::Component;
use crate::components::connect::Access;
use crate::components::create_event::CreateEvent;
use crate::components::event_list::EventList;
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::home::Home;
use crate::components::my_tickets::MyTickets;
use crate::components::status_bar::StatusBar;
use crate::data::TicketService;
use crate::data::contract::ContractDescriptor;
use crate::data::export;
use crate::data::tx::{TxAction, TxPhase};
use crate::data::types::ChainConfig;
use crate::events::{AppEvent, View};
use crate::theme::THEME;

/// Roughly one Sepolia block.
const BLOCK_POLL: Duration = Duration::from_secs(12);

pub struct App {
    // Navigation
    view_stack: Vec<View>,
    current_view: View,

    // Components
    header: Header,
    home: Home,
    event_list: EventList,
    my_tickets: MyTickets,
    create_event: CreateEvent,
    status_bar: StatusBar,
    help: HelpOverlay,

    // Data
    service: Arc<TicketService>,
    contract: ContractDescriptor,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn with_service(
        service: Arc<TicketService>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        contract: ContractDescriptor,
        chain: &ChainConfig,
        tick_rate_ms: u64,
    ) -> Self {
        Self {
            view_stack: Vec::new(),
            current_view: View::Home,
            header: Header::new(&chain.name, &chain.symbol),
            home: Home::new(contract.clone()),
            event_list: EventList::new(),
            my_tickets: MyTickets::new(),
            create_event: CreateEvent::new(),
            status_bar: StatusBar::new(),
            help: HelpOverlay::new(),
            service,
            contract,
            event_rx,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        self.service.fetch_latest_block_number();
        self.service.fetch_balance();

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut block_poll = tokio::time::interval(BLOCK_POLL);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    terminal.draw(|frame| self.render(frame))?;
                }
                _ = block_poll.tick() => {
                    self.service.fetch_latest_block_number();
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        info!("shutting down");
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // header (1) | content (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        match self.current_view {
            View::Home => self.home.render(frame, chunks[1]),
            View::Events => self.event_list.render(frame, chunks[1]),
            View::MyTickets => self.my_tickets.render(frame, chunks[1]),
            View::CreateEvent => self.create_event.render(frame, chunks[1]),
        }

        self.status_bar.render(frame, chunks[2]);
        self.help.render(frame, area);
    }

    /// Whether the current page is taking free text, in which case the
    /// global single-letter shortcuts stay off.
    fn capturing_input(&self) -> bool {
        match self.current_view {
            View::MyTickets => self.my_tickets.capturing_input(),
            View::CreateEvent => self.create_event.capturing_input(),
            _ => false,
        }
    }

    fn handle_terminal_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Only handle key press events (not release/repeat) for cross-platform compat
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.help.handle_key(key) {
            return;
        }

        if !self.capturing_input() {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('?') => {
                    self.help.toggle();
                    return;
                }
                KeyCode::Char(c @ '1'..='4') => {
                    if let Some(view) = View::from_tab_key(c) {
                        self.navigate_to(view);
                    }
                    return;
                }
                KeyCode::Esc | KeyCode::Backspace => {
                    self.go_back();
                    return;
                }
                _ => {}
            }
        }

        let app_event = match self.current_view {
            View::Home => self.home.handle_key(key),
            View::Events => self.event_list.handle_key(key),
            View::MyTickets => self.my_tickets.handle_key(key),
            View::CreateEvent => self.create_event.handle_key(key),
        };

        if let Some(event) = app_event {
            self.handle_app_event(event);
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Connected {
                chain_id,
                account,
                can_sign,
            } => {
                info!(chain_id, ?account, can_sign, "connected");
                self.status_bar.connected = true;
                self.header.account = account;
                self.header.can_sign = can_sign;
                self.my_tickets.account = account;
                self.my_tickets.can_sign = can_sign;
                self.create_event.access = Access::new(account.is_some(), can_sign);
            }
            AppEvent::LatestBlockNumber(number) => {
                self.status_bar.latest_block = number;
                self.status_bar.connected = true;
            }
            AppEvent::BalanceLoaded(balance) => {
                self.header.balance = Some(balance);
            }
            AppEvent::EventPageStarted {
                generation,
                page,
                has_next,
            } => {
                self.event_list.on_page_started(generation, page, has_next);
            }
            AppEvent::EventLoaded { generation, event } => {
                self.event_list.insert_event(generation, event);
            }
            AppEvent::EventScanComplete { generation, listed } => {
                debug!(generation, listed, "event page loaded");
                if self.event_list.on_scan_complete(generation) {
                    self.status_bar.loading = false;
                }
            }
            AppEvent::TicketLoaded { generation, ticket } => {
                self.my_tickets.insert_ticket(generation, ticket);
            }
            AppEvent::TicketScanComplete { generation, owned } => {
                debug!(generation, owned, "tickets loaded");
                if self.my_tickets.on_scan_complete(generation) {
                    self.status_bar.loading = false;
                }
            }
            AppEvent::MintRequested { event_id, price } => {
                self.service.mint_ticket(event_id, price);
            }
            AppEvent::CreateRequested(draft) => {
                self.service.create_event(draft);
            }
            AppEvent::TransferRequested { token_id, to } => {
                self.service.transfer_ticket(token_id, to);
            }
            AppEvent::ValidateRequested { token_id } => {
                self.service.validate_ticket(token_id);
            }
            AppEvent::RefreshRequested => {
                self.status_bar.clear();
                self.load_view(self.current_view);
            }
            AppEvent::PageRequested(page) => {
                self.load_events(page);
            }
            AppEvent::ExportRequested => {
                self.export_current();
            }
            AppEvent::TxUpdate { action, phase } => {
                self.handle_tx_update(action, phase);
            }
            AppEvent::Navigate(view) => {
                self.navigate_to(view);
            }
            AppEvent::Back => {
                self.go_back();
            }
            AppEvent::Error(msg) => {
                self.status_bar.set_error(msg);
                self.status_bar.loading = false;
            }
        }
    }

    fn handle_tx_update(&mut self, action: TxAction, phase: TxPhase) {
        match &phase {
            TxPhase::Failed(reason) => self.status_bar.set_error(format!("{action}: {reason}")),
            TxPhase::Confirmed(hash) => match self.contract.tx_link(hash) {
                Some(link) => {
                    info!(%action, %link, "confirmed");
                    self.status_bar.set_status(format!("{action}: {phase} {link}"));
                }
                None => self.status_bar.set_status(format!("{action}: {phase}")),
            },
            _ => self.status_bar.set_status(format!("{action}: {phase}")),
        }

        let confirmed = self.event_list.apply_tx(&action, &phase)
            | self.my_tickets.apply_tx(&action, &phase)
            | self.create_event.apply_tx(&action, &phase);
        if !confirmed {
            return;
        }

        self.service.fetch_balance();
        match action {
            // sold counts moved
            TxAction::Mint { .. } if self.current_view == View::Events => {
                let generation = self.event_list.reload();
                self.status_bar.loading = true;
                self.service.load_events(generation, self.event_list.page);
            }
            TxAction::Transfer { .. } | TxAction::Validate { .. }
                if self.current_view == View::MyTickets =>
            {
                self.load_tickets();
            }
            _ => {}
        }
    }

    fn load_events(&mut self, page: usize) {
        let generation = self.event_list.begin_load(page);
        self.status_bar.loading = true;
        self.service.load_events(generation, page);
    }

    fn load_tickets(&mut self) {
        if self.service.account().is_none() {
            return;
        }
        let generation = self.my_tickets.begin_load();
        self.status_bar.loading = true;
        self.service.load_tickets(generation);
    }

    fn load_view(&mut self, view: View) {
        match view {
            View::Events => self.load_events(self.event_list.page),
            View::MyTickets => self.load_tickets(),
            View::Home => {
                self.service.fetch_latest_block_number();
                self.service.fetch_balance();
            }
            View::CreateEvent => {}
        }
    }

    fn export_current(&mut self) {
        let result = match self.current_view {
            View::Events => export::export_events_csv(
                &self.event_list.events,
                &export::default_filename("events", "csv"),
            ),
            View::MyTickets => export::export_tickets_json(
                &self.my_tickets.tickets,
                &export::default_filename("tickets", "json"),
            ),
            _ => Err("Nothing to export on this page".to_string()),
        };
        match result {
            Ok(msg) => {
                info!("{msg}");
                self.status_bar.set_status(msg);
            }
            Err(msg) => self.status_bar.set_error(msg),
        }
    }

    fn navigate_to(&mut self, view: View) {
        self.header.current_tab = view.tab_index();
        self.status_bar.clear();

        if view != self.current_view {
            let old_view = std::mem::replace(&mut self.current_view, view);
            self.view_stack.push(old_view);
        }

        // pages re-read on every visit
        self.load_view(view);
    }

    fn go_back(&mut self) {
        if let Some(prev_view) = self.view_stack.pop() {
            self.current_view = prev_view;
            self.header.current_tab = prev_view.tab_index();
            self.status_bar.clear();
        }
    }
}
