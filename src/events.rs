use alloy::primitives::{Address, U256};

use crate::data::tx::{TxAction, TxPhase};
use crate::data::types::{EventDraft, EventInfo, OwnedTicket};

/// Pages the user can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Events,
    MyTickets,
    CreateEvent,
}

impl View {
    pub fn tab_index(self) -> usize {
        match self {
            View::Home => 0,
            View::Events => 1,
            View::MyTickets => 2,
            View::CreateEvent => 3,
        }
    }

    pub fn from_tab_key(c: char) -> Option<View> {
        match c {
            '1' => Some(View::Home),
            '2' => Some(View::Events),
            '3' => Some(View::MyTickets),
            '4' => Some(View::CreateEvent),
            _ => None,
        }
    }
}

/// Events sent from background data tasks and page components to the main
/// app loop
#[derive(Debug)]
pub enum AppEvent {
    // Connection
    Connected {
        chain_id: u64,
        account: Option<Address>,
        can_sign: bool,
    },
    LatestBlockNumber(u64),
    BalanceLoaded(U256),

    // Event listing
    EventPageStarted {
        generation: u64,
        page: usize,
        has_next: bool,
    },
    EventLoaded {
        generation: u64,
        event: EventInfo,
    },
    EventScanComplete {
        generation: u64,
        listed: usize,
    },

    // Ticket listing
    TicketLoaded {
        generation: u64,
        ticket: OwnedTicket,
    },
    TicketScanComplete {
        generation: u64,
        owned: usize,
    },

    // Requests raised by pages
    MintRequested { event_id: u64, price: U256 },
    CreateRequested(EventDraft),
    TransferRequested { token_id: u64, to: Address },
    ValidateRequested { token_id: u64 },
    RefreshRequested,
    PageRequested(usize),
    ExportRequested,

    // Write lifecycle
    TxUpdate { action: TxAction, phase: TxPhase },

    // Navigation
    Navigate(View),
    Back,

    Error(String),
}
