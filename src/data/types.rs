use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::data::contract::IEventTicket;

/// Clamp an on-chain integer into a `u64` for ids and counters.
pub fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    pub id: u64,
    pub name: String,
    pub max_tickets: U256,
    pub tickets_sold: U256,
    pub price: U256,
    pub event_date: u64,
    pub active: bool,
    pub max_transfers: u64,
    pub organizer: Address,
}

impl EventInfo {
    pub fn from_record(id: u64, record: IEventTicket::eventsReturn) -> Self {
        Self {
            id,
            name: record.name,
            max_tickets: record.maxTickets,
            tickets_sold: record.ticketsSold,
            price: record.pricePerTicket,
            event_date: to_u64(record.eventDate),
            active: record.active,
            max_transfers: to_u64(record.maxTransfersPerTicket),
            organizer: record.organizer,
        }
    }

    /// The contract returns a zeroed struct for unknown ids, so an event only
    /// exists once it has a name and is active.
    pub fn exists(&self) -> bool {
        !self.name.is_empty() && self.active
    }

    pub fn is_consistent(&self) -> bool {
        self.tickets_sold <= self.max_tickets
    }

    /// Whether the event gets a row in the listing.
    pub fn is_listed(&self) -> bool {
        self.exists() && self.is_consistent()
    }

    pub fn sold_out(&self) -> bool {
        self.tickets_sold >= self.max_tickets
    }

    pub fn remaining(&self) -> U256 {
        self.max_tickets.saturating_sub(self.tickets_sold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTicket {
    pub token_id: u64,
    pub owner: Address,
    pub event: EventInfo,
    pub transfer_count: Option<u64>,
    pub attended: Option<bool>,
    pub token_uri: Option<String>,
}

impl OwnedTicket {
    pub fn transfers_left(&self) -> Option<u64> {
        self.transfer_count
            .map(|used| self.event.max_transfers.saturating_sub(used))
    }
}

/// Arguments for `createEvent`, already converted to on-chain units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub max_tickets: u64,
    pub price: U256,
    pub event_date: u64,
    pub max_transfers: u64,
}

impl EventDraft {
    pub fn to_call(&self) -> IEventTicket::createEventCall {
        IEventTicket::createEventCall {
            _name: self.name.clone(),
            _maxTickets: U256::from(self.max_tickets),
            _price: self.price,
            _eventDate: U256::from(self.event_date),
            _maxTransfers: U256::from(self.max_transfers),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub symbol: String,
    pub explorer_url: Option<String>,
}

/// Exported ticket row.
#[derive(Debug, Clone, Serialize)]
pub struct TicketRecord {
    pub token_id: u64,
    pub event_id: u64,
    pub event_name: String,
    pub event_date: u64,
    pub transfer_count: Option<u64>,
    pub max_transfers: u64,
    pub attended: Option<bool>,
    pub token_uri: Option<String>,
}

impl From<&OwnedTicket> for TicketRecord {
    fn from(ticket: &OwnedTicket) -> Self {
        Self {
            token_id: ticket.token_id,
            event_id: ticket.event.id,
            event_name: ticket.event.name.clone(),
            event_date: ticket.event.event_date,
            transfer_count: ticket.transfer_count,
            max_transfers: ticket.event.max_transfers,
            attended: ticket.attended,
            token_uri: ticket.token_uri.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_event(id: u64, name: &str, max: u64, sold: u64, active: bool) -> EventInfo {
    EventInfo {
        id,
        name: name.to_string(),
        max_tickets: U256::from(max),
        tickets_sold: U256::from(sold),
        price: U256::from(100_000_000_000_000_000u64),
        event_date: 1_735_689_600,
        active,
        max_transfers: 3,
        organizer: Address::repeat_byte(0x11),
    }
}
