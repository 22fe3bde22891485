use std::future::Future;

use alloy::primitives::Address;
use color_eyre::eyre::Result;

use crate::data::types::EventInfo;

/// Typed reads against the ticketing contract.
///
/// `ChainClient` implements this over RPC; tests implement it over maps.
pub trait ChainReader: Send + Sync + 'static {
    /// `events(id)`, returned as-is even when the slot is empty.
    fn event(&self, id: u64) -> impl Future<Output = Result<EventInfo>> + Send;

    fn owner_of(&self, token_id: u64) -> impl Future<Output = Result<Address>> + Send;

    fn ticket_event_id(&self, token_id: u64) -> impl Future<Output = Result<u64>> + Send;

    fn ticket_transfer_count(&self, token_id: u64) -> impl Future<Output = Result<u64>> + Send;

    fn token_uri(&self, token_id: u64) -> impl Future<Output = Result<String>> + Send;

    fn has_attended(
        &self,
        event_id: u64,
        account: Address,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Ids from `EventCreated` logs since `from_block`.
    fn created_event_ids(&self, from_block: u64) -> impl Future<Output = Result<Vec<u64>>> + Send;

    /// Token ids minted to or transferred to `account` since `from_block`.
    fn received_token_ids(
        &self,
        account: Address,
        from_block: u64,
    ) -> impl Future<Output = Result<Vec<u64>>> + Send;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;

    use alloy::primitives::{Address, U256};
    use color_eyre::eyre::{Result, eyre};

    use super::ChainReader;
    use crate::data::types::EventInfo;

    /// In-memory contract state. Missing entries behave like reverted calls,
    /// except `events`, which returns an empty record like the contract does.
    #[derive(Default)]
    pub struct MockReader {
        pub events: HashMap<u64, EventInfo>,
        pub failing_events: Vec<u64>,
        pub owners: HashMap<u64, Address>,
        pub ticket_events: HashMap<u64, u64>,
        pub transfer_counts: HashMap<u64, u64>,
        pub attended: HashMap<(u64, Address), bool>,
        pub created_logs: Vec<u64>,
        pub received_logs: HashMap<Address, Vec<u64>>,
    }

    impl MockReader {
        pub fn with_event(mut self, event: EventInfo) -> Self {
            self.events.insert(event.id, event);
            self
        }

        pub fn with_ticket(mut self, token_id: u64, owner: Address, event_id: u64) -> Self {
            self.owners.insert(token_id, owner);
            self.ticket_events.insert(token_id, event_id);
            self
        }
    }

    fn empty_event(id: u64) -> EventInfo {
        EventInfo {
            id,
            name: String::new(),
            max_tickets: U256::ZERO,
            tickets_sold: U256::ZERO,
            price: U256::ZERO,
            event_date: 0,
            active: false,
            max_transfers: 0,
            organizer: Address::ZERO,
        }
    }

    impl ChainReader for MockReader {
        async fn event(&self, id: u64) -> Result<EventInfo> {
            if self.failing_events.contains(&id) {
                return Err(eyre!("execution reverted"));
            }
            Ok(self.events.get(&id).cloned().unwrap_or_else(|| empty_event(id)))
        }

        async fn owner_of(&self, token_id: u64) -> Result<Address> {
            self.owners
                .get(&token_id)
                .copied()
                .ok_or_else(|| eyre!("ERC721NonexistentToken({token_id})"))
        }

        async fn ticket_event_id(&self, token_id: u64) -> Result<u64> {
            Ok(self.ticket_events.get(&token_id).copied().unwrap_or(0))
        }

        async fn ticket_transfer_count(&self, token_id: u64) -> Result<u64> {
            self.transfer_counts
                .get(&token_id)
                .copied()
                .ok_or_else(|| eyre!("no transfer count"))
        }

        async fn token_uri(&self, token_id: u64) -> Result<String> {
            Ok(format!("ipfs://ticket-{token_id}"))
        }

        async fn has_attended(&self, event_id: u64, account: Address) -> Result<bool> {
            Ok(self
                .attended
                .get(&(event_id, account))
                .copied()
                .unwrap_or(false))
        }

        async fn created_event_ids(&self, _from_block: u64) -> Result<Vec<u64>> {
            Ok(self.created_logs.clone())
        }

        async fn received_token_ids(&self, account: Address, _from_block: u64) -> Result<Vec<u64>> {
            Ok(self.received_logs.get(&account).cloned().unwrap_or_default())
        }
    }
}
