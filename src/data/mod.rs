pub mod chains;
pub mod contract;
pub mod export;
pub mod listing;
pub mod pipeline;
pub mod provider;
pub mod reader;
pub mod tx;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;
use color_eyre::eyre::{Report, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::data::contract::IEventTicket;
use crate::data::listing::Index;
use crate::data::provider::ChainClient;
use crate::data::reader::ChainReader;
use crate::data::tx::{TxAction, TxPhase};
use crate::data::types::EventDraft;
use crate::events::AppEvent;

type UiSender = mpsc::UnboundedSender<AppEvent>;

/// Runs contract reads and writes on the runtime and reports back to the UI
/// loop through `event_tx`.
pub struct TicketService {
    client: Arc<ChainClient>,
    index: Index,
    read_concurrency: usize,
    event_tx: UiSender,
}

impl TicketService {
    pub fn new(
        client: ChainClient,
        index: Index,
        read_concurrency: usize,
        event_tx: UiSender,
    ) -> Self {
        Self {
            client: Arc::new(client),
            index,
            read_concurrency,
            event_tx,
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.client.account()
    }

    /// Fetch the latest block number and send it as an event.
    pub fn fetch_latest_block_number(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match client.get_latest_block_number().await {
                Ok(number) => {
                    let _ = tx.send(AppEvent::LatestBlockNumber(number));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("Failed to get block number: {e}")));
                }
            }
        });
    }

    /// Fetch the connected account's balance, if an account is connected.
    pub fn fetch_balance(&self) {
        let Some(account) = self.client.account() else {
            return;
        };
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            if let Ok(balance) = client.get_balance(account).await {
                let _ = tx.send(AppEvent::BalanceLoaded(balance));
            }
        });
    }

    /// List one page of events. Each listed event is sent on its own as soon
    /// as its read resolves, tagged with `generation`.
    pub fn load_events(&self, generation: u64, page: usize) {
        let client = Arc::clone(&self.client);
        let index = self.index.clone();
        let concurrency = self.read_concurrency;
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            report_events(client.as_ref(), &index, generation, page, concurrency, &tx).await;
        });
    }

    /// Resolve every ticket owned by the connected account.
    pub fn load_tickets(&self, generation: u64) {
        let Some(account) = self.client.account() else {
            return;
        };
        let client = Arc::clone(&self.client);
        let index = self.index.clone();
        let concurrency = self.read_concurrency;
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            report_tickets(client.as_ref(), &index, account, generation, concurrency, &tx).await;
        });
    }

    /// Buy a ticket, attaching the event's unit price as value.
    pub fn mint_ticket(&self, event_id: u64, price: U256) {
        let Some(account) = self.client.account() else {
            reject(&self.event_tx, TxAction::Mint { event_id, price });
            return;
        };
        let call = IEventTicket::mintTicketCall {
            _eventId: U256::from(event_id),
            _tokenURI: format!("ipfs://ticket-{event_id}-{account}"),
        };
        self.submit(TxAction::Mint { event_id, price }, call, price);
    }

    pub fn create_event(&self, draft: EventDraft) {
        self.submit(TxAction::CreateEvent, draft.to_call(), U256::ZERO);
    }

    pub fn transfer_ticket(&self, token_id: u64, to: Address) {
        let Some(from) = self.client.account() else {
            reject(&self.event_tx, TxAction::Transfer { token_id, to });
            return;
        };
        let call = IEventTicket::transferFromCall {
            from,
            to,
            tokenId: U256::from(token_id),
        };
        self.submit(TxAction::Transfer { token_id, to }, call, U256::ZERO);
    }

    pub fn validate_ticket(&self, token_id: u64) {
        let call = IEventTicket::validateTicketCall {
            _tokenId: U256::from(token_id),
        };
        self.submit(TxAction::Validate { token_id }, call, U256::ZERO);
    }

    /// Report `Submitted` right away, then drive the write on the runtime.
    fn submit<C>(&self, action: TxAction, call: C, value: U256)
    where
        C: SolCall + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        let _ = tx.send(AppEvent::TxUpdate {
            action: action.clone(),
            phase: TxPhase::Submitted,
        });

        tokio::spawn(async move {
            info!(%action, "submitting transaction");
            let send = async {
                let pending = client.send(call, value).await?;
                let hash = *pending.tx_hash();
                let receipt = async move {
                    let receipt = pending.get_receipt().await?;
                    Ok::<bool, Report>(receipt.status())
                };
                Ok::<_, Report>((hash, receipt))
            };
            drive_write(action, send, &tx).await;
        });
    }
}

/// Stream one page of events to the UI: page bounds first, then each listed
/// event, then the completion marker.
pub(crate) async fn report_events<R: ChainReader>(
    reader: &R,
    index: &Index,
    generation: u64,
    page: usize,
    concurrency: usize,
    tx: &UiSender,
) {
    let page = match index.event_ids(reader, page).await {
        Ok(page) => page,
        Err(e) => {
            let _ = tx.send(AppEvent::Error(format!("Failed to list events: {e}")));
            let _ = tx.send(AppEvent::EventScanComplete { generation, listed: 0 });
            return;
        }
    };

    info!(
        generation,
        page = page.page,
        candidates = page.items.len(),
        "loading events"
    );
    let _ = tx.send(AppEvent::EventPageStarted {
        generation,
        page: page.page,
        has_next: page.has_next,
    });

    let listed = listing::resolve_events(reader, page.items, concurrency, |event| {
        let _ = tx.send(AppEvent::EventLoaded { generation, event });
    })
    .await;

    let _ = tx.send(AppEvent::EventScanComplete { generation, listed });
}

/// Stream every ticket owned by `account`, then the completion marker.
pub(crate) async fn report_tickets<R: ChainReader>(
    reader: &R,
    index: &Index,
    account: Address,
    generation: u64,
    concurrency: usize,
    tx: &UiSender,
) {
    let candidates = match index.ticket_ids(reader, account).await {
        Ok(ids) => ids,
        Err(e) => {
            let _ = tx.send(AppEvent::Error(format!("Failed to list tickets: {e}")));
            let _ = tx.send(AppEvent::TicketScanComplete { generation, owned: 0 });
            return;
        }
    };

    info!(generation, candidates = candidates.len(), "loading tickets");
    let owned = pipeline::resolve_tickets(reader, candidates, account, concurrency, |ticket| {
        let _ = tx.send(AppEvent::TicketLoaded { generation, ticket });
    })
    .await;

    let _ = tx.send(AppEvent::TicketScanComplete { generation, owned });
}

/// Final phase for a mined transaction, from its receipt status.
pub(crate) fn receipt_phase(hash: B256, receipt: Result<bool>) -> TxPhase {
    match receipt {
        Ok(true) => TxPhase::Confirmed(hash),
        Ok(false) => TxPhase::Failed("Transaction reverted".to_string()),
        Err(e) => TxPhase::Failed(e.to_string()),
    }
}

/// Follow a write after `Submitted`: `send` resolves to the broadcast hash
/// and a future for the receipt status.
pub(crate) async fn drive_write<S, R>(action: TxAction, send: S, tx: &UiSender)
where
    S: Future<Output = Result<(B256, R)>>,
    R: Future<Output = Result<bool>>,
{
    let (hash, receipt) = match send.await {
        Ok(sent) => sent,
        Err(e) => {
            warn!(%action, error = %e, "transaction rejected");
            let _ = tx.send(AppEvent::TxUpdate {
                action,
                phase: TxPhase::Failed(e.to_string()),
            });
            return;
        }
    };

    info!(%action, %hash, "transaction broadcast");
    let _ = tx.send(AppEvent::TxUpdate {
        action: action.clone(),
        phase: TxPhase::Confirming(hash),
    });

    let phase = receipt_phase(hash, receipt.await);
    match &phase {
        TxPhase::Confirmed(_) => info!(%action, %hash, "transaction confirmed"),
        other => warn!(%action, %hash, "{other}"),
    }
    let _ = tx.send(AppEvent::TxUpdate { action, phase });
}

/// A write asked for without an account: fail it through the usual
/// lifecycle so the page shows why.
pub(crate) fn reject(tx: &UiSender, action: TxAction) {
    let _ = tx.send(AppEvent::TxUpdate {
        action: action.clone(),
        phase: TxPhase::Submitted,
    });
    let _ = tx.send(AppEvent::TxUpdate {
        action,
        phase: TxPhase::Failed("Connect a wallet first".to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::listing::IndexMode;
    use crate::data::reader::mock::MockReader;
    use crate::data::types::sample_event;
    use color_eyre::eyre::eyre;
    use futures::future::{Ready, ready};

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    fn phases(events: Vec<AppEvent>) -> Vec<TxPhase> {
        events
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::TxUpdate { phase, .. } => Some(phase),
                _ => None,
            })
            .collect()
    }

    fn index(mode: IndexMode) -> Index {
        Index {
            mode,
            event_scan_limit: 5,
            ticket_scan_limit: 10,
            from_block: 0,
            page_size: 10,
        }
    }

    fn me() -> Address {
        Address::repeat_byte(0xaa)
    }

    #[test]
    fn test_receipt_phase() {
        let hash = B256::repeat_byte(1);
        assert_eq!(receipt_phase(hash, Ok(true)), TxPhase::Confirmed(hash));
        assert_eq!(
            receipt_phase(hash, Ok(false)),
            TxPhase::Failed("Transaction reverted".to_string())
        );
        assert_eq!(
            receipt_phase(hash, Err(eyre!("timed out"))),
            TxPhase::Failed("timed out".to_string())
        );
    }

    #[tokio::test]
    async fn test_confirmed_write() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let hash = B256::repeat_byte(7);
        let send = ready(Ok::<_, Report>((hash, ready(Ok::<bool, Report>(true)))));
        drive_write(TxAction::Validate { token_id: 3 }, send, &tx).await;

        assert_eq!(
            phases(drain(&mut rx)),
            vec![TxPhase::Confirming(hash), TxPhase::Confirmed(hash)]
        );
    }

    #[tokio::test]
    async fn test_reverted_write() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let hash = B256::repeat_byte(7);
        let send = ready(Ok::<_, Report>((hash, ready(Ok::<bool, Report>(false)))));
        drive_write(TxAction::CreateEvent, send, &tx).await;

        assert_eq!(
            phases(drain(&mut rx)),
            vec![
                TxPhase::Confirming(hash),
                TxPhase::Failed("Transaction reverted".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_send_has_no_hash() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let send = ready(Err::<(B256, Ready<Result<bool>>), Report>(eyre!(
            "insufficient funds"
        )));
        drive_write(TxAction::Validate { token_id: 3 }, send, &tx).await;

        assert_eq!(
            phases(drain(&mut rx)),
            vec![TxPhase::Failed("insufficient funds".to_string())]
        );
    }

    #[test]
    fn test_reject_without_account() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let action = TxAction::Mint {
            event_id: 1,
            price: U256::from(10u64),
        };
        reject(&tx, action.clone());

        let events = drain(&mut rx);
        assert!(events.iter().all(|e| matches!(
            e,
            AppEvent::TxUpdate { action: a, .. } if *a == action
        )));
        assert_eq!(
            phases(events),
            vec![
                TxPhase::Submitted,
                TxPhase::Failed("Connect a wallet first".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_event_page_sequence() {
        let reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_event(sample_event(3, "Meetup", 10, 2, true));
        let (tx, mut rx) = mpsc::unbounded_channel();
        report_events(&reader, &index(IndexMode::Scan), 4, 0, 2, &tx).await;

        let events = drain(&mut rx);
        assert!(matches!(
            events.first(),
            Some(AppEvent::EventPageStarted {
                generation: 4,
                page: 0,
                has_next: false
            })
        ));
        let mut ids: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                AppEvent::EventLoaded { generation: 4, event } => Some(event.id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
        assert!(matches!(
            events.last(),
            Some(AppEvent::EventScanComplete {
                generation: 4,
                listed: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_ticket_sequence() {
        let reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_ticket(2, me(), 1)
            .with_ticket(6, Address::repeat_byte(0x42), 1);
        let (tx, mut rx) = mpsc::unbounded_channel();
        report_tickets(&reader, &index(IndexMode::Scan), me(), 9, 4, &tx).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            AppEvent::TicketLoaded { generation: 9, ticket } if ticket.token_id == 2
        ));
        assert!(matches!(
            events[1],
            AppEvent::TicketScanComplete {
                generation: 9,
                owned: 1
            }
        ));
    }
}
