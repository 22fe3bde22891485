use alloy::primitives::Address;
use futures::StreamExt;
use thiserror::Error;
use tracing::debug;

use crate::data::reader::ChainReader;
use crate::data::types::OwnedTicket;

/// Why a ticket candidate was not rendered. Each variant names the step that
/// stopped the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Skip {
    #[error("ownerOf({token_id}) failed: {reason}")]
    OwnerUnavailable { token_id: u64, reason: String },
    #[error("ticket {token_id} is owned by {owner}")]
    NotOwned { token_id: u64, owner: Address },
    #[error("ticketEventId({token_id}) failed: {reason}")]
    EventIdUnavailable { token_id: u64, reason: String },
    #[error("ticket {token_id} is not linked to an event")]
    NoEvent { token_id: u64 },
    #[error("events({event_id}) for ticket {token_id} failed: {reason}")]
    EventUnavailable {
        token_id: u64,
        event_id: u64,
        reason: String,
    },
}

/// Resolve one ticket for `account`: owner, then event id, then the event
/// record. Transfer count, attendance and metadata URI are fetched last and
/// are optional.
pub async fn resolve_ticket<R: ChainReader>(
    reader: &R,
    token_id: u64,
    account: Address,
) -> Result<OwnedTicket, Skip> {
    let owner = reader
        .owner_of(token_id)
        .await
        .map_err(|e| Skip::OwnerUnavailable {
            token_id,
            reason: e.to_string(),
        })?;
    // Address equality is on bytes, so hex case never matters.
    if owner != account {
        return Err(Skip::NotOwned { token_id, owner });
    }

    let event_id = reader
        .ticket_event_id(token_id)
        .await
        .map_err(|e| Skip::EventIdUnavailable {
            token_id,
            reason: e.to_string(),
        })?;
    if event_id == 0 {
        return Err(Skip::NoEvent { token_id });
    }

    let event = reader
        .event(event_id)
        .await
        .map_err(|e| Skip::EventUnavailable {
            token_id,
            event_id,
            reason: e.to_string(),
        })?;

    let (transfer_count, attended, token_uri) = tokio::join!(
        reader.ticket_transfer_count(token_id),
        reader.has_attended(event_id, account),
        reader.token_uri(token_id),
    );

    Ok(OwnedTicket {
        token_id,
        owner,
        event,
        transfer_count: transfer_count.ok(),
        attended: attended.ok(),
        token_uri: token_uri.ok(),
    })
}

/// Run the pipeline for every candidate, handing owned tickets to
/// `on_ticket` as they resolve. Returns the number of owned tickets.
pub async fn resolve_tickets<R, F>(
    reader: &R,
    candidates: Vec<u64>,
    account: Address,
    concurrency: usize,
    mut on_ticket: F,
) -> usize
where
    R: ChainReader,
    F: FnMut(OwnedTicket),
{
    let mut reads = futures::stream::iter(candidates)
        .map(|token_id| resolve_ticket(reader, token_id, account))
        .buffer_unordered(concurrency.max(1));

    let mut owned = 0;
    while let Some(result) = reads.next().await {
        match result {
            Ok(ticket) => {
                owned += 1;
                on_ticket(ticket);
            }
            Err(skip @ Skip::NotOwned { .. }) => debug!("{skip}"),
            Err(skip) => debug!(reason = %skip, "ticket skipped"),
        }
    }
    owned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reader::mock::MockReader;
    use crate::data::types::sample_event;

    fn me() -> Address {
        "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap()
    }

    fn someone_else() -> Address {
        Address::repeat_byte(0x42)
    }

    #[tokio::test]
    async fn test_owned_ticket_resolves() {
        let mut reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_ticket(3, me(), 1);
        reader.transfer_counts.insert(3, 1);
        reader.attended.insert((1, me()), true);

        let ticket = resolve_ticket(&reader, 3, me()).await.unwrap();
        assert_eq!(ticket.token_id, 3);
        assert_eq!(ticket.event.name, "Conf");
        assert_eq!(ticket.transfer_count, Some(1));
        assert_eq!(ticket.attended, Some(true));
        assert_eq!(ticket.token_uri.as_deref(), Some("ipfs://ticket-3"));
    }

    #[tokio::test]
    async fn test_lowercase_account_matches() {
        let reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_ticket(3, me(), 1);
        let lowercase: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
        assert!(resolve_ticket(&reader, 3, lowercase).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_ticket_skipped() {
        let reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_ticket(5, someone_else(), 1);
        let skip = resolve_ticket(&reader, 5, me()).await.unwrap_err();
        assert_eq!(
            skip,
            Skip::NotOwned {
                token_id: 5,
                owner: someone_else()
            }
        );
    }

    #[tokio::test]
    async fn test_unminted_ticket_short_circuits() {
        let reader = MockReader::default();
        let skip = resolve_ticket(&reader, 9, me()).await.unwrap_err();
        assert!(matches!(skip, Skip::OwnerUnavailable { token_id: 9, .. }));
    }

    #[tokio::test]
    async fn test_missing_event_link() {
        let mut reader = MockReader::default();
        reader.owners.insert(2, me());
        let skip = resolve_ticket(&reader, 2, me()).await.unwrap_err();
        assert_eq!(skip, Skip::NoEvent { token_id: 2 });
    }

    #[tokio::test]
    async fn test_event_read_failure() {
        let mut reader = MockReader::default().with_ticket(2, me(), 8);
        reader.failing_events.push(8);
        let skip = resolve_ticket(&reader, 2, me()).await.unwrap_err();
        assert!(matches!(
            skip,
            Skip::EventUnavailable {
                token_id: 2,
                event_id: 8,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_enrichment_is_optional() {
        let reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_ticket(3, me(), 1);
        let ticket = resolve_ticket(&reader, 3, me()).await.unwrap();
        assert_eq!(ticket.transfer_count, None);
        assert_eq!(ticket.attended, Some(false));
    }

    #[tokio::test]
    async fn test_resolve_tickets_keeps_only_owned() {
        let reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_ticket(1, me(), 1)
            .with_ticket(4, me(), 1)
            .with_ticket(5, someone_else(), 1);

        let mut seen = Vec::new();
        let owned = resolve_tickets(&reader, (1..=50).collect(), me(), 8, |t| {
            seen.push(t.token_id)
        })
        .await;
        seen.sort_unstable();

        assert_eq!(owned, 2);
        assert_eq!(seen, vec![1, 4]);
    }
}
