use alloy::primitives::Address;
use clap::ValueEnum;
use color_eyre::eyre::Result;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::data::reader::ChainReader;
use crate::data::types::{EventInfo, Page};

/// Where listing candidates come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexMode {
    /// Read a fixed id range.
    Scan,
    /// Read ids from the contract's emitted logs.
    Logs,
}

/// Paginated listing of event ids and ticket candidates.
#[derive(Debug, Clone)]
pub struct Index {
    pub mode: IndexMode,
    pub event_scan_limit: u64,
    pub ticket_scan_limit: u64,
    pub from_block: u64,
    pub page_size: usize,
}

impl Index {
    /// Candidate event ids for page `page` (zero-based), ascending.
    pub async fn event_ids<R: ChainReader>(&self, reader: &R, page: usize) -> Result<Page<u64>> {
        let ids = match self.mode {
            IndexMode::Scan => (1..=self.event_scan_limit).collect(),
            IndexMode::Logs => reader.created_event_ids(self.from_block).await?,
        };
        Ok(paginate(&ids, page, self.page_size))
    }

    /// Every token id that might belong to `account`. Ownership still has
    /// to be confirmed with `ownerOf`, since logs include tickets that were
    /// later transferred away.
    pub async fn ticket_ids<R: ChainReader>(&self, reader: &R, account: Address) -> Result<Vec<u64>> {
        match self.mode {
            IndexMode::Scan => Ok((1..=self.ticket_scan_limit).collect()),
            IndexMode::Logs => reader.received_token_ids(account, self.from_block).await,
        }
    }
}

pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        page,
        has_next: end < items.len(),
    }
}

/// Fetch `events(id)` for every candidate with at most `concurrency` reads
/// in flight, handing each listed event to `on_event` as soon as its read
/// resolves. Returns the number of listed events.
pub async fn resolve_events<R, F>(
    reader: &R,
    ids: Vec<u64>,
    concurrency: usize,
    mut on_event: F,
) -> usize
where
    R: ChainReader,
    F: FnMut(EventInfo),
{
    let mut reads = futures::stream::iter(ids)
        .map(|id| async move { (id, reader.event(id).await) })
        .buffer_unordered(concurrency.max(1));

    let mut listed = 0;
    while let Some((id, result)) = reads.next().await {
        match result {
            Ok(event) if event.is_listed() => {
                listed += 1;
                on_event(event);
            }
            Ok(event) if event.exists() => {
                warn!(
                    event_id = id,
                    sold = %event.tickets_sold,
                    capacity = %event.max_tickets,
                    "skipping event with more tickets sold than capacity"
                );
            }
            Ok(_) => debug!(event_id = id, "no active event"),
            Err(e) => debug!(event_id = id, error = %e, "event read failed"),
        }
    }
    listed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reader::mock::MockReader;
    use crate::data::types::sample_event;

    fn scan_index(page_size: usize) -> Index {
        Index {
            mode: IndexMode::Scan,
            event_scan_limit: 20,
            ticket_scan_limit: 50,
            from_block: 0,
            page_size,
        }
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u64> = (1..=25).collect();
        let first = paginate(&items, 0, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert!(first.has_next);

        let last = paginate(&items, 2, 10);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert!(!last.has_next);

        let past_end = paginate(&items, 5, 10);
        assert!(past_end.items.is_empty());
        assert!(!past_end.has_next);
    }

    #[test]
    fn test_paginate_zero_page_size() {
        let items = vec![1u64, 2];
        let page = paginate(&items, 0, 0);
        assert_eq!(page.items, vec![1]);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn test_scan_event_ids_capped() {
        let reader = MockReader::default();
        let index = scan_index(15);
        let second = index.event_ids(&reader, 1).await.unwrap();
        assert_eq!(second.items, (16..=20).collect::<Vec<_>>());
        assert!(!second.has_next);
    }

    #[tokio::test]
    async fn test_log_event_ids() {
        let reader = MockReader {
            created_logs: vec![3, 7, 42],
            ..Default::default()
        };
        let index = Index {
            mode: IndexMode::Logs,
            ..scan_index(2)
        };
        let first = index.event_ids(&reader, 0).await.unwrap();
        assert_eq!(first.items, vec![3, 7]);
        assert!(first.has_next);
        // ids beyond the old scan ceiling are reachable
        let second = index.event_ids(&reader, 1).await.unwrap();
        assert_eq!(second.items, vec![42]);
    }

    #[tokio::test]
    async fn test_ticket_ids_by_mode() {
        let account = Address::repeat_byte(0xaa);
        let mut reader = MockReader::default();
        reader.received_logs.insert(account, vec![4, 9]);

        let scan = scan_index(10);
        assert_eq!(scan.ticket_ids(&reader, account).await.unwrap().len(), 50);

        let logs = Index {
            mode: IndexMode::Logs,
            ..scan_index(10)
        };
        assert_eq!(logs.ticket_ids(&reader, account).await.unwrap(), vec![4, 9]);
    }

    #[tokio::test]
    async fn test_resolve_events_filters() {
        let mut reader = MockReader::default()
            .with_event(sample_event(1, "Conf", 100, 10, true))
            .with_event(sample_event(2, "", 100, 0, true))
            .with_event(sample_event(3, "Closed", 100, 0, false))
            .with_event(sample_event(4, "Oversold", 10, 12, true))
            .with_event(sample_event(5, "Meetup", 50, 50, true));
        reader.failing_events.push(6);

        let mut seen = Vec::new();
        let listed = resolve_events(&reader, (1..=8).collect(), 3, |event| seen.push(event.id)).await;
        seen.sort_unstable();

        assert_eq!(listed, 2);
        assert_eq!(seen, vec![1, 5]);
    }
}
