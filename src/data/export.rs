use std::fs;

use crate::data::types::{EventInfo, OwnedTicket, TicketRecord};
use crate::utils;

/// Export listed events to CSV format.
///
/// Columns: id, name, date, sold, capacity, price_wei, price_eth, max_transfers, organizer
pub fn export_events_csv(events: &[EventInfo], path: &str) -> Result<String, String> {
    let file = fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "id",
        "name",
        "date",
        "sold",
        "capacity",
        "price_wei",
        "price_eth",
        "max_transfers",
        "organizer",
    ])
    .map_err(|e| format!("Failed to write CSV header: {e}"))?;

    for event in events {
        wtr.write_record(&[
            event.id.to_string(),
            event.name.clone(),
            event.event_date.to_string(),
            event.tickets_sold.to_string(),
            event.max_tickets.to_string(),
            event.price.to_string(),
            utils::format_ether(event.price),
            event.max_transfers.to_string(),
            format!("{:#x}", event.organizer),
        ])
        .map_err(|e| format!("Failed to write CSV row: {e}"))?;
    }

    wtr.flush().map_err(|e| format!("Failed to flush CSV: {e}"))?;

    Ok(format!("Exported {} events to {path}", events.len()))
}

/// Export owned tickets to JSON format.
pub fn export_tickets_json(tickets: &[OwnedTicket], path: &str) -> Result<String, String> {
    let records: Vec<TicketRecord> = tickets.iter().map(TicketRecord::from).collect();
    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| format!("Failed to serialize tickets: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write file: {e}"))?;
    Ok(format!("Exported {} tickets to {path}", tickets.len()))
}

/// Default export filename with a timestamp, e.g. `events_20250101_120000.csv`.
pub fn default_filename(prefix: &str, extension: &str) -> String {
    let now = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{prefix}_{now}.{extension}")
}
