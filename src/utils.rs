use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, NaiveDateTime};

/// Truncate a B256 hash to "0xabcd...ef12" format
pub fn truncate_hash(hash: &B256) -> String {
    let s = format!("{hash}");
    if s.len() > 14 {
        format!("{}...{}", &s[..8], &s[s.len() - 4..])
    } else {
        s
    }
}

/// Truncate an address to "0xabcd...ef12" format
pub fn truncate_address(addr: &Address) -> String {
    let s = format!("{addr}");
    if s.len() > 14 {
        format!("{}...{}", &s[..8], &s[s.len() - 4..])
    } else {
        s
    }
}

/// Format wei as ether the way viem's `formatEther` does: no trailing zeros,
/// no decimal point for whole amounts.
pub fn format_ether(wei: U256) -> String {
    format_units(wei, 18)
}

/// Format a wei value as "<ether> ETH"
pub fn format_eth(wei: U256) -> String {
    format!("{} ETH", format_ether(wei))
}

pub fn format_units(value: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return format!("{whole}");
    }

    let padded = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    format!("{whole}.{}", padded.trim_end_matches('0'))
}

/// Format a number with comma separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a Unix timestamp as "Jan 01, 2025 · 18:00 UTC"
pub fn format_event_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%b %d, %Y \u{00b7} %H:%M UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Parse "YYYY-MM-DD HH:MM" (or the `T`-separated form) as UTC epoch seconds.
pub fn parse_event_date(input: &str) -> Option<u64> {
    let input = input.trim();
    let parsed = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .ok()?;
    u64::try_from(parsed.and_utc().timestamp()).ok()
}

/// Parse a 0x-prefixed 20-byte address, in any hex case.
pub fn parse_address(input: &str) -> Option<Address> {
    let input = input.trim();
    if !input.starts_with("0x") || input.len() != 42 {
        return None;
    }
    input.parse::<Address>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_eth_fraction() {
        let wei = U256::from(100_000_000_000_000_000u64);
        assert_eq!(format_eth(wei), "0.1 ETH");
    }

    #[test]
    fn test_format_ether_whole_and_zero() {
        assert_eq!(format_ether(U256::ZERO), "0");
        assert_eq!(format_ether(U256::from(2_000_000_000_000_000_000u64)), "2");
    }

    #[test]
    fn test_format_ether_full_precision() {
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(
            format_ether(U256::from(1_234_500_000_000_000_000u64)),
            "1.2345"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(11_155_111), "11,155,111");
    }

    #[test]
    fn test_truncate_address() {
        let addr: Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        let short = truncate_address(&addr);
        assert!(short.starts_with("0x"));
        assert!(short.contains("..."));
        assert_eq!(short.len(), 15);
    }

    #[test]
    fn test_parse_event_date() {
        assert_eq!(parse_event_date("2025-01-01 00:00"), Some(1_735_689_600));
        assert_eq!(parse_event_date("2025-01-01T00:00"), Some(1_735_689_600));
        assert_eq!(parse_event_date(" 2025-01-01 01:30 "), Some(1_735_695_000));
    }

    #[test]
    fn test_parse_event_date_invalid() {
        assert!(parse_event_date("").is_none());
        assert!(parse_event_date("tomorrow").is_none());
        assert!(parse_event_date("2025-13-01 00:00").is_none());
    }

    #[test]
    fn test_format_event_date() {
        assert_eq!(format_event_date(1_735_689_600), "Jan 01, 2025 \u{00b7} 00:00 UTC");
        assert_eq!(format_event_date(u64::MAX), "Unknown");
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_some());
        assert_eq!(
            parse_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
            parse_address("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045")
        );
        assert!(parse_address("d8da6bf26964af9d7eed9e03e53415d37aa96045").is_none());
        assert!(parse_address("0x1234").is_none());
        assert!(parse_address("0xZZdA6BF26964aF9D7eEd9e03E53415D37aA96045").is_none());
    }
}
