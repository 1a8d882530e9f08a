use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

pub type CorrelationId = u64;

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a fresh correlation id for an inbound call that did not supply
/// one itself.
pub fn next_correlation_id() -> CorrelationId {
    // Try to use system time as the base
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    // Always increment the counter to ensure uniqueness
    let counter = CORRELATION_COUNTER.fetch_add(1, Ordering::SeqCst);

    // Upper 32 bits from the timestamp, lower 32 bits from the counter
    (timestamp & 0xFFFFFFFF00000000) | (counter & 0xFFFFFFFF)
}

/// Renders a correlation id the way it appears in payloads and span fields.
pub fn format_correlation_id(id: CorrelationId) -> String {
    format!("{id:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<CorrelationId> = (0..10_000).map(|_| next_correlation_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_format_is_fixed_width_hex() {
        let rendered = format_correlation_id(0xAB);
        assert_eq!(rendered.len(), 16);
        assert_eq!(rendered, "00000000000000ab");
    }
}
