use crate::error::StoreError;
use crate::store::{CounterStore, VISITS_KEY};

/// Lenient integer parse of the stored total.
///
/// Accepts leading whitespace, an optional sign and a run of digits, ignoring
/// anything after them. Missing values, values with no digits, negative
/// values and values that overflow all read as zero.
pub fn parse_stored_visits(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };

    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return 0;
    }

    let digits = &rest[..digits_len];
    if negative {
        // "-0" is still zero, everything else is corrupt
        return 0;
    }

    digits.parse::<u64>().unwrap_or(0)
}

pub async fn read_total(store: &dyn CounterStore) -> Result<u64, StoreError> {
    let current = store.get(VISITS_KEY).await?;
    Ok(parse_stored_visits(current.as_deref()))
}

/// Adds one to the stored total and returns the new value.
///
/// Read-modify-write without coordination: two concurrent callers can read
/// the same value and both write `n + 1`. The total never goes down and never
/// exceeds the number of completed writes.
pub async fn increment_total(store: &dyn CounterStore) -> Result<u64, StoreError> {
    let next = read_total(store).await?.saturating_add(1);
    store.put(VISITS_KEY, &next.to_string(), None).await?;
    Ok(next)
}
