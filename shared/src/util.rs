/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: per-millisecond sequence (4096 values per ms)
///
/// The sequence of each new millisecond starts at a random offset below 2048,
/// so a record count can't be inferred from ids. Within one process ids are
/// strictly increasing and never repeat; a burst of more than the remaining
/// sequence space borrows from the next millisecond.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    use std::sync::atomic::{AtomicI64, Ordering};

    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    static LAST_ID: AtomicI64 = AtomicI64::new(0);

    let ts = (now_millis() - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let fresh = (ts << 12) | rand::thread_rng().gen_range(0..0x800);
    let prev = LAST_ID
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(if last >> 12 >= ts { last + 1 } else { fresh })
        })
        .unwrap_or_else(|last| last);
    if prev >> 12 >= ts { prev + 1 } else { fresh }
}

/// Generate an unguessable table access token (UUID v4, hyphenated)
pub fn access_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_fits_js_safe_integer() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn snowflake_ids_never_repeat_in_a_burst() {
        let ids: Vec<i64> = (0..5000).map(|_| snowflake_id()).collect();
        let unique: std::collections::HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn snowflake_ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..1000).map(|_| snowflake_id()).collect::<Vec<_>>()))
            .collect();
        let mut all = std::collections::HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id), "duplicate id {id}");
            }
        }
    }

    #[test]
    fn access_tokens_are_unique_uuids() {
        let a = access_token();
        let b = access_token();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
