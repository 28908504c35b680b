//! Shared utility functions

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
///
/// Collisions are possible in principle; callers insert under a primary
/// key and regenerate on conflict.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Generate an order-number candidate: 10-digit UTC seconds timestamp
/// followed by 4 random digits.
///
/// Candidates are NOT guaranteed unique — two creations in the same second
/// can draw the same suffix. Callers must insert under a UNIQUE constraint
/// and regenerate on collision.
pub fn order_number_candidate() -> String {
    use rand::Rng;
    let timestamp = chrono::Utc::now().timestamp();
    let random_num: u32 = rand::thread_rng().gen_range(1000..10000);
    format!("{timestamp}{random_num}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_id_positive() {
        let id = snowflake_id();
        assert!(id > 0);
    }

    #[test]
    fn test_snowflake_id_ordered_across_millis() {
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = snowflake_id();
        assert!(b > a);
    }

    #[test]
    fn test_order_number_candidate_format() {
        let number = order_number_candidate();
        // 10-digit seconds timestamp + 4-digit random suffix
        assert_eq!(number.len(), 14);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_order_number_candidate_suffix_range() {
        for _ in 0..100 {
            let number = order_number_candidate();
            let suffix: u32 = number[10..].parse().unwrap();
            assert!((1000..10000).contains(&suffix));
        }
    }
}
