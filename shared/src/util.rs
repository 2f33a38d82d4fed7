/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Next sequential id for a collection keyed by a numeric `id` (max + 1, 1 when empty)
pub fn next_sequential_id<I>(ids: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    ids.into_iter().max().unwrap_or(0).max(0) + 1
}
