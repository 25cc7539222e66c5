use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use super::email_filter::normalize;

const CACHE_CAPACITY: u64 = 500_000;
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Emails known to be taken. Only positives are stored.
pub static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(CACHE_TTL)
        .build()
});

pub async fn mark_taken(email: &str) {
    EMAIL_CACHE.insert(normalize(email), true).await;
}

/// `false` means "ask the database", not "free".
pub async fn is_taken(email: &str) -> bool {
    EMAIL_CACHE.get(&normalize(email)).await.unwrap_or(false)
}

async fn batch_mark(emails: &[String]) {
    let futures: Vec<_> = emails
        .iter()
        .map(|e| EMAIL_CACHE.insert(normalize(e), true))
        .collect();

    futures::future::join_all(futures).await;
}

/// Preloads users who logged in within the last `days` days.
pub async fn warmup_email_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT email
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (email,) = row?;
        batch.push(email);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    tracing::info!(total_count, days, "Email cache warmup complete");

    Ok(())
}
