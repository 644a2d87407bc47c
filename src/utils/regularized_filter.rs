use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use chrono::NaiveDate;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// A few years of corrections across the whole workforce fits well inside.
const FILTER_CAPACITY: usize = 500_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static REGULARIZED_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn key(employee_id: u64, date: NaiveDate) -> String {
    format!("{}:{}", employee_id, date)
}

/// Check if an (employee, date) pair might already carry a saved correction
/// (false positives possible)
pub fn might_have(employee_id: u64, date: NaiveDate) -> bool {
    REGULARIZED_FILTER
        .read()
        .expect("regularized filter poisoned")
        .contains(&key(employee_id, date))
}

/// Record a freshly saved correction in the filter
pub fn insert(employee_id: u64, date: NaiveDate) {
    REGULARIZED_FILTER
        .write()
        .expect("regularized filter poisoned")
        .add(&key(employee_id, date));
}

/// Authoritative check: filter fast-negative first, database on a maybe.
/// Report rows use this to flag days the UI must not offer for editing.
pub async fn is_regularized(pool: &MySqlPool, employee_id: u64, date: NaiveDate) -> bool {
    if !might_have(employee_id, date) {
        return false;
    }

    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM regularizations WHERE employee_id = ? AND date = ? LIMIT 1)",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_one(pool)
    .await
    .unwrap_or(true) // fail-safe: never offer a duplicate edit
}

/// Warm up the filter from the regularizations table using streaming + batching
pub async fn warmup_regularized_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, NaiveDate)>(
        "SELECT employee_id, date FROM regularizations",
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (employee_id, date) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(key(employee_id, date));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Regularized filter warmup complete: {} corrections", total);
    Ok(())
}

/// Insert a batch of pre-built keys
fn insert_batch(keys: &[String]) {
    let mut filter = REGULARIZED_FILTER
        .write()
        .expect("regularized filter poisoned");

    for key in keys {
        filter.add(key);
    }
}
