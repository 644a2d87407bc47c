use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// Directory fields the report layer attaches to each derived row.
#[derive(Debug, Clone)]
pub struct EmployeeProfile {
    pub name: String,
    pub department: String,
    pub job_title: String,
}

/// employee_id => profile. Reports hit this once per row, so keep the whole
/// active directory resident.
pub static DIRECTORY_CACHE: Lazy<Cache<u64, EmployeeProfile>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(3600)) // directory edits show up within the hour
        .build()
});

type ProfileRow = (u64, String, String, String, String);

fn profile_from_row((_, first, last, department, job_title): &ProfileRow) -> EmployeeProfile {
    EmployeeProfile {
        name: format!("{} {}", first, last),
        department: department.clone(),
        job_title: job_title.clone(),
    }
}

/// Look up a profile, filling the cache from the directory table on a miss.
/// `None` means the employee is not in the directory; report rows for such
/// ids are excluded rather than half-filled.
pub async fn get_profile(pool: &MySqlPool, employee_id: u64) -> Option<EmployeeProfile> {
    if let Some(profile) = DIRECTORY_CACHE.get(&employee_id).await {
        return Some(profile);
    }

    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT id, first_name, last_name, department, job_title
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await
    .unwrap_or(None); // lookup failure degrades to a directory miss

    let profile = profile_from_row(&row?);
    DIRECTORY_CACHE.insert(employee_id, profile.clone()).await;
    Some(profile)
}

/// Drop a cached entry after a directory edit or delete.
pub async fn invalidate(employee_id: u64) {
    DIRECTORY_CACHE.invalidate(&employee_id).await;
}

/// Load the active directory into the cache at startup (batched)
pub async fn warmup_directory_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT id, first_name, last_name, department, job_title
        FROM employees
        WHERE status = 'active'
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let row = row?;
        batch.push(row);
        total_count += 1;

        if batch.len() >= batch_size {
            insert_batch(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch).await;
    }

    log::info!("Directory cache warmup complete: {} employees", total_count);

    Ok(())
}

async fn insert_batch(rows: &[ProfileRow]) {
    let futures: Vec<_> = rows
        .iter()
        .map(|row| DIRECTORY_CACHE.insert(row.0, profile_from_row(row)))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}
