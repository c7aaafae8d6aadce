//! `search` and `history` subcommand handlers.

use medloc_core::{directions_url, AppConfig, Coordinate, SearchQuery, SearchResult};
use uuid::Uuid;

#[derive(Debug)]
pub(crate) struct SearchRequest {
    pub query: String,
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub limit: Option<usize>,
    pub user: Option<Uuid>,
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn format_row(result: &SearchResult) -> String {
    let distance = format!("{:.1}", result.display_distance_km());
    let price = result.medicine.price.to_string();
    let open = if result.store.is_open { "yes" } else { "no" };
    format!(
        "{distance:<9}{price:<10}{:<6}{open:<6}{:<28}{}",
        result.medicine.quantity,
        truncate(&result.store.store_name, 25),
        truncate(&result.medicine.name, 40),
    )
}

/// Run one search and print the ranked results.
///
/// Waits for the history write before returning so a short-lived process
/// does not drop it.
///
/// # Errors
///
/// Returns an error if the origin is invalid, the query is rejected, or the
/// inventory query fails.
pub(crate) async fn run_search(
    pool: sqlx::PgPool,
    config: &AppConfig,
    request: SearchRequest,
) -> anyhow::Result<()> {
    let origin = Coordinate::new(request.lat, request.lng)?;
    let service = medloc_search::pg_search_service(pool, config.search_max_results);

    let query = SearchQuery {
        text: request.query,
        origin: Some(origin),
        radius_km: request.radius_km,
        limit: request.limit,
    };
    let (results, history_write) = service.search_tracked(query, request.user).await?;

    if let Err(e) = history_write.await {
        tracing::warn!(error = %e, "history task did not complete");
    }

    if results.is_empty() {
        println!(
            "no stores within {} km stock that medicine",
            request.radius_km
        );
        return Ok(());
    }

    let header = format!(
        "{:<9}{:<10}{:<6}{:<6}{:<28}MEDICINE",
        "KM", "PRICE", "QTY", "OPEN", "STORE"
    );
    println!("{header}");
    for result in &results {
        println!("{}", format_row(result));
    }

    if let Some(nearest) = results.first() {
        if let Ok(destination) = nearest.store.coordinate() {
            println!();
            println!(
                "directions to nearest: {}",
                directions_url(destination, Some(origin))
            );
        }
    }

    Ok(())
}

/// Print a user's most recent searches, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_history(
    pool: &sqlx::PgPool,
    user: Uuid,
    limit: i64,
) -> anyhow::Result<()> {
    let rows = medloc_db::list_search_history(pool, user, limit.max(1)).await?;

    if rows.is_empty() {
        println!("no searches recorded for {user}");
        return Ok(());
    }

    let header = format!("{:<22}{:<9}{:<24}QUERY", "WHEN", "RESULTS", "ORIGIN");
    println!("{header}");
    for row in &rows {
        let when = row.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let origin = format!("{:.4},{:.4}", row.latitude, row.longitude);
        println!(
            "{when:<22}{:<9}{origin:<24}{}",
            row.result_count,
            truncate(&row.query_text, 40)
        );
    }

    Ok(())
}
