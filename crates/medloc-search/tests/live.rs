//! End-to-end search against a migrated Postgres database.

use medloc_core::{Coordinate, MedicineSeed, SearchQuery, StoreSeed};
use medloc_search::{pg_search_service, SearchError};
use rust_decimal::Decimal;
use uuid::Uuid;

fn store(name: &str, lng: f64, price: i64, quantity: i32) -> StoreSeed {
    StoreSeed {
        store_name: name.to_string(),
        address: format!("{name} Road"),
        latitude: 0.0,
        longitude: lng,
        phone: "080 1234".to_string(),
        is_open: true,
        medicines: vec![MedicineSeed {
            name: "Cetirizine 10mg".to_string(),
            generic_name: Some("Cetirizine".to_string()),
            price: Decimal::new(price, 0),
            quantity,
            image_url: None,
        }],
    }
}

fn query(text: &str, radius_km: f64) -> SearchQuery {
    SearchQuery {
        text: text.to_string(),
        origin: Some(Coordinate::new(0.0, 0.0).expect("origin")),
        radius_km,
        limit: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn postgres_search_ranks_and_records(pool: sqlx::PgPool) {
    medloc_db::seed_inventory(
        &pool,
        &[
            store("Corner Chemist", 0.02, 40, 3),
            store("Highway Meds", 0.08, 35, 9),
            store("Empty Shelf", 0.01, 10, 0),
            store("Other Town", 1.5, 5, 9),
        ],
    )
    .await
    .expect("seed");

    let service = pg_search_service(pool.clone(), 50);
    let user = Uuid::new_v4();

    let (results, write) = service
        .search_tracked(query("cetirizine", 10.0), Some(user))
        .await
        .expect("search");
    write.await.expect("history task");

    let stores: Vec<&str> = results.iter().map(|r| r.store.store_name.as_str()).collect();
    assert_eq!(stores, ["Corner Chemist", "Highway Meds"]);
    assert!(results.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

    let history = medloc_db::list_search_history(&pool, user, 10)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].result_count, 2);
    assert_eq!(history[0].query_text, "cetirizine");
}

#[sqlx::test(migrations = "../../migrations")]
async fn closed_pool_surfaces_backend_unavailable(pool: sqlx::PgPool) {
    let service = pg_search_service(pool.clone(), 50);
    pool.close().await;

    let err = service
        .search(query("cetirizine", 10.0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::BackendUnavailable(_)), "got {err:?}");
}
