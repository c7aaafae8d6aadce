//! Offline unit tests for medloc-db pool configuration and row types.
//! These tests do not require a live database connection.

use medloc_core::{AppConfig, Candidate, Environment};
use medloc_db::{CandidateRow, PoolConfig, SearchHistoryRow};
use rust_decimal::Decimal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        search_default_radius_km: 10.0,
        search_max_results: 50,
        rate_limit_per_minute: 120,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`SearchHistoryRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn search_history_row_has_expected_fields() {
    let row = SearchHistoryRow {
        public_id: Uuid::new_v4(),
        user_id: None,
        query_text: "paracetamol".to_string(),
        latitude: 12.97,
        longitude: 77.59,
        result_count: 3_i32,
        created_at: chrono::Utc::now(),
    };

    assert!(row.user_id.is_none());
    assert_eq!(row.query_text, "paracetamol");
    assert_eq!(row.result_count, 3);
}

#[test]
fn candidate_row_keeps_out_of_stock_quantity_for_ranker_to_drop() {
    let row = CandidateRow {
        medicine_id: Uuid::new_v4(),
        medicine_name: "Insulin".to_string(),
        generic_name: None,
        price: Decimal::new(100, 0),
        quantity: 0,
        image_url: None,
        store_id: Uuid::new_v4(),
        store_name: "Night Pharmacy".to_string(),
        address: "1 Main".to_string(),
        latitude: 0.0,
        longitude: 0.0,
        phone: String::new(),
        is_open: false,
    };

    let candidate = Candidate::from(row);
    assert!(!candidate.medicine.in_stock());
    assert!(!candidate.store.is_open);
}
