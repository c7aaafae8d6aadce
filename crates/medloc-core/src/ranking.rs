//! Radius filtering, deduplication, and ordering of search candidates.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::geo::{distance_km, Coordinate};
use crate::types::{Candidate, SearchResult};

/// Turn raw candidates into an ordered, deduplicated result list.
///
/// - candidates farther than `radius_km` are dropped (the boundary itself is kept)
/// - out-of-stock listings and stores with unusable coordinates are dropped
/// - one result per `(store_id, medicine_id)`, keeping the lower price and the
///   first-seen listing when prices tie
/// - ordered by distance, then price, then store name, with medicine name and
///   ids as final tie-breakers
/// - `limit` truncates only after the full set has been ordered
#[must_use]
pub fn rank<I>(
    candidates: I,
    origin: Coordinate,
    radius_km: f64,
    limit: Option<usize>,
) -> Vec<SearchResult>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut results: Vec<SearchResult> = Vec::new();
    let mut seen: HashMap<(Uuid, Uuid), usize> = HashMap::new();

    for Candidate { medicine, store } in candidates {
        if !medicine.in_stock() {
            continue;
        }
        let Ok(store_point) = store.coordinate() else {
            continue;
        };
        let distance = distance_km(origin, store_point);
        if distance > radius_km {
            continue;
        }

        let key = (store.id, medicine.id);
        match seen.get(&key) {
            Some(&idx) => {
                if medicine.price < results[idx].medicine.price {
                    results[idx] = SearchResult {
                        medicine,
                        store,
                        distance_km: distance,
                    };
                }
            }
            None => {
                seen.insert(key, results.len());
                results.push(SearchResult {
                    medicine,
                    store,
                    distance_km: distance,
                });
            }
        }
    }

    results.sort_by(compare_results);

    if let Some(limit) = limit {
        results.truncate(limit);
    }
    results
}

fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.medicine.price.cmp(&b.medicine.price))
        .then_with(|| a.store.store_name.cmp(&b.store.store_name))
        .then_with(|| a.medicine.name.cmp(&b.medicine.name))
        .then_with(|| a.store.id.cmp(&b.store.id))
        .then_with(|| a.medicine.id.cmp(&b.medicine.id))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{MedicineRecord, StoreRecord};

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0).unwrap()
    }

    fn store(id: u128, name: &str, lat: f64, lng: f64) -> StoreRecord {
        StoreRecord {
            id: Uuid::from_u128(id),
            store_name: name.to_string(),
            address: format!("{name} street"),
            latitude: lat,
            longitude: lng,
            phone: "+1-555-0100".to_string(),
            is_open: true,
        }
    }

    fn medicine(id: u128, store: &StoreRecord, name: &str, price: i64, quantity: i32) -> MedicineRecord {
        MedicineRecord {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            generic_name: None,
            price: Decimal::new(price, 0),
            quantity,
            image_url: None,
            store_id: store.id,
        }
    }

    fn candidate(medicine: MedicineRecord, store: StoreRecord) -> Candidate {
        Candidate { medicine, store }
    }

    fn assert_ordered(results: &[SearchResult]) {
        for pair in results.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.distance_km <= b.distance_km, "distance out of order");
            if (a.distance_km - b.distance_km).abs() < f64::EPSILON {
                assert!(a.medicine.price <= b.medicine.price, "price out of order");
                if a.medicine.price == b.medicine.price {
                    assert!(a.store.store_name <= b.store.store_name, "name out of order");
                }
            }
        }
    }

    #[test]
    fn only_stores_inside_radius_survive() {
        let near = store(1, "Near", 0.0, 0.0);
        let far = store(2, "Far", 0.0, 1.0);
        let candidates = vec![
            candidate(medicine(10, &near, "Paracetamol", 5, 3), near.clone()),
            candidate(medicine(11, &far, "Paracetamol", 4, 3), far.clone()),
        ];

        let results = rank(candidates, origin(), 50.0, None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].store.id, near.id);
        assert!(results[0].distance_km.abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_listing_keeps_lowest_price() {
        let s = store(1, "Corner Pharmacy", 0.0, 0.01);
        let mut pricey = medicine(10, &s, "Ibuprofen", 10, 5);
        let mut cheap = medicine(10, &s, "Ibuprofen", 8, 2);
        pricey.image_url = Some("first".to_string());
        cheap.image_url = Some("second".to_string());

        let results = rank(
            vec![candidate(pricey, s.clone()), candidate(cheap, s.clone())],
            origin(),
            10.0,
            None,
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].medicine.price, Decimal::new(8, 0));
        assert_eq!(results[0].medicine.image_url.as_deref(), Some("second"));
    }

    #[test]
    fn duplicate_listing_with_equal_price_keeps_first_seen() {
        let s = store(1, "Corner Pharmacy", 0.0, 0.01);
        let mut first = medicine(10, &s, "Ibuprofen", 8, 5);
        let mut second = medicine(10, &s, "Ibuprofen", 8, 9);
        first.image_url = Some("first".to_string());
        second.image_url = Some("second".to_string());

        let results = rank(
            vec![candidate(first, s.clone()), candidate(second, s.clone())],
            origin(),
            10.0,
            None,
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].medicine.image_url.as_deref(), Some("first"));
    }

    #[test]
    fn boundary_distance_is_inclusive() {
        let s = store(1, "Edge", 0.0, 0.09);
        let exact = distance_km(origin(), s.coordinate().unwrap());
        let make = || vec![candidate(medicine(10, &s, "Cetirizine", 3, 1), s.clone())];

        let included = rank(make(), origin(), exact, None);
        assert_eq!(included.len(), 1, "store at exactly the radius must be kept");

        let excluded = rank(make(), origin(), exact - 0.01, None);
        assert!(excluded.is_empty(), "store 0.01 km past the radius must be dropped");
    }

    #[test]
    fn ten_km_radius_boundary() {
        // 10 km due east along the equator.
        let lng = 10.0 / (crate::geo::EARTH_RADIUS_KM * std::f64::consts::PI / 180.0);
        let s = store(1, "Ten K", 0.0, lng);
        let d = distance_km(origin(), s.coordinate().unwrap());
        assert!((d - 10.0).abs() < 1e-6, "got {d}");

        let past = store(2, "Ten K Plus", 0.0, lng * 10.01 / 10.0);
        let candidates = vec![
            candidate(medicine(10, &s, "Amoxicillin", 3, 1), s.clone()),
            candidate(medicine(11, &past, "Amoxicillin", 3, 1), past.clone()),
        ];

        let results = rank(candidates, origin(), d, None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].store.id, s.id);
    }

    #[test]
    fn out_of_stock_is_never_returned() {
        let s = store(1, "Empty Shelf", 0.0, 0.0);
        let results = rank(
            vec![candidate(medicine(10, &s, "Insulin", 20, 0), s.clone())],
            origin(),
            10.0,
            None,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn store_with_invalid_coordinates_is_skipped() {
        let s = store(1, "Nowhere", 123.0, 0.0);
        let results = rank(
            vec![candidate(medicine(10, &s, "Insulin", 20, 4), s.clone())],
            origin(),
            20_000.0,
            None,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn ties_break_on_price_then_store_name() {
        let a = store(1, "Beta Pharmacy", 0.0, 0.02);
        let b = store(2, "Alpha Pharmacy", 0.0, 0.02);
        let c = store(3, "Gamma Pharmacy", 0.0, 0.02);
        let candidates = vec![
            candidate(medicine(10, &a, "Aspirin", 4, 1), a.clone()),
            candidate(medicine(11, &b, "Aspirin", 4, 1), b.clone()),
            candidate(medicine(12, &c, "Aspirin", 2, 1), c.clone()),
        ];

        let results = rank(candidates, origin(), 10.0, None);
        let names: Vec<&str> = results.iter().map(|r| r.store.store_name.as_str()).collect();
        assert_eq!(names, ["Gamma Pharmacy", "Alpha Pharmacy", "Beta Pharmacy"]);
        assert_ordered(&results);
    }

    #[test]
    fn sorted_by_distance_ascending() {
        let s1 = store(1, "Three", 0.0, 0.03);
        let s2 = store(2, "One", 0.0, 0.01);
        let s3 = store(3, "Two", 0.0, -0.02);
        let candidates = vec![
            candidate(medicine(10, &s1, "Aspirin", 1, 1), s1.clone()),
            candidate(medicine(11, &s2, "Aspirin", 9, 1), s2.clone()),
            candidate(medicine(12, &s3, "Aspirin", 5, 1), s3.clone()),
        ];

        let results = rank(candidates, origin(), 10.0, None);
        let names: Vec<&str> = results.iter().map(|r| r.store.store_name.as_str()).collect();
        assert_eq!(names, ["One", "Two", "Three"]);
        assert_ordered(&results);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let far = store(1, "Far", 0.0, 0.05);
        let near = store(2, "Near", 0.0, 0.01);
        let candidates = vec![
            candidate(medicine(10, &far, "Aspirin", 1, 1), far.clone()),
            candidate(medicine(11, &near, "Aspirin", 1, 1), near.clone()),
        ];

        let results = rank(candidates, origin(), 10.0, Some(1));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].store.id, near.id);
    }

    #[test]
    fn results_are_unique_per_store_and_medicine() {
        let s = store(1, "Hub", 0.0, 0.01);
        let other = store(2, "Spoke", 0.0, 0.02);
        let candidates = vec![
            candidate(medicine(10, &s, "Aspirin", 3, 1), s.clone()),
            candidate(medicine(10, &s, "Aspirin", 2, 1), s.clone()),
            candidate(medicine(11, &s, "Aspirin Forte", 6, 1), s.clone()),
            candidate(medicine(10, &other, "Aspirin", 2, 1), other.clone()),
        ];

        let results = rank(candidates, origin(), 10.0, None);
        let mut keys: Vec<(Uuid, Uuid)> = results.iter().map(|r| (r.store.id, r.medicine.id)).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(before, keys.len());
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn rank_is_idempotent() {
        let stores: Vec<StoreRecord> = (0..6u32)
            .map(|i| store(u128::from(i), &format!("Store {}", i % 3), 0.0, f64::from(i % 2) * 0.01))
            .collect();
        let candidates: Vec<Candidate> = stores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let price = i64::try_from(i % 2).unwrap() + 1;
                candidate(medicine(100 + i as u128, s, "Aspirin", price, 1), s.clone())
            })
            .collect();

        let first = rank(candidates.clone(), origin(), 10.0, None);
        let second = rank(candidates, origin(), 10.0, None);
        assert_eq!(first, second);
        assert_ordered(&first);
    }

    #[test]
    fn every_result_is_within_radius() {
        let candidates: Vec<Candidate> = (0..40u32)
            .map(|i| {
                let s = store(u128::from(i), &format!("S{i}"), 0.0, f64::from(i) * 0.05);
                candidate(medicine(1_000 + u128::from(i), &s, "Aspirin", 1, 1), s)
            })
            .collect();

        let radius = 25.0;
        let results = rank(candidates, origin(), radius, None);
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.distance_km <= radius));
    }

    #[test]
    fn display_distance_rounds_but_ranking_does_not() {
        // Both round to 1.1 km for display but must keep their true order.
        let a = store(1, "Zed", 0.0, 0.00990);
        let b = store(2, "Abe", 0.0, 0.00985);
        let candidates = vec![
            candidate(medicine(10, &a, "Aspirin", 1, 1), a.clone()),
            candidate(medicine(11, &b, "Aspirin", 1, 1), b.clone()),
        ];

        let results = rank(candidates, origin(), 10.0, None);
        assert_eq!(results[0].store.id, b.id);
        assert!((results[0].display_distance_km() - results[1].display_distance_km()).abs() < 1e-9);
    }
}
