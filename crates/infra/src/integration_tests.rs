//! Integration tests for the catalog + stock ledger pipeline.
//!
//! Tests: CatalogManager → StockLedger → Store, with the location service and
//! alert delivery replaced by in-memory fakes.
//!
//! Verifies:
//! - Add-or-update keeps one record per (equipment, location)
//! - Consumption never drives a quantity negative, even under contention
//! - Location outages and unknown locations are reported distinctly
//! - Low-stock alerts fire exactly when the quantity drops under the minimum

use std::sync::Arc;

use equipstock_catalog::{EquipmentStatus, EquipmentType};
use equipstock_core::{EquipmentTypeId, LocationId, StockRecordId};
use equipstock_stock::LocationRef;

use crate::alerts::RecordingAlertSink;
use crate::catalog_manager::{CatalogManager, CreateEquipmentType};
use crate::error::LedgerError;
use crate::location::InMemoryLocationDirectory;
use crate::stock_ledger::{AddStock, StockLedger};
use crate::store::{InMemoryStore, StockRepository};

const WARD_A: i32 = 5;
const WARD_B: i32 = 6;
const EMPTY_WARD: i32 = 7;

struct Harness {
    catalog: CatalogManager,
    ledger: StockLedger,
    store: Arc<InMemoryStore>,
    locations: Arc<InMemoryLocationDirectory>,
    alerts: Arc<RecordingAlertSink>,
}

fn setup() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let locations = Arc::new(InMemoryLocationDirectory::with_locations([
        LocationRef::new(LocationId::new(WARD_A), "Ward A"),
        LocationRef::new(LocationId::new(WARD_B), "Ward B"),
        LocationRef::new(LocationId::new(EMPTY_WARD), "Empty ward"),
    ]));
    let alerts = Arc::new(RecordingAlertSink::new());

    let catalog = CatalogManager::new(store.clone());
    let ledger = StockLedger::new(catalog.clone(), store.clone(), locations.clone(), alerts.clone());

    Harness {
        catalog,
        ledger,
        store,
        locations,
        alerts,
    }
}

async fn equipment(h: &Harness, name: &str, status: EquipmentStatus) -> EquipmentType {
    h.catalog
        .create_equipment_type(CreateEquipmentType {
            name: name.to_string(),
            description: format!("{name} for integration tests"),
            status,
            useful_life_years: Some(10),
        })
        .await
        .unwrap()
}

fn add(equipment_id: EquipmentTypeId, location: i32, quantity: i32, min: i32, max: i32) -> AddStock {
    AddStock {
        equipment_id,
        location_id: LocationId::new(location),
        quantity,
        min_threshold: min,
        max_threshold: max,
    }
}

#[tokio::test]
async fn add_creates_then_overwrites_same_pair() {
    let h = setup();
    let eq = equipment(&h, "Infusion pump", EquipmentStatus::Operational).await;

    let first = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 10, 2, 20)).await.unwrap();
    assert_eq!(first.quantity, 10);
    assert_eq!(first.equipment, eq);
    assert_eq!(first.location.name, "Ward A");

    let second = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 4, 1, 8)).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.quantity, 4);
    assert_eq!(second.min_threshold, 1);
    assert_eq!(second.max_threshold, 8);

    let listed = h.ledger.get_stock_by_location(LocationId::new(WARD_A)).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn repeated_identical_add_is_idempotent() {
    let h = setup();
    let eq = equipment(&h, "Defibrillator", EquipmentStatus::Operational).await;

    let a = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 3, 1, 5)).await.unwrap();
    let b = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 3, 1, 5)).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn quantity_above_max_threshold_is_stored_as_given() {
    let h = setup();
    let eq = equipment(&h, "Stretcher", EquipmentStatus::Operational).await;

    let rec = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 50, 2, 20)).await.unwrap();
    assert_eq!(rec.quantity, 50);
    assert_eq!(rec.max_threshold, 20);
}

#[tokio::test]
async fn add_rejects_negative_quantity_without_writing() {
    let h = setup();
    let eq = equipment(&h, "Oximeter", EquipmentStatus::Operational).await;

    let err = h.ledger.add_or_update_stock(add(eq.id, WARD_A, -1, 0, 5)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(h.store.list_by_location(LocationId::new(WARD_A)).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_requires_operational_equipment() {
    let h = setup();
    for status in [
        EquipmentStatus::UnderMaintenance,
        EquipmentStatus::OutOfService,
        EquipmentStatus::Retired,
    ] {
        let eq = equipment(&h, "Broken monitor", status).await;
        let err = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 1, 0, 5)).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)), "{status}: {err:?}");
    }
    assert!(h.store.list_by_location(LocationId::new(WARD_A)).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_reports_unknown_equipment_and_unknown_location() {
    let h = setup();
    let eq = equipment(&h, "Wheelchair", EquipmentStatus::Operational).await;

    let err = h
        .ledger
        .add_or_update_stock(add(EquipmentTypeId::new(999), WARD_A, 1, 0, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));

    let err = h.ledger.add_or_update_stock(add(eq.id, 404, 1, 0, 5)).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn add_during_location_outage_is_dependency_unavailable() {
    let h = setup();
    let eq = equipment(&h, "Ventilator", EquipmentStatus::Operational).await;
    h.locations.set_unavailable(true);

    let err = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 1, 0, 5)).await.unwrap_err();
    assert!(matches!(err, LedgerError::DependencyUnavailable(_)));
    assert!(h.store.list_by_location(LocationId::new(WARD_A)).await.unwrap().is_empty());
}

#[tokio::test]
async fn worked_example_consumes_and_alerts() {
    let h = setup();
    let eq = equipment(&h, "Suction unit", EquipmentStatus::Operational).await;
    let rec = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 10, 2, 20)).await.unwrap();

    let after = h.ledger.consume_stock(rec.id, 3).await.unwrap();
    assert_eq!(after.quantity, 7);
    assert!(h.alerts.all().is_empty());

    let after = h.ledger.consume_stock(rec.id, 6).await.unwrap();
    assert_eq!(after.quantity, 1);
    let alerts = h.alerts.all();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].stock_id, rec.id);
    assert_eq!(alerts[0].quantity, 1);
    assert_eq!(alerts[0].min_threshold, 2);
    assert_eq!(alerts[0].equipment_name, "Suction unit");

    let err = h.ledger.consume_stock(rec.id, 5).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidState(_)));
    let detail = h
        .ledger
        .get_stock_detail(LocationId::new(WARD_A), eq.id)
        .await
        .unwrap();
    assert_eq!(detail.quantity, 1);
    assert_eq!(h.alerts.all().len(), 1);
}

#[tokio::test]
async fn consuming_everything_leaves_zero() {
    let h = setup();
    let eq = equipment(&h, "Syringe driver", EquipmentStatus::Operational).await;
    let rec = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 4, 0, 10)).await.unwrap();

    let after = h.ledger.consume_stock(rec.id, 4).await.unwrap();
    assert_eq!(after.quantity, 0);
    // 0 is not below a minimum of 0
    assert!(h.alerts.all().is_empty());
}

#[tokio::test]
async fn negative_consumption_restocks() {
    let h = setup();
    let eq = equipment(&h, "Thermometer", EquipmentStatus::Operational).await;
    let rec = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 2, 1, 10)).await.unwrap();

    let after = h.ledger.consume_stock(rec.id, -3).await.unwrap();
    assert_eq!(after.quantity, 5);
}

#[tokio::test]
async fn consume_unknown_record_is_not_found() {
    let h = setup();
    let err = h.ledger.consume_stock(StockRecordId::new(77), 1).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn consume_during_outage_rejects_before_writing() {
    let h = setup();
    let eq = equipment(&h, "ECG", EquipmentStatus::Operational).await;
    let rec = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 10, 2, 20)).await.unwrap();

    h.locations.set_unavailable(true);
    let err = h.ledger.consume_stock(rec.id, 9).await.unwrap_err();
    assert!(matches!(err, LedgerError::DependencyUnavailable(_)));

    let stored = StockRepository::find(h.store.as_ref(), rec.id).await.unwrap().unwrap();
    assert_eq!(stored.quantity(), 10);
    assert!(h.alerts.all().is_empty());
}

#[tokio::test]
async fn list_distinguishes_empty_location_from_unknown_location() {
    let h = setup();
    let eq = equipment(&h, "Bed", EquipmentStatus::Operational).await;
    h.ledger.add_or_update_stock(add(eq.id, WARD_A, 1, 0, 5)).await.unwrap();

    let empty = h.ledger.get_stock_by_location(LocationId::new(EMPTY_WARD)).await.unwrap();
    assert!(empty.is_empty());

    let err = h.ledger.get_stock_by_location(LocationId::new(404)).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));

    h.locations.set_unavailable(true);
    let err = h.ledger.get_stock_by_location(LocationId::new(WARD_A)).await.unwrap_err();
    assert!(matches!(err, LedgerError::DependencyUnavailable(_)));
}

#[tokio::test]
async fn list_only_returns_records_for_that_location() {
    let h = setup();
    let pump = equipment(&h, "Pump", EquipmentStatus::Operational).await;
    let monitor = equipment(&h, "Monitor", EquipmentStatus::Operational).await;
    h.ledger.add_or_update_stock(add(pump.id, WARD_A, 1, 0, 5)).await.unwrap();
    h.ledger.add_or_update_stock(add(monitor.id, WARD_A, 2, 0, 5)).await.unwrap();
    h.ledger.add_or_update_stock(add(pump.id, WARD_B, 3, 0, 5)).await.unwrap();

    let ward_a = h.ledger.get_stock_by_location(LocationId::new(WARD_A)).await.unwrap();
    assert_eq!(ward_a.len(), 2);
    assert!(ward_a.iter().all(|s| s.location.id == LocationId::new(WARD_A)));
    assert!(ward_a.iter().all(|s| s.location.name == "Ward A"));

    let names: Vec<&str> = ward_a.iter().map(|s| s.equipment.name.as_str()).collect();
    assert!(names.contains(&"Pump") && names.contains(&"Monitor"));
}

#[tokio::test]
async fn detail_reports_missing_pair_and_unknown_location() {
    let h = setup();
    let eq = equipment(&h, "Scale", EquipmentStatus::Operational).await;
    h.ledger.add_or_update_stock(add(eq.id, WARD_A, 1, 0, 5)).await.unwrap();

    let found = h.ledger.get_stock_detail(LocationId::new(WARD_A), eq.id).await.unwrap();
    assert_eq!(found.equipment.id, eq.id);

    let err = h.ledger.get_stock_detail(LocationId::new(WARD_B), eq.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));

    let err = h.ledger.get_stock_detail(LocationId::new(404), eq.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn detail_during_location_outage_is_dependency_unavailable() {
    let h = setup();
    let eq = equipment(&h, "Infusion stand", EquipmentStatus::Operational).await;
    h.ledger.add_or_update_stock(add(eq.id, WARD_A, 3, 1, 5)).await.unwrap();

    h.locations.set_unavailable(true);
    let err = h.ledger.get_stock_detail(LocationId::new(WARD_A), eq.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::DependencyUnavailable(_)), "{err:?}");
}

#[tokio::test]
async fn location_service_is_consulted_on_every_call() {
    let h = setup();
    let eq = equipment(&h, "Lamp", EquipmentStatus::Operational).await;
    let rec = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 10, 0, 20)).await.unwrap();
    let before = h.locations.lookups();

    for _ in 0..3 {
        h.ledger.get_stock_by_location(LocationId::new(WARD_A)).await.unwrap();
    }
    h.ledger.consume_stock(rec.id, 1).await.unwrap();
    assert_eq!(h.locations.lookups(), before + 4);

    // A location removed upstream is seen immediately.
    h.locations.remove(LocationId::new(WARD_A));
    let err = h.ledger.get_stock_by_location(LocationId::new(WARD_A)).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_consumption_never_goes_negative() {
    let h = setup();
    let eq = equipment(&h, "Glove box", EquipmentStatus::Operational).await;
    let rec = h.ledger.add_or_update_stock(add(eq.id, WARD_A, 10, 0, 20)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..25 {
        let ledger = h.ledger.clone();
        handles.push(tokio::spawn(async move { ledger.consume_stock(rec.id, 1).await }));
    }

    let mut applied = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(after) => {
                assert!(after.quantity >= 0);
                applied += 1;
            }
            Err(LedgerError::InvalidState(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(applied, 10);
    assert_eq!(rejected, 15);
    let stored = StockRepository::find(h.store.as_ref(), rec.id).await.unwrap().unwrap();
    assert_eq!(stored.quantity(), 0);
}
