use chrono::{NaiveDate, TimeZone, Utc};

use engine::{
    BlobStore, Currency, DateRange, Engine, EngineError, FileBlobStore, MemoryBlobStore, Revenue,
    Role, TripInputs, storage::TRIP_HISTORY_KEY,
};

fn logged_in_engine() -> (Engine<MemoryBlobStore>, MemoryBlobStore) {
    let store = MemoryBlobStore::new();
    let engine = Engine::builder().store(store.clone()).build().unwrap();
    engine.login("admin", "admin123").unwrap();
    (engine, store)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn trip(distance_km: f64, freight: f64) -> TripInputs {
    TripInputs {
        distance_km,
        revenue: Revenue::FlatAmount(freight),
        ..TripInputs::default()
    }
}

#[test]
fn calculator_is_gated_by_login() {
    let engine = Engine::builder()
        .store(MemoryBlobStore::new())
        .build()
        .unwrap();
    assert_eq!(
        engine.calculate(&trip(500.0, 2000.0)).unwrap_err(),
        EngineError::Forbidden("login required".to_string())
    );
    assert!(engine.trips().is_err());

    engine.login("admin", "admin123").unwrap();
    assert!(engine.calculate(&trip(500.0, 2000.0)).is_ok());

    engine.logout().unwrap();
    assert!(engine.history(&DateRange::all()).is_err());
}

#[test]
fn saved_trip_keeps_profit_and_display_currency() {
    let (engine, _) = logged_in_engine();
    let inputs = TripInputs {
        revenue: Revenue::FlatAmount(500.0),
        is_euro_mode: true,
        ..trip(500.0, 0.0)
    };
    let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
    let record = engine.save_trip(inputs, None, now).unwrap();

    assert_eq!(record.id, now.timestamp_millis().to_string());
    assert_eq!(record.summary.currency, Currency::Eur);
    // 500 EUR * 4.30 = 2150 PLN revenue, 1275 PLN costs, 19% tax.
    assert!((record.summary.total_net_profit - (2150.0 - 1275.0) * 0.81).abs() < 1e-9);
    assert_eq!(record.effective_date(), day(2024, 1, 10));
}

#[test]
fn invalid_trip_is_not_saved() {
    let (engine, _) = logged_in_engine();
    let now = Utc::now();
    assert!(matches!(
        engine.save_trip(trip(0.0, 2000.0), None, now),
        Err(EngineError::InvalidTrip(_))
    ));
    assert!(matches!(
        engine.save_trip(trip(500.0, 0.0), None, now),
        Err(EngineError::InvalidTrip(_))
    ));
    let unknown = TripInputs {
        tax_residency: "Atlantyda".to_string(),
        ..trip(500.0, 2000.0)
    };
    assert!(matches!(
        engine.save_trip(unknown, None, now),
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.trips().unwrap().is_empty());
}

#[test]
fn period_filter_selects_second_trip_only() {
    let (engine, _) = logged_in_engine();
    let now = Utc.with_ymd_and_hms(2024, 2, 6, 12, 0, 0).unwrap();

    let first = engine
        .save_trip(trip(500.0, 2000.0), Some(day(2024, 1, 10)), now)
        .unwrap();
    let second = engine
        .save_trip(trip(300.0, 1500.0), Some(day(2024, 2, 5)), now)
        .unwrap();
    assert_ne!(first.id, second.id);

    let all = engine.trips().unwrap();
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);

    let range = DateRange::parse(Some("2024-02-01"), None).unwrap();
    let (filtered, summary) = engine.history(&range).unwrap();
    assert_eq!(filtered, vec![second.clone()]);
    assert_eq!(summary.total_distance_km, 300.0);
    assert_eq!(summary.total_profit, second.summary.total_net_profit);
    assert_eq!(summary.trip_count, 1);

    let (_, everything) = engine.history(&DateRange::all()).unwrap();
    assert_eq!(everything.total_distance_km, 800.0);
}

#[test]
fn delete_then_reload_from_disk() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_blobs")
        .join(format!("engine_history_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);

    let store = FileBlobStore::new(&root).unwrap();
    let engine = Engine::builder().store(store.clone()).build().unwrap();
    engine.login("admin", "admin123").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let kept = engine.save_trip(trip(100.0, 900.0), None, now).unwrap();
    let gone = engine.save_trip(trip(200.0, 900.0), None, now).unwrap();

    assert!(engine.delete_trip(&gone.id).unwrap());
    assert!(!engine.delete_trip(&gone.id).unwrap());

    let reopened = Engine::builder().store(store).build().unwrap();
    assert_eq!(reopened.trips().unwrap(), vec![kept]);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn corrupt_history_recovers_on_next_save() {
    let (engine, store) = logged_in_engine();
    store.write(TRIP_HISTORY_KEY, "[{\"id\":").unwrap();
    assert!(engine.trips().unwrap().is_empty());

    engine
        .save_trip(trip(500.0, 2000.0), None, Utc::now())
        .unwrap();
    assert_eq!(engine.trips().unwrap().len(), 1);
}

#[test]
fn null_profit_record_survives_next_save() {
    let (engine, store) = logged_in_engine();
    store
        .write(
            TRIP_HISTORY_KEY,
            r#"[
                {"id":"1704880000001","timestamp":1704880000001,
                 "inputs":{"distance":500,"freightAmount":2000,"customFuelPrice":""},
                 "summary":{"totalNetProfit":null,"currency":"PLN"}},
                {"id":"1704880000000","timestamp":1704880000000,
                 "inputs":{"distance":300,"freightAmount":1500},
                 "summary":{"totalNetProfit":412.5,"currency":"PLN"}}
            ]"#,
        )
        .unwrap();
    assert_eq!(engine.trips().unwrap().len(), 2);

    engine
        .save_trip(trip(100.0, 900.0), None, Utc::now())
        .unwrap();
    let all = engine.trips().unwrap();
    assert_eq!(all.len(), 3);
    let (_, summary) = engine.history(&DateRange::all()).unwrap();
    assert!((summary.total_profit - 412.5 - all[0].summary.total_net_profit).abs() < 1e-9);
}

#[test]
fn older_records_load_for_re_editing() {
    let (engine, store) = logged_in_engine();
    store
        .write(
            TRIP_HISTORY_KEY,
            r#"[{
                "id": "1704880000000",
                "timestamp": 1704880000000,
                "date": "2024-01-10",
                "inputs": {
                    "distance": 500, "freightAmount": 2000,
                    "customFuelPrice": 5, "customTollCost": 0.4, "customServiceCost": 0.65,
                    "taxResidency": "Polska", "isEuroMode": false, "exchangeRate": 4.3
                },
                "summary": { "totalNetProfit": 587.25, "currency": "PLN" }
            }]"#,
        )
        .unwrap();

    let before = store.read(TRIP_HISTORY_KEY).unwrap();
    let record = engine.load_trip("1704880000000").unwrap();
    assert_eq!(store.read(TRIP_HISTORY_KEY).unwrap(), before);

    assert!(!record.inputs.revenue.is_per_km());
    assert_eq!(record.inputs.fuel_consumption_l_per_100km, 30.0);
    let results = engine.calculate(&record.inputs).unwrap();
    assert!((results.total_net_profit - record.summary.total_net_profit).abs() < 1e-9);
}

#[test]
fn only_admins_manage_principals() {
    let (engine, _) = logged_in_engine();
    engine.create_principal("ola", "haslo", Role::User).unwrap();
    assert_eq!(
        engine.delete_principal("admin").unwrap_err(),
        EngineError::ProtectedPrincipal("admin".to_string())
    );

    engine.login("ola", "haslo").unwrap();
    assert!(matches!(
        engine.list_principals(),
        Err(EngineError::Forbidden(_))
    ));
    assert!(engine.calculate(&trip(10.0, 100.0)).is_ok());
}
