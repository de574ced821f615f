use chipledger::domain::{Decimal, ParticipantId, SessionId, TransactionKind};
use chipledger::engine::{player_settlement, Access, ContributionInput, ReturnInput};
use chipledger::store::{migrate, to_record, MemorySnapshotStore, MigrateError};
use chipledger::{SessionConfig, SessionOrchestrator, SnapshotStore};
use serde_json::json;
use std::sync::Arc;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn legacy_session() -> serde_json::Value {
    json!({
        "settings": {"stackValue": "100", "chipsPerStack": 100},
        "people": [
            {"id": "0", "name": "Ana", "initialMoney": 100, "moneyReturned": 40, "chipCount": 60},
            {"name": "", "totalMoney": "100.00", "chips": 100}
        ],
        "transactions": [
            {"personId": 0, "amount": 100, "type": "buyin", "time": 1700000000000i64},
            {"personId": 1, "amount": 100, "date": {"_seconds": 1700000060, "_nanoseconds": 0}},
            {"personId": 0, "amount": -40, "chips": -40, "timestamp": "2023-11-14T22:15:00Z"}
        ]
    })
}

#[test]
fn test_legacy_record_normalizes_to_current_schema() {
    let state = migrate(legacy_session()).unwrap();

    assert_eq!(state.config, SessionConfig::uniform(d("100"), 100));
    assert_eq!(state.participants[0].money_put_in, d("100"));
    assert_eq!(state.participants[1].id, ParticipantId::new(1));
    assert_eq!(state.participants[1].money_put_in, d("100"));
    assert_eq!(state.participants[1].chip_count, 100);

    let kinds: Vec<TransactionKind> = state.transactions.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Contribution,
            TransactionKind::Contribution,
            TransactionKind::Return
        ]
    );
    assert!(state.transactions.iter().all(|t| !t.amount.is_negative()));
    assert_eq!(state.transactions[1].person_name, "Person 2");
    assert_eq!(state.transactions[2].chips, 40);

    let ids: Vec<u64> = state.transactions.iter().map(|t| t.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(state.transactions[0].timestamp.as_millis(), 1_700_000_000_000);
    assert_eq!(state.transactions[1].timestamp.as_millis(), 1_700_000_060_000);
}

#[test]
fn test_current_record_survives_reload_unchanged() {
    let state = migrate(legacy_session()).unwrap();
    let record = to_record(&state).unwrap();
    assert_eq!(record["version"], 2);
    assert!(record["transactions"][0]["timestamp"].is_string());

    let reloaded = migrate(record).unwrap();
    assert_eq!(reloaded, state);
}

#[test]
fn test_future_versions_are_rejected() {
    let err = migrate(json!({"version": 99, "participants": []})).unwrap_err();
    assert_eq!(err, MigrateError::UnsupportedVersion(99));
}

#[test]
fn test_non_object_record_is_rejected() {
    assert_eq!(migrate(json!([1, 2])).unwrap_err(), MigrateError::NotAnObject);
}

#[test]
fn test_unparseable_timestamp_is_rejected() {
    let record = json!({
        "participants": [{"id": 0, "name": "A"}],
        "transactions": [{"participantId": 0, "amount": 5, "timestamp": "yesterday"}]
    });
    assert!(matches!(
        migrate(record).unwrap_err(),
        MigrateError::InvalidValue { field: "timestamp", .. }
    ));
}

#[tokio::test]
async fn test_legacy_session_is_usable_after_load() {
    let id = SessionId::generate();
    let store = Arc::new(MemorySnapshotStore::new().with_record(id, legacy_session()));
    let orch = SessionOrchestrator::new(store.clone(), SessionConfig::default());

    let outcome = orch
        .mutate(&id, Access::Edit, |ledger| {
            ledger.record_return(ParticipantId::new(1), ReturnInput::Count(160))
        })
        .await
        .unwrap();
    assert!(outcome.saved.acknowledged);
    assert_eq!(outcome.change.transaction.unwrap().id.0, 4);

    let raw = store.raw_record(&id).unwrap();
    assert_eq!(raw["version"], 2);

    let state = store.load_snapshot(&id).await.unwrap().unwrap();
    let report = player_settlement(&state);
    assert!(report.warning.is_none());
    let payments = report.payments();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].from, ParticipantId::new(0));
    assert_eq!(payments[0].amount, d("60"));
}

#[tokio::test]
async fn test_saved_amounts_reload_digit_for_digit() {
    let store = Arc::new(MemorySnapshotStore::new());
    let orch = SessionOrchestrator::new(store.clone(), SessionConfig::uniform(d("20"), 20));
    let (id, _) = orch.create_session(None).await.unwrap();
    orch.mutate(&id, Access::Edit, |ledger| ledger.add_participant("A", Decimal::zero()))
        .await
        .unwrap();
    orch.mutate(&id, Access::Edit, |ledger| {
        ledger.record_contribution(
            ParticipantId::new(0),
            ContributionInput::Stacks(d("0.123456789012345678")),
        )
    })
    .await
    .unwrap();

    let raw = store.raw_record(&id).unwrap();
    assert_eq!(raw["participants"][0]["moneyPutIn"], "2.46913578024691356");
    assert_eq!(raw["transactions"][0]["amount"], "2.46913578024691356");

    let live = orch.snapshot(&id).await.unwrap();
    let reloaded = store.load_snapshot(&id).await.unwrap().unwrap();
    assert_eq!(reloaded, live);
    assert_eq!(reloaded.total_pot(), d("2.46913578024691356"));
}

#[test]
fn test_negative_legacy_stack_value_is_rejected() {
    let record = json!({
        "settings": {"stackValue": -20, "chipsPerStack": 20},
        "people": [{"id": 0, "name": "Ana", "initialMoney": 20}]
    });
    assert!(matches!(
        migrate(record).unwrap_err(),
        MigrateError::InvalidValue { field: "stackUnitValue", .. }
    ));
}
