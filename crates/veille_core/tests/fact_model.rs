use chrono::{TimeZone, Utc};
use veille_core::{Fact, FactDraft, FactPatch, FactValidationError, TECHNO_MAX_CHARS};

#[test]
fn valid_draft_passes_validation() {
    assert!(FactDraft::new("Cargo builds crates.", "Rust").validate().is_ok());
}

#[test]
fn blank_fields_are_reported_per_field_in_order() {
    let err = FactDraft::new("  ", "").validate().unwrap_err();
    let fields: Vec<_> = err.violations.iter().map(|v| v.field).collect();
    assert_eq!(fields, vec!["fact", "techno"]);
    assert!(err
        .violations
        .iter()
        .all(|v| v.message == "This value should not be blank."));
}

#[test]
fn overlong_techno_is_rejected() {
    let err: FactValidationError = FactDraft::new("ok", "x".repeat(TECHNO_MAX_CHARS + 1))
        .validate()
        .unwrap_err();
    assert_eq!(err.violations.len(), 1);
    assert_eq!(err.violations[0].field, "techno");
    assert_eq!(
        err.violations[0].message,
        "This value is too long. It should have 255 characters or less."
    );
    assert!(err.to_string().starts_with("invalid fact: techno:"));
}

#[test]
fn patch_deserializes_missing_and_null_fields_as_unset() {
    let patch: FactPatch = serde_json::from_str(r#"{"fact": "x", "techno": null}"#).unwrap();
    assert_eq!(patch.fact.as_deref(), Some("x"));
    assert_eq!(patch.techno, None);

    let empty: FactPatch = serde_json::from_str("{}").unwrap();
    assert!(empty.is_empty());
}

#[test]
fn fact_serialization_uses_expected_wire_fields() {
    let fact = Fact {
        id: 42,
        fact: "SQLite is serverless.".to_string(),
        techno: "SQLite".to_string(),
        date_enregistrement: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
    };

    let json = serde_json::to_value(&fact).unwrap();
    assert_eq!(json["id"], 42);
    assert_eq!(json["fact"], "SQLite is serverless.");
    assert_eq!(json["techno"], "SQLite");
    assert_eq!(json["dateEnregistrement"], "2023-11-14T22:13:20.123Z");
    assert!(json.get("date_enregistrement").is_none());

    let back: Fact = serde_json::from_value(json).unwrap();
    assert_eq!(back, fact);
}

#[test]
fn whole_second_timestamps_keep_millisecond_digits() {
    let fact = Fact {
        id: 1,
        fact: "x".to_string(),
        techno: "y".to_string(),
        date_enregistrement: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    };
    let json = serde_json::to_value(&fact).unwrap();
    assert_eq!(json["dateEnregistrement"], "2023-11-14T22:13:20.000Z");
}
