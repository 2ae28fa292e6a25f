//! SQLite store behaviour and the JSON request boundary.

use chrono::NaiveDate;
use ladder_core::{
    engine::LadderEngine,
    error::LadderError,
    invasion::{Invasion, Outcome, Settlement},
    member::{Faction, Member},
    request::{Request, Response},
    source::InvasionSource,
};

fn build() -> LadderEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    LadderEngine::build_test().expect("build test engine")
}

fn request(json: &str) -> Request {
    serde_json::from_str(json).expect("valid request json")
}

#[test]
fn roster_keeps_enrollment_order_for_tie_breaks() {
    let engine = build();
    let joined = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    for name in ["Chatz02", "Chatz01", "Abe"] {
        engine
            .enroll_member(&Member::new(name, joined, Faction::Syndicate).unwrap())
            .unwrap();
    }

    let roster = engine.roster().unwrap();
    let names: Vec<_> = roster.iter().map(|m| m.canonical_name.as_str()).collect();
    assert_eq!(names, vec!["Chatz02", "Chatz01", "Abe"]);
    assert_eq!(roster.is_member("Chatz", true), Some("Chatz02"));
    assert_eq!(roster.get(2).map(|m| m.faction), Some(Faction::Syndicate));
}

#[test]
fn duplicate_enrollment_is_rejected_case_insensitively() {
    let engine = build();
    let joined = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    engine
        .enroll_member(&Member::new("Fred", joined, Faction::Covenant).unwrap())
        .unwrap();
    let err = engine
        .enroll_member(&Member::new("FRED", joined, Faction::Covenant).unwrap())
        .unwrap_err();
    assert!(matches!(err, LadderError::DuplicateMember { .. }));
    assert_eq!(engine.store.member_count().unwrap(), 1);

    assert!(engine.remove_member("Fred").unwrap());
    assert!(!engine.remove_member("Fred").unwrap());
}

#[test]
fn reregistering_an_invasion_keeps_its_ladder() {
    let engine = build();
    let joined = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    engine
        .enroll_member(&Member::new("fred", joined, Faction::Covenant).unwrap())
        .unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let first = Invasion::register(date, Settlement::MonarchsBluff, Outcome::Loss, None);
    engine.register_invasion(&first).unwrap();
    engine
        .process_ladder(&first.id, "1 fred 10", Default::default())
        .unwrap();

    let corrected = Invasion::register(
        date,
        Settlement::MonarchsBluff,
        Outcome::Win,
        Some("outcome fixed".into()),
    );
    engine.register_invasion(&corrected).unwrap();

    let stored = engine.store.invasion(&first.id).unwrap().unwrap();
    assert_eq!(stored, corrected);
    assert_eq!(engine.invasion_report(&first.id).unwrap().entries, 1);

    let march = engine.store.invasions_in_month(3, 2024).unwrap();
    assert_eq!(march.len(), 1);
}

#[test]
fn json_requests_drive_the_whole_flow() {
    let engine = build();

    for json in [
        r#"{"type":"enroll_member","name":"Chatz01","joined":"2024-01-15","faction":"covenant","salary":true}"#,
        r#"{"type":"enroll_member","name":"Dave the Farmer","joined":"2024-01-16","faction":"marauders"}"#,
        r#"{"type":"register_invasion","day":1,"month":3,"year":2024,"settlement":"bw","win":true}"#,
    ] {
        engine.dispatch(request(json)).unwrap();
    }

    let resp = engine
        .dispatch(request(
            r#"{"type":"process_ladder","invasion":"20240301-bw","text":"1 ChatzO1 900\n3 Dave the 700"}"#,
        ))
        .unwrap();
    let Response::InvasionReport { report, needs_attention, text } = resp else {
        panic!("expected an invasion report");
    };
    assert!(needs_attention);
    assert_eq!(report.members, 2);
    assert!(text.contains("incomplete starting at rank 2"));

    let resp = engine
        .dispatch(request(r#"{"type":"month_report","month":3,"year":2024}"#))
        .unwrap();
    let Response::MonthReport { report, .. } = resp else {
        panic!("expected a month report");
    };
    assert_eq!(report.total_participation, 2);
    assert_eq!(report.salary_participation, 1);

    let resp = engine
        .dispatch(request(r#"{"type":"roster","faction":"marauders"}"#))
        .unwrap();
    let Response::Roster { count, text } = resp else {
        panic!("expected a roster");
    };
    assert_eq!(count, 2);
    assert!(text.contains("- Dave the Farmer (marauders)"));
    assert!(!text.contains("Chatz01"));

    let json = serde_json::to_value(engine.dispatch(request(
        r#"{"type":"invasion_report","invasion":"20240301-bw"}"#,
    )).unwrap())
    .unwrap();
    assert_eq!(json["type"], "invasion_report");
    assert_eq!(json["report"]["warnings"][0]["kind"], "incomplete_ladder");
}

#[test]
fn invalid_requests_never_reach_the_store() {
    let engine = build();
    let err = engine
        .dispatch(request(
            r#"{"type":"register_invasion","day":30,"month":2,"year":2024,"settlement":"bw","win":true}"#,
        ))
        .unwrap_err();
    assert!(matches!(err, LadderError::InvalidRequest { .. }));

    let err = engine
        .dispatch(request(
            r#"{"type":"enroll_member","name":"x","joined":"2024-01-15","faction":"pirates"}"#,
        ))
        .unwrap_err();
    assert!(matches!(err, LadderError::InvalidRequest { .. }));
    assert_eq!(engine.store.member_count().unwrap(), 0);
}

#[test]
fn enrollment_uses_the_roster_notion_of_duplicate() {
    let engine = build();
    let joined = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    engine
        .enroll_member(&Member::new("Ärik", joined, Faction::Covenant).unwrap())
        .unwrap();
    let err = engine
        .enroll_member(&Member::new("ärik", joined, Faction::Covenant).unwrap())
        .unwrap_err();
    assert!(matches!(err, LadderError::DuplicateMember { ref name } if name == "ärik"));

    // The roster still loads, so ladders can still be processed.
    let roster = engine.roster().unwrap();
    assert_eq!(roster.count(), 1);
    let invasion = Invasion::register(
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        Settlement::Edengrove,
        Outcome::Win,
        None,
    );
    engine.register_invasion(&invasion).unwrap();
    let report = engine
        .process_ladder(&invasion.id, "1 ÄRIK 100", Default::default())
        .unwrap();
    assert_eq!(report.members, 1);
    assert_eq!(engine.month_report(3, 2024).unwrap().total_participation, 1);

    assert!(engine.remove_member("ÄRIK").unwrap());
    assert_eq!(engine.store.member_count().unwrap(), 0);
}

#[test]
fn deleting_an_invasion_removes_its_ladder() {
    let engine = build();
    let joined = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    engine
        .enroll_member(&Member::new("fred", joined, Faction::Covenant).unwrap())
        .unwrap();
    engine
        .dispatch(request(
            r#"{"type":"register_invasion","day":4,"month":3,"year":2024,"settlement":"ef","win":false}"#,
        ))
        .unwrap();
    engine
        .process_ladder("20240304-ef", "1 fred 10\nx mary 5", Default::default())
        .unwrap();

    let resp = engine
        .dispatch(request(r#"{"type":"delete_invasion","invasion":"20240304-ef"}"#))
        .unwrap();
    let Response::InvasionDeleted { invasion, removed } = resp else {
        panic!("expected a deletion response");
    };
    assert_eq!(invasion, "20240304-ef");
    assert!(removed);

    assert!(engine.store.load_ladder("20240304-ef").unwrap().is_none());
    let err = engine.invasion_report("20240304-ef").unwrap_err();
    assert!(matches!(err, LadderError::InvasionNotFound { .. }));
    assert!(engine.month_report(3, 2024).unwrap().skipped.is_empty());

    assert!(!engine.delete_invasion("20240304-ef").unwrap());
}
