//! Integration tests for the unification stage
//!
//! Runs the whole stage over fixture files on disk.

use anyhow::Result;
use offerlab_etl::{run, EtlConfig, EtlError};
use offerlab_types::{EventKind, UnifiedRecord};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TRANSACTIONS: &str = r#"{"account_id":"u1","event":"offer received","time_since_test_start":0.0,"value":{"offer id":"o1"}}
{"account_id":"u1","event":"offer viewed","time_since_test_start":0.5,"value":{"offer id":"o1"}}
{"account_id":"u1","event":"transaction","time_since_test_start":1.0,"value":{"amount":19.9}}
{"account_id":"u1","event":"offer completed","time_since_test_start":1.0,"value":{"offer_id":"o1","reward":5.0}}
{"account_id":"u2","event":"offer received","time_since_test_start":2.0,"value":{"offer id":"o2"}}
{"account_id":"u2","event":"transaction","time_since_test_start":3.0,"value":{"amount":4.5}}
"#;

const PROFILES: &str = r#"{"id":"u1","gender":"F","age":52,"credit_card_limit":91000.0,"registered_on":"20170715"}
{"id":"u2","gender":null,"age":118,"credit_card_limit":null,"registered_on":20170804}
"#;

const OFFERS: &str = r#"[
  {"id":"o1","offer_type":"discount","discount_value":5,"min_value":20,"duration":10,"channels":["web","email"]},
  {"id":"o2","offer_type":"bogo","discount_value":10,"min_value":10,"duration":7,"channels":["email","mobile","social"]}
]"#;

fn fixture_dir() -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("transactions.json"), TRANSACTIONS)?;
    fs::write(dir.path().join("profile.json"), PROFILES)?;
    fs::write(dir.path().join("offers.json"), OFFERS)?;
    Ok(dir)
}

fn config_for(dir: &Path) -> EtlConfig {
    EtlConfig {
        input_dir: dir.to_path_buf(),
        output: dir.join("out").join("unified.csv"),
        ..EtlConfig::default()
    }
}

fn read_back(path: &Path) -> Result<Vec<UnifiedRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<UnifiedRecord>, _>>()?;
    Ok(rows)
}

#[test]
fn unified_file_keeps_every_transaction() -> Result<()> {
    let dir = fixture_dir()?;
    let config = config_for(dir.path());

    let summary = run(&config)?;
    assert_eq!(summary.transactions, 6);
    assert_eq!(summary.join.rows, 6);
    assert_eq!(summary.join.profile_matches, 6);
    assert_eq!(summary.join.offer_matches, 4);

    let rows = read_back(&config.output)?;
    assert_eq!(rows.len(), 6);

    let completed = &rows[3];
    assert_eq!(completed.event, EventKind::OfferCompleted);
    assert_eq!(completed.offer_id.as_deref(), Some("o1"));
    assert_eq!(completed.reward, Some(5.0));
    assert_eq!(completed.offer_type.as_deref(), Some("discount"));
    assert_eq!((completed.web, completed.email, completed.mobile, completed.social),
        (Some(1), Some(1), Some(0), Some(0)));

    let purchase = &rows[2];
    assert_eq!(purchase.amount, Some(19.9));
    assert_eq!(purchase.offer_id, None);
    assert_eq!(purchase.offer_type, None);
    assert_eq!(purchase.gender.as_deref(), Some("F"));

    let anonymous = &rows[4];
    assert_eq!(anonymous.gender, None);
    assert_eq!(anonymous.credit_card_limit, None);
    assert_eq!(anonymous.registered_on.map(|d| d.to_string()).as_deref(), Some("2017-08-04"));

    Ok(())
}

#[test]
fn rerun_produces_identical_bytes() -> Result<()> {
    let dir = fixture_dir()?;
    let config = config_for(dir.path());

    run(&config)?;
    let first = fs::read(&config.output)?;
    run(&config)?;
    let second = fs::read(&config.output)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn missing_input_fails_fast() -> Result<()> {
    let dir = fixture_dir()?;
    fs::remove_file(dir.path().join("offers.json"))?;

    let err = run(&config_for(dir.path())).unwrap_err();
    assert!(matches!(err, EtlError::Read { .. }));
    assert!(!dir.path().join("out").join("unified.csv").exists());
    Ok(())
}

#[test]
fn duplicate_profiles_abort_the_run() -> Result<()> {
    let dir = fixture_dir()?;
    let mut profiles = PROFILES.to_string();
    profiles.push_str(r#"{"id":"u1","gender":"M","age":20,"credit_card_limit":1000.0,"registered_on":"20180101"}"#);
    fs::write(dir.path().join("profile.json"), profiles)?;

    let err = run(&config_for(dir.path())).unwrap_err();
    assert!(matches!(err, EtlError::DuplicateKey { table: "profile", .. }));
    Ok(())
}
