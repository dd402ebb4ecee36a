//! Integration tests for the modeling stage
//!
//! Drives raw fixtures through unification and training, and checks that
//! runs are reproducible.

use anyhow::Result;
use offerlab_gbdt::{Model, TreeExplainer};
use offerlab_trainer::{
    build_training_set, label_received, read_unified, run, train_test_split, TrainerError, TrainingConfig,
};
use offerlab_types::{EventKind, UnifiedRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TRANSACTIONS: &str = r#"{"account_id":"A","event":"offer received","time":0.0,"value":{"offer id":"O1"}}
{"account_id":"A","event":"offer completed","time":2.0,"value":{"offer_id":"O1","reward":3.0}}
{"account_id":"B","event":"offer received","time":0.0,"value":{"offer id":"O2"}}
{"account_id":"B","event":"transaction","time":1.0,"value":{"amount":7.25}}
"#;

const PROFILES: &str = r#"{"id":"A","gender":"M","age":30,"credit_card_limit":60000.0,"registered_on":20160101}
{"id":"B","gender":"F","age":55,"credit_card_limit":90000.0,"registered_on":"20180315"}
"#;

const OFFERS: &str = r#"{"id":"O1","offer_type":"discount","discount_value":3,"min_value":10,"duration":7,"channels":["web","email"]}
{"id":"O2","offer_type":"discount","discount_value":2,"min_value":10,"duration":10,"channels":["email","mobile","social"]}
"#;

/// Run the ETL stage over the raw fixtures and return the unified file path.
fn unify_fixtures(dir: &Path) -> Result<PathBuf> {
    fs::write(dir.join("transactions.json"), TRANSACTIONS)?;
    fs::write(dir.join("profile.json"), PROFILES)?;
    fs::write(dir.join("offers.json"), OFFERS)?;

    let config = offerlab_etl::EtlConfig {
        input_dir: dir.to_path_buf(),
        output: dir.join("unified.csv"),
        ..offerlab_etl::EtlConfig::default()
    };
    offerlab_etl::run(&config)?;
    Ok(config.output)
}

/// Several hundred received offers with a learnable completion rule
fn synthetic_rows() -> Vec<UnifiedRecord> {
    let offers = [
        ("bogo", 10.0, 10.0, 5.0, [1, 1, 1, 1]),
        ("discount", 2.0, 10.0, 10.0, [1, 1, 1, 0]),
        ("discount", 5.0, 20.0, 7.0, [1, 1, 0, 0]),
        ("informational", 0.0, 0.0, 3.0, [0, 1, 1, 0]),
    ];
    let genders = [Some("F"), Some("M"), Some("O"), None];

    let mut rows = Vec::new();
    for i in 0..400usize {
        let (offer_type, discount, min_value, duration, channels) = offers[i % offers.len()];
        let age = 18.0 + ((i * 13) % 70) as f64;
        let limit = if i % 11 == 0 {
            None
        } else {
            Some(30_000.0 + ((i * 37) % 90) as f64 * 1_000.0)
        };
        let account = format!("u{i}");
        let offer = format!("o{}", i % offers.len());

        let base = UnifiedRecord {
            account_id: account,
            offer_id: Some(offer),
            event: EventKind::OfferReceived,
            time: Some((i % 30) as f64),
            amount: None,
            reward: None,
            gender: genders[i % genders.len()].map(str::to_string),
            age: Some(age),
            credit_card_limit: limit,
            registered_on: None,
            offer_type: Some(offer_type.to_string()),
            discount_value: Some(discount),
            min_value: Some(min_value),
            duration: Some(duration),
            web: Some(channels[0]),
            email: Some(channels[1]),
            mobile: Some(channels[2]),
            social: Some(channels[3]),
        };

        let completes = limit.is_some_and(|l| l > 75_000.0) || (age > 60.0 && offer_type == "bogo");
        if completes {
            rows.push(UnifiedRecord {
                event: EventKind::OfferCompleted,
                reward: Some(discount),
                time: base.time.map(|t| t + 1.0),
                ..base.clone()
            });
        }
        rows.push(base);
    }
    rows
}

fn synthetic_config(dir: &TempDir) -> Result<TrainingConfig> {
    let input = dir.path().join("unified.csv");
    offerlab_etl::write_unified(&input, &synthetic_rows())?;

    let mut config = TrainingConfig {
        input,
        ..TrainingConfig::default()
    };
    config.gbdt.num_trees = 20;
    config.gbdt.max_depth = 4;
    Ok(config)
}

#[test]
fn test_end_to_end_labels() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let unified = unify_fixtures(dir.path())?;

    let rows = read_unified(&unified)?;
    assert_eq!(rows.len(), 4);

    let labeled = label_received(&rows);
    let table = build_training_set(&labeled);
    assert_eq!(table.len(), 2);

    let labels: Vec<(&str, Option<&str>, f64)> = table
        .keys
        .iter()
        .zip(&table.labels)
        .map(|((account, offer), &y)| (account.as_str(), offer.as_deref(), y))
        .collect();
    assert_eq!(labels, vec![("A", Some("O1"), 1.0), ("B", Some("O2"), 0.0)]);
    Ok(())
}

#[test]
fn test_end_to_end_training_runs_on_tiny_input() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = TrainingConfig {
        input: unify_fixtures(dir.path())?,
        ..TrainingConfig::default()
    };

    let report = run(&config)?;
    assert_eq!(report.training_rows, 2);
    assert_eq!(report.train_rows + report.test_rows, 2);
    Ok(())
}

#[test]
fn test_deterministic_training() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = synthetic_config(&dir)?;

    config.model_output = Some(dir.path().join("run1"));
    let first = run(&config)?;
    config.model_output = Some(dir.path().join("run2"));
    let second = run(&config)?;

    assert_eq!(first.model_hash, second.model_hash);
    assert_eq!(first.metrics, second.metrics);
    assert_eq!(
        fs::read(dir.path().join("run1/model.json"))?,
        fs::read(dir.path().join("run2/model.json"))?
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("run1/model.hash"))?,
        first.model_hash
    );
    Ok(())
}

#[test]
fn test_split_depends_on_seed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = synthetic_config(&dir)?;

    let rows = read_unified(&config.input)?;
    let table = build_training_set(&label_received(&rows));
    assert_eq!(table.len(), 300);

    let a = train_test_split(table.len(), config.test_fraction, config.seed)?;
    let b = train_test_split(table.len(), config.test_fraction, config.seed)?;
    let c = train_test_split(table.len(), config.test_fraction, 7)?;
    assert_eq!(a, b);
    assert_ne!(a.test, c.test);
    assert_eq!(a.test.len(), 60);

    let base = run(&config)?;
    config.seed = 7;
    let reseeded = run(&config)?;
    assert_ne!(base.model_hash, reseeded.model_hash);
    Ok(())
}

#[test]
fn test_metrics_are_bounded_and_model_learns() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let report = run(&synthetic_config(&dir)?)?;

    assert_eq!((report.train_rows, report.test_rows), (240, 60));
    let m = report.metrics;
    for value in [m.accuracy, m.precision, m.recall, m.f1] {
        assert!((0.0..=1.0).contains(&value));
    }
    assert!(m.accuracy > 0.7, "accuracy {}", m.accuracy);
    Ok(())
}

#[test]
fn test_shap_local_accuracy_on_trained_model() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = synthetic_config(&dir)?;
    config.model_output = Some(dir.path().join("model"));
    let report = run(&config)?;

    let model = Model::load(&dir.path().join("model/model.json"))?;
    let explainer = TreeExplainer::new(&model);
    assert!((explainer.expected_value() - report.expected_value).abs() < 1e-9);

    let rows = read_unified(&config.input)?;
    let table = build_training_set(&label_received(&rows));
    for row in &table.features {
        let phi = explainer.shap_values(row);
        let reconstructed = explainer.expected_value() + phi.iter().sum::<f64>();
        assert!((reconstructed - model.margin(row)).abs() < 1e-6);
    }

    let top = &report.importances[0];
    assert!(top.mean_abs_shap > 0.0);
    assert!(report
        .importances
        .windows(2)
        .all(|w| w[0].mean_abs_shap >= w[1].mean_abs_shap));
    Ok(())
}

#[test]
fn test_shap_csv_has_one_row_per_training_sample() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = synthetic_config(&dir)?;
    let shap_path = dir.path().join("reports/shap.csv");
    config.shap_output = Some(shap_path.clone());

    let report = run(&config)?;
    let content = fs::read_to_string(&shap_path)?;
    let mut lines = content.lines();

    let header = lines.next().unwrap_or_default();
    assert!(header.starts_with("account_id,offer_id,age,credit_card_limit,reward"));
    assert_eq!(lines.count(), report.train_rows);
    Ok(())
}

#[test]
fn test_missing_input_fails_fast() {
    let config = TrainingConfig {
        input: PathBuf::from("/nonexistent/unified.csv"),
        ..TrainingConfig::default()
    };
    assert!(matches!(run(&config), Err(TrainerError::Read { .. })));
}
