//! Aggregate feature importance from per-sample attributions
//!
//! Importance is the mean absolute attribution of a feature over all
//! explained rows. The report is a sorted list plus a plain-text bar chart.

use std::fs::{self, File};
use std::path::Path;
use tracing::info;

use crate::errors::{Result, TrainerError};

/// Width of the longest bar in the text chart
pub const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub mean_abs_shap: f64,
}

/// Mean |φ| per feature, sorted descending. Equal scores stay in column order.
pub fn mean_abs_importance(feature_names: &[String], shap: &[Vec<f64>]) -> Vec<FeatureImportance> {
    let rows = shap.len().max(1) as f64;
    let mut importances: Vec<FeatureImportance> = feature_names
        .iter()
        .enumerate()
        .map(|(f, name)| FeatureImportance {
            feature: name.clone(),
            mean_abs_shap: shap.iter().map(|phi| phi[f].abs()).sum::<f64>() / rows,
        })
        .collect();

    importances.sort_by(|a, b| b.mean_abs_shap.total_cmp(&a.mean_abs_shap));
    importances
}

/// One line per feature: padded name, `#` bar scaled to the top score, value.
pub fn render_bar_chart(importances: &[FeatureImportance], width: usize) -> Vec<String> {
    let label_width = importances.iter().map(|i| i.feature.len()).max().unwrap_or(0);
    let top = importances.iter().map(|i| i.mean_abs_shap).fold(0.0, f64::max);

    importances
        .iter()
        .map(|i| {
            let bar = if top > 0.0 {
                ((i.mean_abs_shap / top) * width as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:<label_width$} | {:<width$} {:.4}",
                i.feature,
                "#".repeat(bar),
                i.mean_abs_shap
            )
        })
        .collect()
}

pub fn log_report(importances: &[FeatureImportance]) {
    info!("Feature importance (mean |SHAP|):");
    for line in render_bar_chart(importances, CHART_WIDTH) {
        info!("  {}", line);
    }
}

/// Write the per-row attribution matrix with each row's identity.
pub fn write_shap_csv(
    path: &Path,
    feature_names: &[String],
    keys: &[(String, Option<String>)],
    shap: &[Vec<f64>],
) -> Result<()> {
    let write_err = |source: std::io::Error| TrainerError::Write {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| TrainerError::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    let mut writer = csv::Writer::from_writer(File::create(path).map_err(write_err)?);

    let header = ["account_id", "offer_id"]
        .into_iter()
        .chain(feature_names.iter().map(String::as_str));
    writer.write_record(header).map_err(csv_err)?;

    for ((account_id, offer_id), phi) in keys.iter().zip(shap) {
        let mut record = vec![account_id.clone(), offer_id.clone().unwrap_or_default()];
        record.extend(phi.iter().map(|v| v.to_string()));
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(write_err)?;

    info!("Wrote {} attribution rows to {}", shap.len(), path.display());
    Ok(())
}
